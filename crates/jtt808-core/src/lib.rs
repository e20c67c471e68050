//! # jtt808-core
//!
//! Codec for JT/T 808, the vehicle terminal ↔ platform protocol used by
//! Chinese fleet telematics: flag-delimited, byte-stuffed, XOR-checksummed
//! frames carrying registration, positions, alarms, media and the rest.
//!
//! The crate performs no I/O. A transport feeds each connection's bytes into
//! a [`BytesMut`](bytes::BytesMut) and asks a [`DataParser`] for events and
//! replies:
//!
//! ```rust
//! use bytes::BytesMut;
//! use jtt808_core::{DataParser, DomainEvent, EventKind, FrameBuilder, ParserRegistry};
//!
//! let registry = ParserRegistry::with_defaults();
//! let parser = registry.get("china-jtt808-2013.1").unwrap();
//!
//! let wire = FrameBuilder::new(0x0002, "012345678901", 1).finish().unwrap();
//! let mut buf = BytesMut::from(&wire[..]);
//! let mut events: Vec<DomainEvent> = Vec::new();
//! parser.process(&mut buf, &mut events);
//!
//! assert_eq!(events[0].kind, EventKind::Heartbeat);
//! assert_eq!(events[0].device_id(), "012345678901");
//! ```
//!
//! - **`protocol`** – framing, header, body decoders and acknowledgements.
//! - **`parser`** – the [`DataParser`] seam and the batch driver.
//! - **`registry`** – version string → parser.
//! - **`config`** – serde-loadable codec settings.

pub mod config;
pub mod parser;
pub mod protocol;
pub mod registry;

pub use config::CodecConfig;
pub use parser::{DataParser, EventSink, Jtt808Parser, ProcessSummary};
pub use protocol::builder::FrameBuilder;
pub use protocol::codec::{BodyDecoder, DecodedFrame};
pub use protocol::error::ProtocolError;
pub use protocol::frame::{Frame, FrameExtractor};
pub use protocol::messages::{DomainEvent, EventKind, EventMeta, PROTOCOL_ID};
pub use protocol::response::{ResponseEncoder, ResponseReason};
pub use registry::ParserRegistry;
