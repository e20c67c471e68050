//! Wire protocol: framing, header, body decoders and response encoding.

pub mod bcd;
pub mod builder;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod escape;
pub mod frame;
pub mod header;
pub mod location;
pub mod media;
pub mod messages;
pub mod metadata;
pub mod reader;
pub mod response;
pub mod terminal;

pub use builder::FrameBuilder;
pub use codec::{BodyDecoder, DecodeFn, DecodedFrame};
pub use error::ProtocolError;
pub use frame::{Frame, FrameExtractor, MAX_BUFFERED_BYTES};
pub use header::{parse_header, EncryptMode, Header, SubPacket};
pub use messages::*;
pub use metadata::{peek_metadata, FrameMetadata};
pub use response::{ResponseEncoder, ResponseReason, TokenSource, UuidTokens};
