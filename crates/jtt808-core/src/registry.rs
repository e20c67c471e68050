//! Version string → parser lookup, built once at startup and passed to
//! whatever accepts connections.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::parser::{DataParser, Jtt808Parser};

#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn DataParser>>,
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("protocols", &self.protocols())
            .finish()
    }
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the JT/T 808-2013 parser.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Jtt808Parser::new()));
        registry
    }

    /// Registers `parser` under its own protocol id, returning any parser it
    /// replaced.
    pub fn register(&mut self, parser: Arc<dyn DataParser>) -> Option<Arc<dyn DataParser>> {
        let id = parser.protocol_id().to_string();
        info!(protocol = %id, "registered parser");
        self.parsers.insert(id, parser)
    }

    pub fn get(&self, protocol_id: &str) -> Option<Arc<dyn DataParser>> {
        self.parsers.get(protocol_id).cloned()
    }

    /// Registered protocol ids, sorted.
    pub fn protocols(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
