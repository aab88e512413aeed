//! Listing backends: adapters that turn object bytes into instruction
//! listings.
//!
//! Real disassembler integrations (objdiff, capstone, vendor exporters)
//! live outside this crate; their whole contract is the `ListingDocument`
//! they produce. The registry lets frontends select a codec by name, and the
//! JSON backend is both the default ingest codec and the format stored
//! blobs are rehydrated with.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::ListingDocument;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("malformed listing document: {0}")]
    Malformed(String),
}

/// A codec from raw object bytes to a listing document.
pub trait ListingBackend: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<ListingDocument, ListingError>;
    fn name(&self) -> &'static str;
}

/// The default codec: a JSON document of symbols and instruction streams.
pub struct JsonListingBackend;

impl ListingBackend for JsonListingBackend {
    fn parse(&self, bytes: &[u8]) -> Result<ListingDocument, ListingError> {
        serde_json::from_slice(bytes).map_err(|e| ListingError::Malformed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Maps backend names to codecs so a frontend can pick one at runtime.
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Box<dyn ListingBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self { backends: HashMap::new() }
    }

    pub fn register<B: ListingBackend + 'static>(&mut self, backend: B) -> &mut Self {
        self.backends.insert(backend.name().to_string(), Box::new(backend));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ListingBackend> {
        self.backends.get(name).map(|b| &**b)
    }

    /// Names of the registered backends, sorted so help output is stable.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.backends.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// A registry with the built-in JSON backend already registered.
pub fn default_backend_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(JsonListingBackend);
    registry
}

/// Parse bytes with the default document codec. Stored blobs always use it.
pub fn parse_listing(bytes: &[u8]) -> Result<ListingDocument, ListingError> {
    JsonListingBackend.parse(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_backend_round_trips_a_document() {
        let raw = br#"{"symbols":[{"name":"f","symbol_idx":0,"instructions":[{"opcode":"nop"}]}]}"#;
        let doc = parse_listing(raw).expect("parse listing");
        assert_eq!(doc.symbols.len(), 1);
        assert_eq!(doc.symbols[0].instructions[0].opcode, "nop");
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(parse_listing(b"not json").is_err());
    }

    #[test]
    fn registry_lists_backends_by_name() {
        let registry = default_backend_registry();
        assert_eq!(registry.names(), vec!["json".to_string()]);
        assert!(registry.get("json").is_some());
        assert!(registry.get("elf").is_none());
    }
}
