//! Decoders for the encoded blobs attached to raw function records.
//!
//! The encoded formats belong to the analysis tool that exported the symbols;
//! the rest of the crate only sees these traits. Decoders are stateless and
//! may be called from several worker threads at once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CallingConvention, TypeDescriptor};

pub mod json;

pub use json::JsonDecoder;

/// Name of the decoder used when neither the caller nor the project config picks one.
pub const DEFAULT_DECODER_NAME: &str = "json";

/// Output of a type-blob decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedSignature {
    pub arg_types: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
    pub calling_convention: CallingConvention,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed type blob: {0}")]
    MalformedType(String),
    #[error("Malformed field-name blob: {0}")]
    MalformedFields(String),
}

/// Decodes a function's encoded type blob.
pub trait TypeDecoder: Send + Sync {
    fn decode_type(&self, blob: &str) -> Result<DecodedSignature, DecodeError>;
}

/// Decodes a function's encoded parameter-name blob.
pub trait FieldNameDecoder: Send + Sync {
    fn decode_names(&self, blob: &str) -> Result<Vec<String>, DecodeError>;
}

/// A named decoder able to handle both blob kinds of one export format.
pub trait SymbolDecoder: TypeDecoder + FieldNameDecoder {
    fn name(&self) -> &'static str;
}

/// Registry for decoders; callers select by name.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Box<dyn SymbolDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self { decoders: HashMap::new() }
    }

    pub fn register<D: SymbolDecoder + 'static>(&mut self, decoder: D) -> &mut Self {
        self.decoders.insert(decoder.name().to_string(), Box::new(decoder));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn SymbolDecoder> {
        self.decoders.get(name).map(|d| &**d)
    }

    /// Return a sorted list of registered decoder names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.decoders.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Registry populated with the built-in decoders.
pub fn default_decoder_registry() -> DecoderRegistry {
    let mut registry = DecoderRegistry::new();
    registry.register(JsonDecoder);
    registry
}
