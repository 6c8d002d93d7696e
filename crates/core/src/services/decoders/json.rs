use serde::Deserialize;

use crate::model::{CallingConvention, TypeDescriptor};
use crate::services::decoders::{
    DecodeError, DecodedSignature, FieldNameDecoder, SymbolDecoder, TypeDecoder,
};

/// Decoder for exports that carry already-unpacked signatures as JSON.
///
/// Type blob: `{"args": [..], "ret": <desc>, "cc": "<tag>"}` where a descriptor
/// is either a bare string or `{"decl": "...", "size": n}`. Missing `ret` is
/// `void`, missing `cc` is `unknown`.
///
/// Field blob: a JSON array of strings. An empty blob has no names.
pub struct JsonDecoder;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDescriptor {
    Plain(String),
    Full(TypeDescriptor),
}

impl From<RawDescriptor> for TypeDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        match raw {
            RawDescriptor::Plain(decl) => TypeDescriptor::new(decl),
            RawDescriptor::Full(desc) => desc,
        }
    }
}

#[derive(Deserialize)]
struct RawSignature {
    #[serde(default)]
    args: Vec<RawDescriptor>,
    #[serde(default)]
    ret: Option<RawDescriptor>,
    #[serde(default)]
    cc: Option<String>,
}

impl TypeDecoder for JsonDecoder {
    fn decode_type(&self, blob: &str) -> Result<DecodedSignature, DecodeError> {
        let raw: RawSignature = serde_json::from_str(blob.trim())
            .map_err(|e| DecodeError::MalformedType(e.to_string()))?;

        Ok(DecodedSignature {
            arg_types: raw.args.into_iter().map(TypeDescriptor::from).collect(),
            return_type: raw.ret.map(TypeDescriptor::from).unwrap_or_else(TypeDescriptor::void),
            calling_convention: raw
                .cc
                .map(CallingConvention::new)
                .unwrap_or_else(CallingConvention::unknown),
        })
    }
}

impl FieldNameDecoder for JsonDecoder {
    fn decode_names(&self, blob: &str) -> Result<Vec<String>, DecodeError> {
        let body = blob.trim();
        if body.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(body).map_err(|e| DecodeError::MalformedFields(e.to_string()))
    }
}

impl SymbolDecoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "json"
    }
}
