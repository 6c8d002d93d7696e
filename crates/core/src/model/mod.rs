//! Core data model for normalized symbols and their raw inputs.
//!
//! Entities are produced once by the entity pass and never mutated afterwards.
//! They live in arenas keyed by [`FunctionId`] / [`TypeId`]; relation edges
//! refer to them only through those ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable arena index of a [`Function`] within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

/// Stable arena index of a [`LocalType`] within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// A single argument or return type as reported by the type decoder.
///
/// The descriptor is opaque to the model: `decl` is the declaration text the
/// decoder produced (e.g. `"int"`, `"_mon_block_fld *"`), `size` is the byte
/// size when the decoder knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub decl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl TypeDescriptor {
    pub fn new(decl: impl Into<String>) -> Self {
        Self { decl: decl.into(), size: None }
    }

    pub fn void() -> Self {
        Self::new("void")
    }
}

/// Opaque calling-convention label produced by the type decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallingConvention(pub String);

impl CallingConvention {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn unknown() -> Self {
        Self::new("unknown")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalized function record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Identifier of the symbol in the analysis tool that produced it.
    pub source_id: i64,
    /// Leaf name; overloads share it.
    pub name: String,
    /// Qualifying scope, `None` for free functions.
    pub owner_name: Option<String>,
    pub return_type: TypeDescriptor,
    pub arg_types: Vec<TypeDescriptor>,
    /// Aligned argument names, at least as many as `arg_types`.
    pub arg_names: Vec<String>,
    pub calling_convention: CallingConvention,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner_name {
            Some(owner) => write!(f, "{owner}::{} : {}", self.name, self.source_id),
            None => write!(f, "{} : {}", self.name, self.source_id),
        }
    }
}

/// Closed set of user-defined type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Struct,
    Union,
    Enum,
    Typedef,
    Class,
}

impl TypeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeCategory::Struct => "struct",
            TypeCategory::Union => "union",
            TypeCategory::Enum => "enum",
            TypeCategory::Typedef => "typedef",
            TypeCategory::Class => "class",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "struct" => Some(TypeCategory::Struct),
            "union" => Some(TypeCategory::Union),
            "enum" => Some(TypeCategory::Enum),
            "typedef" => Some(TypeCategory::Typedef),
            "class" => Some(TypeCategory::Class),
            _ => None,
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified local (user-defined) type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalType {
    pub source_id: i64,
    pub name: String,
    pub category: TypeCategory,
}

impl fmt::Display for LocalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} : {}", self.category, self.name, self.source_id)
    }
}

/// Identifier with kind, used where the graph needs to refer to either entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Function(FunctionId),
    Type(TypeId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Function(id) => id.fmt(f),
            EntityRef::Type(id) => id.fmt(f),
        }
    }
}

/// Raw function symbol as exported by the analysis tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFunctionRecord {
    pub source_id: i64,
    /// Decorated qualified name, e.g. `NS::Outer::method<int>(int,float)`.
    #[serde(default)]
    pub raw_name: String,
    /// Encoded type blob handed to the type decoder.
    pub type_blob: String,
    /// Encoded parameter-name blob handed to the field-name decoder.
    #[serde(default)]
    pub field_blob: String,
    /// Type names referenced by the signature.
    #[serde(default)]
    pub references: Vec<String>,
}

/// Raw local type declaration as exported by the analysis tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeRecord {
    pub source_id: i64,
    pub name: String,
    /// Free-text multi-word declaration, e.g. `const struct _mon_block_fld`.
    pub declaration: String,
    /// Enclosing namespace, if any.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Name of the lexically enclosing type, if nested.
    #[serde(default)]
    pub parent: Option<String>,
    /// Types referenced by fields/members (not nested ones).
    #[serde(default)]
    pub references: Vec<String>,
}

/// A batch of raw records processed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBatch {
    #[serde(default)]
    pub functions: Vec<RawFunctionRecord>,
    #[serde(default)]
    pub types: Vec<RawTypeRecord>,
}

impl RawBatch {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.types.len()
    }
}
