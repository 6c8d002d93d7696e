use thiserror::Error;

use crate::model::TypeCategory;

/// Qualifier skipped before keyword search.
const CONST_PREFIX: &str = "const ";

/// Keyword table in priority order; the first keyword found wins.
pub const CATEGORY_KEYWORDS: [(&str, TypeCategory); 5] = [
    ("struct", TypeCategory::Struct),
    ("union", TypeCategory::Union),
    ("enum", TypeCategory::Enum),
    ("typedef", TypeCategory::Typedef),
    ("class", TypeCategory::Class),
];

/// A declaration that matched none of the category keywords.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported type declaration (no category keyword): {declaration:?}")]
pub struct ClassificationError {
    pub declaration: String,
}

/// Assign a [`TypeCategory`] to a raw multi-word declaration.
///
/// A leading `const ` is skipped, then the keyword table is searched as plain
/// substrings. There is no fallback category.
pub fn classify_declaration(declaration: &str) -> Result<TypeCategory, ClassificationError> {
    let offset = if declaration.starts_with(CONST_PREFIX) { CONST_PREFIX.len() } else { 0 };
    let haystack = &declaration[offset..];

    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, category)| *category)
        .ok_or_else(|| ClassificationError { declaration: declaration.to_string() })
}
