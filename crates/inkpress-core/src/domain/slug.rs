use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The entity types that own a slug namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Author,
    Category,
    Tag,
    Post,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Category => "category",
            EntityKind::Tag => "tag",
            EntityKind::Post => "post",
        }
    }

    /// Parse the lowercase name used in routes and payloads.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "author" | "authors" => Some(EntityKind::Author),
            "category" | "categories" => Some(EntityKind::Category),
            "tag" | "tags" => Some(EntityKind::Tag),
            "post" | "posts" => Some(EntityKind::Post),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized, URL-safe slug.
///
/// Construction lowercases the input, transliterates non-ASCII letters and
/// collapses every run of other characters into a single `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Normalize free text into a slug. Fails when nothing URL-safe remains.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Self::normalize(raw)
            .ok_or_else(|| DomainError::Validation(format!("'{raw}' does not form a valid slug")))
    }

    /// Like [`Slug::parse`] but returns `None` for input without slug characters.
    pub fn normalize(raw: &str) -> Option<Self> {
        let slug = ::slug::slugify(raw.trim());
        if slug.is_empty() { None } else { Some(Self(slug)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(Slug::parse("John Doe").unwrap().as_str(), "john-doe");
        assert_eq!(Slug::parse("  ASP.NET Core  ").unwrap().as_str(), "asp-net-core");
        assert_eq!(Slug::parse("already-a-slug").unwrap().as_str(), "already-a-slug");
    }

    #[test]
    fn rejects_input_without_slug_characters() {
        assert!(Slug::normalize("  ").is_none());
        assert!(matches!(Slug::parse("!!!"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn entity_kind_accepts_singular_and_plural() {
        assert_eq!(EntityKind::parse("Authors"), Some(EntityKind::Author));
        assert_eq!(EntityKind::parse("post"), Some(EntityKind::Post));
        assert_eq!(EntityKind::parse("user"), None);
    }
}
