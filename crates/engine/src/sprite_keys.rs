use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '\\\\'")]
    Backslash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Validated name of a sprite sheet, e.g. `cat/orange/walk`.
///
/// Cheap to clone; draw commands carry one per sprite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpriteKey(Arc<str>);

impl SpriteKey {
    pub fn parse(key: &str) -> Result<Self, SpriteKeyError> {
        validate_sprite_key(key)?;
        Ok(Self(Arc::from(key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SpriteKey {
    type Error = SpriteKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SpriteKey> for String {
    fn from(value: SpriteKey) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for SpriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    let invalid = key.chars().find(|ch| {
        !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-'))
    });
    match invalid {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sheet_names() {
        for key in ["cat/orange/walk", "cat/black/run", "enemy_1-attack"] {
            let parsed = SpriteKey::parse(key).expect("valid key");
            assert_eq!(parsed.as_str(), key);
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", r"a\b", "Cat", "a.png"] {
            assert!(SpriteKey::parse(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn reports_first_invalid_character() {
        assert_eq!(
            SpriteKey::parse("cat walk"),
            Err(SpriteKeyError::InvalidCharacter { character: ' ' })
        );
    }
}
