//! Input validation limits for keys, categories and layouts

/// Maximum length for a child key name (256 chars)
pub const MAX_KEY_LEN: usize = 256;

/// Maximum length for a category tag (128 chars)
pub const MAX_CATEGORY_LEN: usize = 128;

/// Maximum number of declared slots on a static layout (1024)
pub const MAX_LAYOUT_SLOTS: usize = 1024;

/// Characters reserved by generated names
pub const RESERVED_KEY_CHARS: &[char] = &['.', '[', ']'];

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyKey,
    KeyTooLong { len: usize, max: usize },
    ReservedCharacter { key: String, ch: char },
    EmptyCategory,
    ReservedCategory(String),
    CategoryTooLong { len: usize, max: usize },
    TooManySlots { count: usize, max: usize },
    DuplicateSlot(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "Key cannot be empty"),
            Self::KeyTooLong { len, max } => {
                write!(f, "Key too long: {} chars (max {})", len, max)
            }
            Self::ReservedCharacter { key, ch } => {
                write!(f, "Key '{}' contains reserved character '{}'", key, ch)
            }
            Self::EmptyCategory => write!(f, "Category cannot be empty"),
            Self::ReservedCategory(category) => {
                write!(f, "Category '{}' is reserved for blocks", category)
            }
            Self::CategoryTooLong { len, max } => {
                write!(f, "Category too long: {} chars (max {})", len, max)
            }
            Self::TooManySlots { count, max } => {
                write!(f, "Too many layout slots: {} (max {})", count, max)
            }
            Self::DuplicateSlot(name) => write!(f, "Duplicate layout slot: {}", name),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a child key name
pub fn validate_key_name(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(ValidationError::KeyTooLong {
            len: key.len(),
            max: MAX_KEY_LEN,
        });
    }
    if let Some(ch) = key.chars().find(|c| RESERVED_KEY_CHARS.contains(c)) {
        return Err(ValidationError::ReservedCharacter {
            key: key.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Validate a category tag
pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    if category.len() > MAX_CATEGORY_LEN {
        return Err(ValidationError::CategoryTooLong {
            len: category.len(),
            max: MAX_CATEGORY_LEN,
        });
    }
    Ok(())
}

/// Validate static layout slot count
pub fn validate_slot_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_LAYOUT_SLOTS {
        return Err(ValidationError::TooManySlots {
            count,
            max: MAX_LAYOUT_SLOTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_name() {
        assert!(validate_key_name("valid_name").is_ok());
        assert!(validate_key_name("").is_err());
        assert!(validate_key_name(&"x".repeat(300)).is_err());
        assert_eq!(
            validate_key_name("a.b"),
            Err(ValidationError::ReservedCharacter {
                key: "a.b".to_string(),
                ch: '.'
            })
        );
        assert!(validate_key_name("x[0]").is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("Var").is_ok());
        assert!(validate_category("").is_err());
        assert!(validate_category(&"c".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_slot_count() {
        assert!(validate_slot_count(10).is_ok());
        assert!(validate_slot_count(MAX_LAYOUT_SLOTS + 1).is_err());
    }
}
