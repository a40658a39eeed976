//! Contributor name validation.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum length of a full name, in characters.
pub const MAX_USERNAME_LEN: usize = 70;

/// Why a contributor name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("Please enter your name first.")]
    Empty,
    #[error("Name is too long ({len} characters, at most {max} allowed).")]
    TooLong { len: usize, max: usize },
    #[error(
        "Please enter a valid name (letters, whitespace, hyphens, apostrophes, commas and periods)."
    )]
    InvalidCharacters,
}

fn name_pattern() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([a-z]+([.,] |[-']| )?)+[a-z]+\.?\s*$")
            .expect("name regex compiles")
    })
}

/// Validate a contributor name and return it trimmed.
///
/// Names are words of letters separated by a single space, a hyphen, an
/// apostrophe, or a period/comma followed by a space. A trailing period is
/// allowed.
pub fn validate_username(raw: &str) -> Result<String, UsernameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(UsernameError::Empty);
    }

    let len = name.chars().count();
    if len > MAX_USERNAME_LEN {
        return Err(UsernameError::TooLong {
            len,
            max: MAX_USERNAME_LEN,
        });
    }

    if !name_pattern().is_match(name) {
        return Err(UsernameError::InvalidCharacters);
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_names() {
        for name in [
            "Jane Doe",
            "Jane O'Brien-Smith",
            "A. B. Smith",
            "Smith, John",
            "Radu",
            "John Smith Jr.",
        ] {
            assert_eq!(validate_username(name).as_deref(), Ok(name), "{name}");
        }
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(validate_username("  Jane Doe \t").as_deref(), Ok("Jane Doe"));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_username(""), Err(UsernameError::Empty));
        assert_eq!(validate_username("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_rejects_too_long() {
        let long = "a".repeat(MAX_USERNAME_LEN + 1);
        assert_eq!(
            validate_username(&long),
            Err(UsernameError::TooLong {
                len: MAX_USERNAME_LEN + 1,
                max: MAX_USERNAME_LEN
            })
        );

        let exact = "a".repeat(MAX_USERNAME_LEN);
        assert!(validate_username(&exact).is_ok());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        for name in ["J4ne", "Jane  Doe", "Jane--Doe", "J", "<script>", "Jane_Doe"] {
            assert_eq!(
                validate_username(name),
                Err(UsernameError::InvalidCharacters),
                "{name}"
            );
        }
    }
}
