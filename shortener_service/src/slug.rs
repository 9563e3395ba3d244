use entity::url::SLUG_MAX_LEN;
use rand::{Rng, rng};

use crate::error::{Result, StoreError};

pub const SLUG_LENGTH: usize = 8;

const BASE36_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_slug(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())] as char)
        .collect()
}

pub fn validate_slug(slug: &str) -> Result<()> {
    let len = slug.chars().count();
    if len == 0 {
        return Err(StoreError::InvalidSlug("slug is empty".to_string()));
    }
    if len > SLUG_MAX_LEN {
        return Err(StoreError::InvalidSlug(format!(
            "`{slug}` is {len} characters, at most {SLUG_MAX_LEN} allowed"
        )));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
    {
        return Err(StoreError::InvalidSlug(format!(
            "`{slug}` contains `{bad}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_slug_is_base36() {
        let slug = generate_slug(SLUG_LENGTH);
        assert_eq!(slug.len(), SLUG_LENGTH);
        assert!(slug.bytes().all(|b| BASE36_ALPHABET.contains(&b)));
        assert!(validate_slug(&slug).is_ok());
    }

    #[test]
    fn test_accepts_sixteen_characters() {
        assert!(validate_slug("abcdefghijklmnop").is_ok());
        assert!(validate_slug("my-link_2").is_ok());
    }

    #[test]
    fn test_rejects_seventeen_characters() {
        assert!(matches!(
            validate_slug("abcdefghijklmnopq"),
            Err(StoreError::InvalidSlug(_))
        ));
    }

    #[test]
    fn test_rejects_empty_and_odd_characters() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("héllo").is_err());
    }
}
