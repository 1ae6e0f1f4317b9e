//! National-ID protection. The raw identifier is normalized, hashed with a
//! server-held key for dedup/verification, and masked for display. The raw
//! value must not escape the upsert operation: never logged, never stored,
//! never serialized into a response.

use std::fmt::Write as _;
use std::sync::OnceLock;

use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn nric_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^[A-Z0-9]{5,32}$").expect("NRIC shape regex is valid"))
}

/// Trim and uppercase, so "s1234567a " and "S1234567A" hash identically.
pub fn normalize_nric(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn validate_nric(nric: &str) -> Result<(), String> {
    if !nric_shape().is_match(nric) {
        return Err("NRIC looks invalid".to_string());
    }
    Ok(())
}

/// Keyed one-way hash (HMAC-SHA256, hex) for internal deduplication.
/// Callers must refuse to operate with an empty secret before reaching
/// this point; an empty key here is still rejected.
pub fn hash_nric(nric: &str, secret: &str) -> Result<String, String> {
    if secret.is_empty() {
        return Err("NRIC hashing secret is not configured".to_string());
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to initialize NRIC hash".to_string())?;
    mac.update(nric.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}

/// Display form: first and last characters kept, every character between
/// them replaced by an asterisk. Inputs shorter than 3 characters mask
/// completely.
pub fn mask_nric(nric: &str) -> String {
    let chars: Vec<char> = nric.chars().collect();
    if chars.len() < 3 {
        return "***".to_string();
    }

    let mut masked = String::with_capacity(chars.len());
    masked.push(chars[0]);
    for _ in 1..chars.len() - 1 {
        masked.push('*');
    }
    masked.push(chars[chars.len() - 1]);
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-nric-hash-secret";

    #[test]
    fn normalization_uppercases_and_trims() {
        assert_eq!(normalize_nric("  s1234567a "), "S1234567A");
    }

    #[test]
    fn shape_check_accepts_normalized_ids_only() {
        assert!(validate_nric("S1234567A").is_ok());
        assert!(validate_nric("s1234567a").is_err());
        assert!(validate_nric("S123").is_err());
        assert!(validate_nric("S1234 567A").is_err());
    }

    #[test]
    fn mask_keeps_only_the_first_and_last_characters() {
        let masked = mask_nric("S1234567A");

        assert_eq!(masked, "S*******A");
        assert_eq!(masked.len(), "S1234567A".len());
        for middle_char in "1234567".chars() {
            assert!(!masked[1..masked.len() - 1].contains(middle_char));
        }
    }

    #[test]
    fn short_inputs_mask_completely() {
        assert_eq!(mask_nric("AB"), "***");
        assert_eq!(mask_nric(""), "***");
        assert_eq!(mask_nric("ABC"), "A*C");
    }

    #[test]
    fn hashing_is_deterministic_per_secret() {
        let first = hash_nric("S1234567A", SECRET).unwrap();
        let second = hash_nric("S1234567A", SECRET).unwrap();
        let other_key = hash_nric("S1234567A", "another-secret").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other_key);
        assert_eq!(first.len(), 64);
        assert!(!first.contains("S1234567A"));
    }

    #[test]
    fn hashing_without_a_secret_is_refused() {
        assert!(hash_nric("S1234567A", "").is_err());
    }
}
