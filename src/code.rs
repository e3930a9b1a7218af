use rand::Rng;

use crate::error::{Result, StoreError};

/// Length of a system-generated short code.
pub const CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Source of candidate short codes.
///
/// Implementations only propose codes; the store decides whether a candidate
/// is free and asks again when it is not.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform random codes over `[A-Za-z0-9]{6}` from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        random_code(CODE_LEN)
    }
}

/// Generate a random alphanumeric string of the given length.
pub fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Check a caller-chosen slug: non-empty, ASCII letters, digits and hyphens only.
pub fn validate_slug(candidate: &str) -> Result<()> {
    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(StoreError::InvalidSlug(candidate.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_the_alphabet() {
        for _ in 0..200 {
            let code = RandomCodeGenerator.generate();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "bad code {code}");
        }
    }

    #[test]
    fn alphabet_has_62_symbols() {
        assert_eq!(ALPHABET.len(), 62);
    }

    #[test]
    fn accepts_letters_digits_and_hyphens() {
        assert!(validate_slug("promo").is_ok());
        assert!(validate_slug("Spring-Sale-2024").is_ok());
        assert!(validate_slug("-").is_ok());
    }

    #[test]
    fn rejects_empty_and_foreign_characters() {
        for bad in ["", "with space", "under_score", "slash/path", "émoji", "dot.com", "q?x=1"] {
            assert_eq!(
                validate_slug(bad),
                Err(StoreError::InvalidSlug(bad.to_owned())),
                "{bad:?} should be rejected"
            );
        }
    }
}
