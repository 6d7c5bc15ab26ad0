//! Strength checks for the shared credential signing secret.
//!
//! Both services refuse to start with a secret that is short, looks like a
//! copied placeholder, or has too little entropy.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};

/// Minimum signing secret length in bytes.
pub const MIN_SIGNING_SECRET_LENGTH: usize = 32;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Why a signing secret was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeakSecret {
    #[error("must be at least {MIN_SIGNING_SECRET_LENGTH} characters (got {0})")]
    TooShort(usize),

    #[error("appears to be a placeholder (contains '{0}')")]
    Placeholder(&'static str),

    #[error(
        "entropy too low ({0:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
    )]
    LowEntropy(f64),
}

/// Reject short, placeholder, or low-entropy signing secrets.
///
/// # Errors
///
/// Returns the first [`WeakSecret`] reason that applies.
pub fn check_signing_secret(secret: &SecretString) -> Result<(), WeakSecret> {
    let value = secret.expose_secret();
    if value.len() < MIN_SIGNING_SECRET_LENGTH {
        return Err(WeakSecret::TooShort(value.len()));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(WeakSecret::Placeholder(pattern));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(WeakSecret::LowEntropy(entropy));
    }

    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            check_signing_secret(&SecretString::from("aB3$xY9!")),
            Err(WeakSecret::TooShort(8))
        );
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(
            check_signing_secret(&SecretString::from("changeme-aB3$xY9!mK2@nL5#pQ7&rT0*")),
            Err(WeakSecret::Placeholder("changeme"))
        );
    }

    #[test]
    fn test_low_entropy() {
        assert!(matches!(
            check_signing_secret(&SecretString::from("ab".repeat(20))),
            Err(WeakSecret::LowEntropy(_))
        ));
    }

    #[test]
    fn test_valid() {
        assert!(check_signing_secret(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6Z")).is_ok());
    }
}
