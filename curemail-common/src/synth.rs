//! Synthetic email derivation
//!
//! Deterministic placeholder address for an author display name. This is the
//! last tier of the enrichment fallback chain: when neither the cache nor the
//! scrape service produces a real address, both the client resolver
//! (curemail-ec) and the scrape service (curemail-es) call this one function,
//! so the two sides can never diverge on the derived address.
//!
//! Pure function: no I/O, no randomness, same input always yields the same
//! output byte-for-byte.

/// Domain used for all synthesized addresses
pub const SYNTHETIC_DOMAIN: &str = "cureus-author.com";

/// Local-part used when a name yields no usable letters
const FALLBACK_PREFIX: &str = "author";

/// Confidence assigned to synthesized addresses
pub const GENERATED_CONFIDENCE: f64 = 0.1;

/// Derive a deterministic placeholder email address from an author name.
///
/// The name is lowercased and split on whitespace; each token is reduced to
/// its ASCII letters. The local part is:
/// - `author` for an empty or all-symbol name
/// - the cleaned token for a single-token name
/// - `<first>.<last>` for multi-token names (middle tokens ignored)
///
/// # Examples
/// ```
/// use curemail_common::synth::derive_email;
///
/// assert_eq!(derive_email("Jane Doe"), "jane.doe@cureus-author.com");
/// assert_eq!(derive_email(""), "author@cureus-author.com");
/// ```
pub fn derive_email(name: &str) -> String {
    let tokens: Vec<String> = name
        .to_lowercase()
        .split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect();

    let prefix = match tokens.as_slice() {
        [] => FALLBACK_PREFIX.to_string(),
        [only] => only.clone(),
        [first, .., last] => format!("{}.{}", first, last),
    };

    format!("{}@{}", prefix, SYNTHETIC_DOMAIN)
}

/// Strip a token down to its ASCII letters
fn clean_token(token: &str) -> String {
    token.chars().filter(|c| c.is_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_last_pattern() {
        assert_eq!(derive_email("Jane Doe"), "jane.doe@cureus-author.com");
    }

    #[test]
    fn test_middle_tokens_ignored() {
        assert_eq!(
            derive_email("Jane Alexandra Maria Doe"),
            "jane.doe@cureus-author.com"
        );
    }

    #[test]
    fn test_single_token() {
        assert_eq!(derive_email("Prince"), "prince@cureus-author.com");
    }

    #[test]
    fn test_symbols_stripped_from_tokens() {
        // "Dr." -> "dr", "J." -> "j"
        assert_eq!(derive_email("Dr. J."), "dr.j@cureus-author.com");
    }

    #[test]
    fn test_empty_name_falls_back() {
        assert_eq!(derive_email(""), "author@cureus-author.com");
    }

    #[test]
    fn test_whitespace_only_falls_back() {
        assert_eq!(derive_email("   \t "), "author@cureus-author.com");
    }

    #[test]
    fn test_all_symbols_falls_back() {
        assert_eq!(derive_email("... --- ..."), "author@cureus-author.com");
    }

    #[test]
    fn test_non_ascii_letters_stripped() {
        // 'ü' is not an ASCII letter, the remainder is kept
        assert_eq!(derive_email("Müller"), "mller@cureus-author.com");
    }

    #[test]
    fn test_casing_and_padding_normalized() {
        assert_eq!(
            derive_email("  JANE   dOe  "),
            derive_email("Jane Doe"),
            "Casing and whitespace must not affect the derived address"
        );
    }

    #[test]
    fn test_deterministic_across_calls() {
        for name in ["Jane Doe", "Dr. J.", "", "Müller", "A B C"] {
            assert_eq!(derive_email(name), derive_email(name));
        }
    }
}
