//! Random token generation for codes, addresses and captchas.

use rand::seq::IndexedRandom;

/// Upper-case letters and digits.
pub const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Lower-case letters and digits (base36 digits).
pub const LOWER_ALNUM: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a string of `length` characters drawn uniformly from `charset`.
#[must_use]
pub fn random_string(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| charset.choose(&mut rng))
        .map(|&b| char::from(b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_charset() {
        let s = random_string(UPPER_ALNUM, 32);
        assert_eq!(s.len(), 32);
        assert!(s.bytes().all(|b| UPPER_ALNUM.contains(&b)));
    }

    #[test]
    fn test_empty_charset_yields_empty_string() {
        assert!(random_string(b"", 8).is_empty());
    }
}
