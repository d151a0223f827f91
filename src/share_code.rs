use std::collections::HashMap;

use crate::error::AppError;

/// Alphabet and length floor for share codes, read once at startup.
#[derive(Debug, Clone)]
pub struct ShareCodeConfig {
    pub alphabet: String,
    pub min_length: usize,
}

impl Default for ShareCodeConfig {
    fn default() -> Self {
        Self {
            // No 0/O/1/l/I to keep codes unambiguous when read aloud.
            alphabet: "abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789".to_string(),
            min_length: 4,
        }
    }
}

/// Reversible mapping between collection ids and short share codes.
///
/// Codes are positional base-N over the configured alphabet, left-padded
/// with the zero digit up to `min_length`. Pure and synchronous; anything
/// that fails to decode is reported as [`AppError::NotFound`] so a bad code
/// is indistinguishable from a missing collection.
#[derive(Clone)]
pub struct ShareCodec {
    digits: Vec<char>,
    values: HashMap<char, i64>,
    min_length: usize,
}

impl ShareCodec {
    /// Panics if the alphabet has fewer than two characters or repeats one.
    /// Both are startup configuration errors, caught before serving.
    pub fn new(config: &ShareCodeConfig) -> Self {
        let digits: Vec<char> = config.alphabet.chars().collect();
        assert!(
            digits.len() >= 2,
            "share code alphabet needs at least two characters"
        );

        let mut values = HashMap::new();
        for (i, c) in digits.iter().enumerate() {
            let previous = values.insert(*c, i as i64);
            assert!(
                previous.is_none(),
                "share code alphabet repeats {c:?}"
            );
        }

        Self {
            digits,
            values,
            min_length: config.min_length,
        }
    }

    pub fn encode(&self, id: i64) -> String {
        debug_assert!(id > 0, "collection ids are store-assigned and positive");

        let base = self.digits.len() as i64;
        let mut rest = id;
        let mut code = Vec::new();

        while rest > 0 {
            code.push(self.digits[(rest % base) as usize]);
            rest /= base;
        }
        while code.len() < self.min_length {
            code.push(self.digits[0]);
        }

        code.iter().rev().collect()
    }

    pub fn decode(&self, code: &str) -> Result<i64, AppError> {
        if code.chars().count() < self.min_length {
            return Err(AppError::NotFound);
        }

        let base = self.digits.len() as i64;
        let mut id: i64 = 0;
        for c in code.chars() {
            let digit = self.values.get(&c).ok_or(AppError::NotFound)?;
            id = id
                .checked_mul(base)
                .and_then(|v| v.checked_add(*digit))
                .ok_or(AppError::NotFound)?;
        }

        if id <= 0 {
            return Err(AppError::NotFound);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> ShareCodec {
        ShareCodec::new(&ShareCodeConfig::default())
    }

    #[test]
    fn roundtrip_small_and_large_ids() {
        let codec = codec();
        for id in (1..2000).chain([100_000, 123_456_789, i64::MAX / 2]) {
            let code = codec.encode(id);
            assert_eq!(codec.decode(&code).unwrap(), id, "id {id}, code {code}");
        }
    }

    #[test]
    fn codes_are_padded_to_the_length_floor() {
        let codec = codec();
        assert_eq!(codec.encode(1).len(), 4);
        assert_eq!(codec.encode(57).len(), 4);
    }

    #[test]
    fn codes_are_distinct_for_distinct_ids() {
        let codec = codec();
        let mut seen = std::collections::HashSet::new();
        for id in 1..5000 {
            assert!(seen.insert(codec.encode(id)), "collision at id {id}");
        }
    }

    #[test]
    fn foreign_strings_fail_as_not_found() {
        let codec = codec();
        for bad in ["", "ab", "????", "with space", "0O1l", "ab-cd"] {
            assert!(
                matches!(codec.decode(bad), Err(AppError::NotFound)),
                "expected NotFound for {bad:?}"
            );
        }
    }

    #[test]
    fn zero_valued_code_fails() {
        let codec = codec();
        // All zero digits decodes to 0, which is not a valid id.
        assert!(matches!(codec.decode("aaaa"), Err(AppError::NotFound)));
    }

    #[test]
    fn overlong_garbage_overflows_to_not_found() {
        let codec = codec();
        let huge: String = std::iter::repeat('9').take(64).collect();
        assert!(matches!(codec.decode(&huge), Err(AppError::NotFound)));
    }

    #[test]
    fn custom_alphabet_roundtrips() {
        let codec = ShareCodec::new(&ShareCodeConfig {
            alphabet: "wxyz".to_string(),
            min_length: 6,
        });
        for id in 1..500 {
            let code = codec.encode(id);
            assert!(code.len() >= 6);
            assert_eq!(codec.decode(&code).unwrap(), id);
        }
    }
}
