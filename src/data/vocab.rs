//! Character vocabulary for next-character prediction.
//!
//! Maps between characters and integer codes. Code `0` is permanently reserved for
//! the boundary symbol [`BOUNDARY`]; every character seen in the corpus gets a code
//! in `1..V-1`, assigned in sorted order so that the same corpus always yields the
//! same codes.

use std::collections::{BTreeSet, HashMap};

use crate::error::{NamegenError, NamegenResult};

/// Boundary symbol: start-of-name padding and end-of-name marker.
pub const BOUNDARY: char = '.';

/// Code of the boundary symbol.
pub const BOUNDARY_CODE: usize = 0;

/// Character-to-code vocabulary built from a corpus of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Ordered list of characters; `chars[code]` is the character for `code`.
    chars: Vec<char>,
    /// Reverse mapping from character to code.
    char_to_code: HashMap<char, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from every character appearing in `corpus`.
    ///
    /// # Errors
    ///
    /// - `EmptyCorpus` if the corpus is empty or contains no characters
    /// - `ReservedCharacter` if a name contains the boundary symbol
    pub fn build<S: AsRef<str>>(corpus: &[S]) -> NamegenResult<Self> {
        let mut seen = BTreeSet::new();
        for name in corpus {
            let name = name.as_ref();
            for c in name.chars() {
                if c == BOUNDARY {
                    return Err(NamegenError::ReservedCharacter {
                        ch: c,
                        name: name.to_string(),
                    });
                }
                seen.insert(c);
            }
        }

        if seen.is_empty() {
            return Err(NamegenError::EmptyCorpus);
        }

        let chars: Vec<char> = std::iter::once(BOUNDARY).chain(seen).collect();
        let char_to_code = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Ok(Self {
            chars,
            char_to_code,
        })
    }

    /// Number of codes, boundary included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    /// All characters in code order, starting with the boundary symbol.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Get the code for a character.
    ///
    /// # Errors
    ///
    /// `UnknownCharacter` if `c` was not seen during [`build`](Self::build).
    pub fn encode(&self, c: char) -> NamegenResult<usize> {
        self.char_to_code
            .get(&c)
            .copied()
            .ok_or(NamegenError::UnknownCharacter { ch: c })
    }

    /// Get the character for a code.
    ///
    /// Takes a signed code so that out-of-range values coming from arithmetic
    /// or external tensors are rejected rather than wrapped.
    ///
    /// # Errors
    ///
    /// `InvalidCode` if `code` is outside `[0, size() - 1]`.
    pub fn decode(&self, code: i64) -> NamegenResult<char> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.chars.get(idx).copied())
            .ok_or(NamegenError::InvalidCode {
                code,
                vocab_size: self.size(),
            })
    }

    /// Encode every character of `name`.
    ///
    /// # Errors
    ///
    /// - `ReservedCharacter` if `name` contains the boundary symbol
    /// - `UnknownCharacter` for characters outside the vocabulary
    pub fn encode_name(&self, name: &str) -> NamegenResult<Vec<usize>> {
        name.chars()
            .map(|c| {
                if c == BOUNDARY {
                    return Err(NamegenError::ReservedCharacter {
                        ch: c,
                        name: name.to_string(),
                    });
                }
                self.encode(c)
            })
            .collect()
    }

    /// Decode a sequence of codes into a string.
    pub fn decode_codes(&self, codes: &[usize]) -> NamegenResult<String> {
        codes
            .iter()
            .map(|&code| self.decode(code as i64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<&'static str> {
        vec!["emma", "olivia", "ava"]
    }

    #[test]
    fn test_vocab_size() {
        let vocab = Vocabulary::build(&names()).unwrap();
        // boundary + a e i l m o v
        assert_eq!(vocab.size(), 8);
    }

    #[test]
    fn test_codes_sorted_after_boundary() {
        let vocab = Vocabulary::build(&names()).unwrap();
        assert_eq!(vocab.chars(), &['.', 'a', 'e', 'i', 'l', 'm', 'o', 'v']);
        assert_eq!(vocab.encode('a').unwrap(), 1);
        assert_eq!(vocab.encode('v').unwrap(), 7);
    }

    #[test]
    fn test_char_round_trip() {
        let vocab = Vocabulary::build(&names()).unwrap();
        for name in names() {
            for c in name.chars() {
                let code = vocab.encode(c).unwrap();
                assert_eq!(vocab.decode(code as i64).unwrap(), c);
            }
        }
    }

    #[test]
    fn test_boundary_is_code_zero() {
        let vocab = Vocabulary::build(&["zz"]).unwrap();
        assert_eq!(vocab.decode(0).unwrap(), BOUNDARY);
        assert_eq!(vocab.encode(BOUNDARY).unwrap(), BOUNDARY_CODE);
    }

    #[test]
    fn test_deterministic() {
        let a = Vocabulary::build(&names()).unwrap();
        let b = Vocabulary::build(&names()).unwrap();
        assert_eq!(a, b);

        let reversed: Vec<_> = names().into_iter().rev().collect();
        let c = Vocabulary::build(&reversed).unwrap();
        assert_eq!(a.chars(), c.chars());
    }

    #[test]
    fn test_unknown_char() {
        let vocab = Vocabulary::build(&names()).unwrap();
        assert!(matches!(
            vocab.encode('z'),
            Err(NamegenError::UnknownCharacter { ch: 'z' })
        ));
    }

    #[test]
    fn test_invalid_code() {
        let vocab = Vocabulary::build(&names()).unwrap();
        let v = vocab.size() as i64;
        assert!(matches!(
            vocab.decode(v),
            Err(NamegenError::InvalidCode { code, vocab_size: 8 }) if code == v
        ));
        assert!(matches!(
            vocab.decode(-1),
            Err(NamegenError::InvalidCode { code: -1, .. })
        ));
    }

    #[test]
    fn test_empty_corpus() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            Vocabulary::build(&empty),
            Err(NamegenError::EmptyCorpus)
        ));
        assert!(matches!(
            Vocabulary::build(&["", ""]),
            Err(NamegenError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_reserved_character() {
        let err = Vocabulary::build(&["ab", "a.b"]).unwrap_err();
        assert!(matches!(
            err,
            NamegenError::ReservedCharacter { ch: '.', ref name } if name == "a.b"
        ));
    }

    #[test]
    fn test_encode_decode_name() {
        let vocab = Vocabulary::build(&names()).unwrap();
        let codes = vocab.encode_name("olivia").unwrap();
        assert_eq!(codes.len(), 6);
        assert_eq!(vocab.decode_codes(&codes).unwrap(), "olivia");
    }
}
