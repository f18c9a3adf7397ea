//! Random invite code generation.

use rand::Rng;

/// Code symbols: uppercase letters and digits minus the visually ambiguous
/// pairs O/0 and I/1. 32 symbols, so a 6-character code has ~1.07e9
/// combinations.
pub const CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default invite code length.
pub const CODE_LENGTH: usize = 6;

/// Stateless generator of human-typeable codes.
///
/// Generated codes are not globally unique by themselves; the store's unique
/// constraint plus the bounded retry in the service absorb collisions.
pub struct CodeGenerator {
    alphabet: Vec<char>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::with_alphabet(CODE_ALPHABET)
    }

    /// Generator over a custom alphabet. Must not be empty.
    pub fn with_alphabet(alphabet: &str) -> Self {
        let alphabet: Vec<char> = alphabet.chars().collect();
        assert!(!alphabet.is_empty(), "code alphabet must not be empty");
        Self { alphabet }
    }

    /// Draws `length` independent, uniformly distributed symbols.
    pub fn generate(&self, length: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_32_symbols_without_ambiguous_chars() {
        assert_eq!(CODE_ALPHABET.len(), 32);
        for c in ['0', 'O', '1', 'I'] {
            assert!(!CODE_ALPHABET.contains(c));
        }
    }

    #[test]
    fn generates_requested_length() {
        let generator = CodeGenerator::new();
        assert_eq!(generator.generate(CODE_LENGTH).len(), CODE_LENGTH);
        assert_eq!(generator.generate(12).len(), 12);
        assert_eq!(generator.generate(0).len(), 0);
    }

    #[test]
    fn generates_only_alphabet_symbols() {
        let generator = CodeGenerator::new();
        for _ in 0..100 {
            let code = generator.generate(CODE_LENGTH);
            assert!(code.chars().all(|c| CODE_ALPHABET.contains(c)), "{code}");
        }
    }

    #[test]
    fn single_symbol_alphabet_always_collides() {
        let generator = CodeGenerator::with_alphabet("A");
        assert_eq!(generator.generate(6), "AAAAAA");
        assert_eq!(generator.generate(6), generator.generate(6));
    }

    #[test]
    #[should_panic(expected = "alphabet must not be empty")]
    fn empty_alphabet_is_rejected() {
        CodeGenerator::with_alphabet("");
    }
}
