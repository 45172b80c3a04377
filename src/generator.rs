//! Random password generation.

use rand::seq::SliceRandom;
use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{LpVaultError, Result};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters that are easy to confuse with one another.
pub const SIMILAR: &[u8] = b"l1IO0S5";

/// Knobs for `generate_password`.  Lowercase letters are always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub exclude_similar: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            digits: true,
            symbols: true,
            exclude_similar: true,
        }
    }
}

impl GeneratorOptions {
    /// The enabled character classes, with similar characters removed
    /// when requested.
    fn classes(&self) -> Vec<Vec<u8>> {
        let mut classes = vec![LOWERCASE];
        if self.uppercase {
            classes.push(UPPERCASE);
        }
        if self.digits {
            classes.push(DIGITS);
        }
        if self.symbols {
            classes.push(SYMBOLS);
        }
        classes
            .into_iter()
            .map(|class| {
                class
                    .iter()
                    .copied()
                    .filter(|c| !(self.exclude_similar && SIMILAR.contains(c)))
                    .collect()
            })
            .collect()
    }
}

/// Generate a password from the OS-seeded thread RNG.
///
/// The result contains at least one character of every enabled class.
pub fn generate_password(options: &GeneratorOptions) -> Result<Zeroizing<String>> {
    let classes = options.classes();

    if options.length == 0 {
        return Err(LpVaultError::Generator("length must be at least 1".into()));
    }
    if options.length < classes.len() {
        return Err(LpVaultError::Generator(format!(
            "length {} is too short for {} character classes",
            options.length,
            classes.len()
        )));
    }

    let pool: Vec<u8> = classes.iter().flatten().copied().collect();
    let mut rng = rand::rng();
    let mut chars: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(options.length));

    // One guaranteed pick per class, the rest from the full pool.
    for class in &classes {
        chars.push(class[rng.random_range(0..class.len())]);
    }
    while chars.len() < options.length {
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    let password = chars.iter().map(|&b| char::from(b)).collect();
    Ok(Zeroizing::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_any(password: &str, class: &[u8]) -> bool {
        password.bytes().any(|b| class.contains(&b))
    }

    #[test]
    fn default_password_covers_all_classes() {
        for _ in 0..50 {
            let pw = generate_password(&GeneratorOptions::default()).unwrap();
            assert_eq!(pw.len(), 16);
            assert!(has_any(&pw, LOWERCASE));
            assert!(has_any(&pw, UPPERCASE));
            assert!(has_any(&pw, DIGITS));
            assert!(has_any(&pw, SYMBOLS));
            assert!(!has_any(&pw, SIMILAR));
        }
    }

    #[test]
    fn disabled_classes_are_absent() {
        let options = GeneratorOptions {
            length: 40,
            uppercase: false,
            digits: false,
            symbols: false,
            exclude_similar: false,
        };
        let pw = generate_password(&options).unwrap();
        assert!(pw.bytes().all(|b| LOWERCASE.contains(&b)));
    }

    #[test]
    fn similar_characters_allowed_when_not_excluded() {
        let options = GeneratorOptions {
            length: 4,
            exclude_similar: false,
            ..GeneratorOptions::default()
        };
        assert_eq!(generate_password(&options).unwrap().len(), 4);
    }

    #[test]
    fn length_limits() {
        let zero = GeneratorOptions {
            length: 0,
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generate_password(&zero),
            Err(LpVaultError::Generator(_))
        ));

        let too_short = GeneratorOptions {
            length: 3,
            ..GeneratorOptions::default()
        };
        assert!(generate_password(&too_short).is_err());

        let exact = GeneratorOptions {
            length: 1,
            uppercase: false,
            digits: false,
            symbols: false,
            exclude_similar: true,
        };
        assert_eq!(generate_password(&exact).unwrap().len(), 1);
    }

    #[test]
    fn passwords_differ() {
        let a = generate_password(&GeneratorOptions::default()).unwrap();
        let b = generate_password(&GeneratorOptions::default()).unwrap();
        assert_ne!(*a, *b);
    }
}
