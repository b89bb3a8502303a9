//! Short, human-shareable team codes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;

pub const CODE_LEN: usize = 6;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Six upper-case ASCII letters or digits. Codes are compared
/// case-insensitively, so user input is normalised to upper case on parse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamCode(String);

impl TeamCode {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn parse(input: &str) -> Result<Self, RegistrationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistrationError::Validation(
                "Please enter a team code.".to_string(),
            ));
        }

        if input.len() != CODE_LEN
            || !input.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(RegistrationError::Validation(format!(
                "Team not found: no team has the code \"{input}\". Team codes \
                 are {CODE_LEN} letters or digits."
            )));
        }

        Ok(Self(input.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    proptest! {
        #[test]
        fn generated_codes_are_six_upper_case_alphanumerics(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let code = TeamCode::generate(&mut rng);

            prop_assert_eq!(code.as_str().len(), CODE_LEN);
            prop_assert!(code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }

        #[test]
        fn parse_ignores_case(input in "[a-zA-Z0-9]{6}") {
            let lower = TeamCode::parse(&input.to_ascii_lowercase()).unwrap();
            let upper = TeamCode::parse(&input.to_ascii_uppercase()).unwrap();
            prop_assert_eq!(lower, upper);
        }
    }

    #[test]
    fn parse_trims_and_upper_cases() {
        assert_eq!(TeamCode::parse("  abc123 ").unwrap().as_str(), "ABC123");
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        for bad in ["", "ABC12", "ABC1234", "ABC-12", "ÄBC123"] {
            assert!(
                matches!(
                    TeamCode::parse(bad),
                    Err(RegistrationError::Validation(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_codes_read_as_unknown_teams() {
        let err = TeamCode::parse("abc12").unwrap_err().to_string();
        assert!(err.starts_with("Team not found"), "{err}");
        assert!(err.contains("\"abc12\""), "{err}");
    }

    #[test]
    fn same_seed_same_code() {
        let a = TeamCode::generate(&mut ChaCha8Rng::seed_from_u64(42));
        let b = TeamCode::generate(&mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
