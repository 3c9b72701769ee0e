//! Client-side password policy for the new-password challenge.
//!
//! The identity provider remains the authority; this check only rejects
//! obviously weak passwords before a round trip is made.

use crate::auth::ChallengeError;

/// Password requirements enforced before a new password is submitted.
///
/// The default mirrors the user pool defaults: at least eight characters
/// with a lowercase letter, an uppercase letter and a digit.
///
/// # Example
///
/// ```rust
/// use console_session::auth::{ChallengeError, PasswordPolicy};
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("Str0ngPass").is_ok());
/// assert_eq!(
///     policy.validate("short"),
///     Err(ChallengeError::TooShort { min_length: 8 })
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum number of characters.
    pub min_length: usize,
    /// Whether a lowercase letter is required.
    pub require_lowercase: bool,
    /// Whether an uppercase letter is required.
    pub require_uppercase: bool,
    /// Whether a digit is required.
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    /// Checks `password` against the policy, reporting the first violation.
    ///
    /// # Errors
    ///
    /// Returns the [`ChallengeError`] describing the first failed rule.
    pub fn validate(&self, password: &str) -> Result<(), ChallengeError> {
        if password.chars().count() < self.min_length {
            return Err(ChallengeError::TooShort {
                min_length: self.min_length,
            });
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(ChallengeError::MissingLowercase);
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ChallengeError::MissingUppercase);
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ChallengeError::MissingDigit);
        }
        Ok(())
    }

    /// Checks that `confirmation` matches, then validates `password`.
    ///
    /// # Errors
    ///
    /// Returns [`ChallengeError::Mismatch`] before any policy rule is checked.
    pub fn validate_with_confirmation(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<(), ChallengeError> {
        if password != confirmation {
            return Err(ChallengeError::Mismatch);
        }
        self.validate(password)
    }
}
