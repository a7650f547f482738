//! Password policy and hashing

use crate::error::AppError;

/// Password utilities
pub struct PasswordUtils;

impl PasswordUtils {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 128;

    /// Hash password using bcrypt
    pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
        bcrypt::hash(password, cost)
            .map_err(|e| AppError::Bcrypt(format!("Failed to hash password: {}", e)))
    }

    /// Verify password against hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::Bcrypt(format!("Failed to verify password: {}", e)))
    }

    /// Validate password strength
    ///
    /// Mirrors the default identity policy: six characters, one uppercase,
    /// one lowercase, one digit and one non-alphanumeric character. The
    /// character classes are ASCII only.
    pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
        let length = password.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(AppError::PasswordPolicy(format!(
                "Password must be at least {} characters long",
                Self::MIN_LENGTH
            )));
        }

        if length > Self::MAX_LENGTH {
            return Err(AppError::PasswordPolicy(format!(
                "Password must be less than {} characters long",
                Self::MAX_LENGTH
            )));
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AppError::PasswordPolicy(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(AppError::PasswordPolicy(
                "Password must contain at least one lowercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::PasswordPolicy(
                "Password must contain at least one digit".to_string(),
            ));
        }

        if password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::PasswordPolicy(
                "Password must contain at least one non-alphanumeric character".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation() {
        assert!(PasswordUtils::validate_password_strength("").is_err());
        assert!(PasswordUtils::validate_password_strength("Ab1!").is_err());
        assert!(PasswordUtils::validate_password_strength("weakpass").is_err());
        assert!(PasswordUtils::validate_password_strength("Weakpass").is_err());
        assert!(PasswordUtils::validate_password_strength("Weakpass1").is_err());
        assert!(PasswordUtils::validate_password_strength("Weak1!").is_ok());
        assert!(PasswordUtils::validate_password_strength("Passw0rd!").is_ok());
    }

    #[test]
    fn test_password_classes_are_ascii() {
        // É is not an ASCII uppercase letter
        let err = PasswordUtils::validate_password_strength("Éclair1!").unwrap_err();
        assert!(err.to_string().contains("uppercase"));

        // é counts as non-alphanumeric
        assert!(PasswordUtils::validate_password_strength("Passw0rdé").is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let long = format!("Aa1!{}", "x".repeat(PasswordUtils::MAX_LENGTH));
        let err = PasswordUtils::validate_password_strength(&long).unwrap_err();
        assert_eq!(err.error_code(), "PASSWORD_POLICY");
    }

    #[test]
    fn test_hash_roundtrip() {
        let hash = PasswordUtils::hash_password("Passw0rd!", 4).unwrap();
        assert!(PasswordUtils::verify_password("Passw0rd!", &hash).unwrap());
        assert!(!PasswordUtils::verify_password("wrong", &hash).unwrap());
    }
}
