//! Client-side form checks. Convenience only: the backend stays the authority.

use crate::error::ValidationError;

/// Reject a blank required field.
pub fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

/// Shape check equivalent to a browser `type="email"` input.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());
    let email = require(email, "Email")?;
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password_match(password: &str, retype: &str) -> Result<(), ValidationError> {
    require(password, "Password")?;
    if password != retype {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require("  dog ", "Category").unwrap(), "dog");
        assert_eq!(
            require("   ", "Category"),
            Err(ValidationError::MissingField("Category"))
        );
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("asha@example.com").is_ok());
        assert!(validate_email("asha@localhost").is_ok());
        assert!(validate_email("asha").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_password_mismatch() {
        assert_eq!(
            validate_password_match("secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_password_match("secret1", "secret1").is_ok());
        assert_eq!(
            validate_password_match("", ""),
            Err(ValidationError::MissingField("Password"))
        );
    }
}
