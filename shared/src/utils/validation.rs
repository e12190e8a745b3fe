//! Input validation for the login flow

use serde::Serialize;

use super::phone::is_valid_mobile_number;

/// Minimum number of digits in a one-time code
pub const OTP_MIN_LENGTH: usize = 4;

/// Maximum number of digits in a one-time code
pub const OTP_MAX_LENGTH: usize = 6;

/// Validation error with field-level details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Check if a one-time code is 4 to 6 ASCII digits
pub fn is_valid_otp_code(code: &str) -> bool {
    (OTP_MIN_LENGTH..=OTP_MAX_LENGTH).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_digit())
}

/// Validate a mobile number before any request is made
pub fn validate_mobile_number(mobile: &str) -> Result<(), ValidationError> {
    if is_valid_mobile_number(mobile) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "mobileNumber",
            "Please enter a valid 10-digit mobile number",
            "INVALID_MOBILE_NUMBER",
        ))
    }
}

/// Validate a one-time code before it is submitted
pub fn validate_otp_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_otp_code(code) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "otp",
            "Please enter a valid OTP",
            "INVALID_OTP_FORMAT",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_otp_code() {
        assert!(is_valid_otp_code("1234"));
        assert!(is_valid_otp_code("12345"));
        assert!(is_valid_otp_code("123456"));
        assert!(!is_valid_otp_code("123")); // Too short
        assert!(!is_valid_otp_code("1234567")); // Too long
        assert!(!is_valid_otp_code("12a4"));
        assert!(!is_valid_otp_code(""));
    }

    #[test]
    fn test_validate_mobile_number() {
        assert!(validate_mobile_number("9876543210").is_ok());

        let err = validate_mobile_number("98765").unwrap_err();
        assert_eq!(err.field, "mobileNumber");
        assert_eq!(err.code, "INVALID_MOBILE_NUMBER");
    }

    #[test]
    fn test_validate_otp_code() {
        assert!(validate_otp_code("0000").is_ok());

        let err = validate_otp_code("12").unwrap_err();
        assert_eq!(err.field, "otp");
        assert_eq!(err.to_string(), "Please enter a valid OTP");
    }
}
