//! Mobile number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Exactly ten ASCII digits, no country code
static MOBILE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{10}$").expect("mobile number pattern is valid")
});

/// Number of digits in a mobile number accepted by the login flow
pub const MOBILE_NUMBER_LENGTH: usize = 10;

/// Country code shown next to masked numbers
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Country codes offered by the login form
pub const COUNTRY_CODES: [(&str, &str); 5] = [
    ("+91", "India"),
    ("+1", "United States"),
    ("+44", "United Kingdom"),
    ("+61", "Australia"),
    ("+971", "United Arab Emirates"),
];

/// Strip everything but ASCII digits from user input
///
/// Mirrors what the login form does while the user types, so
/// `"98765 43210"` becomes `"9876543210"`.
pub fn normalize_mobile_input(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Check if a mobile number has the exact ten-digit shape
///
/// No normalization happens here; callers normalize input first if they
/// want to accept spaces or dashes.
pub fn is_valid_mobile_number(mobile: &str) -> bool {
    MOBILE_NUMBER_REGEX.is_match(mobile)
}

/// Mask a phone number for logging, keeping the last four digits
pub fn mask_phone_number(phone: &str) -> String {
    let len = phone.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }

    let last_digits: String = phone.chars().skip(len - 4).collect();
    if phone.starts_with('+') {
        format!("+{}{}", "*".repeat(len - 5), last_digits)
    } else {
        format!("{}{}", "*".repeat(len - 4), last_digits)
    }
}

/// Format a number for display on the code entry screen
///
/// `display_masked_mobile("9876543210", "+91")` gives `"+91-XXXXXX3210"`.
/// Numbers shorter than four digits are shown fully masked.
pub fn display_masked_mobile(mobile: &str, country_code: &str) -> String {
    let len = mobile.chars().count();
    if len < 4 {
        return format!("{}-{}", country_code, "X".repeat(MOBILE_NUMBER_LENGTH));
    }
    let last_digits: String = mobile.chars().skip(len - 4).collect();
    format!("{}-XXXXXX{}", country_code, last_digits)
}

/// Look up the label for a country code
pub fn country_label(code: &str) -> Option<&'static str> {
    COUNTRY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}
