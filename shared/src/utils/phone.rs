//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Ethiopian mobile numbers: local 09xxxxxxxx / 07xxxxxxxx or E.164 +2519/+2517
static LOCAL_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[79]\d{8}$").unwrap());

static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is a valid local mobile number
pub fn is_valid_local_mobile(phone: &str) -> bool {
    LOCAL_MOBILE_REGEX.is_match(&normalize_phone_number(phone))
}

/// Check if a phone number is valid in E.164 format
pub fn is_valid_international_phone(phone: &str) -> bool {
    INTERNATIONAL_PHONE_REGEX.is_match(&normalize_phone_number(phone))
}

/// Check if a phone number is valid (local or international)
pub fn is_valid_phone(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    is_valid_local_mobile(&normalized) || is_valid_international_phone(&normalized)
}

/// Mask a phone number for logging (show only last 4 digits)
pub fn mask_phone(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() <= 4 {
        "****".to_string()
    } else {
        format!("***{}", &normalized[normalized.len() - 4..])
    }
}
