//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates display name format.
///
/// Requirements:
/// - 1-100 characters in length
/// - No control characters
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() || name.chars().count() > 100 {
        return Err(ValidationError::new("display_name_invalid_length"));
    }

    if name.chars().any(char::is_control) {
        return Err(ValidationError::new("display_name_invalid_characters"));
    }

    Ok(())
}

/// Validates that an asking price is positive and below the sanity cap
/// (one billion dollars, in cents).
pub fn validate_price_cents(price_cents: i64) -> Result<(), ValidationError> {
    if !(1..=100_000_000_000).contains(&price_cents) {
        return Err(ValidationError::new("price_out_of_range"));
    }
    Ok(())
}

/// Validates blog slug format.
///
/// Requirements:
/// - Lowercase alphanumeric segments separated by single hyphens
/// - 1-120 characters in length
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() || slug.len() > 120 {
        return Err(ValidationError::new("slug_invalid_length"));
    }

    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(ValidationError::new("slug_invalid_format"));
    }

    Ok(())
}
