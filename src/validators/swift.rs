// 🏦 SWIFT Code Validator
// Fixed-width format check plus consistency with the claimed country and headquarters flag
//
// Layout (0-indexed):
//   [0..4)  institution code   - letters
//   [4..6)  country code       - letters
//   [6..8)  location code      - alphanumeric
//   [8..11) branch suffix      - alphanumeric, optional; "XXX" marks the head office

use crate::error::FieldError;
use crate::validators::field::expect_str;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static SWIFT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").unwrap());

pub const SWIFT_CODE_FIELD: &str = "SWIFT code";

/// Suffix carried by an 11-character head-office code.
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// Length of the branch code shared by a head office and its branches.
pub const BRANCH_CODE_LEN: usize = 8;

// ============================================================================
// FORMAT
// ============================================================================

/// Validate the SWIFT code format. Returns the uppercased code.
pub fn validate_swift_code(value: &Value) -> Result<String, FieldError> {
    let raw = expect_str(value, SWIFT_CODE_FIELD)?;
    check_swift_code(raw)
}

pub fn check_swift_code(raw: &str) -> Result<String, FieldError> {
    let code = raw.to_ascii_uppercase();
    let len = code.chars().count();

    if len != 8 && len != 11 {
        return Err(FieldError::BadLength {
            field: SWIFT_CODE_FIELD,
            len,
        });
    }
    if !SWIFT_CODE_RE.is_match(&code) {
        return Err(FieldError::BadFormat {
            field: SWIFT_CODE_FIELD,
            value: code,
        });
    }

    Ok(code)
}

// ============================================================================
// CONSISTENCY
// ============================================================================

/// Validate the code and require its embedded country to equal `country_iso2`.
pub fn validate_with_country(value: &Value, country_iso2: &str) -> Result<String, FieldError> {
    let code = validate_swift_code(value)?;
    let expected = country_iso2.to_ascii_uppercase();
    let found = country_segment(&code);

    if found != expected {
        return Err(FieldError::CountryMismatch {
            found: found.to_string(),
            expected,
        });
    }

    Ok(code)
}

/// Validate the code and require `is_headquarter` to agree with its structure.
///
/// An 8-character code has no branch suffix and always denotes a head office,
/// so it only accepts `is_headquarter == true`.
pub fn validate_with_headquarter_flag(
    value: &Value,
    is_headquarter: bool,
) -> Result<String, FieldError> {
    let code = validate_swift_code(value)?;

    if is_headquarter_code(&code) != is_headquarter {
        return Err(FieldError::HeadquarterMismatch {
            code,
            claimed: is_headquarter,
        });
    }

    Ok(code)
}

// ============================================================================
// STRUCTURE HELPERS (expect an already validated code)
// ============================================================================

/// `true` for an 8-character code or an 11-character code ending in `XXX`.
pub fn is_headquarter_code(code: &str) -> bool {
    code.len() == BRANCH_CODE_LEN || code.get(BRANCH_CODE_LEN..) == Some(HEADQUARTER_SUFFIX)
}

/// First 8 characters of the code.
pub fn branch_code(code: &str) -> &str {
    code.get(..BRANCH_CODE_LEN).unwrap_or(code)
}

/// Characters 4-5, the embedded country.
pub fn country_segment(code: &str) -> &str {
    code.get(4..6).unwrap_or("")
}
