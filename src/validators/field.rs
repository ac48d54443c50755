// 🔎 Field Validators
// Stateless single-field checks over loosely-typed input values

use crate::entities::CodeType;
use crate::error::FieldError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static COUNTRY_ISO2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

static CODE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^BIC(8|11)$").unwrap());

/// Structural only: `<Region>/<Place>`, letters only. Not checked against a zone database.
static TIME_ZONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+/[A-Z][A-Za-z]+$").unwrap());

pub const COUNTRY_CODE_FIELD: &str = "country code";
pub const CODE_TYPE_FIELD: &str = "code type";
pub const TIME_ZONE_FIELD: &str = "timeZone";

// ============================================================================
// TYPE NARROWING
// ============================================================================

/// Narrow an untyped value to a string, or fail with `WrongType`.
pub fn expect_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, FieldError> {
    value.as_str().ok_or(FieldError::WrongType { field })
}

// ============================================================================
// COUNTRY CODE
// ============================================================================

/// Validate an ISO2 country code. Returns the uppercased code.
pub fn validate_country_iso2(value: &Value) -> Result<String, FieldError> {
    let raw = expect_str(value, COUNTRY_CODE_FIELD)?;
    check_country_iso2(raw)
}

pub fn check_country_iso2(raw: &str) -> Result<String, FieldError> {
    let country_iso2 = raw.to_ascii_uppercase();
    let len = country_iso2.chars().count();

    if len < 2 {
        return Err(FieldError::TooShort {
            field: COUNTRY_CODE_FIELD,
            len,
        });
    }
    if len > 2 {
        return Err(FieldError::TooLong {
            field: COUNTRY_CODE_FIELD,
            len,
        });
    }
    if !COUNTRY_ISO2_RE.is_match(&country_iso2) {
        return Err(FieldError::BadFormat {
            field: COUNTRY_CODE_FIELD,
            value: country_iso2,
        });
    }

    Ok(country_iso2)
}

// ============================================================================
// CODE TYPE
// ============================================================================

/// Validate a code-type tag against `{BIC8, BIC11}`, case-insensitively.
pub fn validate_code_type(value: &Value) -> Result<CodeType, FieldError> {
    let raw = expect_str(value, CODE_TYPE_FIELD)?;
    let code_type = raw.to_ascii_uppercase();

    if !CODE_TYPE_RE.is_match(&code_type) {
        return Err(FieldError::BadFormat {
            field: CODE_TYPE_FIELD,
            value: raw.to_string(),
        });
    }

    match code_type.as_str() {
        "BIC8" => Ok(CodeType::Bic8),
        _ => Ok(CodeType::Bic11),
    }
}

// ============================================================================
// TIME ZONE
// ============================================================================

/// Validate the `<Region>/<Place>` shape of a time-zone string.
pub fn validate_time_zone(value: &Value) -> Result<String, FieldError> {
    let time_zone = expect_str(value, TIME_ZONE_FIELD)?;

    if !TIME_ZONE_RE.is_match(time_zone) {
        return Err(FieldError::BadFormat {
            field: TIME_ZONE_FIELD,
            value: time_zone.to_string(),
        });
    }

    Ok(time_zone.to_string())
}

// ============================================================================
// BOOLEAN COERCION
// ============================================================================

/// Parse the usual textual booleans: `1 t T TRUE true True` / `0 f F FALSE false False`.
pub fn parse_bool_str(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Coerce a loosely-typed flag to a boolean.
///
/// Accepts a JSON boolean, a boolean-like string, or a number (nonzero is
/// `true`). Anything else, including an absent value, yields `false`.
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(raw)) => parse_bool_str(raw).unwrap_or(false),
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        _ => false,
    }
}
