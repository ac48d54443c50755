// ⚠️ Error taxonomy
// Field, record, store and service failures, each with a flat ErrorKind

use thiserror::Error;

// ============================================================================
// ERROR KIND
// ============================================================================

/// Flat classification of every failure the directory can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WrongType,
    MissingField,
    TooShort,
    TooLong,
    BadLength,
    BadFormat,
    CountryMismatch,
    HeadquarterMismatch,
    InjectionAttempt,
    AlreadyExists,
    NotFound,
    StoreError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::WrongType => "wrong_type",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::TooShort => "too_short",
            ErrorKind::TooLong => "too_long",
            ErrorKind::BadLength => "bad_length",
            ErrorKind::BadFormat => "bad_format",
            ErrorKind::CountryMismatch => "country_mismatch",
            ErrorKind::HeadquarterMismatch => "headquarter_mismatch",
            ErrorKind::InjectionAttempt => "injection_attempt",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::NotFound => "not_found",
            ErrorKind::StoreError => "store_error",
        }
    }

    /// True for kinds caused by a defect in the caller's input.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ErrorKind::AlreadyExists | ErrorKind::NotFound | ErrorKind::StoreError
        )
    }
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// Failure of a single-field check (country code, code type, time zone, SWIFT code).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} value must be a string")]
    WrongType { field: &'static str },

    #[error("{field} is too short: {len}")]
    TooShort { field: &'static str, len: usize },

    #[error("{field} is too long: {len}")]
    TooLong { field: &'static str, len: usize },

    #[error("invalid {field} length: {len}")]
    BadLength { field: &'static str, len: usize },

    #[error("invalid {field} format: {value}")]
    BadFormat { field: &'static str, value: String },

    #[error("SWIFT code country does not match provided country code: {found} vs {expected}")]
    CountryMismatch { found: String, expected: String },

    #[error("{}", headquarter_message(.claimed))]
    HeadquarterMismatch { code: String, claimed: bool },
}

fn headquarter_message(claimed: &bool) -> &'static str {
    if *claimed {
        "the bank is not a headquarter"
    } else {
        "the bank should be marked as a headquarter"
    }
}

impl FieldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FieldError::WrongType { .. } => ErrorKind::WrongType,
            FieldError::TooShort { .. } => ErrorKind::TooShort,
            FieldError::TooLong { .. } => ErrorKind::TooLong,
            FieldError::BadLength { .. } => ErrorKind::BadLength,
            FieldError::BadFormat { .. } => ErrorKind::BadFormat,
            FieldError::CountryMismatch { .. } => ErrorKind::CountryMismatch,
            FieldError::HeadquarterMismatch { .. } => ErrorKind::HeadquarterMismatch,
        }
    }
}

// ============================================================================
// RECORD ERRORS
// ============================================================================

/// Failure of a whole inbound record. The first failing step wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("field {field} contains illegal value: {value}")]
    InjectionAttempt { field: String, value: String },

    #[error("{field} is required and must be a non-empty string")]
    MissingField { field: &'static str },

    #[error("countryISO2 invalid: {0}")]
    InvalidCountry(#[source] FieldError),

    #[error("swiftCode invalid: {0}")]
    InvalidCode(#[source] FieldError),

    #[error("swiftCode and countryISO2 mismatch: {0}")]
    CountryCodeMismatch(#[source] FieldError),

    #[error("isHeadquarter and swift code mismatch: {0}")]
    HeadquarterCodeMismatch(#[source] FieldError),

    #[error("codeType invalid: {0}")]
    InvalidCodeType(#[source] FieldError),

    #[error("timeZone invalid: {0}")]
    InvalidTimeZone(#[source] FieldError),
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordError::InjectionAttempt { .. } => ErrorKind::InjectionAttempt,
            RecordError::MissingField { .. } => ErrorKind::MissingField,
            RecordError::InvalidCountry(inner)
            | RecordError::InvalidCode(inner)
            | RecordError::CountryCodeMismatch(inner)
            | RecordError::HeadquarterCodeMismatch(inner)
            | RecordError::InvalidCodeType(inner)
            | RecordError::InvalidTimeZone(inner) => inner.kind(),
        }
    }
}

// ============================================================================
// STORE ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Database(_) | StoreError::Unavailable(_) | StoreError::Serialization(_) => {
                ErrorKind::StoreError
            }
        }
    }
}

// ============================================================================
// SERVICE ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("import failed: {0}")]
    ImportFailed(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(e) => e.kind(),
            ServiceError::Store(e) => e.kind(),
            ServiceError::ImportFailed(_) => ErrorKind::StoreError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_kind_follows_inner_field_error() {
        let err = RecordError::InvalidCode(FieldError::BadLength {
            field: "SWIFT code",
            len: 4,
        });
        assert_eq!(err.kind(), ErrorKind::BadLength);
        assert_eq!(err.to_string(), "swiftCode invalid: invalid SWIFT code length: 4");
    }

    #[test]
    fn test_headquarter_mismatch_messages() {
        let claimed_hq = FieldError::HeadquarterMismatch {
            code: "DEUTDEFF500".to_string(),
            claimed: true,
        };
        let claimed_branch = FieldError::HeadquarterMismatch {
            code: "DEUTDEFFXXX".to_string(),
            claimed: false,
        };

        assert_eq!(claimed_hq.to_string(), "the bank is not a headquarter");
        assert_eq!(
            claimed_branch.to_string(),
            "the bank should be marked as a headquarter"
        );
    }

    #[test]
    fn test_validation_kinds() {
        assert!(ErrorKind::BadFormat.is_validation());
        assert!(ErrorKind::InjectionAttempt.is_validation());
        assert!(!ErrorKind::NotFound.is_validation());
        assert!(!ErrorKind::AlreadyExists.is_validation());
        assert!(!StoreError::NotFound("X".into()).kind().is_validation());
    }
}
