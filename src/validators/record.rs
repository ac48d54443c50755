// 📋 Record Validator
// Validates and normalizes a whole inbound bank submission, fail-fast

use crate::error::RecordError;
use crate::validators::field::{coerce_bool, validate_country_iso2};
use crate::validators::swift::{
    validate_swift_code, validate_with_country, validate_with_headquarter_flag,
};
use serde_json::{Map, Value};

/// Inbound record: a dynamically-keyed map of loosely-typed values.
pub type Record = Map<String, Value>;

pub const ADDRESS: &str = "address";
pub const BANK_NAME: &str = "bankName";
pub const COUNTRY_ISO2: &str = "countryISO2";
pub const SWIFT_CODE: &str = "swiftCode";
pub const CODE_ALIAS: &str = "code";
pub const CODE_TYPE: &str = "codeType";
pub const TOWN_NAME: &str = "townName";
pub const IS_HEADQUARTER: &str = "isHeadquarter";
pub const COUNTRY_NAME: &str = "countryName";
pub const TIME_ZONE: &str = "timeZone";

/// Characters the store's query language treats as operators.
const ILLEGAL_CHARACTERS: [char; 3] = ['$', '{', '}'];

// ============================================================================
// SANITIZATION
// ============================================================================

/// Reject any string-valued field containing `$`, `{` or `}`.
///
/// Non-string values are skipped. The first offending field (in key order) is reported.
pub fn sanitize(data: &Record) -> Result<(), RecordError> {
    for (key, value) in data {
        if let Some(text) = value.as_str() {
            if text.contains(ILLEGAL_CHARACTERS) {
                return Err(RecordError::InjectionAttempt {
                    field: key.clone(),
                    value: text.to_string(),
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// FIELD ACCESS
// ============================================================================

/// Key under which the record carries its SWIFT code (`swiftCode`, or the `code` alias).
pub fn code_key(data: &Record) -> Option<&'static str> {
    if data.contains_key(SWIFT_CODE) {
        Some(SWIFT_CODE)
    } else if data.contains_key(CODE_ALIAS) {
        Some(CODE_ALIAS)
    } else {
        None
    }
}

/// Present and a string that is not blank after trimming.
pub fn non_blank<'a>(data: &'a Record, field: &'static str) -> Result<&'a str, RecordError> {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or(RecordError::MissingField { field })
}

fn present<'a>(data: &'a Record, field: &'static str) -> Result<&'a Value, RecordError> {
    data.get(field)
        .filter(|value| !value.is_null())
        .ok_or(RecordError::MissingField { field })
}

// ============================================================================
// BANK RECORD VALIDATOR
// ============================================================================

/// Normalized values produced by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBank {
    pub country_iso2: String,
    pub swift_code: String,
    pub is_headquarter: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BankRecordValidator;

impl BankRecordValidator {
    pub fn new() -> Self {
        BankRecordValidator
    }

    /// Run every check in order and return the normalized values.
    ///
    /// 1. sanitize  2. required fields  3. country  4. code
    /// 5. code/country  6. code/headquarters flag
    pub fn validate(&self, data: &Record) -> Result<ValidatedBank, RecordError> {
        sanitize(data)?;

        non_blank(data, ADDRESS)?;
        non_blank(data, BANK_NAME)?;
        let country_value = present(data, COUNTRY_ISO2)?;
        let code_value = match code_key(data) {
            Some(key) => present(data, key)
                .map_err(|_| RecordError::MissingField { field: SWIFT_CODE })?,
            None => return Err(RecordError::MissingField { field: SWIFT_CODE }),
        };

        let country_iso2 =
            validate_country_iso2(country_value).map_err(RecordError::InvalidCountry)?;

        validate_swift_code(code_value).map_err(RecordError::InvalidCode)?;

        validate_with_country(code_value, &country_iso2)
            .map_err(RecordError::CountryCodeMismatch)?;

        let is_headquarter = coerce_bool(data.get(IS_HEADQUARTER));
        let swift_code = validate_with_headquarter_flag(code_value, is_headquarter)
            .map_err(RecordError::HeadquarterCodeMismatch)?;

        Ok(ValidatedBank {
            country_iso2,
            swift_code,
            is_headquarter,
        })
    }

    /// Validate, then write the uppercased country and code back into the record.
    pub fn validate_and_normalize(&self, data: &mut Record) -> Result<ValidatedBank, RecordError> {
        let validated = self.validate(data)?;

        data.insert(
            COUNTRY_ISO2.to_string(),
            Value::String(validated.country_iso2.clone()),
        );
        if let Some(key) = code_key(data) {
            data.insert(key.to_string(), Value::String(validated.swift_code.clone()));
        }

        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FieldError};
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn valid_record() -> Record {
        record(json!({
            "address": "123 Main St",
            "bankName": "Test Bank",
            "countryISO2": "DE",
            "swiftCode": "DEUTDEFF",
            "codeType": "BIC8",
            "isHeadquarter": true,
            "timeZone": "Europe/Berlin",
            "countryName": "Germany",
        }))
    }

    #[test]
    fn test_valid_input() {
        let validated = BankRecordValidator::new().validate(&valid_record()).unwrap();
        assert_eq!(validated.swift_code, "DEUTDEFF");
        assert_eq!(validated.country_iso2, "DE");
        assert!(validated.is_headquarter);
    }

    #[test]
    fn test_missing_fields() {
        let validator = BankRecordValidator::new();

        let mut data = valid_record();
        data.remove("address");
        assert_eq!(
            validator.validate(&data).unwrap_err(),
            RecordError::MissingField { field: ADDRESS }
        );

        data.insert("address".into(), json!("Some Address"));
        data.insert("bankName".into(), json!("   "));
        assert_eq!(
            validator.validate(&data).unwrap_err(),
            RecordError::MissingField { field: BANK_NAME }
        );

        data.insert("bankName".into(), json!("Bank"));
        data.remove("swiftCode");
        assert_eq!(
            validator.validate(&data).unwrap_err(),
            RecordError::MissingField { field: SWIFT_CODE }
        );

        data.insert("swiftCode".into(), json!("DEUTDEFF"));
        data.remove("countryISO2");
        assert_eq!(
            validator.validate(&data).unwrap_err().kind(),
            ErrorKind::MissingField
        );
    }

    #[test]
    fn test_code_alias_accepted() {
        let mut data = valid_record();
        data.remove("swiftCode");
        data.insert("code".into(), json!("deutdeffxxx"));

        let validated = BankRecordValidator::new()
            .validate_and_normalize(&mut data)
            .unwrap();
        assert_eq!(validated.swift_code, "DEUTDEFFXXX");
        assert_eq!(data["code"], json!("DEUTDEFFXXX"));
    }

    #[test]
    fn test_invalid_country_code() {
        let mut data = valid_record();
        data.insert("countryISO2".into(), json!("XYZ"));
        let err = BankRecordValidator::new().validate(&data).unwrap_err();
        assert!(matches!(err, RecordError::InvalidCountry(FieldError::TooLong { .. })));
        assert!(err.to_string().contains("countryISO2 invalid"));

        data.insert("countryISO2".into(), json!(49));
        let err = BankRecordValidator::new().validate(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongType);
    }

    #[test]
    fn test_invalid_swift_code() {
        let mut data = valid_record();
        data.insert("swiftCode".into(), json!("INVALID"));
        let err = BankRecordValidator::new().validate(&data).unwrap_err();
        assert!(matches!(err, RecordError::InvalidCode(FieldError::BadLength { .. })));
        assert!(err.to_string().contains("swiftCode invalid"));
    }

    #[test]
    fn test_swift_code_country_mismatch() {
        let mut data = valid_record();
        data.insert("countryISO2".into(), json!("FR"));
        let err = BankRecordValidator::new().validate(&data).unwrap_err();
        assert!(matches!(err, RecordError::CountryCodeMismatch(_)));
        assert_eq!(err.kind(), ErrorKind::CountryMismatch);
    }

    #[test]
    fn test_headquarter_mismatch() {
        let validator = BankRecordValidator::new();

        let mut data = valid_record();
        data.insert("isHeadquarter".into(), json!(false));
        let err = validator.validate(&data).unwrap_err();
        assert!(matches!(err, RecordError::HeadquarterCodeMismatch(_)));

        data.insert("swiftCode".into(), json!("DEUTDEFFXXX"));
        let err = validator.validate(&data).unwrap_err();
        assert!(err.to_string().contains("isHeadquarter and swift code mismatch"));

        // Absent flag defaults to false, which suits a branch code
        data.remove("isHeadquarter");
        data.insert("swiftCode".into(), json!("DEUTDEFF500"));
        assert!(validator.validate(&data).is_ok());

        data.insert("isHeadquarter".into(), json!("true"));
        assert_eq!(
            validator.validate(&data).unwrap_err().kind(),
            ErrorKind::HeadquarterMismatch
        );
    }

    #[test]
    fn test_normalization_only_touches_code_and_country() {
        let mut data = valid_record();
        data.insert("swiftCode".into(), json!("deutdeff"));
        data.insert("countryISO2".into(), json!("de"));
        data.insert("bankName".into(), json!("lower case bank"));

        BankRecordValidator::new()
            .validate_and_normalize(&mut data)
            .unwrap();

        assert_eq!(data["swiftCode"], json!("DEUTDEFF"));
        assert_eq!(data["countryISO2"], json!("DE"));
        assert_eq!(data["bankName"], json!("lower case bank"));
        assert!(!data.contains_key("branchCode"));
    }

    #[test]
    fn test_sanitize_reports_field() {
        let data = record(json!({ "field1": "${RCE}", "field2": 12345 }));
        assert_eq!(
            sanitize(&data).unwrap_err(),
            RecordError::InjectionAttempt {
                field: "field1".into(),
                value: "${RCE}".into()
            }
        );

        let clean = record(json!({ "field1": "validValue", "field2": 12345 }));
        assert!(sanitize(&clean).is_ok());
    }

    #[test]
    fn test_sanitize_runs_before_required_fields() {
        let data = record(json!({ "townName": "Berlin}" }));
        assert_eq!(
            BankRecordValidator::new().validate(&data).unwrap_err().kind(),
            ErrorKind::InjectionAttempt
        );
    }

    proptest! {
        #[test]
        fn prop_any_field_with_operator_is_rejected(
            field in prop::sample::select(vec![
                "address", "bankName", "countryISO2", "swiftCode", "townName", "countryName",
            ]),
            prefix in "[a-zA-Z ]{0,8}",
            op in prop::sample::select(vec!['$', '{', '}']),
            suffix in "[a-zA-Z ]{0,8}",
        ) {
            let mut data = valid_record();
            data.insert(field.to_string(), json!(format!("{prefix}{op}{suffix}")));
            let err = BankRecordValidator::new().validate(&data).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InjectionAttempt);
        }
    }
}
