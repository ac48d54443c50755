// 🌍 Country Record Validator

use crate::error::RecordError;
use crate::validators::field::{validate_country_iso2, validate_time_zone};
use crate::validators::record::{non_blank, sanitize, Record, COUNTRY_ISO2, COUNTRY_NAME, TIME_ZONE};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCountry {
    pub country_iso2: String,
    pub country_name: String,
    pub time_zone: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CountryRecordValidator;

impl CountryRecordValidator {
    pub fn new() -> Self {
        CountryRecordValidator
    }

    /// Sanitize, then require `countryISO2` and a non-blank `countryName`.
    /// `timeZone` is optional but must be well-formed when given.
    pub fn validate(&self, data: &Record) -> Result<ValidatedCountry, RecordError> {
        sanitize(data)?;

        let country_value = data
            .get(COUNTRY_ISO2)
            .filter(|value| !value.is_null())
            .ok_or(RecordError::MissingField {
                field: COUNTRY_ISO2,
            })?;
        let country_name = non_blank(data, COUNTRY_NAME)?.trim().to_string();

        let country_iso2 =
            validate_country_iso2(country_value).map_err(RecordError::InvalidCountry)?;

        let time_zone = match data.get(TIME_ZONE) {
            None | Some(Value::Null) => None,
            Some(value) => Some(validate_time_zone(value).map_err(RecordError::InvalidTimeZone)?),
        };

        Ok(ValidatedCountry {
            country_iso2,
            country_name,
            time_zone,
        })
    }
}
