// Validators - field, SWIFT code, bank record and country record checks
//
// Every validator takes loosely-typed input (serde_json::Value) and narrows
// it explicitly, failing with WrongType on a mismatch.

pub mod country;
pub mod field;
pub mod record;
pub mod swift;

pub use country::{CountryRecordValidator, ValidatedCountry};
pub use field::{
    coerce_bool, parse_bool_str, validate_code_type, validate_country_iso2, validate_time_zone,
};
pub use record::{sanitize, BankRecordValidator, Record, ValidatedBank};
pub use swift::{
    branch_code, is_headquarter_code, validate_swift_code, validate_with_country,
    validate_with_headquarter_flag,
};
