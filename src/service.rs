// 🧭 SWIFT Service
// Orchestrates validators, the hierarchy resolver and the store for each operation

use crate::entities::{Bank, BranchSummary, Country};
use crate::error::{RecordError, ServiceError, StoreError};
use crate::hierarchy::{self, SwiftCodeDetails};
use crate::parser;
use crate::store::BankStore;
use crate::validators::field::{check_country_iso2, validate_time_zone};
use crate::validators::record::{COUNTRY_NAME, TIME_ZONE};
use crate::validators::swift::check_swift_code;
use crate::validators::{BankRecordValidator, CountryRecordValidator, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// All codes registered for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySwiftCodes {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<BranchSummary>,
}

/// Counters reported by a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub countries: usize,
}

pub struct SwiftService<S: BankStore> {
    store: S,
    bank_validator: BankRecordValidator,
    country_validator: CountryRecordValidator,
}

impl<S: BankStore> SwiftService<S> {
    pub fn new(store: S) -> Self {
        SwiftService {
            store,
            bank_validator: BankRecordValidator::new(),
            country_validator: CountryRecordValidator::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Look up one code; head offices come back with their branches.
    pub fn get_by_swift_code(&self, code: &str) -> Result<SwiftCodeDetails, ServiceError> {
        let code = check_swift_code(code).map_err(RecordError::InvalidCode)?;
        let bank = self.store.find_by_code(&code)?;

        let country_name = match self.store.find_country(&bank.country_iso2) {
            Ok(country) => country.country_name,
            Err(e) => {
                warn!(country_iso2 = %bank.country_iso2, "country name lookup failed: {}", e);
                String::new()
            }
        };

        Ok(hierarchy::resolve(&self.store, bank).into_details(country_name))
    }

    pub fn get_by_country(&self, country_iso2: &str) -> Result<CountrySwiftCodes, ServiceError> {
        let country_iso2 = check_country_iso2(country_iso2).map_err(RecordError::InvalidCountry)?;
        let country = self.store.find_country(&country_iso2)?;

        let banks = self.store.find_by_country(&country_iso2)?;
        if banks.is_empty() {
            let what = format!("SWIFT codes for country {}", country_iso2);
            return Err(StoreError::NotFound(what).into());
        }

        Ok(CountrySwiftCodes {
            country_iso2,
            country_name: country.country_name,
            swift_codes: banks.iter().map(Bank::summary).collect(),
        })
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Validate and store a new bank. A non-blank `countryName` on the record
    /// also updates the country reference.
    pub fn create_bank(&self, data: &Record) -> Result<Bank, ServiceError> {
        let mut data = data.clone();
        let validated = self.bank_validator.validate_and_normalize(&mut data)?;
        let time_zone = optional_time_zone(&data)?;
        let bank = Bank::from_validated_record(&validated, &data)?;

        // Country before bank: a failed country write must leave no bank behind
        let country_name = data
            .get(COUNTRY_NAME)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if !country_name.is_empty() {
            let country = Country::new(
                bank.country_iso2.clone(),
                country_name.to_uppercase(),
                time_zone.unwrap_or_default(),
            );
            self.store.upsert_country(&country)?;
        }

        self.store.insert_bank(&bank)?;
        info!(swift_code = %bank.swift_code, "bank created");

        Ok(bank)
    }

    pub fn create_country(&self, data: &Record) -> Result<Country, ServiceError> {
        let validated = self.country_validator.validate(data)?;
        let country = Country::new(
            validated.country_iso2,
            validated.country_name.to_uppercase(),
            validated.time_zone.unwrap_or_default(),
        );

        self.store.upsert_country(&country)?;
        info!(country_iso2 = %country.country_iso2, "country stored");
        Ok(country)
    }

    pub fn delete_bank(&self, code: &str) -> Result<(), ServiceError> {
        let code = check_swift_code(code).map_err(RecordError::InvalidCode)?;
        self.store.delete_bank(&code)?;
        info!(swift_code = %code, "bank deleted");
        Ok(())
    }

    // ========================================================================
    // IMPORT
    // ========================================================================

    /// Seed an empty store from a SWIFT file. `None` when the store already
    /// holds banks.
    pub fn load_initial_data(&self, path: &Path) -> Result<Option<ImportSummary>, ServiceError> {
        let existing = self.store.count_banks()?;
        if existing > 0 {
            info!(existing, "store already populated, skipping initial load");
            return Ok(None);
        }

        self.import_file(path).map(Some)
    }

    /// Import a SWIFT file regardless of what the store holds.
    pub fn import_file(&self, path: &Path) -> Result<ImportSummary, ServiceError> {
        let parsed = parser::parse_file(path)
            .map_err(|e| ServiceError::ImportFailed(format!("{:#}", e)))?;

        for country in &parsed.countries {
            self.store.upsert_country(country)?;
        }
        let bulk = self.store.insert_banks(&parsed.banks)?;

        let summary = ImportSummary {
            inserted: bulk.inserted,
            duplicates: bulk.duplicates,
            rejected: parsed.rejected,
            countries: parsed.countries.len(),
        };
        info!(
            file = %path.display(),
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            rejected = summary.rejected,
            countries = summary.countries,
            "SWIFT file imported"
        );

        Ok(summary)
    }
}

fn optional_time_zone(data: &Record) -> Result<Option<String>, RecordError> {
    match data.get(TIME_ZONE) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => validate_time_zone(value)
            .map(Some)
            .map_err(RecordError::InvalidTimeZone),
    }
}

// ============================================================================
// TESTS
// ============================================================================
