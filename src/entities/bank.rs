// 🏦 Bank Entity - one SWIFT directory entry (head office or branch)
//
// Identity: swift_code (unique in the store)
// Grouping: branch_code = swift_code[0..8], shared by a head office and its branches

use crate::error::RecordError;
use crate::validators::field::validate_code_type;
use crate::validators::record::{Record, ADDRESS, BANK_NAME, CODE_TYPE, TOWN_NAME};
use crate::validators::swift::{branch_code, is_headquarter_code};
use crate::validators::ValidatedBank;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

// ============================================================================
// CODE TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeType {
    #[serde(rename = "BIC8")]
    Bic8,

    #[serde(rename = "BIC11")]
    Bic11,
}

impl CodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::Bic8 => "BIC8",
            CodeType::Bic11 => "BIC11",
        }
    }

    /// Class implied by the code's length.
    pub fn for_code(code: &str) -> Self {
        if code.len() == 8 {
            CodeType::Bic8
        } else {
            CodeType::Bic11
        }
    }
}

impl FromStr for CodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BIC8" => Ok(CodeType::Bic8),
            "BIC11" => Ok(CodeType::Bic11),
            other => Err(format!("unknown code type: {}", other)),
        }
    }
}

// ============================================================================
// BANK ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    #[serde(rename = "codeType")]
    pub code_type: CodeType,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    /// May be empty for rows imported without an address
    #[serde(default)]
    pub address: String,

    #[serde(rename = "townName", default)]
    pub town_name: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "branchCode")]
    pub branch_code: String,
}

impl Bank {
    /// Build a bank from an already validated SWIFT code, deriving the
    /// headquarters flag and branch code from the code's structure.
    pub fn new(
        swift_code: String,
        country_iso2: String,
        bank_name: String,
        address: String,
        town_name: String,
    ) -> Self {
        Bank {
            is_headquarter: is_headquarter_code(&swift_code),
            branch_code: branch_code(&swift_code).to_string(),
            code_type: CodeType::for_code(&swift_code),
            country_iso2,
            swift_code,
            bank_name,
            address,
            town_name,
        }
    }

    /// Builder: override the code type
    pub fn with_code_type(mut self, code_type: CodeType) -> Self {
        self.code_type = code_type;
        self
    }

    /// Ingestion path for a record that passed `BankRecordValidator`.
    ///
    /// `codeType` is validated when present, otherwise derived from the code length.
    pub fn from_validated_record(
        validated: &ValidatedBank,
        data: &Record,
    ) -> Result<Bank, RecordError> {
        let text = |field: &str| {
            data.get(field)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let code_type = match data.get(CODE_TYPE) {
            None | Some(Value::Null) => CodeType::for_code(&validated.swift_code),
            Some(value) => validate_code_type(value).map_err(RecordError::InvalidCodeType)?,
        };

        let bank = Bank::new(
            validated.swift_code.clone(),
            validated.country_iso2.clone(),
            text(BANK_NAME),
            text(ADDRESS),
            text(TOWN_NAME),
        )
        .with_code_type(code_type);

        Ok(bank)
    }

    /// Branch-facing projection used in hierarchy and country listings.
    pub fn summary(&self) -> BranchSummary {
        BranchSummary {
            address: self.address.clone(),
            bank_name: self.bank_name.clone(),
            country_iso2: self.country_iso2.clone(),
            is_headquarter: self.is_headquarter,
            swift_code: self.swift_code.clone(),
        }
    }
}

// ============================================================================
// BRANCH SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchSummary {
    pub address: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,
}

// ============================================================================
// TESTS
// ============================================================================
