// 🌳 Hierarchy Resolver
// Links a head-office entry to its branches through the shared branch code
//
// The store has no foreign key between a head office and its branches; the
// relation is derived on read from branch_code = swift_code[0..8].

use crate::entities::{Bank, BranchSummary};
use crate::store::BankStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A bank together with its (possibly empty) branch list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBank {
    pub bank: Bank,
    pub branches: Vec<BranchSummary>,
}

/// Outbound lookup shape: head-office fields plus `branches` when non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeDetails {
    pub address: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchSummary>,
}

impl ResolvedBank {
    pub fn into_details(self, country_name: String) -> SwiftCodeDetails {
        SwiftCodeDetails {
            address: self.bank.address,
            bank_name: self.bank.bank_name,
            country_iso2: self.bank.country_iso2,
            country_name,
            is_headquarter: self.bank.is_headquarter,
            swift_code: self.bank.swift_code,
            branches: self.branches,
        }
    }
}

/// Assemble the branch list of a head-office entry.
///
/// Non-headquarters entries and entries without a branch code resolve to
/// themselves with no branches. A failing branch query degrades to the
/// head office alone.
pub fn resolve<S: BankStore + ?Sized>(store: &S, bank: Bank) -> ResolvedBank {
    if !bank.is_headquarter || bank.branch_code.is_empty() {
        return ResolvedBank {
            bank,
            branches: Vec::new(),
        };
    }

    let group = match store.find_by_branch_code(&bank.branch_code) {
        Ok(group) => group,
        Err(e) => {
            warn!(
                swift_code = %bank.swift_code,
                branch_code = %bank.branch_code,
                "branch lookup failed, returning head office only: {}",
                e
            );
            return ResolvedBank {
                bank,
                branches: Vec::new(),
            };
        }
    };

    let branches = group
        .iter()
        .filter(|candidate| candidate.swift_code != bank.swift_code)
        .map(Bank::summary)
        .collect();

    ResolvedBank { bank, branches }
}
