// Entity Models - the data shapes the validators, resolver and store share
//
// Bank: one SWIFT directory entry, keyed by swift_code
// Country: ISO2 reference metadata, keyed by country_iso2

pub mod bank;
pub mod country;

pub use bank::{Bank, BranchSummary, CodeType};
pub use country::Country;
