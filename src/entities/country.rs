// 🌍 Country Entity - reference metadata, one row per ISO2 code

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "timeZone", default)]
    pub time_zone: String,
}

impl Country {
    pub fn new(country_iso2: String, country_name: String, time_zone: String) -> Self {
        Country {
            country_iso2,
            country_name,
            time_zone,
        }
    }

    /// Merge an incoming value into this stored one.
    ///
    /// The name is overwritten only by a non-empty, different name; an empty
    /// stored time zone is filled from a non-empty incoming one. Returns
    /// whether anything changed.
    pub fn merge(&mut self, incoming: &Country) -> bool {
        let mut changed = false;

        if !incoming.country_name.is_empty() && incoming.country_name != self.country_name {
            self.country_name = incoming.country_name.clone();
            changed = true;
        }
        if self.time_zone.is_empty() && !incoming.time_zone.is_empty() {
            self.time_zone = incoming.time_zone.clone();
            changed = true;
        }

        changed
    }
}
