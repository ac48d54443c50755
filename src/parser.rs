// 📥 SWIFT file parser
// Reads the bulk SWIFT directory export into banks and countries
//
// Expected header (case-insensitive, any column order):
//   COUNTRY ISO2 CODE; SWIFT CODE; CODE TYPE; NAME; ADDRESS; TOWN NAME; COUNTRY NAME; TIME ZONE
// Delimiter is ';' (the upstream export) or ',' and is sniffed from the header line.

use crate::entities::{Bank, CodeType, Country};
use crate::validators::swift::check_swift_code;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// COLUMNS
// ============================================================================

pub const COL_COUNTRY_ISO2: &str = "COUNTRY ISO2 CODE";
pub const COL_SWIFT_CODE: &str = "SWIFT CODE";
pub const COL_CODE_TYPE: &str = "CODE TYPE";
pub const COL_NAME: &str = "NAME";
pub const COL_ADDRESS: &str = "ADDRESS";
pub const COL_TOWN_NAME: &str = "TOWN NAME";
pub const COL_COUNTRY_NAME: &str = "COUNTRY NAME";
pub const COL_TIME_ZONE: &str = "TIME ZONE";

/// Result of parsing one SWIFT file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDirectory {
    pub banks: Vec<Bank>,
    /// One entry per ISO2 code, in order of first appearance
    pub countries: Vec<Country>,
    /// Rows dropped because their SWIFT code or country was invalid
    pub rejected: usize,
}

/// Upper-cased header name → column index
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Columns(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_uppercase(), i))
                .collect(),
        )
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.0
            .get(column)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse a SWIFT file from disk
pub fn parse_file(file_path: &Path) -> Result<ParsedDirectory> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    parse_str(&content)
        .with_context(|| format!("Failed to parse SWIFT file: {}", file_path.display()))
}

/// Parse SWIFT file content already held in memory
pub fn parse_str(content: &str) -> Result<ParsedDirectory> {
    let delimiter = sniff_delimiter(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let columns = Columns::from_headers(&headers);

    let mut parsed = ParsedDirectory::default();
    let mut seen_countries: HashMap<String, usize> = HashMap::new();

    for (line_num, result) in reader.records().enumerate() {
        // +2: 1-indexed plus the header row
        let line = line_num + 2;
        let record = result.with_context(|| format!("Failed to parse CSV line {}", line))?;

        if record.len() < headers.len() {
            debug!(line, "skipping short row");
            continue;
        }

        let Some(bank) = bank_from_row(&columns, &record, line) else {
            parsed.rejected += 1;
            continue;
        };

        if !seen_countries.contains_key(&bank.country_iso2) {
            seen_countries.insert(bank.country_iso2.clone(), parsed.countries.len());
            parsed.countries.push(Country::new(
                bank.country_iso2.clone(),
                columns.get(&record, COL_COUNTRY_NAME).to_uppercase(),
                columns.get(&record, COL_TIME_ZONE).to_string(),
            ));
        }

        parsed.banks.push(bank);
    }

    debug!(
        banks = parsed.banks.len(),
        countries = parsed.countries.len(),
        rejected = parsed.rejected,
        "parsed SWIFT file"
    );

    Ok(parsed)
}

/// Build a bank from one row, or `None` when the row must be rejected.
fn bank_from_row(columns: &Columns, record: &StringRecord, line: usize) -> Option<Bank> {
    let raw_code = columns.get(record, COL_SWIFT_CODE);
    let country_iso2 = columns.get(record, COL_COUNTRY_ISO2).to_uppercase();

    let swift_code = match check_swift_code(raw_code) {
        Ok(code) => code,
        Err(e) => {
            warn!(line, swift_code = raw_code, "rejecting row: {}", e);
            return None;
        }
    };

    if swift_code.get(4..6) != Some(country_iso2.as_str()) {
        warn!(
            line,
            swift_code = %swift_code,
            country_iso2 = %country_iso2,
            "rejecting row: SWIFT code country does not match"
        );
        return None;
    }

    let code_type = columns
        .get(record, COL_CODE_TYPE)
        .parse::<CodeType>()
        .unwrap_or_else(|_| CodeType::for_code(&swift_code));

    let bank = Bank::new(
        swift_code,
        country_iso2,
        columns.get(record, COL_NAME).to_string(),
        columns.get(record, COL_ADDRESS).to_string(),
        columns.get(record, COL_TOWN_NAME).to_string(),
    )
    .with_code_type(code_type);

    Some(bank)
}

/// ';' unless the header line has more ',' than ';'
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();

    if commas > semicolons {
        b','
    } else {
        b';'
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "COUNTRY ISO2 CODE;SWIFT CODE;CODE TYPE;NAME;ADDRESS;TOWN NAME;COUNTRY NAME;TIME ZONE";

    fn file(rows: &[&str]) -> String {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    #[test]
    fn test_parse_semicolon_file() {
        let content = file(&[
            "PL;TPEOPLPWXXX;BIC11;PEKAO TOWARZYSTWO FUNDUSZY INWESTYCYJNYCH S.A.;FOREST ZUBRA 1, FLOOR 1 WARSZAWA;WARSZAWA;Poland;Europe/Warsaw",
            "PL;TPEOPLPWPAE;BIC11;PEKAO TOWARZYSTWO FUNDUSZY INWESTYCYJNYCH S.A.;  ;WARSZAWA;POLAND;Europe/Warsaw",
        ]);

        let parsed = parse_str(&content).unwrap();
        assert_eq!(parsed.banks.len(), 2);
        assert_eq!(parsed.rejected, 0);

        let hq = &parsed.banks[0];
        assert!(hq.is_headquarter);
        assert_eq!(hq.branch_code, "TPEOPLPW");
        assert_eq!(hq.address, "FOREST ZUBRA 1, FLOOR 1 WARSZAWA");

        let branch = &parsed.banks[1];
        assert!(!branch.is_headquarter);
        assert_eq!(branch.branch_code, "TPEOPLPW");
        assert_eq!(branch.address, "");
    }

    #[test]
    fn test_countries_deduplicated_first_wins() {
        let content = file(&[
            "PL;TPEOPLPWXXX;BIC11;PEKAO;ADDR;WARSZAWA;Poland;Europe/Warsaw",
            "PL;BREXPLPWXXX;BIC11;MBANK;ADDR;WARSZAWA;Polska;Europe/Warsaw",
            "DE;DEUTDEFFXXX;BIC11;DEUTSCHE BANK;ADDR;FRANKFURT;Germany;Europe/Berlin",
        ]);

        let parsed = parse_str(&content).unwrap();
        assert_eq!(parsed.countries.len(), 2);
        assert_eq!(parsed.countries[0].country_iso2, "PL");
        assert_eq!(parsed.countries[0].country_name, "POLAND");
        assert_eq!(parsed.countries[1].country_name, "GERMANY");
        assert_eq!(parsed.countries[1].time_zone, "Europe/Berlin");
    }

    #[test]
    fn test_invalid_rows_rejected() {
        let content = file(&[
            "PL;TPEO;BIC11;BAD LENGTH;;WARSZAWA;POLAND;Europe/Warsaw",
            "US;TPEOPLPWXXX;BIC11;WRONG COUNTRY;;WARSZAWA;POLAND;Europe/Warsaw",
            "PL;TPEOPLPWXXX;BIC11;GOOD;;WARSZAWA;POLAND;Europe/Warsaw",
        ]);

        let parsed = parse_str(&content).unwrap();
        assert_eq!(parsed.rejected, 2);
        assert_eq!(parsed.banks.len(), 1);
        assert_eq!(parsed.banks[0].bank_name, "GOOD");
    }

    #[test]
    fn test_short_rows_skipped_not_rejected() {
        let content = file(&["PL;TPEOPLPWXXX;BIC11"]);
        let parsed = parse_str(&content).unwrap();
        assert!(parsed.banks.is_empty());
        assert_eq!(parsed.rejected, 0);
    }

    #[test]
    fn test_comma_delimiter_and_header_case() {
        let content = "country iso2 code,swift code,code type,name,address,town name,country name,time zone\n\
                       pl,tpeoplpwxxx,bic11,PEKAO,\"FOREST ZUBRA 1, FLOOR 1\",WARSZAWA,poland,Europe/Warsaw";

        let parsed = parse_str(content).unwrap();
        assert_eq!(parsed.banks.len(), 1);
        assert_eq!(parsed.banks[0].swift_code, "TPEOPLPWXXX");
        assert_eq!(parsed.banks[0].country_iso2, "PL");
        assert_eq!(parsed.banks[0].address, "FOREST ZUBRA 1, FLOOR 1");
        assert_eq!(parsed.countries[0].country_name, "POLAND");
    }

    #[test]
    fn test_code_type_falls_back_to_length() {
        let content = file(&["DE;DEUTDEFF;;DEUTSCHE BANK;;FRANKFURT;GERMANY;Europe/Berlin"]);
        let parsed = parse_str(&content).unwrap();
        assert_eq!(parsed.banks[0].code_type, CodeType::Bic8);
        assert!(parsed.banks[0].is_headquarter);
        assert_eq!(parsed.banks[0].branch_code, "DEUTDEFF");
    }

    #[test]
    fn test_header_only_file() {
        let parsed = parse_str(HEADER).unwrap();
        assert_eq!(parsed, ParsedDirectory::default());
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file(Path::new("/nonexistent/swift.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
