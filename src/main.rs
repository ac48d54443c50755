use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use swift_directory::{open_store, BankStore, Config, SwiftService};

const USAGE: &str =
    "usage: swift-directory <import [csv] | lookup <code> | country <iso2> | delete <code>>";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swift_directory=info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env();

    let store = open_store(&config)
        .with_context(|| format!("Failed to open database: {}", config.database_path))?;
    let service = SwiftService::new(store);

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["import"] => run_import(&service, config.swift_data_file.clone()),
        ["import", path] => run_import(&service, PathBuf::from(path)),
        ["lookup", code] => {
            let details = service.get_by_swift_code(code)?;
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(())
        }
        ["country", iso2] => {
            let codes = service.get_by_country(iso2)?;
            println!("{}", serde_json::to_string_pretty(&codes)?);
            Ok(())
        }
        ["delete", code] => {
            service.delete_bank(code)?;
            println!("✓ Deleted {}", code.to_ascii_uppercase());
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

fn run_import<S: BankStore>(service: &SwiftService<S>, path: PathBuf) -> Result<()> {
    println!("🗄️  SWIFT import: {}", path.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let summary = service
        .import_file(&path)
        .with_context(|| format!("Import of {} failed", path.display()))?;

    println!("✓ Inserted:   {}", summary.inserted);
    println!("✓ Duplicates: {}", summary.duplicates);
    println!("✓ Rejected:   {}", summary.rejected);
    println!("✓ Countries:  {}", summary.countries);
    println!("✓ Database contains {} banks", service.store().count_banks()?);

    Ok(())
}
