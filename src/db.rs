// 🗄️ SQLite store - banks, countries and the write audit trail

use crate::entities::{Bank, CodeType, Country};
use crate::error::StoreError;
use crate::store::{BankStore, BulkInsert};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Event for audit trail (every store write is recorded)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
        }
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;

    // ==========================================================================
    // Banks Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS banks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            swift_code TEXT UNIQUE NOT NULL,
            country_iso2 TEXT NOT NULL,
            code_type TEXT NOT NULL,
            bank_name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            town_name TEXT NOT NULL DEFAULT '',
            is_headquarter INTEGER NOT NULL,
            branch_code TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Countries Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS countries (
            country_iso2 TEXT PRIMARY KEY,
            country_name TEXT NOT NULL,
            time_zone TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_banks_country ON banks(country_iso2)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_banks_branch_code ON banks(branch_code)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), StoreError> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

/// Record an audit event; a failure here never fails the write it describes.
fn record_event(conn: &Connection, event: Event) {
    if let Err(e) = insert_event(conn, &event) {
        warn!(
            event_type = %event.event_type,
            entity_id = %event.entity_id,
            "failed to record event: {}",
            e
        );
    }
}

const BANK_COLUMNS: &str = "swift_code, country_iso2, code_type, bank_name, \
                            address, town_name, is_headquarter, branch_code";

const COUNTRY_BY_ISO2: &str =
    "SELECT country_iso2, country_name, time_zone FROM countries WHERE country_iso2 = ?1";

fn bank_from_row(row: &Row) -> rusqlite::Result<Bank> {
    let swift_code: String = row.get(0)?;
    let code_type: String = row.get(2)?;

    Ok(Bank {
        code_type: code_type
            .parse()
            .unwrap_or_else(|_| CodeType::for_code(&swift_code)),
        swift_code,
        country_iso2: row.get(1)?,
        bank_name: row.get(3)?,
        address: row.get(4)?,
        town_name: row.get(5)?,
        is_headquarter: row.get(6)?,
        branch_code: row.get(7)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        debug!(path = %path.display(), "opening SQLite store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("connection lock poisoned: {}", e)))
    }

    /// Audit trail for one entity, newest first.
    pub fn events_for(&self, entity_type: &str, entity_id: &str) -> Result<Vec<Event>, StoreError> {
        let conn = self.conn()?;
        get_events_for_entity(&conn, entity_type, entity_id)
    }

    fn query_banks(&self, filter: &str, value: &str) -> Result<Vec<Bank>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM banks WHERE {} = ?1 ORDER BY swift_code",
            BANK_COLUMNS, filter
        ))?;

        let banks = stmt
            .query_map([value], bank_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(banks)
    }
}

impl BankStore for SqliteStore {
    fn find_by_code(&self, code: &str) -> Result<Bank, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM banks WHERE swift_code = ?1", BANK_COLUMNS),
            [code],
            bank_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("SWIFT code {}", code)))
    }

    fn find_by_branch_code(&self, branch_code: &str) -> Result<Vec<Bank>, StoreError> {
        self.query_banks("branch_code", branch_code)
    }

    fn find_by_country(&self, country_iso2: &str) -> Result<Vec<Bank>, StoreError> {
        self.query_banks("country_iso2", country_iso2)
    }

    fn find_country(&self, country_iso2: &str) -> Result<Country, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            COUNTRY_BY_ISO2,
            [country_iso2],
            |row| Ok(Country::new(row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("country {}", country_iso2)))
    }

    fn insert_bank(&self, bank: &Bank) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let result = conn.execute(
            &format!(
                "INSERT INTO banks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                BANK_COLUMNS
            ),
            params![
                bank.swift_code,
                bank.country_iso2,
                bank.code_type.as_str(),
                bank.bank_name,
                bank.address,
                bank.town_name,
                bank.is_headquarter,
                bank.branch_code,
            ],
        );

        match result {
            Ok(_) => {
                record_event(
                    &conn,
                    Event::new(
                        "bank_added",
                        "bank",
                        &bank.swift_code,
                        serde_json::json!({
                            "countryISO2": bank.country_iso2,
                            "branchCode": bank.branch_code,
                        }),
                    ),
                );
                Ok(())
            }
            Err(e) if is_constraint_violation(&e) => {
                Err(StoreError::AlreadyExists(format!("SWIFT code {}", bank.swift_code)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn insert_banks(&self, banks: &[Bank]) -> Result<BulkInsert, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut summary = BulkInsert::default();

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO banks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                BANK_COLUMNS
            ))?;

            for bank in banks {
                let result = stmt.execute(params![
                    bank.swift_code,
                    bank.country_iso2,
                    bank.code_type.as_str(),
                    bank.bank_name,
                    bank.address,
                    bank.town_name,
                    bank.is_headquarter,
                    bank.branch_code,
                ]);

                match result {
                    Ok(_) => summary.inserted += 1,
                    Err(e) if is_constraint_violation(&e) => summary.duplicates += 1,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        record_event(
            &tx,
            Event::new(
                "banks_imported",
                "import",
                "bulk",
                serde_json::json!({
                    "inserted": summary.inserted,
                    "duplicates": summary.duplicates,
                }),
            ),
        );
        tx.commit()?;

        Ok(summary)
    }

    fn upsert_country(&self, country: &Country) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                COUNTRY_BY_ISO2,
                params![country.country_iso2],
                |row| Ok(Country::new(row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let changed = match existing {
            None => {
                conn.execute(
                    "INSERT INTO countries (country_iso2, country_name, time_zone) \
                     VALUES (?1, ?2, ?3)",
                    params![country.country_iso2, country.country_name, country.time_zone],
                )?;
                true
            }
            Some(mut stored) => {
                let changed = stored.merge(country);
                if changed {
                    conn.execute(
                        "UPDATE countries SET country_name = ?1, time_zone = ?2 \
                         WHERE country_iso2 = ?3",
                        params![stored.country_name, stored.time_zone, stored.country_iso2],
                    )?;
                }
                changed
            }
        };

        if changed {
            record_event(
                &conn,
                Event::new(
                    "country_upserted",
                    "country",
                    &country.country_iso2,
                    serde_json::json!({ "countryName": country.country_name }),
                ),
            );
        }

        Ok(())
    }

    fn delete_bank(&self, code: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM banks WHERE swift_code = ?1", [code])?;

        if deleted == 0 {
            return Err(StoreError::NotFound(format!("SWIFT code {}", code)));
        }

        record_event(
            &conn,
            Event::new("bank_deleted", "bank", code, serde_json::json!({})),
        );
        Ok(())
    }

    fn count_banks(&self) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM banks", [], |row| row.get(0))?;
        Ok(count)
    }
}
