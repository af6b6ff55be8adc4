use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::settings::{Settings, load_settings};
use crate::store::connection::{
    ensure_ledger_directory, ledger_db_path, map_sqlite_error, open_connection,
    resolve_ledger_home,
};
use crate::store::migrations::{REQUIRED_TABLES, run_pending};
use crate::{CoachError, CoachResult};

/// A migrated ledger plus the settings that apply to it.
#[derive(Debug, Clone)]
pub struct LedgerContext {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub settings: Settings,
}

impl LedgerContext {
    pub fn connect(&self) -> CoachResult<Connection> {
        open_connection(&self.db_path)
    }
}

pub fn ensure_initialized(home_override: Option<&Path>) -> CoachResult<LedgerContext> {
    let ledger_home = resolve_ledger_home(home_override)?;
    ensure_ledger_directory(&ledger_home)?;
    let settings = load_settings(&ledger_home)?;

    let db_path = ledger_db_path(&ledger_home);
    let mut connection = open_connection(&db_path)?;
    run_pending(&mut connection).map_err(|error| map_migration_error(&db_path, &error))?;
    verify_tables(&connection, &db_path)?;

    debug!(db_path = %db_path.display(), "ledger ready");
    Ok(LedgerContext {
        home: ledger_home,
        db_path,
        settings,
    })
}

fn map_migration_error(db_path: &Path, error: &rusqlite_migration::Error) -> CoachError {
    match error {
        rusqlite_migration::Error::RusqliteError { query: _, err } => {
            let mapped = map_sqlite_error(db_path, err);
            if mapped.code == "ledger_locked"
                || mapped.code == "ledger_corrupt"
                || mapped.code == "ledger_init_permission_denied"
            {
                mapped
            } else {
                CoachError::migration_failed(db_path, &error.to_string())
            }
        }
        _ => CoachError::migration_failed(db_path, &error.to_string()),
    }
}

fn verify_tables(connection: &Connection, db_path: &Path) -> CoachResult<()> {
    for (table_name, required_columns) in REQUIRED_TABLES {
        let exists = connection
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1",
                params![table_name],
                |_row| Ok(true),
            )
            .optional()
            .map_err(|error| map_sqlite_error(db_path, &error))?
            .unwrap_or(false);
        if !exists {
            return Err(CoachError::ledger_corrupt(db_path));
        }

        let columns = table_columns(connection, table_name, db_path)?;
        for required_column in required_columns {
            if !columns.iter().any(|column| column == required_column) {
                return Err(CoachError::ledger_corrupt(db_path));
            }
        }
    }

    Ok(())
}

fn table_columns(
    connection: &Connection,
    table_name: &str,
    db_path: &Path,
) -> CoachResult<Vec<String>> {
    // Only names from REQUIRED_TABLES reach this format string.
    let sql = format!("PRAGMA table_info({table_name})");
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let column_iter = statement
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut columns: Vec<String> = Vec::new();
    for row in column_iter {
        columns.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(columns)
}
