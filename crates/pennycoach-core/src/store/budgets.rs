use std::path::Path;

use rusqlite::{Connection, params};
use tracing::info;

use crate::CoachResult;
use crate::engine::types::BudgetLimit;
use crate::store::connection::{map_sqlite_error, now_timestamp};

/// Saving the same category and month again replaces the limit.
pub fn upsert_budget(
    connection: &Connection,
    db_path: &Path,
    month: &str,
    budget: &BudgetLimit,
) -> CoachResult<()> {
    connection
        .execute(
            "INSERT INTO budgets (category_id, month, amount_limit, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category_id, month) DO UPDATE SET
                amount_limit = excluded.amount_limit,
                updated_at = excluded.updated_at",
            params![&budget.category_id, month, budget.limit, now_timestamp()],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    info!(
        category = %budget.category_id,
        month,
        limit = budget.limit,
        "budget saved"
    );
    Ok(())
}

/// Returns `false` when no budget exists for that category and month.
pub fn delete_budget(
    connection: &Connection,
    db_path: &Path,
    category_id: &str,
    month: &str,
) -> CoachResult<bool> {
    let deleted = connection
        .execute(
            "DELETE FROM budgets WHERE category_id = ?1 AND month = ?2",
            params![category_id, month],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if deleted > 0 {
        info!(category = %category_id, month, "budget deleted");
    }
    Ok(deleted > 0)
}

/// Budgets for one `YYYY-MM` month, ordered by category.
pub fn list_budgets(
    connection: &Connection,
    db_path: &Path,
    month: &str,
) -> CoachResult<Vec<BudgetLimit>> {
    let mut statement = connection
        .prepare(
            "SELECT category_id, amount_limit
             FROM budgets
             WHERE month = ?1
             ORDER BY category_id COLLATE NOCASE ASC, category_id ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows_iter = statement
        .query_map([month], |row| {
            Ok(BudgetLimit {
                category_id: row.get(0)?,
                limit: row.get(1)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(rows)
}
