use std::path::Path;

use rusqlite::{Connection, params};
use tracing::info;

use crate::CoachResult;
use crate::engine::rules::RuleBook;
use crate::engine::types::Rule;
use crate::store::connection::{map_sqlite_error, now_timestamp};

/// Last write wins per merchant key.
pub fn upsert_rule(connection: &Connection, db_path: &Path, rule: &Rule) -> CoachResult<()> {
    connection
        .execute(
            "INSERT INTO rules (merchant_key, category_id, is_subscription, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(merchant_key) DO UPDATE SET
                category_id = excluded.category_id,
                is_subscription = excluded.is_subscription,
                updated_at = excluded.updated_at",
            params![
                &rule.merchant_key,
                &rule.category_id,
                rule.is_subscription,
                now_timestamp()
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    info!(
        merchant_key = %rule.merchant_key,
        category = %rule.category_id,
        is_subscription = rule.is_subscription,
        "rule saved"
    );
    Ok(())
}

pub fn list_rules(connection: &Connection, db_path: &Path) -> CoachResult<Vec<Rule>> {
    let mut statement = connection
        .prepare(
            "SELECT merchant_key, category_id, is_subscription
             FROM rules
             ORDER BY merchant_key ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows_iter = statement
        .query_map([], |row| {
            Ok(Rule {
                merchant_key: row.get(0)?,
                category_id: row.get(1)?,
                is_subscription: row.get(2)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(rows)
}

pub fn load_rule_book(connection: &Connection, db_path: &Path) -> CoachResult<RuleBook> {
    Ok(list_rules(connection, db_path)?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusqlite::Connection;

    use crate::engine::types::Rule;
    use crate::store::migrations::run_pending;

    use super::{list_rules, load_rule_book, upsert_rule};

    fn rule(category: &str, is_subscription: bool) -> Rule {
        Rule {
            merchant_key: "Netflix".to_string(),
            category_id: category.to_string(),
            is_subscription,
        }
    }

    #[test]
    fn saving_twice_keeps_one_row_with_latest_values() {
        let db_path = Path::new(":memory:");
        let connection = Connection::open_in_memory();
        assert!(connection.is_ok());
        if let Ok(mut conn) = connection {
            assert!(run_pending(&mut conn).is_ok());
            assert!(upsert_rule(&conn, db_path, &rule("Entertainment", false)).is_ok());
            assert!(upsert_rule(&conn, db_path, &rule("Subscriptions", true)).is_ok());

            let rows = list_rules(&conn, db_path);
            assert!(rows.is_ok());
            if let Ok(rows) = rows {
                assert_eq!(rows, vec![rule("Subscriptions", true)]);
            }

            let book = load_rule_book(&conn, db_path);
            assert_eq!(book.map(|value| value.len()).ok(), Some(1));
        }
    }
}
