use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;
use ulid::Ulid;

use crate::CoachResult;
use crate::engine::date::{format_iso_date, parse_transaction_date};
use crate::engine::merge::SubscriptionDraft;
use crate::engine::types::Subscription;
use crate::store::connection::{map_sqlite_error, now_timestamp};

const SELECT_COLUMNS: &str = "SELECT
        subscription_id,
        merchant,
        merchant_key,
        amount,
        last_charge,
        match_count,
        active
     FROM subscriptions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionSource {
    Detected,
    Manual,
}

impl SubscriptionSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Manual => "manual",
        }
    }
}

/// Inserts drafts whose merchant key is not stored yet.
///
/// Rows that already exist, paused ones included, are left untouched.
/// Returns the number of rows actually written.
pub fn insert_drafts(
    connection: &Connection,
    db_path: &Path,
    drafts: &[SubscriptionDraft],
) -> CoachResult<usize> {
    let created_at = now_timestamp();
    let mut inserted = 0_usize;
    for draft in drafts {
        let subscription_id = format!("sub_{}", Ulid::new());
        inserted += connection
            .execute(
                "INSERT INTO subscriptions (
                    subscription_id,
                    merchant,
                    merchant_key,
                    amount,
                    last_charge,
                    match_count,
                    active,
                    source,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)
                 ON CONFLICT(merchant_key) DO NOTHING",
                params![
                    &subscription_id,
                    &draft.merchant,
                    &draft.merchant_key,
                    draft.amount,
                    format_iso_date(&draft.last_charge),
                    draft.match_count,
                    SubscriptionSource::Detected.as_str(),
                    &created_at
                ],
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;
    }
    if inserted > 0 {
        info!(inserted, proposed = drafts.len(), "subscriptions synced");
    }
    Ok(inserted)
}

pub fn create_subscription(
    connection: &Connection,
    db_path: &Path,
    merchant: &str,
    merchant_key: &str,
    amount: f64,
    last_charge: Option<NaiveDate>,
) -> CoachResult<Subscription> {
    let subscription_id = format!("sub_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO subscriptions (
                subscription_id,
                merchant,
                merchant_key,
                amount,
                last_charge,
                match_count,
                active,
                source,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 1, ?6, ?7)",
            params![
                &subscription_id,
                merchant,
                merchant_key,
                amount,
                last_charge.as_ref().map(format_iso_date),
                SubscriptionSource::Manual.as_str(),
                now_timestamp()
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    info!(%subscription_id, merchant_key, amount, "subscription added");

    Ok(Subscription {
        id: subscription_id,
        merchant: merchant.to_string(),
        merchant_key: merchant_key.to_string(),
        amount,
        last_charge,
        match_count: 0,
        active: true,
    })
}

/// Returns `false` when no subscription has this id.
pub fn set_active(
    connection: &Connection,
    db_path: &Path,
    subscription_id: &str,
    active: bool,
) -> CoachResult<bool> {
    let changed = connection
        .execute(
            "UPDATE subscriptions SET active = ?2 WHERE subscription_id = ?1",
            params![subscription_id, active],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if changed > 0 {
        info!(subscription_id, active, "subscription status changed");
    }
    Ok(changed > 0)
}

/// Returns `false` when no subscription has this id.
pub fn delete_subscription(
    connection: &Connection,
    db_path: &Path,
    subscription_id: &str,
) -> CoachResult<bool> {
    let changed = connection
        .execute(
            "DELETE FROM subscriptions WHERE subscription_id = ?1",
            [subscription_id],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if changed > 0 {
        info!(subscription_id, "subscription deleted");
    }
    Ok(changed > 0)
}

pub fn find_by_merchant_key(
    connection: &Connection,
    db_path: &Path,
    merchant_key: &str,
) -> CoachResult<Option<Subscription>> {
    let sql = format!("{SELECT_COLUMNS} WHERE merchant_key = ?1 LIMIT 1");
    connection
        .query_row(&sql, [merchant_key], read_subscription)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

pub fn get_subscription(
    connection: &Connection,
    db_path: &Path,
    subscription_id: &str,
) -> CoachResult<Option<Subscription>> {
    let sql = format!("{SELECT_COLUMNS} WHERE subscription_id = ?1 LIMIT 1");
    connection
        .query_row(&sql, [subscription_id], read_subscription)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

pub fn list_subscriptions(connection: &Connection, db_path: &Path) -> CoachResult<Vec<Subscription>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY merchant_key ASC");
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows_iter = statement
        .query_map([], read_subscription)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(rows)
}

fn read_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let last_charge: Option<String> = row.get(4)?;
    Ok(Subscription {
        id: row.get(0)?,
        merchant: row.get(1)?,
        merchant_key: row.get(2)?,
        amount: row.get(3)?,
        last_charge: last_charge.as_deref().and_then(parse_transaction_date),
        match_count: row.get(5)?,
        active: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::NaiveDate;
    use rusqlite::Connection;

    use crate::engine::merge::SubscriptionDraft;
    use crate::store::migrations::run_pending;

    use super::{create_subscription, insert_drafts, list_subscriptions, set_active};

    fn draft(key: &str, amount: f64) -> SubscriptionDraft {
        SubscriptionDraft {
            merchant: key.to_string(),
            merchant_key: key.to_string(),
            amount,
            last_charge: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap_or(NaiveDate::MIN),
            match_count: 3,
        }
    }

    #[test]
    fn drafts_never_overwrite_existing_rows() {
        let db_path = Path::new(":memory:");
        let connection = Connection::open_in_memory();
        assert!(connection.is_ok());
        if let Ok(mut conn) = connection {
            assert!(run_pending(&mut conn).is_ok());
            let created = create_subscription(&conn, db_path, "Netflix", "Netflix", 17.99, None);
            assert!(created.is_ok());
            if let Ok(subscription) = created {
                assert_eq!(set_active(&conn, db_path, &subscription.id, false).ok(), Some(true));
            }

            let inserted = insert_drafts(
                &conn,
                db_path,
                &[draft("Netflix", 15.49), draft("Spotify", 9.99)],
            );
            assert_eq!(inserted.ok(), Some(1));

            let rows = list_subscriptions(&conn, db_path);
            assert!(rows.is_ok());
            if let Ok(rows) = rows {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].merchant_key, "Netflix");
                assert_eq!(rows[0].amount, 17.99);
                assert!(!rows[0].active);
                assert_eq!(rows[1].merchant_key, "Spotify");
                assert_eq!(rows[1].match_count, 3);
                assert!(rows[1].active);
            }
        }
    }
}
