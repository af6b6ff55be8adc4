#[path = "support/coach_testkit.rs"]
mod coach_testkit;

use std::path::Path;

use pennycoach_core::commands::subscriptions::{
    self, SubscriptionAddOptions, SubscriptionIdOptions, SubscriptionsViewOptions,
};
use serde_json::Value;

use coach_testkit::{import_csv, monthly_charges, payload, rows, temp_home_in_tmp};

const AS_OF: &str = "2026-03-31";

fn seed_ledger(home: &Path) {
    let mut body = "Date,Description,Amount\n".to_string();
    body.push_str(&monthly_charges(
        "SPOTIFY USA",
        9.99,
        &["2026-01-05", "2026-02-05", "2026-03-05"],
    ));
    body.push_str(&monthly_charges(
        "NETFLIX.COM",
        15.49,
        &["2026-01-12", "2026-02-12", "2026-03-12"],
    ));
    import_csv(home, &body);
}

fn subs(home: &Path, sync: bool) -> Value {
    payload(subscriptions::list(SubscriptionsViewOptions {
        as_of: Some(AS_OF.to_string()),
        sync,
        home_override: Some(home),
    }))
}

fn id_of(data: &Value, merchant: &str) -> String {
    rows(data)
        .iter()
        .find(|row| row["merchant"] == merchant)
        .and_then(|row| row["id"].as_str().map(str::to_string))
        .unwrap_or_default()
}

fn id_options<'a>(home: &'a Path, id: &str) -> SubscriptionIdOptions<'a> {
    SubscriptionIdOptions {
        id: id.to_string(),
        home_override: Some(home),
    }
}

#[test]
fn sync_persists_findings_once() {
    let temp = temp_home_in_tmp("pennycoach-subs-sync");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        seed_ledger(&home);

        let before = subs(&home, false);
        assert!(rows(&before).is_empty());
        assert_eq!(before["sync"], Value::Null);
        assert_eq!(before["monthly_total"], Value::from(0.0));

        let first = subs(&home, true);
        assert_eq!(first["sync"]["findings"], Value::from(2));
        assert_eq!(first["sync"]["proposed"], Value::from(2));
        assert_eq!(first["sync"]["inserted"], Value::from(2));
        assert_eq!(first["active_count"], Value::from(2));
        assert_eq!(first["monthly_total"], Value::from(25.48));

        let listed = rows(&first);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["merchant"], "Netflix.com");
        assert_eq!(listed[0]["matches"], Value::from(3));
        assert_eq!(listed[0]["last_charge"], "2026-03-12");
        assert_eq!(listed[1]["merchant"], "Spotify usa");
        assert!(listed[1]["id"].as_str().unwrap_or("").starts_with("sub_"));

        let second = subs(&home, true);
        assert_eq!(second["sync"]["proposed"], Value::from(0));
        assert_eq!(second["sync"]["inserted"], Value::from(0));
        assert_eq!(rows(&second).len(), 2);
    }
}

#[test]
fn paused_subscriptions_stay_paused_across_syncs() {
    let temp = temp_home_in_tmp("pennycoach-subs-pause");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        seed_ledger(&home);
        let synced = subs(&home, true);
        let spotify_id = id_of(&synced, "Spotify usa");
        assert!(!spotify_id.is_empty());

        let paused = payload(subscriptions::pause(id_options(&home, &spotify_id)));
        assert_eq!(paused["subscription"]["active"], Value::Bool(false));

        let resynced = subs(&home, true);
        assert_eq!(resynced["sync"]["proposed"], Value::from(1));
        assert_eq!(resynced["sync"]["inserted"], Value::from(0));
        assert_eq!(resynced["active_count"], Value::from(1));
        assert_eq!(resynced["monthly_total"], Value::from(15.49));
        let spotify = rows(&resynced)
            .into_iter()
            .find(|row| row["id"] == spotify_id.as_str());
        assert_eq!(spotify.map(|row| row["active"].clone()), Some(Value::Bool(false)));

        let resumed = payload(subscriptions::resume(id_options(&home, &spotify_id)));
        assert_eq!(resumed["subscription"]["active"], Value::Bool(true));
    }
}

#[test]
fn manual_entries_keep_their_amounts_and_reject_duplicates() {
    let temp = temp_home_in_tmp("pennycoach-subs-manual");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        seed_ledger(&home);
        let added = payload(subscriptions::add(SubscriptionAddOptions {
            merchant: "Spotify USA".to_string(),
            amount: 10.99,
            last_charge: Some("2026-03-05".to_string()),
            home_override: Some(&home),
        }));
        assert_eq!(added["subscription"]["amount"], Value::from(10.99));
        assert_eq!(added["subscription"]["last_charge"], "2026-03-05");

        let duplicate = subscriptions::add(SubscriptionAddOptions {
            merchant: "spotify   usa".to_string(),
            amount: 9.99,
            last_charge: None,
            home_override: Some(&home),
        });
        assert!(duplicate.is_err());
        if let Err(error) = duplicate {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("already tracked"));
        }

        let synced = subs(&home, true);
        assert_eq!(synced["sync"]["inserted"], Value::from(1));
        let spotify = rows(&synced)
            .into_iter()
            .find(|row| row["merchant"] == "Spotify USA");
        assert!(spotify.is_some());
        if let Some(row) = spotify {
            assert_eq!(row["amount"], Value::from(10.99));
            assert_eq!(row["matches"], Value::from(3));
        }

        let bad_date = subscriptions::add(SubscriptionAddOptions {
            merchant: "Hulu".to_string(),
            amount: 7.99,
            last_charge: Some("last week".to_string()),
            home_override: Some(&home),
        });
        assert!(bad_date.is_err());
    }
}

#[test]
fn delete_removes_the_row_and_missing_ids_are_not_found() {
    let temp = temp_home_in_tmp("pennycoach-subs-delete");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let added = payload(subscriptions::add(SubscriptionAddOptions {
            merchant: "Hulu".to_string(),
            amount: 7.99,
            last_charge: None,
            home_override: Some(&home),
        }));
        let hulu_id = added["subscription"]["id"].as_str().unwrap_or("").to_string();

        let deleted = payload(subscriptions::delete(id_options(&home, &hulu_id)));
        assert_eq!(deleted["deleted"], Value::Bool(true));
        assert!(rows(&subs(&home, false)).is_empty());

        let again = subscriptions::delete(id_options(&home, &hulu_id));
        assert!(again.is_err());
        if let Err(error) = again {
            assert_eq!(error.code, "not_found");
        }

        let missing = subscriptions::pause(id_options(&home, "sub_missing"));
        assert!(missing.is_err());
        if let Err(error) = missing {
            assert_eq!(error.code, "not_found");
            assert_eq!(error.data.map(|data| data["id"].clone()), Some(Value::from("sub_missing")));
        }
    }
}

#[test]
fn oversized_settings_lookback_fails_cleanly() {
    let temp = temp_home_in_tmp("pennycoach-subs-huge-lookback");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let written = std::fs::write(
            home.join("config.toml"),
            "lookback_days = 9223372036854775807\n",
        );
        assert!(written.is_ok());
        let result = subscriptions::list(SubscriptionsViewOptions {
            as_of: Some(AS_OF.to_string()),
            sync: true,
            home_override: Some(&home),
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_settings");
        }
    }
}
