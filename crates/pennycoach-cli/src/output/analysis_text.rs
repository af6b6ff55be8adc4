use std::io;

use serde_json::Value;

use super::format::{self, Column, money, plural, value_bool, value_f64, value_i64, value_str};

pub fn render_recurring(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("recurring output requires rows"))?;
    let window = format!(
        "from {} to {}",
        value_str(data, "window_start"),
        value_str(data, "as_of")
    );

    if rows.is_empty() {
        return Ok([
            format!("No recurring charges found {window}."),
            String::new(),
            "A merchant needs charges roughly a month apart to count.".to_string(),
            "Import more history, or widen the window with --lookback-days.".to_string(),
        ]
        .join("\n"));
    }

    let total = value_i64(data, "total_findings");
    let mut heading = format!(
        "{} {window}.",
        plural(total.max(0) as usize, "recurring charge", "recurring charges")
    );
    if (rows.len() as i64) < total {
        heading = format!("{heading} Showing the top {}.", rows.len());
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            let cadence = if value_bool(row, "is_monthly") {
                "monthly"
            } else {
                "irregular"
            };
            vec![
                value_str(row, "merchant_key").to_string(),
                value_i64(row, "occurrence_count").to_string(),
                money(value_f64(row, "average_amount")),
                value_str(row, "last_charge_date").to_string(),
                cadence.to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![heading, String::new()];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Merchant"),
            Column::right("Charges"),
            Column::right("Average"),
            Column::left("Last Charge"),
            Column::left("Cadence"),
        ],
        &table_rows,
        format::terminal_width(),
        "Pattern",
    ));
    lines.push(String::new());
    lines.push("Run `pennycoach subs --sync` to start tracking these.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_subscriptions(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("subscriptions output requires rows"))?;

    let mut lines = Vec::new();
    if let Some(sync) = data.get("sync") {
        lines.push(format!(
            "Sync saved {} from {}.",
            plural(
                value_i64(sync, "inserted").max(0) as usize,
                "new subscription",
                "new subscriptions"
            ),
            plural(
                value_i64(sync, "findings").max(0) as usize,
                "recurring finding",
                "recurring findings"
            ),
        ));
        lines.push(String::new());
    }
    if let Some(sync_error) = data.get("sync_error") {
        lines.push(format!(
            "Sync could not save changes ({}): {}",
            value_str(sync_error, "code"),
            value_str(sync_error, "message")
        ));
        lines.push("The list below still reflects your latest transactions.".to_string());
        lines.push(String::new());
    }

    if rows.is_empty() {
        lines.push("No subscriptions tracked or detected yet.".to_string());
        lines.push(String::new());
        lines.push("Import a few months of history, then run `pennycoach subs --sync`.".to_string());
        return Ok(lines.join("\n"));
    }

    let table_rows = rows.iter().map(subscription_cells).collect::<Vec<Vec<String>>>();
    lines.push(format!(
        "Subscriptions as of {}:",
        value_str(data, "as_of")
    ));
    lines.push(String::new());
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("ID"),
            Column::left("Merchant"),
            Column::right("Amount"),
            Column::left("Last Charge"),
            Column::right("Matches"),
            Column::left("Status"),
        ],
        &table_rows,
        format::terminal_width(),
        "Subscription",
    ));
    lines.push(String::new());
    lines.push(format!(
        "  Monthly total:  {} across {}",
        money(value_f64(data, "monthly_total")),
        plural(
            value_i64(data, "active_count").max(0) as usize,
            "active subscription",
            "active subscriptions"
        )
    ));
    Ok(lines.join("\n"))
}

pub fn render_subscription(command: &str, data: &Value) -> io::Result<String> {
    let subscription = data
        .get("subscription")
        .ok_or_else(|| io::Error::other("subscription output requires subscription"))?;
    let heading = match command {
        "subs pause" => "Subscription paused.",
        "subs resume" => "Subscription resumed.",
        _ => "Subscription added.",
    };

    let mut lines = vec![heading.to_string(), String::new()];
    let cells = subscription_cells(subscription);
    lines.extend(format::key_value_rows(
        &[
            ("ID:", cells[0].clone()),
            ("Merchant:", cells[1].clone()),
            ("Amount:", cells[2].clone()),
            ("Last charge:", cells[3].clone()),
            ("Status:", cells[5].clone()),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_summary(data: &Value) -> String {
    let remaining = value_f64(data, "remaining");
    let remaining_label = if remaining < 0.0 { "Over budget:" } else { "Left to spend:" };
    let mut lines = vec![format!("Summary for {}:", value_str(data, "month")), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Spent:", money(value_f64(data, "spent"))),
            ("Planned:", money(value_f64(data, "planned"))),
            (remaining_label, money(remaining.abs())),
            (
                "Active subscriptions:",
                value_i64(data, "active_subscriptions").to_string(),
            ),
        ],
        2,
    ));
    lines.join("\n")
}

pub fn render_insights(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("insights output requires rows"))?;

    let mut lines = vec![
        format!(
            "Insights for {} (day {} of {}):",
            value_str(data, "month"),
            value_i64(data, "day_of_month"),
            value_i64(data, "days_in_month")
        ),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Spent so far:", money(value_f64(data, "total_spent"))),
            ("Budgeted:", money(value_f64(data, "total_budget"))),
        ],
        2,
    ));
    lines.push(String::new());

    if rows.is_empty() {
        lines.push("Nothing to flag right now.".to_string());
        if value_f64(data, "total_budget") <= 0.0 {
            lines.push(
                "Set a budget with `pennycoach budget set <category> <limit>` to get pacing tips."
                    .to_string(),
            );
        }
        return Ok(lines.join("\n"));
    }

    for (index, row) in rows.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, value_str(row, "title")));
        lines.push(format!("     {}", value_str(row, "detail")));
    }
    Ok(lines.join("\n"))
}

pub fn render_normalize(data: &Value) -> String {
    format!(
        "{}  ->  {}",
        value_str(data, "raw"),
        value_str(data, "merchant_key")
    )
}

fn subscription_cells(row: &Value) -> Vec<String> {
    let last_charge = match value_str(row, "last_charge") {
        "" => "-".to_string(),
        date => date.to_string(),
    };
    let status = if value_bool(row, "active") {
        "active"
    } else {
        "paused"
    };
    vec![
        value_str(row, "id").to_string(),
        value_str(row, "merchant").to_string(),
        money(value_f64(row, "amount")),
        last_charge,
        value_i64(row, "matches").to_string(),
        status.to_string(),
    ]
}
