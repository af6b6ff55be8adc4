use std::io;

use serde_json::Value;

use super::format::{
    self, Column, money, plural, value_bool, value_f64, value_i64, value_rows, value_str,
};

const TRANSACTION_COLUMNS: [Column<'static>; 6] = [
    Column::left("ID"),
    Column::left("Date"),
    Column::left("Merchant"),
    Column::left("Category"),
    Column::right("Amount"),
    Column::left("Sub"),
];

pub fn render_import(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .filter(|value| value.is_object())
        .ok_or_else(|| io::Error::other("import output requires summary"))?;
    let dry_run = value_bool(data, "dry_run");

    let mut lines = vec![
        if dry_run {
            "Dry run finished. No rows were written.".to_string()
        } else {
            "Import finished.".to_string()
        },
        String::new(),
        "Summary:".to_string(),
    ];

    let source = match value_str(data, "path") {
        "" => "stdin".to_string(),
        path => path.to_string(),
    };
    let mut entries = vec![
        ("Source:", source),
        ("Sign convention:", value_str(data, "sign_convention").to_string()),
        ("Rows read:", value_i64(summary, "rows_read").to_string()),
    ];
    if !dry_run {
        entries.push(("Inserted:", value_i64(summary, "inserted").to_string()));
    }
    entries.push(("Skipped:", value_i64(summary, "skipped").to_string()));
    entries.push(("Dated today:", value_i64(summary, "defaulted_dates").to_string()));
    entries.push((
        "Categorized by rule:",
        value_i64(summary, "categorized_by_rule").to_string(),
    ));
    lines.extend(format::key_value_rows(&entries, 2));

    let issues = value_rows(data, "issues");
    if !issues.is_empty() {
        lines.push(String::new());
        lines.push("Skipped rows:".to_string());
        let rows = issues
            .iter()
            .map(|issue| {
                vec![
                    value_i64(issue, "row").to_string(),
                    value_str(issue, "code").to_string(),
                    value_str(issue, "message").to_string(),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &[Column::right("Row"), Column::left("Code"), Column::left("Reason")],
            &rows,
            format::terminal_width(),
            "Issue",
        ));
    }

    let preview = value_rows(data, "preview");
    if !preview.is_empty() {
        lines.push(String::new());
        lines.push(if dry_run {
            "Preview:".to_string()
        } else {
            "First rows written:".to_string()
        });
        let rows = preview.iter().map(preview_cells).collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &[
                Column::left("Date"),
                Column::left("Merchant"),
                Column::left("Category"),
                Column::right("Amount"),
            ],
            &rows,
            format::terminal_width(),
            "Row",
        ));
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if dry_run {
        lines.push("  1. Rerun without --dry-run to write these rows.".to_string());
        lines.push(
            "  2. Pass --outflow-positive if spending shows up as negative above.".to_string(),
        );
    } else {
        lines.push("  1. Run `pennycoach recurring` to find repeating charges.".to_string());
        lines.push("  2. Run `pennycoach insights` to check budget pacing.".to_string());
    }

    Ok(lines.join("\n"))
}

pub fn render_transaction(command: &str, data: &Value) -> io::Result<String> {
    let transaction = data
        .get("transaction")
        .ok_or_else(|| io::Error::other("transaction output requires transaction"))?;
    let heading = if command == "tx edit" {
        "Transaction updated."
    } else {
        "Transaction added."
    };

    let mut lines = vec![heading.to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("ID:", value_str(transaction, "id").to_string()),
            ("Date:", value_str(transaction, "posted_at").to_string()),
            ("Merchant:", value_str(transaction, "merchant_raw").to_string()),
            ("Merchant key:", value_str(transaction, "merchant_key").to_string()),
            ("Category:", value_str(transaction, "category_id").to_string()),
            ("Amount:", money(value_f64(transaction, "amount"))),
            ("Subscription:", yes_no(value_bool(transaction, "is_subscription"))),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_transaction_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("transaction list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No transactions yet.",
            "",
            "Add some:",
            "  pennycoach import --dry-run <path>",
            "  pennycoach tx add --date <YYYY-MM-DD> --merchant <text> --amount <value>",
        ]
        .join("\n"));
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "id").to_string(),
                value_str(row, "posted_at").to_string(),
                value_str(row, "merchant_key").to_string(),
                value_str(row, "category_id").to_string(),
                money(value_f64(row, "amount")),
                yes_no(value_bool(row, "is_subscription")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![
        format!("{} (newest first).", plural(rows.len(), "transaction", "transactions")),
        String::new(),
    ];
    lines.extend(format::render_table_or_blocks(
        &TRANSACTION_COLUMNS,
        &table_rows,
        format::terminal_width(),
        "Transaction",
    ));
    Ok(lines.join("\n"))
}

pub fn render_deleted(entity: &str, data: &Value) -> String {
    format!("Deleted {entity} {}.", value_str(data, "id"))
}

pub fn render_rule_saved(data: &Value) -> io::Result<String> {
    let rule = data
        .get("rule")
        .ok_or_else(|| io::Error::other("rule output requires rule"))?;
    let heading = if value_bool(data, "replaced") {
        "Rule updated."
    } else {
        "Rule saved."
    };

    let mut lines = vec![heading.to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Merchant key:", value_str(rule, "merchant_key").to_string()),
            ("Category:", value_str(rule, "category_id").to_string()),
            ("Subscription:", yes_no(value_bool(rule, "is_subscription"))),
            ("Recategorized:", value_i64(data, "recategorized").to_string()),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("New imports from this merchant use the rule.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_rule_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("rule list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No rules saved yet.",
            "",
            "Save one with `pennycoach rule set <merchant> <category>`.",
        ]
        .join("\n"));
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "merchant_key").to_string(),
                value_str(row, "category_id").to_string(),
                yes_no(value_bool(row, "is_subscription")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!("{}.", plural(rows.len(), "rule", "rules")), String::new()];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Merchant key"),
            Column::left("Category"),
            Column::left("Subscription"),
        ],
        &table_rows,
        format::terminal_width(),
        "Rule",
    ));
    Ok(lines.join("\n"))
}

pub fn render_budget_saved(data: &Value) -> io::Result<String> {
    let budget = data
        .get("budget")
        .ok_or_else(|| io::Error::other("budget output requires budget"))?;
    Ok(format!(
        "Budget saved: {} {} for {}.",
        value_str(budget, "category_id"),
        money(value_f64(budget, "limit")),
        value_str(budget, "month"),
    ))
}

pub fn render_budget_deleted(data: &Value) -> String {
    format!(
        "Deleted the {} budget for {}.",
        value_str(data, "category_id"),
        value_str(data, "month")
    )
}

pub fn render_budget_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("budget list output requires rows"))?;
    let month = value_str(data, "month");

    if rows.is_empty() {
        return Ok(format!(
            "No budgets set for {month}.\n\nSet one with `pennycoach budget set <category> <limit>`."
        ));
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "category_id").to_string(),
                money(value_f64(row, "limit")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!("Budgets for {month}:"), String::new()];
    lines.extend(format::render_table_or_blocks(
        &[Column::left("Category"), Column::right("Limit")],
        &table_rows,
        format::terminal_width(),
        "Budget",
    ));
    lines.push(String::new());
    lines.push(format!("  Total:  {}", money(value_f64(data, "total_limit"))));
    Ok(lines.join("\n"))
}

fn preview_cells(row: &Value) -> Vec<String> {
    vec![
        value_str(row, "posted_at").to_string(),
        value_str(row, "merchant_key").to_string(),
        value_str(row, "category_id").to_string(),
        money(value_f64(row, "amount")),
    ]
}

fn yes_no(value: bool) -> String {
    let label = if value { "yes" } else { "no" };
    label.to_string()
}
