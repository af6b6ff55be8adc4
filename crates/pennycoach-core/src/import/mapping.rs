use chrono::NaiveDate;

use crate::engine::date::parse_statement_date;
use crate::engine::round_to;
use crate::error::MalformedInput;
use crate::import::parse::RawRow;

const DATE_HEADERS: [&str; 4] = ["date", "transaction date", "posted", "posted_at"];
const MERCHANT_HEADERS: [&str; 5] = ["merchant", "description", "details", "name", "payee"];
const AMOUNT_HEADERS: [&str; 2] = ["amount", "amt"];
const DEBIT_HEADERS: [&str; 2] = ["debit", "withdrawal"];
const CREDIT_HEADERS: [&str; 2] = ["credit", "deposit"];
const CATEGORY_HEADERS: [&str; 1] = ["category"];

/// How the file's signed amounts map onto the ledger, where spend is positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmountSign {
    /// Bank statement style: negative means money out.
    #[default]
    Bank,
    /// Already in ledger style: positive means money out.
    OutflowPositive,
}

impl AmountSign {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::OutflowPositive => "outflow_positive",
        }
    }

    fn to_ledger(self, signed: f64) -> f64 {
        match self {
            Self::Bank => -signed,
            Self::OutflowPositive => signed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub posted_at: NaiveDate,
    /// `true` when the row had no readable date and `today` was used.
    pub date_defaulted: bool,
    pub merchant_raw: String,
    /// Ledger convention: positive = outflow.
    pub amount: f64,
    pub category: Option<String>,
}

pub fn map_row(row: &RawRow, today: NaiveDate, sign: AmountSign) -> Result<MappedRow, MalformedInput> {
    let merchant_raw = row
        .first_of(&MERCHANT_HEADERS)
        .ok_or(MalformedInput::MissingMerchant)?
        .to_string();

    let signed = read_signed_amount(row, sign)?;

    let parsed_date = row
        .first_of(&DATE_HEADERS)
        .and_then(parse_statement_date);

    Ok(MappedRow {
        posted_at: parsed_date.unwrap_or(today),
        date_defaulted: parsed_date.is_none(),
        merchant_raw,
        amount: round_to(signed, 2),
        category: row.first_of(&CATEGORY_HEADERS).map(str::to_string),
    })
}

fn read_signed_amount(row: &RawRow, sign: AmountSign) -> Result<f64, MalformedInput> {
    if let Some(value) = row.first_of(&AMOUNT_HEADERS) {
        return parse_amount(value).map(|amount| sign.to_ledger(amount));
    }

    // Split columns carry magnitudes; the column says which way money moved.
    if let Some(value) = row.first_of(&DEBIT_HEADERS) {
        return parse_amount(value).map(f64::abs);
    }
    if let Some(value) = row.first_of(&CREDIT_HEADERS) {
        return parse_amount(value).map(|amount| -amount.abs());
    }

    Err(MalformedInput::MissingAmount)
}

/// Accepts `$1,234.56`, `-42.10`, `USD 9.99` and similar; only `-`, digits
/// and `.` are kept.
pub fn parse_amount(value: &str) -> Result<f64, MalformedInput> {
    let cleaned = value
        .chars()
        .filter(|character| character.is_ascii_digit() || *character == '-' || *character == '.')
        .collect::<String>();
    let negative_parens = value.trim().starts_with('(') && value.trim().ends_with(')');

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => {
            if negative_parens && amount > 0.0 {
                Ok(-amount)
            } else {
                Ok(amount)
            }
        }
        _ => Err(MalformedInput::InvalidAmount(value.trim().to_string())),
    }
}
