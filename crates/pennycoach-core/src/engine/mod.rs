//! Pure detection and coaching logic. Nothing here touches the ledger.

pub mod date;
pub mod insights;
pub mod merge;
pub mod normalize;
pub mod periodicity;
pub mod policy;
pub mod recurring;
pub mod rules;
pub mod types;

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
