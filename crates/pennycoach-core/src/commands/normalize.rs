use crate::CoachResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::NormalizeData;
use crate::engine::normalize::normalize_merchant;

/// Shows the merchant key a raw description maps to. Never touches the ledger.
pub fn run(raw: &str) -> CoachResult<SuccessEnvelope> {
    let data = NormalizeData {
        raw: raw.to_string(),
        merchant_key: normalize_merchant(raw),
    };
    success("normalize", data)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn reports_raw_and_key() {
        let envelope = run("MCDONALD'S #4821");
        assert!(envelope.is_ok());
        if let Ok(value) = envelope {
            assert_eq!(value.command, "normalize");
            assert_eq!(value.data["raw"], "MCDONALD'S #4821");
            assert_eq!(value.data["merchant_key"], "Mcdonald's");
        }
    }
}
