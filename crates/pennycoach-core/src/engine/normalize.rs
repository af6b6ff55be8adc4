use std::sync::OnceLock;

use regex::Regex;

pub const UNKNOWN_MERCHANT: &str = "Unknown";

// Hash marks take the store number that follows them (`#4821`).
fn store_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\s*\d*").expect("invalid store number regex"))
}

fn pos_terminal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bPOS\s*\d+").expect("invalid pos regex"))
}

fn noise_words_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:PAYMENT|AUTH|PENDING)\b").expect("invalid noise word regex")
    })
}

/// Canonical merchant identity for grouping, rules and duplicate checks.
///
/// Only the first character is upper-cased: `"MCDONALD'S #4821"` becomes
/// `"Mcdonald's"`, not `"McDonald's"`.
pub fn normalize_merchant(raw: &str) -> String {
    let mut current = collapse_whitespace(raw);
    loop {
        let stripped = collapse_whitespace(&strip_noise(&current));
        if stripped == current {
            break;
        }
        current = stripped;
    }

    if current.is_empty() {
        return UNKNOWN_MERCHANT.to_string();
    }
    capitalize_first(&current)
}

fn strip_noise(value: &str) -> String {
    let without_stars = value.replace('*', " ");
    let without_store = store_number_re().replace_all(&without_stars, " ");
    let without_pos = pos_terminal_re().replace_all(&without_store, " ");
    noise_words_re().replace_all(&without_pos, " ").into_owned()
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn capitalize_first(value: &str) -> String {
    let mut characters = value.chars();
    let Some(first) = characters.next() else {
        return String::new();
    };

    let mut upper = first.to_uppercase();
    // Multi-char expansions (`ß` -> `SS`) would not survive a second pass.
    let head = match (upper.next(), upper.next()) {
        (Some(single), None) => single.to_string(),
        _ => first.to_string(),
    };
    format!("{head}{}", characters.as_str().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{UNKNOWN_MERCHANT, normalize_merchant};

    #[test]
    fn empty_and_noise_only_inputs_map_to_unknown() {
        assert_eq!(normalize_merchant(""), UNKNOWN_MERCHANT);
        assert_eq!(normalize_merchant("   "), UNKNOWN_MERCHANT);
        assert_eq!(normalize_merchant("** PENDING #12"), UNKNOWN_MERCHANT);
    }

    #[test]
    fn store_numbers_and_spacing_do_not_split_merchants() {
        let upper = normalize_merchant("COSTCO WHSE #4821");
        let mixed = normalize_merchant("Costco Whse   #4821");
        assert_eq!(upper, mixed);
        assert_eq!(upper, "Costco whse");
    }

    #[test]
    fn only_first_character_is_capitalized() {
        assert_eq!(normalize_merchant("MCDONALD'S #4821"), "Mcdonald's");
        assert_eq!(normalize_merchant("trader joe's"), "Trader joe's");
    }

    #[test]
    fn pos_prefix_and_noise_words_are_removed() {
        assert_eq!(normalize_merchant("POS 0042 SHELL OIL"), "Shell oil");
        assert_eq!(normalize_merchant("pos1234 Shell Oil"), "Shell oil");
        assert_eq!(normalize_merchant("NETFLIX.COM PAYMENT AUTH"), "Netflix.com");
        assert_eq!(normalize_merchant("SQ *BLUE BOTTLE"), "Sq blue bottle");
    }

    #[test]
    fn noise_words_inside_other_words_are_kept() {
        assert_eq!(normalize_merchant("AUTHORITY PARKING"), "Authority parking");
        assert_eq!(normalize_merchant("POSTMATES"), "Postmates");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "COSTCO WHSE #4821",
            "  spotify   usa ",
            "POS #5 12 AMAZON",
            "AMZN*MKTP US*2K4",
            "PAYMENT THANK YOU",
            "ßtraße",
            "Netflix",
            "#",
        ];
        for sample in samples {
            let once = normalize_merchant(sample);
            assert_eq!(normalize_merchant(&once), once, "input: {sample:?}");
        }
    }
}
