//! Display formatting for IPO values.
//!
//! Every formatter returns the configured placeholder for a missing,
//! non-finite or unparseable value, so feed junk such as `NaN`, `inf` or
//! `undefined` never reaches the output.

use chrono::{DateTime, Utc};
use ipo_core::DisplayConfig;
use ipo_ingestion::parse_date_ms;

/// Formats record values according to a [`DisplayConfig`].
#[derive(Debug, Clone)]
pub struct ValueFormatter {
    placeholder: String,
    currency_symbol: String,
}

impl ValueFormatter {
    /// Create a formatter from display settings.
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    /// Currency amount with Indian digit grouping, e.g. `₹12,34,567.50`.
    ///
    /// Whole amounts are shown without decimals.
    pub fn currency(&self, value: Option<f64>) -> String {
        let Some(v) = finite(value) else {
            return self.placeholder.clone();
        };
        let sign = if v < 0.0 { "-" } else { "" };
        format!("{}{}{}", sign, self.currency_symbol, group_amount(v.abs()))
    }

    /// Percentage with two decimals, e.g. `2.04%`.
    pub fn percent(&self, value: Option<f64>) -> String {
        match finite(value) {
            Some(v) => format!("{:.2}%", v),
            None => self.placeholder.clone(),
        }
    }

    /// Whole count with Indian digit grouping, e.g. `45,71,882`.
    pub fn count(&self, value: Option<f64>) -> String {
        let Some(v) = finite(value) else {
            return self.placeholder.clone();
        };
        let rounded = v.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{}{}", sign, group_indian(&format!("{:.0}", rounded.abs())))
    }

    /// Date as `DD Mon YYYY`; the placeholder when empty or unparseable.
    pub fn date(&self, value: &str) -> String {
        parse_date_ms(value)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.format("%d %b %Y").to_string())
            .unwrap_or_else(|| self.placeholder.clone())
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Group a non-negative amount, keeping two decimals only when needed.
fn group_amount(v: f64) -> String {
    let text = format!("{:.2}", v);
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let grouped = group_indian(whole);
    if frac == "00" {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Insert separators in the Indian style: the last three digits, then pairs.
///
/// `"36353276"` becomes `"3,63,53,276"`.
fn group_indian(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    if chars.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = chars.split_at(chars.len() - 3);
    let mut out = String::with_capacity(digits.len() + chars.len() / 2);
    for (i, c) in head.iter().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out.push(',');
    out.extend(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> ValueFormatter {
        ValueFormatter::default()
    }

    #[test]
    fn test_group_indian() {
        assert_eq!(group_indian("7"), "7");
        assert_eq!(group_indian("999"), "999");
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("100000"), "1,00,000");
        assert_eq!(group_indian("4571882"), "45,71,882");
        assert_eq!(group_indian("36353276"), "3,63,53,276");
    }

    #[test]
    fn test_group_indian_multibyte() {
        assert_eq!(group_indian("₹1234"), "₹1,234");
        assert_eq!(group_indian("१२३४५"), "१२,३४५");
    }

    #[test]
    fn test_currency() {
        assert_eq!(fmt().currency(Some(120.0)), "₹120");
        assert_eq!(fmt().currency(Some(1234567.5)), "₹12,34,567.50");
        assert_eq!(fmt().currency(Some(-15.0)), "-₹15");
        assert_eq!(fmt().currency(Some(0.0)), "₹0");
    }

    #[test]
    fn test_currency_symbol_from_config() {
        let config = DisplayConfig {
            currency_symbol: "Rs ".to_string(),
            ..DisplayConfig::default()
        };
        assert_eq!(ValueFormatter::new(&config).currency(Some(1500.0)), "Rs 1,500");
    }

    #[test]
    fn test_percent() {
        assert_eq!(fmt().percent(Some(2.04)), "2.04%");
        assert_eq!(fmt().percent(Some(-3.5)), "-3.50%");
    }

    #[test]
    fn test_count() {
        assert_eq!(fmt().count(Some(4571882.0)), "45,71,882");
        assert_eq!(fmt().count(Some(999.6)), "1,000");
    }

    #[test]
    fn test_non_finite_uses_placeholder() {
        for value in [None, Some(f64::NAN), Some(f64::INFINITY), Some(f64::NEG_INFINITY)] {
            assert_eq!(fmt().currency(value), "N/A");
            assert_eq!(fmt().percent(value), "N/A");
            assert_eq!(fmt().count(value), "N/A");
        }
    }

    #[test]
    fn test_custom_placeholder() {
        let config = DisplayConfig {
            placeholder: "-".to_string(),
            ..DisplayConfig::default()
        };
        let formatter = ValueFormatter::new(&config);
        assert_eq!(formatter.currency(Some(f64::NAN)), "-");
        assert_eq!(formatter.date(""), "-");
    }

    #[test]
    fn test_date() {
        assert_eq!(fmt().date("2024-01-05"), "05 Jan 2024");
        assert_eq!(fmt().date("2024-01-05T10:00:00Z"), "05 Jan 2024");
        assert_eq!(fmt().date("   "), "N/A");
    }

    #[test]
    fn test_unparseable_date_uses_placeholder() {
        for junk in ["sometime soon", "NaN", "Infinity", "undefined", "Invalid Date", "null"] {
            assert_eq!(fmt().date(junk), "N/A", "{}", junk);
        }
    }
}
