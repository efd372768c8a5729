//! Thai-locale display formatting for numbers, money, volumes and dates.
//!
//! Everything here is pure. Rounding happens only at display time, so
//! aggregates keep full precision until they are rendered.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::{parse_calendar_date, parse_instant};

/// Rendered for missing or unparseable values.
pub const PLACEHOLDER: &str = "-";

const BUDDHIST_ERA_OFFSET: i32 = 543;

const THAI_MONTHS_SHORT: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.", "ธ.ค.",
];

const THAI_MONTHS_LONG: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Formats `value` with `,` thousands separators and exactly `decimals`
/// fractional digits, rounding half away from zero.
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
        None => (text, String::new()),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if decimals > 0 {
        let mut frac = frac_part;
        while frac.len() < decimals as usize {
            frac.push('0');
        }
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Locale-aware formatter carrying the few knobs the screens vary on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    currency_symbol: String,
    buddhist_era: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new("฿", true)
    }
}

impl Formatter {
    pub fn new(currency_symbol: impl Into<String>, buddhist_era: bool) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            buddhist_era,
        }
    }

    pub fn number(&self, value: Decimal, decimals: u32) -> String {
        format_number(value, decimals)
    }

    /// `฿1,234.50`, with the sign ahead of the symbol for negatives.
    pub fn currency(&self, value: Decimal) -> String {
        let body = format_number(value.abs(), 2);
        if value.is_sign_negative() && !value.is_zero() {
            format!("-{}{}", self.currency_symbol, body)
        } else {
            format!("{}{}", self.currency_symbol, body)
        }
    }

    pub fn liters(&self, value: Decimal) -> String {
        format!("{} ลิตร", format_number(value, 0))
    }

    fn year(&self, year: i32) -> i32 {
        if self.buddhist_era {
            year + BUDDHIST_ERA_OFFSET
        } else {
            year
        }
    }

    /// Short date such as `5 มี.ค. 2567`. Unparseable input renders as the
    /// placeholder.
    pub fn date(&self, raw: &str) -> String {
        match parse_calendar_date(raw) {
            Some(date) => format!(
                "{} {} {}",
                date.day(),
                THAI_MONTHS_SHORT[date.month0() as usize],
                self.year(date.year())
            ),
            None => PLACEHOLDER.to_string(),
        }
    }

    /// Long date such as `5 มีนาคม 2567`.
    pub fn date_long(&self, raw: &str) -> String {
        match parse_calendar_date(raw) {
            Some(date) => format!(
                "{} {} {}",
                date.day(),
                THAI_MONTHS_LONG[date.month0() as usize],
                self.year(date.year())
            ),
            None => PLACEHOLDER.to_string(),
        }
    }

    /// Month heading used by monthly reports, e.g. `มีนาคม 2567`.
    pub fn month(&self, year: i32, month: u32) -> String {
        match month.checked_sub(1).and_then(|idx| THAI_MONTHS_LONG.get(idx as usize)) {
            Some(name) => format!("{} {}", name, self.year(year)),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn timestamp(&self, instant: &DateTime<Utc>) -> String {
        format!(
            "{} {} {} {:02}:{:02}",
            instant.day(),
            THAI_MONTHS_SHORT[instant.month0() as usize],
            self.year(instant.year()),
            instant.hour(),
            instant.minute()
        )
    }

    pub fn timestamp_str(&self, raw: &str) -> String {
        parse_instant(raw)
            .map(|instant| self.timestamp(&instant))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), 2, "0.00")]
    #[case(dec!(999), 0, "999")]
    #[case(dec!(1000), 0, "1,000")]
    #[case(dec!(1234567.891), 2, "1,234,567.89")]
    #[case(dec!(2.005), 2, "2.01")]
    #[case(dec!(-1500.5), 1, "-1,500.5")]
    #[case(dec!(12.3), 3, "12.300")]
    #[case(dec!(-0.001), 2, "0.00")]
    fn formats_numbers(#[case] value: Decimal, #[case] decimals: u32, #[case] expected: &str) {
        assert_eq!(format_number(value, decimals), expected);
    }

    #[test]
    fn formats_currency_and_volume() {
        let fmt = Formatter::default();
        assert_eq!(fmt.currency(dec!(5000)), "฿5,000.00");
        assert_eq!(fmt.currency(dec!(-12.5)), "-฿12.50");
        assert_eq!(fmt.liters(dec!(1200)), "1,200 ลิตร");
    }

    #[test]
    fn formats_dates_in_buddhist_era() {
        let fmt = Formatter::default();
        assert_eq!(fmt.date("2024-03-05"), "5 มี.ค. 2567");
        assert_eq!(fmt.date_long("2024-12-31"), "31 ธันวาคม 2567");
        assert_eq!(fmt.month(2024, 1), "มกราคม 2567");
        assert_eq!(fmt.date("garbage"), PLACEHOLDER);
        assert_eq!(fmt.month(2024, 13), PLACEHOLDER);
    }

    #[test]
    fn gregorian_years_when_disabled() {
        let fmt = Formatter::new("THB ", false);
        assert_eq!(fmt.date("2024-03-05"), "5 มี.ค. 2024");
        let instant = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(fmt.timestamp(&instant), "5 มี.ค. 2024 14:07");
        assert_eq!(fmt.currency(dec!(1)), "THB 1.00");
    }
}
