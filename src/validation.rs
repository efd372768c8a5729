//! Draft-to-domain parsing.
//!
//! Form drafts hold raw strings. A [`DraftParser`] starts from the draft's
//! declarative `validator` rules and accumulates per-field parse errors on
//! top, so one submit reports every problem at once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::parse_calendar_date;

/// Largest magnitude accepted for any amount, quantity or price. Products and
/// running balances of accepted values stay well inside `Decimal`'s range.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000_000;

/// Custom `validator` rule: the field must contain something other than
/// whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(field_error("required", "This field is required"))
    } else {
        Ok(())
    }
}

pub fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Builds a single-field `ValidationErrors`.
pub fn single_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, field_error(code, message));
    errors
}

/// Accumulates parse failures for one draft.
///
/// Every parse method returns a usable value even on failure (the type's
/// default) so callers can keep going and collect all errors; the value is
/// never observed because [`DraftParser::finish`] fails first.
#[derive(Debug)]
pub struct DraftParser {
    errors: ValidationErrors,
}

impl DraftParser {
    pub fn new<D: Validate>(draft: &D) -> Self {
        Self {
            errors: draft.validate().err().unwrap_or_else(ValidationErrors::new),
        }
    }

    fn has_error(&self, field: &'static str) -> bool {
        self.errors.field_errors().contains_key(field)
    }

    pub fn reject(
        &mut self,
        field: &'static str,
        code: &'static str,
        message: impl Into<Cow<'static, str>>,
    ) {
        self.errors.add(field, field_error(code, message));
    }

    /// Optional free text: trimmed, `None` when blank.
    pub fn optional_text(&mut self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn text(&mut self, field: &'static str, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() && !self.has_error(field) {
            self.reject(field, "required", "This field is required");
        }
        trimmed.to_string()
    }

    /// Finite decimal no larger than [`MAX_MAGNITUDE`]. Blank input is left
    /// to the draft's own `required` rule so it is reported once.
    pub fn decimal(&mut self, field: &'static str, raw: &str) -> Decimal {
        let trimmed = raw.trim().replace(',', "");
        if trimmed.is_empty() {
            if !self.has_error(field) {
                self.reject(field, "required", "This field is required");
            }
            return Decimal::ZERO;
        }
        match Decimal::from_str(&trimmed) {
            Ok(value) if value.abs() > Decimal::from(MAX_MAGNITUDE) => {
                self.reject(
                    field,
                    "out_of_range",
                    format!("Must not exceed {}", MAX_MAGNITUDE),
                );
                Decimal::ZERO
            }
            Ok(value) => value,
            Err(_) => {
                self.reject(field, "not_a_number", "Must be a number");
                Decimal::ZERO
            }
        }
    }

    /// Decimal strictly greater than zero.
    pub fn positive(&mut self, field: &'static str, raw: &str) -> Decimal {
        let before = self.has_error(field);
        let value = self.decimal(field, raw);
        if !before && !self.has_error(field) && value <= Decimal::ZERO {
            self.reject(field, "not_positive", "Must be greater than zero");
        }
        value
    }

    /// Decimal greater than or equal to `minimum`.
    pub fn at_least(&mut self, field: &'static str, raw: &str, minimum: Decimal) -> Decimal {
        let before = self.has_error(field);
        let value = self.decimal(field, raw);
        if !before && !self.has_error(field) && value < minimum {
            self.reject(
                field,
                "below_minimum",
                format!("Must be at least {}", minimum.normalize()),
            );
        }
        value
    }

    /// Whole number within `min..=max`.
    pub fn integer_in(&mut self, field: &'static str, raw: &str, min: u32, max: u32) -> u32 {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if !self.has_error(field) {
                self.reject(field, "required", "This field is required");
            }
            return 0;
        }
        match trimmed.parse::<u32>() {
            Ok(value) if (min..=max).contains(&value) => value,
            Ok(_) => {
                self.reject(
                    field,
                    "out_of_range",
                    format!("Must be between {} and {}", min, max),
                );
                0
            }
            Err(_) => {
                self.reject(field, "not_an_integer", "Must be a whole number");
                0
            }
        }
    }

    /// Calendar date, normalized to `YYYY-MM-DD`.
    pub fn date(&mut self, field: &'static str, raw: &str) -> NaiveDate {
        if raw.trim().is_empty() {
            if !self.has_error(field) {
                self.reject(field, "required", "This field is required");
            }
            return NaiveDate::default();
        }
        match parse_calendar_date(raw) {
            Some(date) => date,
            None => {
                self.reject(field, "invalid_date", "Must be a date (YYYY-MM-DD)");
                NaiveDate::default()
            }
        }
    }

    /// Any `FromStr` value such as a closed enum tag.
    pub fn parse<T>(&mut self, field: &'static str, raw: &str) -> T
    where
        T: FromStr + Default,
    {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if !self.has_error(field) {
                self.reject(field, "required", "This field is required");
            }
            return T::default();
        }
        match trimmed.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                self.reject(field, "invalid_choice", format!("Unknown value '{}'", trimmed));
                T::default()
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use validator::Validate;

    #[derive(Debug, Default, Validate)]
    struct AmountDraft {
        #[validate(custom = "validate_not_blank")]
        amount: String,
        note: String,
    }

    #[test]
    fn blank_required_field_reported_once() {
        let draft = AmountDraft {
            amount: "   ".into(),
            note: String::new(),
        };
        let mut parser = DraftParser::new(&draft);
        let _ = parser.positive("amount", &draft.amount);
        let errors = parser.finish().unwrap_err();
        assert_eq!(errors.field_errors()["amount"].len(), 1);
    }

    #[test]
    fn parses_grouped_numbers() {
        let draft = AmountDraft {
            amount: "1,250.50".into(),
            note: " lunch ".into(),
        };
        let mut parser = DraftParser::new(&draft);
        assert_eq!(parser.positive("amount", &draft.amount), dec!(1250.50));
        assert_eq!(parser.optional_text(&draft.note), Some("lunch".into()));
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn rejects_non_numeric_and_non_positive() {
        let draft = AmountDraft::default();
        let mut parser = DraftParser::new(&draft);
        parser.decimal("qty", "12abc");
        parser.positive("price", "0");
        parser.at_least("deposit", "99.99", dec!(100));
        parser.integer_in("installments", "0", 1, 60);
        let errors = parser.finish().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["qty"][0].code, "not_a_number");
        assert_eq!(fields["price"][0].code, "not_positive");
        assert_eq!(fields["deposit"][0].code, "below_minimum");
        assert_eq!(fields["installments"][0].code, "out_of_range");
    }

    #[test]
    fn rejects_amounts_beyond_the_cap() {
        let draft = AmountDraft::default();
        let mut parser = DraftParser::new(&draft);
        assert_eq!(parser.positive("amount", "1000000000000"), dec!(1000000000000));
        parser.positive("qty", "70000000000000000000000000000");
        parser.decimal("price", "-1000000000000.01");
        let errors = parser.finish().unwrap_err();
        let fields = errors.field_errors();
        assert!(!fields.contains_key("amount"));
        assert_eq!(fields["qty"].len(), 1);
        assert_eq!(fields["qty"][0].code, "out_of_range");
        assert_eq!(fields["price"][0].code, "out_of_range");
    }

    #[test]
    fn single_error_names_one_field() {
        let errors = single_error("amount", "out_of_range", "Too large");
        assert_eq!(errors.field_errors().len(), 1);
        assert_eq!(errors.field_errors()["amount"][0].code, "out_of_range");
    }

    #[test]
    fn rejects_bad_dates() {
        let draft = AmountDraft {
            amount: "1".into(),
            note: String::new(),
        };
        let mut parser = DraftParser::new(&draft);
        parser.date("date", "31/12/2024");
        assert!(!parser.is_valid());
    }
}
