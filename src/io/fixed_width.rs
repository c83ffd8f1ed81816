//! Fixed-width legacy record decoding
//!
//! Every line of the legacy export is exactly 95 bytes with fields at fixed
//! offsets and no delimiters:
//!
//! ```text
//! [0,10)  UserID        [55,65) OrderID       [75,87) ProductValue
//! [10,55) UserName      [65,75) ProductID     [87,95) BuyDate (YYYYMMDD)
//! ```
//!
//! Decoding is pure. All field checks run independently so a rejected line
//! reports every failing field at once, in column order.

use crate::types::{FieldError, Legacy, LegacyRecord, RecordError};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::ops::Range;
use std::str::FromStr;

/// Exact byte length of a legacy line
pub const RECORD_SIZE: usize = 95;

const USER_ID: Range<usize> = 0..10;
const USER_NAME: Range<usize> = 10..55;
const ORDER_ID: Range<usize> = 55..65;
const PRODUCT_ID: Range<usize> = 65..75;
const PRODUCT_VALUE: Range<usize> = 75..87;
const BUY_DATE: Range<usize> = 87..95;

/// Minimum user name length after normalization
const USER_NAME_MIN_LEN: usize = 2;

/// Earliest purchase date accepted anywhere in the engine
pub fn buy_date_min() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Slice a line into its raw sub-fields
///
/// Fails with [`RecordError::MalformedLine`] when the line is not exactly
/// [`RECORD_SIZE`] bytes. A field whose offsets split a multi-byte character
/// comes back empty and fails its own validation later.
pub fn slice_record(line: &str) -> Result<LegacyRecord<'_>, RecordError> {
    if line.len() != RECORD_SIZE {
        return Err(RecordError::MalformedLine {
            expected: RECORD_SIZE,
            actual: line.len(),
        });
    }

    let field = |range: Range<usize>| line.get(range).unwrap_or("");

    Ok(LegacyRecord {
        user_id: field(USER_ID),
        user_name: field(USER_NAME),
        order_id: field(ORDER_ID),
        product_id: field(PRODUCT_ID),
        product_value: field(PRODUCT_VALUE),
        buy_date: field(BUY_DATE),
    })
}

/// Decodes and validates legacy lines against a fixed date window
///
/// The window is `[1900-01-01, max_buy_date]`; `max_buy_date` is "today" for
/// a live import. Every record decoded by one parser shares the same
/// `imported_at` stamp.
#[derive(Debug, Clone)]
pub struct RecordParser {
    min_buy_date: NaiveDate,
    max_buy_date: NaiveDate,
    imported_at: DateTime<Utc>,
}

impl RecordParser {
    /// Create a parser accepting purchase dates up to `max_buy_date`
    pub fn new(max_buy_date: NaiveDate) -> Self {
        Self {
            min_buy_date: buy_date_min(),
            max_buy_date,
            imported_at: Utc::now(),
        }
    }

    /// Create a parser whose window ends today (UTC)
    pub fn for_today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// Decode one line into a validated [`Legacy`] record
    pub fn parse(&self, line: &str) -> Result<Legacy, RecordError> {
        let raw = slice_record(line)?;
        let mut errors = Vec::new();

        let user_id = match i64::from_str(raw.user_id) {
            Ok(id) if id >= 0 => Some(id),
            _ => {
                errors.push(FieldError::UserId);
                None
            }
        };

        let user_name = format_title(raw.user_name);
        if user_name.chars().count() < USER_NAME_MIN_LEN {
            errors.push(FieldError::UserName);
        }

        let order_id = i64::from_str(raw.order_id)
            .map_err(|_| errors.push(FieldError::OrderId))
            .ok();

        let product_id = i64::from_str(raw.product_id)
            .map_err(|_| errors.push(FieldError::ProductId))
            .ok();

        let product_value = parse_product_value(raw.product_value);
        if product_value.is_none() {
            errors.push(FieldError::ProductValue);
        }

        let buy_date = match parse_buy_date(raw.buy_date) {
            None => {
                errors.push(FieldError::BuyDate);
                None
            }
            Some(date) if date < self.min_buy_date || date > self.max_buy_date => {
                errors.push(FieldError::BuyDateBetween {
                    min: self.min_buy_date,
                    max: self.max_buy_date,
                });
                None
            }
            Some(date) => Some(date),
        };

        match (user_id, order_id, product_id, product_value, buy_date) {
            (Some(user_id), Some(order_id), Some(product_id), Some(product_value), Some(buy_date))
                if errors.is_empty() =>
            {
                Ok(Legacy {
                    user_id,
                    user_name,
                    order_id,
                    product_id,
                    product_value,
                    buy_date,
                    imported_at: self.imported_at,
                })
            }
            _ => Err(RecordError::FieldValidation(errors)),
        }
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::for_today()
    }
}

/// Parse a plain decimal amount, surrounding padding allowed
///
/// Only digits, one sign and a decimal point are accepted; digit separators
/// and exponents are rejected.
pub fn parse_product_value(raw: &str) -> Option<Decimal> {
    let value = raw.trim();
    if !value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-'))
    {
        return None;
    }
    Decimal::from_str(value).ok()
}

/// Parse a strict `YYYYMMDD` calendar date
pub fn parse_buy_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = raw[0..4].parse().ok()?;
    let month = raw[4..6].parse().ok()?;
    let day = raw[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a user name
///
/// Trims, collapses whitespace runs to a single space and upper-cases the
/// first letter of every word. The rest of each word is left as is, so
/// `"mcDonald  o'neil"` becomes `"McDonald O'Neil"`.
pub fn format_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut titled = String::with_capacity(collapsed.len());
    let mut prev = ' ';

    for c in collapsed.chars() {
        if is_word_separator(prev) {
            titled.extend(c.to_uppercase());
        } else {
            titled.push(c);
        }
        prev = c;
    }

    titled
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        return !(c.is_ascii_alphanumeric() || c == '_');
    }
    if c.is_alphanumeric() {
        return false;
    }
    c.is_whitespace()
}

/// Round a money amount to 2 places, midpoints away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Build a well-formed legacy line from its field values
#[cfg(test)]
pub(crate) fn fixed_line(
    user_id: &str,
    name: &str,
    order_id: &str,
    product_id: &str,
    value: &str,
    date: &str,
) -> String {
    format!(
        "{:0>10}{:>45}{:0>10}{:0>10}{:>12}{}",
        user_id, name, order_id, product_id, value, date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PALMER: &str =
        "0000000070                              Palmer Prosacco00000007530000000003     1836.7420210308";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn parser() -> RecordParser {
        RecordParser::new(today())
    }

    fn field_errors(line: &str) -> Vec<FieldError> {
        match parser().parse(line) {
            Err(RecordError::FieldValidation(errors)) => errors,
            other => panic!("Expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_line_helper_matches_reference_line() {
        let line = fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20210308");
        assert_eq!(line.len(), RECORD_SIZE);
        assert_eq!(line, PALMER);
    }

    #[test]
    fn test_slice_record_offsets() {
        let raw = slice_record(PALMER).unwrap();
        assert_eq!(raw.user_id, "0000000070");
        assert_eq!(raw.user_name.trim(), "Palmer Prosacco");
        assert_eq!(raw.user_name.len(), 45);
        assert_eq!(raw.order_id, "0000000753");
        assert_eq!(raw.product_id, "0000000003");
        assert_eq!(raw.product_value, "     1836.74");
        assert_eq!(raw.buy_date, "20210308");
    }

    #[test]
    fn test_parse_valid_line() {
        let legacy = parser().parse(PALMER).unwrap();
        assert_eq!(legacy.user_id, 70);
        assert_eq!(legacy.user_name, "Palmer Prosacco");
        assert_eq!(legacy.order_id, 753);
        assert_eq!(legacy.product_id, 3);
        assert_eq!(legacy.product_value, Decimal::new(183674, 2));
        assert_eq!(legacy.buy_date.to_string(), "2021-03-08");
    }

    #[rstest]
    #[case::short(&PALMER[1..], 94)]
    #[case::long(&format!("{} ", PALMER), 96)]
    #[case::empty("", 0)]
    fn test_parse_wrong_size(#[case] line: &str, #[case] actual: usize) {
        let error = parser().parse(line).unwrap_err();
        assert_eq!(
            error,
            RecordError::MalformedLine {
                expected: RECORD_SIZE,
                actual
            }
        );
        assert_eq!(error.to_string(), "Record size not equal 95");
    }

    #[rstest]
    #[case::user_id(
        fixed_line("000000007x", "Palmer Prosacco", "753", "3", "1836.74", "20210308"),
        FieldError::UserId
    )]
    #[case::negative_user_id(
        fixed_line("-000000070", "Palmer Prosacco", "753", "3", "1836.74", "20210308"),
        FieldError::UserId
    )]
    #[case::user_name(
        fixed_line("70", "o", "753", "3", "1836.74", "20210308"),
        FieldError::UserName
    )]
    #[case::order_id(
        fixed_line("70", "Palmer Prosacco", "000000075x", "3", "1836.74", "20210308"),
        FieldError::OrderId
    )]
    #[case::product_id(
        fixed_line("70", "Palmer Prosacco", "753", "000000000x", "1836.74", "20210308"),
        FieldError::ProductId
    )]
    #[case::product_value(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1836.7x", "20210308"),
        FieldError::ProductValue
    )]
    #[case::underscore(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1_836.74", "20210308"),
        FieldError::ProductValue
    )]
    #[case::exponent(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1e3", "20210308"),
        FieldError::ProductValue
    )]
    #[case::buy_date_month(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20211308"),
        FieldError::BuyDate
    )]
    #[case::buy_date_day(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20210230"),
        FieldError::BuyDate
    )]
    #[case::buy_date_before_min(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "18990308"),
        FieldError::BuyDateBetween { min: buy_date_min(), max: today() }
    )]
    #[case::buy_date_future(
        fixed_line("70", "Palmer Prosacco", "753", "3", "1836.74", "20240518"),
        FieldError::BuyDateBetween { min: buy_date_min(), max: today() }
    )]
    fn test_parse_single_field_error(#[case] line: String, #[case] expected: FieldError) {
        assert_eq!(field_errors(&line), vec![expected]);
    }

    #[test]
    fn test_parse_accumulates_all_field_errors() {
        let line = fixed_line("x", "Palmer Prosacco", "x", "x", "x", "x0210308");
        let error = parser().parse(&line).unwrap_err();
        assert_eq!(
            error.to_string(),
            "UserID invalid;OrderID invalid;ProductID invalid;ProductValue invalid;BuyDate invalid"
        );
    }

    #[rstest]
    #[case::today(fixed_line("70", "Palmer Prosacco", "753", "3", "1.00", "20240517"))]
    #[case::min(fixed_line("70", "Palmer Prosacco", "753", "3", "1.00", "19000101"))]
    fn test_parse_date_window_is_inclusive(#[case] line: String) {
        assert!(parser().parse(&line).is_ok());
    }

    #[test]
    fn test_parse_normalizes_user_name() {
        let line = fixed_line("1", "sammie    baumbach", "7", "2", "96.47", "20210528");
        assert_eq!(parser().parse(&line).unwrap().user_name, "Sammie Baumbach");
    }

    #[test]
    fn test_parse_multibyte_char_across_field_boundary() {
        // 'é' occupies bytes 54 and 55, straddling UserName and OrderID
        let line = format!(
            "0000000070{:>44}é000000753000000000300000{:>7}20210308",
            "Palmer Prosacc", "1836.74"
        );
        assert_eq!(line.len(), RECORD_SIZE);
        assert_eq!(
            field_errors(&line),
            vec![FieldError::UserName, FieldError::OrderId]
        );
    }

    #[rstest]
    #[case::collapse("  palmer   prosacco ", "Palmer Prosacco")]
    #[case::keep_inner_case("mrs. stephen mcTrantow", "Mrs. Stephen McTrantow")]
    #[case::apostrophe("o'neil", "O'Neil")]
    #[case::already_titled("Elidia Gulgowski IV", "Elidia Gulgowski IV")]
    #[case::empty("   ", "")]
    fn test_format_title(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(format_title(raw), expected);
    }

    #[rstest]
    #[case("20210308", Some((2021, 3, 8)))]
    #[case("19000101", Some((1900, 1, 1)))]
    #[case("2021038", None)]
    #[case("2021-3-8", None)]
    #[case("+2021038", None)]
    #[case("20210431", None)]
    fn test_parse_buy_date(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_buy_date(raw), expected);
    }

    #[rstest]
    #[case("     1836.74", Some(Decimal::new(183674, 2)))]
    #[case("       -1.50", Some(Decimal::new(-150, 2)))]
    #[case("         +12", Some(Decimal::new(12, 0)))]
    #[case("    1_836.74", None)]
    #[case("       1e3  ", None)]
    #[case("   1 836.74", None)]
    #[case("            ", None)]
    fn test_parse_product_value(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_product_value(raw), expected);
    }

    #[rstest]
    #[case(Decimal::new(28462799, 4), Decimal::new(284628, 2))]
    #[case(Decimal::new(1005, 3), Decimal::new(101, 2))]
    #[case(Decimal::new(-1005, 3), Decimal::new(-101, 2))]
    #[case(Decimal::new(1004, 3), Decimal::new(100, 2))]
    fn test_round_money(#[case] value: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(value), expected);
    }
}
