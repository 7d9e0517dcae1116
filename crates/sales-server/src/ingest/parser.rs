//! Sales record parser
//!
//! Turns one raw CSV line into typed customer, product and order values.
//! Field positions are fixed:
//!
//! | Index | Column         | Index | Column         |
//! |-------|----------------|-------|----------------|
//! | 0     | order_id       | 8     | unit_price     |
//! | 1     | product_id     | 9     | discount       |
//! | 2     | customer_id    | 10    | shipping_cost  |
//! | 3     | product_name   | 11    | payment_method |
//! | 4     | category       | 12    | customer_name  |
//! | 5     | region         | 13    | customer_email |
//! | 6     | date_of_sale   | 14    | customer_address |
//! | 7     | quantity       |       |                |
//!
//! A sale date that is not `YYYY-MM-DD` is fatal. Numeric columns that fail
//! to parse become zero and are reported in [`ParsedLine::degraded`].
//!
//! The parser is pure: no I/O and no logging.

use chrono::NaiveDate;
use thiserror::Error;

use super::models::{Customer, Order, Product};

pub const COL_ORDER_ID: usize = 0;
pub const COL_PRODUCT_ID: usize = 1;
pub const COL_CUSTOMER_ID: usize = 2;
pub const COL_PRODUCT_NAME: usize = 3;
pub const COL_CATEGORY: usize = 4;
pub const COL_REGION: usize = 5;
pub const COL_DATE_OF_SALE: usize = 6;
pub const COL_QUANTITY: usize = 7;
pub const COL_UNIT_PRICE: usize = 8;
pub const COL_DISCOUNT: usize = 9;
pub const COL_SHIPPING_COST: usize = 10;
pub const COL_PAYMENT_METHOD: usize = 11;
pub const COL_CUSTOMER_NAME: usize = 12;
pub const COL_CUSTOMER_EMAIL: usize = 13;
pub const COL_CUSTOMER_ADDRESS: usize = 14;

/// Number of fields a line must carry
pub const REQUIRED_FIELDS: usize = COL_CUSTOMER_ADDRESS + 1;

const SALE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of one input line, unvalidated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord(pub Vec<String>);

impl RawRecord {
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RawRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RawRecord(iter.into_iter().map(Into::into).collect())
    }
}

/// Fatal problems with a single line
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    MissingField { expected: usize, found: usize },

    #[error("invalid date_of_sale '{value}': date must be in format YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// A numeric column that fell back to zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedField {
    pub column: &'static str,
    pub raw: String,
}

/// Typed values extracted from one line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub customer: Customer,
    pub product: Product,
    pub order: Order,
    pub degraded: Vec<DegradedField>,
}

/// Parse one line into its customer, product and order
pub fn parse_record(record: &RawRecord) -> Result<ParsedLine, ParseError> {
    if record.len() < REQUIRED_FIELDS {
        return Err(ParseError::MissingField {
            expected: REQUIRED_FIELDS,
            found: record.len(),
        });
    }

    let text = |index: usize| record.field(index).unwrap_or_default().to_string();

    let date_of_sale = parse_sale_date(record.field(COL_DATE_OF_SALE).unwrap_or_default())?;

    let mut degraded = Vec::new();
    let quantity = tolerant(record, COL_QUANTITY, "quantity", parse_quantity, &mut degraded);
    let unit_price = tolerant(record, COL_UNIT_PRICE, "unit_price", parse_amount, &mut degraded);
    let discount = tolerant(record, COL_DISCOUNT, "discount", parse_amount, &mut degraded);
    let shipping_cost =
        tolerant(record, COL_SHIPPING_COST, "shipping_cost", parse_amount, &mut degraded);

    Ok(ParsedLine {
        customer: Customer {
            customer_id: text(COL_CUSTOMER_ID),
            name: text(COL_CUSTOMER_NAME),
            email: text(COL_CUSTOMER_EMAIL),
            address: text(COL_CUSTOMER_ADDRESS),
            region: text(COL_REGION),
        },
        product: Product {
            product_id: text(COL_PRODUCT_ID),
            name: text(COL_PRODUCT_NAME),
            category: text(COL_CATEGORY),
            unit_price,
        },
        order: Order {
            order_id: text(COL_ORDER_ID),
            customer_id: text(COL_CUSTOMER_ID),
            product_id: text(COL_PRODUCT_ID),
            date_of_sale,
            quantity,
            discount,
            shipping_cost,
            payment_method: text(COL_PAYMENT_METHOD),
        },
        degraded,
    })
}

/// Parse a strict `YYYY-MM-DD` calendar date
///
/// Single-digit months or days, surrounding whitespace and impossible dates
/// such as `2024-02-30` are rejected.
pub fn parse_sale_date(value: &str) -> Result<NaiveDate, ParseError> {
    let invalid = || ParseError::InvalidDate {
        value: value.to_string(),
    };

    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, SALE_DATE_FORMAT).map_err(|_| invalid())
}

fn tolerant<T: Default>(
    record: &RawRecord,
    index: usize,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
    degraded: &mut Vec<DegradedField>,
) -> T {
    let raw = record.field(index).unwrap_or_default();
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            degraded.push(DegradedField {
                column,
                raw: raw.to_string(),
            });
            T::default()
        },
    }
}

fn parse_quantity(value: &str) -> Option<i32> {
    value.parse().ok()
}

fn parse_amount(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn line(date: &str, quantity: &str, discount: &str) -> RawRecord {
        [
            "1001",
            "P-1",
            "C-1",
            "Widget",
            "Tools",
            "North America",
            date,
            quantity,
            "19.99",
            discount,
            "4.50",
            "Credit Card",
            "Ada Lovelace",
            "ada@example.com",
            "12 Analytical Way",
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_complete_line() {
        let parsed = parse_record(&line("2024-01-15", "3", "0.1")).unwrap();

        assert_eq!(parsed.order.order_id, "1001");
        assert_eq!(parsed.order.customer_id, "C-1");
        assert_eq!(parsed.order.product_id, "P-1");
        assert_eq!(parsed.order.date_of_sale, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parsed.order.quantity, 3);
        assert_eq!(parsed.order.discount, 0.1);
        assert_eq!(parsed.order.shipping_cost, 4.5);
        assert_eq!(parsed.order.payment_method, "Credit Card");
        assert_eq!(parsed.product.name, "Widget");
        assert_eq!(parsed.product.category, "Tools");
        assert_eq!(parsed.product.unit_price, 19.99);
        assert_eq!(parsed.customer.name, "Ada Lovelace");
        assert_eq!(parsed.customer.email, "ada@example.com");
        assert_eq!(parsed.customer.address, "12 Analytical Way");
        assert_eq!(parsed.customer.region, "North America");
        assert!(parsed.degraded.is_empty());
    }

    #[test]
    fn test_numeric_fallback_to_zero() {
        let parsed = parse_record(&line("2024-01-15", "many", "n/a")).unwrap();

        assert_eq!(parsed.order.quantity, 0);
        assert_eq!(parsed.order.discount, 0.0);
        assert_eq!(
            parsed.degraded,
            vec![
                DegradedField { column: "quantity", raw: "many".to_string() },
                DegradedField { column: "discount", raw: "n/a".to_string() },
            ]
        );
    }

    #[test]
    fn test_non_finite_amount_degrades() {
        let parsed = parse_record(&line("2024-01-15", "1", "NaN")).unwrap();
        assert_eq!(parsed.order.discount, 0.0);
        assert_eq!(parsed.degraded.len(), 1);
    }

    #[test]
    fn test_padded_numbers_are_accepted() {
        let parsed = parse_record(&line("2024-01-15", " 7 ", "0.25 ")).unwrap();
        assert_eq!(parsed.order.quantity, 7);
        assert_eq!(parsed.order.discount, 0.25);
    }

    #[test]
    fn test_invalid_dates_are_fatal() {
        for date in ["15/01/2024", "2024-1-15", "2024-02-30", "", " 2024-01-15", "20240115"] {
            let err = parse_record(&line(date, "1", "0")).unwrap_err();
            assert_eq!(err, ParseError::InvalidDate { value: date.to_string() }, "{date:?}");
        }
    }

    #[test]
    fn test_leap_day_is_valid() {
        assert_eq!(
            parse_sale_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_short_line_is_fatal() {
        let record: RawRecord = ["1001", "P-1", "C-1"].into_iter().collect();
        assert_eq!(
            parse_record(&record).unwrap_err(),
            ParseError::MissingField { expected: 15, found: 3 }
        );
    }
}
