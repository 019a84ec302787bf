//! # Line Codec
//!
//! Structured encode/decode for the flat-file record format.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   One Line Per Record                                   │
//! │                                                                         │
//! │  Category     CLT,Clothes                                              │
//! │  Product      CLT/1,Nike Cloths,"Nike Cloths L",50,50.00,1,10,40       │
//! │  Vendor       Campus Prints,"Bulk supplier, prints on demand"          │
//! │  Member       ABZW123KL,Abzsde Klaoel,50                               │
//! │  Discount     GME_WEEK,"Games Week",2026-08-01,7,10,M                  │
//! │  Transaction  4,CLT/1,ABZW123KL,2,2026-08-29                           │
//! │                                                                         │
//! │  Fields are comma separated. Descriptions are ALWAYS double quoted      │
//! │  (they may contain commas); every other field uses a restricted         │
//! │  charset and is never quoted. No header line, no schema version.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding is strict: a line must split into exactly the expected fields and
//! every field must pass the same validation the managers apply on write.
//! Lines that fail are treated as corrupt and skipped by the store, never
//! repaired. Encode and decode round-trip exactly for every valid record.

use chrono::NaiveDate;

use crate::money::Money;
use crate::types::{
    Category, Discount, DiscountValidity, Eligibility, LoyaltyPoints, Member, Percentage, Product,
    ProductId, Transaction, Vendor, ALWAYS_SENTINEL, NEW_MEMBER_SENTINEL,
};
use crate::validation;

/// Field separator of the persisted line format.
pub const FIELD_SEPARATOR: char = ',';

/// Date format of the persisted line format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Record Trait
// =============================================================================

/// A domain type with a canonical single-line text form.
///
/// The record store is generic over this trait: it appends `encode` output
/// verbatim and feeds raw lines through `decode`, dropping any line that
/// returns `None`.
pub trait Record: Sized {
    /// Canonical line form, exactly as persisted (no trailing newline).
    fn encode(&self) -> String;

    /// Parses a persisted line; `None` marks the line as corrupt.
    fn decode(line: &str) -> Option<Self>;
}

// =============================================================================
// Field Splitting
// =============================================================================

/// One separated field, with its quoting preserved so decoders can insist
/// that descriptions were quoted and nothing else was.
#[derive(Debug, PartialEq, Eq)]
enum Field<'a> {
    Bare(&'a str),
    Quoted(&'a str),
}

impl<'a> Field<'a> {
    fn bare(&self) -> Option<&'a str> {
        match self {
            Field::Bare(text) => Some(text),
            Field::Quoted(_) => None,
        }
    }

    fn quoted(&self) -> Option<&'a str> {
        match self {
            Field::Quoted(text) => Some(text),
            Field::Bare(_) => None,
        }
    }
}

/// Splits a line into fields, honoring double-quoted sections.
///
/// Returns `None` on malformed quoting (unterminated quote, text after a
/// closing quote, empty quoted field).
fn split_fields(line: &str) -> Option<Vec<Field<'_>>> {
    let mut fields = Vec::new();
    let mut rest = line;

    loop {
        let remainder = if let Some(after_quote) = rest.strip_prefix('"') {
            let end = after_quote.find('"')?;
            if end == 0 {
                return None;
            }
            fields.push(Field::Quoted(&after_quote[..end]));
            let after = &after_quote[end + 1..];
            match after.strip_prefix(FIELD_SEPARATOR) {
                Some(next) => next,
                None if after.is_empty() => return Some(fields),
                None => return None,
            }
        } else {
            match rest.split_once(FIELD_SEPARATOR) {
                Some((field, next)) => {
                    if field.contains('"') {
                        return None;
                    }
                    fields.push(Field::Bare(field));
                    next
                }
                None => {
                    if rest.contains('"') {
                        return None;
                    }
                    fields.push(Field::Bare(rest));
                    return Some(fields);
                }
            }
        };
        rest = remainder;
    }
}

/// Wraps a description in its persisted quoted form.
fn quote(description: &str) -> String {
    format!("\"{description}\"")
}

/// Strict unsigned integer parse: digits only, no sign, no whitespace.
fn parse_u32(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_u64(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

// =============================================================================
// Category: `CODE,Name`
// =============================================================================

impl Record for Category {
    fn encode(&self) -> String {
        format!("{}{FIELD_SEPARATOR}{}", self.code, self.name)
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [code, name] = fields.as_slice() else {
            return None;
        };

        let code = code.bare()?;
        let name = name.bare()?;
        validation::validate_category_code(code).ok()?;
        validation::validate_name(name).ok()?;

        Some(Category::new(code, name))
    }
}

// =============================================================================
// Product: `CAT/seq,Name,"Description",qty,price,barCode,threshold,reorderQty`
// =============================================================================

impl Record for Product {
    fn encode(&self) -> String {
        [
            self.id.to_string(),
            self.name.clone(),
            quote(&self.description),
            self.quantity.to_string(),
            self.price.to_string(),
            self.bar_code.clone(),
            self.reorder_threshold.to_string(),
            self.reorder_quantity.to_string(),
        ]
        .join(",")
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [id, name, description, quantity, price, bar_code, threshold, reorder] =
            fields.as_slice()
        else {
            return None;
        };

        let id: ProductId = id.bare()?.parse().ok()?;
        validation::validate_category_code(&id.category_code).ok()?;

        let name = name.bare()?;
        validation::validate_name(name).ok()?;

        let description = description.quoted()?;
        validation::validate_description(description).ok()?;

        let bar_code = bar_code.bare()?;
        validation::validate_bar_code(bar_code).ok()?;

        Some(Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            quantity: parse_u32(quantity.bare()?)?,
            price: Money::parse(price.bare()?)?,
            bar_code: bar_code.to_string(),
            reorder_threshold: parse_u32(threshold.bare()?)?,
            reorder_quantity: parse_u32(reorder.bare()?)?,
        })
    }
}

// =============================================================================
// Vendor: `Name,"Description"`
// =============================================================================

impl Record for Vendor {
    fn encode(&self) -> String {
        format!("{}{FIELD_SEPARATOR}{}", self.name, quote(&self.description))
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [name, description] = fields.as_slice() else {
            return None;
        };

        let name = name.bare()?;
        let description = description.quoted()?;
        validation::validate_name(name).ok()?;
        validation::validate_description(description).ok()?;

        Some(Vendor::new(name, description))
    }
}

// =============================================================================
// Member: `id,Name,points` (points `-1` = new member)
// =============================================================================

impl Record for Member {
    fn encode(&self) -> String {
        let points = match self.loyalty_points {
            LoyaltyPoints::New => NEW_MEMBER_SENTINEL.to_string(),
            LoyaltyPoints::Balance(points) => points.to_string(),
        };
        format!("{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{points}", self.id, self.name)
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [id, name, points] = fields.as_slice() else {
            return None;
        };

        let id = id.bare()?;
        let name = name.bare()?;
        validation::validate_member_id(id).ok()?;
        validation::validate_name(name).ok()?;

        let points = points.bare()?;
        let loyalty_points = if points == NEW_MEMBER_SENTINEL {
            LoyaltyPoints::New
        } else {
            LoyaltyPoints::Balance(parse_u32(points)?)
        };

        Some(Member {
            id: id.to_string(),
            name: name.to_string(),
            loyalty_points,
        })
    }
}

// =============================================================================
// Discount: `CODE,"Description",startDate,period,percentage,eligibility`
// =============================================================================

impl Record for Discount {
    fn encode(&self) -> String {
        let (start, period) = match self.validity {
            DiscountValidity::Always => {
                (ALWAYS_SENTINEL.to_string(), ALWAYS_SENTINEL.to_string())
            }
            DiscountValidity::Window { start, period_days } => {
                (start.format(DATE_FORMAT).to_string(), period_days.to_string())
            }
        };
        [
            self.code.clone(),
            quote(&self.description),
            start,
            period,
            self.percentage.to_string(),
            self.eligibility.code().to_string(),
        ]
        .join(",")
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [code, description, start, period, percentage, eligibility] = fields.as_slice()
        else {
            return None;
        };

        let code = code.bare()?;
        let description = description.quoted()?;
        validation::validate_discount_code(code).ok()?;
        validation::validate_description(description).ok()?;

        // Start date and period are correlated: both the sentinel, or both
        // concrete values. Mixed lines are corrupt.
        let start = start.bare()?;
        let period = period.bare()?;
        let validity = match (start == ALWAYS_SENTINEL, period == ALWAYS_SENTINEL) {
            (true, true) => DiscountValidity::Always,
            (false, false) => DiscountValidity::Window {
                start: parse_date(start)?,
                period_days: parse_u32(period)?,
            },
            _ => return None,
        };

        Some(Discount {
            code: code.to_string(),
            description: description.to_string(),
            validity,
            percentage: Percentage::parse(percentage.bare()?)?,
            eligibility: Eligibility::parse(eligibility.bare()?)?,
        })
    }
}

// =============================================================================
// Transaction: `id,productId,memberId,quantity,date`
// =============================================================================

impl Record for Transaction {
    fn encode(&self) -> String {
        [
            self.id.to_string(),
            self.product_id.to_string(),
            self.customer_id.clone(),
            self.quantity.to_string(),
            self.date.format(DATE_FORMAT).to_string(),
        ]
        .join(",")
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [id, product_id, customer_id, quantity, date] = fields.as_slice() else {
            return None;
        };

        let customer_id = customer_id.bare()?;
        validation::validate_member_id(customer_id).ok()?;

        Some(Transaction {
            id: parse_u64(id.bare()?)?,
            product_id: product_id.bare()?.parse().ok()?,
            customer_id: customer_id.to_string(),
            quantity: parse_u32(quantity.bare()?)?,
            date: parse_date(date.bare()?)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new("CLT", 1),
            name: "Nike Cloths".to_string(),
            description: "Large, blue, long sleeve".to_string(),
            quantity: 50,
            price: Money::from_cents(5000),
            bar_code: "1001".to_string(),
            reorder_threshold: 10,
            reorder_quantity: 40,
        }
    }

    #[test]
    fn test_category_round_trip() {
        let category = Category::new("CLT", "Clothes");
        let line = category.encode();
        assert_eq!(line, "CLT,Clothes");
        assert_eq!(Category::decode(&line), Some(category));
    }

    #[test]
    fn test_category_rejects_malformed_lines() {
        assert_eq!(Category::decode(""), None);
        assert_eq!(Category::decode("CLT"), None);
        assert_eq!(Category::decode("CLTS,Clothes"), None);
        assert_eq!(Category::decode("clt,Clothes"), None);
        assert_eq!(Category::decode("CLT,Clothes,extra"), None);
    }

    #[test]
    fn test_product_round_trip_with_comma_in_description() {
        let product = sample_product();
        let line = product.encode();
        assert_eq!(line, "CLT/1,Nike Cloths,\"Large, blue, long sleeve\",50,50.00,1001,10,40");
        assert_eq!(Product::decode(&line), Some(product));
    }

    #[test]
    fn test_product_rejects_unquoted_description() {
        assert_eq!(
            Product::decode("CLT/1,Nike Cloths,Large blue,50,50.00,1001,10,40"),
            None
        );
    }

    #[test]
    fn test_product_rejects_bad_numbers() {
        assert_eq!(
            Product::decode("CLT/1,Nike Cloths,\"Top\",-1,50.00,1001,10,40"),
            None
        );
        assert_eq!(
            Product::decode("CLT/1,Nike Cloths,\"Top\",50,fifty,1001,10,40"),
            None
        );
    }

    #[test]
    fn test_product_accepts_loose_decimal_then_reencodes_canonically() {
        let decoded =
            Product::decode("CLT/1,Nike Cloths,\"Top\",50,50.5,1001,10,40").unwrap();
        assert_eq!(decoded.price, Money::from_cents(5050));
        assert!(decoded.encode().contains(",50.50,"));
    }

    #[test]
    fn test_vendor_round_trip() {
        let vendor = Vendor::new("Campus Prints", "Bulk supplier, prints on demand");
        let line = vendor.encode();
        assert_eq!(line, "Campus Prints,\"Bulk supplier, prints on demand\"");
        assert_eq!(Vendor::decode(&line), Some(vendor));
    }

    #[test]
    fn test_member_round_trip_with_sentinel() {
        let fresh = Member::new("ABZW123KL", "Abzsde Klaoel");
        let line = fresh.encode();
        assert_eq!(line, "ABZW123KL,Abzsde Klaoel,-1");
        assert_eq!(Member::decode(&line), Some(fresh));

        let seasoned = Member {
            id: "ABZW123KL".to_string(),
            name: "Abzsde Klaoel".to_string(),
            loyalty_points: LoyaltyPoints::Balance(50),
        };
        assert_eq!(Member::decode(&seasoned.encode()), Some(seasoned));
    }

    #[test]
    fn test_member_rejects_other_negatives() {
        assert_eq!(Member::decode("ABZW123KL,Abzsde Klaoel,-2"), None);
    }

    #[test]
    fn test_discount_round_trip_window() {
        let discount = Discount {
            code: "GME_WEEK".to_string(),
            description: "Games Week".to_string(),
            validity: DiscountValidity::Window {
                start: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                period_days: 7,
            },
            percentage: Percentage::from_bps(1000),
            eligibility: Eligibility::Member,
        };
        let line = discount.encode();
        assert_eq!(line, "GME_WEEK,\"Games Week\",2026-08-01,7,10,M");
        assert_eq!(Discount::decode(&line), Some(discount));
    }

    #[test]
    fn test_discount_round_trip_always() {
        let discount = Discount::public_default();
        let line = discount.encode();
        assert_eq!(line, "PUBLIC,\"No discount applicable\",ALWAYS,ALWAYS,0,A");
        assert_eq!(Discount::decode(&line), Some(discount));
    }

    #[test]
    fn test_discount_rejects_mixed_sentinels() {
        assert_eq!(
            Discount::decode("GME_WEEK,\"Games Week\",ALWAYS,7,10,M"),
            None
        );
        assert_eq!(
            Discount::decode("GME_WEEK,\"Games Week\",2026-08-01,ALWAYS,10,M"),
            None
        );
    }

    #[test]
    fn test_discount_rejects_bad_percentage_and_eligibility() {
        assert_eq!(
            Discount::decode("GME_WEEK,\"Games Week\",ALWAYS,ALWAYS,101,M"),
            None
        );
        assert_eq!(
            Discount::decode("GME_WEEK,\"Games Week\",ALWAYS,ALWAYS,10,X"),
            None
        );
    }

    #[test]
    fn test_transaction_round_trip() {
        let transaction = Transaction {
            id: 4,
            product_id: ProductId::new("CLT", 1),
            customer_id: "ABZW123KL".to_string(),
            quantity: 2,
            date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        };
        let line = transaction.encode();
        assert_eq!(line, "4,CLT/1,ABZW123KL,2,2026-08-29");
        assert_eq!(Transaction::decode(&line), Some(transaction));
    }

    #[test]
    fn test_transaction_rejects_bad_date() {
        assert_eq!(Transaction::decode("4,CLT/1,ABZW123KL,2,29-08-2026"), None);
        assert_eq!(Transaction::decode("4,CLT/1,ABZW123KL,2,2026-13-01"), None);
    }

    #[test]
    fn test_split_rejects_unterminated_quote() {
        assert_eq!(Vendor::decode("Campus Prints,\"Bulk supplier"), None);
        assert_eq!(Vendor::decode("Campus Prints,\"Bulk\" trailing"), None);
        assert_eq!(Vendor::decode("Campus Prints,\"\""), None);
    }
}
