//! # Domain Types
//!
//! Core domain types used throughout Campus POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Category     │   │     Product     │   │     Vendor      │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  code (3×A-Z)   │   │  id = CAT/seq   │   │  name           │        │
//! │  │  name           │   │  price (Money)  │   │  description    │        │
//! │  └─────────────────┘   │  bar_code       │   └─────────────────┘        │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │     Member      │   │    Discount     │   │   Transaction   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  loyalty points │   │  validity       │   │  shared id per  │        │
//! │  │  (sentinel -1)  │   │  percentage     │   │  checkout, one  │        │
//! │  └─────────────────┘   │  eligibility    │   │  line per item  │        │
//! │                        └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cross-references between entities are by identifier/code only, never by
//! embedded object; each flat file exclusively owns its records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Customer identifier used when no member is attached to a sale.
pub const PUBLIC_CUSTOMER: &str = "PUBLIC";

/// Code of the pre-seeded default discount (0%, eligibility All).
///
/// This record is created when the discount store opens and can never be
/// updated or deleted.
pub const PUBLIC_DISCOUNT_CODE: &str = "PUBLIC";

/// Description of the pre-seeded default discount.
pub const PUBLIC_DISCOUNT_DESCRIPTION: &str = "No discount applicable";

/// Sentinel written for a member who has not completed a transaction yet.
pub const NEW_MEMBER_SENTINEL: &str = "-1";

/// Sentinel for a discount with no start date and no finite period.
pub const ALWAYS_SENTINEL: &str = "ALWAYS";

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so `1250` bps = 12.5%. The persisted
/// format allows up to two fraction digits, which maps exactly onto bps and
/// keeps discount math in integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Percentage(u32);

impl Percentage {
    /// 100% expressed in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a percentage from basis points. Values above 100% saturate.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            Percentage(Self::MAX_BPS)
        } else {
            Percentage(bps)
        }
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parses the persisted text form: `0`–`100` with up to two decimals.
    pub fn parse(text: &str) -> Option<Percentage> {
        let (whole, fraction) = match text.split_once('.') {
            // A dot with nothing after it is malformed, not a zero fraction.
            Some((_, "")) => return None,
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };

        if whole.is_empty() || whole.len() > 3 || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole: u32 = whole.parse().ok()?;
        let fraction_bps: u32 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u32>().ok()? * 10,
            _ => fraction.parse().ok()?,
        };

        let bps = whole.checked_mul(100)?.checked_add(fraction_bps)?;
        if bps > Self::MAX_BPS {
            return None;
        }
        Some(Percentage(bps))
    }
}

/// Canonical display form: trailing zeros trimmed (`10`, `12.5`, `12.55`).
impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;
        if fraction == 0 {
            write!(f, "{whole}")
        } else if fraction % 10 == 0 {
            write!(f, "{whole}.{}", fraction / 10)
        } else {
            write!(f, "{whole}.{fraction:02}")
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category. The code doubles as the prefix of every product
/// identifier under it and as the suffix of the category's vendor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Three uppercase letters, unique across the store.
    pub code: String,

    /// Display name.
    pub name: String,
}

impl Category {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Category {
            code: code.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Product Identifier
// =============================================================================

/// A product identifier: owning category code plus a per-category sequence
/// number, rendered as `CLT/1`.
///
/// Sequence numbers are generated monotonically per category and never
/// reused, even after deletions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId {
    /// Owning category code.
    pub category_code: String,

    /// Per-category sequence number, starting at 1.
    pub sequence: u32,
}

impl ProductId {
    pub fn new(category_code: impl Into<String>, sequence: u32) -> Self {
        ProductId {
            category_code: category_code.into(),
            sequence,
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category_code, self.sequence)
    }
}

impl FromStr for ProductId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, sequence) = s.split_once('/').ok_or(())?;
        if code.is_empty() || sequence.is_empty() || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(());
        }
        let sequence: u32 = sequence.parse().map_err(|_| ())?;
        Ok(ProductId::new(code, sequence))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Generated identifier, unique store-wide.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Free text; may contain the field separator, stored quoted.
    pub description: String,

    /// On-hand quantity.
    pub quantity: u32,

    /// Unit price.
    pub price: Money,

    /// Scanner bar code, unique store-wide.
    pub bar_code: String,

    /// Quantity at or below which restocking is flagged.
    pub reorder_threshold: u32,

    /// Suggested restocking amount.
    pub reorder_quantity: u32,
}

impl Product {
    /// Whether the product should appear on the restocking report.
    ///
    /// A quantity exactly at the threshold counts as below it.
    #[inline]
    pub fn is_below_threshold(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }

    /// Returns a copy with the on-hand quantity replaced.
    pub fn with_quantity(&self, quantity: u32) -> Product {
        Product {
            quantity,
            ..self.clone()
        }
    }
}

// =============================================================================
// Vendor
// =============================================================================

/// A supplier, scoped to a single category (one vendor file per category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
    pub description: String,
}

impl Vendor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Vendor {
            name: name.into(),
            description: description.into(),
        }
    }
}

// =============================================================================
// Member
// =============================================================================

/// Loyalty point balance of a member.
///
/// A member who has never completed a transaction is persisted with the
/// sentinel `-1`; interface layers display that as 0 and the first checkout
/// converts it into a concrete balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyPoints {
    /// Registered, but no transaction yet (stored as `-1`).
    New,
    /// Concrete earned balance.
    Balance(u32),
}

impl LoyaltyPoints {
    /// The balance available for redemption; a new member has 0.
    #[inline]
    pub fn redeemable(&self) -> u32 {
        match self {
            LoyaltyPoints::New => 0,
            LoyaltyPoints::Balance(points) => *points,
        }
    }
}

impl Default for LoyaltyPoints {
    fn default() -> Self {
        LoyaltyPoints::New
    }
}

/// A registered store member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Alphanumeric identifier, unique across the store.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Loyalty point balance.
    pub loyalty_points: LoyaltyPoints,
}

impl Member {
    /// Creates a member who has not transacted yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Member {
            id: id.into(),
            name: name.into(),
            loyalty_points: LoyaltyPoints::New,
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Who a discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Restricted to registered members.
    Member,
    /// Open to every customer.
    All,
}

impl Eligibility {
    /// Single-letter persisted form.
    pub const fn code(&self) -> &'static str {
        match self {
            Eligibility::Member => "M",
            Eligibility::All => "A",
        }
    }

    /// Parses the persisted form.
    pub fn parse(text: &str) -> Option<Eligibility> {
        match text {
            "M" => Some(Eligibility::Member),
            "A" => Some(Eligibility::All),
            _ => None,
        }
    }
}

/// When a discount is active.
///
/// Start date and period are correlated by construction: a discount is either
/// permanently open-ended (both fields the `ALWAYS` sentinel on disk) or has
/// both a concrete start date and a finite period in days. The old format's
/// illegal mixed states cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountValidity {
    /// Active regardless of the current date.
    Always,
    /// Active from `start` for `period_days` days.
    Window { start: NaiveDate, period_days: u32 },
}

impl DiscountValidity {
    /// Whether the discount applies on the given date.
    ///
    /// The window covers `start` inclusive up to (but excluding)
    /// `start + period_days`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self {
            DiscountValidity::Always => true,
            DiscountValidity::Window { start, period_days } => {
                let days_in = (date - *start).num_days();
                days_in >= 0 && days_in < i64::from(*period_days)
            }
        }
    }
}

/// A percentage discount on the sale total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Uppercase letters and underscores, unique across the store.
    pub code: String,

    /// Free text; may contain the field separator, stored quoted.
    pub description: String,

    /// Activity window, or the always-active sentinel pair.
    pub validity: DiscountValidity,

    /// Percentage **off** the raw total.
    pub percentage: Percentage,

    /// Applicability scope.
    pub eligibility: Eligibility,
}

impl Discount {
    /// The pre-seeded default discount handed to non-members.
    pub fn public_default() -> Discount {
        Discount {
            code: PUBLIC_DISCOUNT_CODE.to_string(),
            description: PUBLIC_DISCOUNT_DESCRIPTION.to_string(),
            validity: DiscountValidity::Always,
            percentage: Percentage::zero(),
            eligibility: Eligibility::All,
        }
    }

    /// Whether this is the non-deletable, non-updatable default record.
    #[inline]
    pub fn is_public_default(&self) -> bool {
        self.code == PUBLIC_DISCOUNT_CODE
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// One line item of a committed sale.
///
/// All items of a single checkout share one transaction identifier; the store
/// writes one record per product purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonically increasing identifier shared across the sale's items.
    pub id: u64,

    /// Purchased product.
    pub product_id: ProductId,

    /// Member identifier, or [`PUBLIC_CUSTOMER`] for a walk-in sale.
    pub customer_id: String,

    /// Units purchased.
    pub quantity: u32,

    /// Date of sale.
    pub date: NaiveDate,
}

// =============================================================================
// Sale Item
// =============================================================================

/// One line of an in-progress cart: a product and the requested quantity.
///
/// The embedded product is a lookup snapshot; checkout re-reads current stock
/// before committing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product: Product,
    pub quantity: u32,
}

impl SaleItem {
    pub fn new(product: Product, quantity: u32) -> Self {
        SaleItem { product, quantity }
    }

    /// Line total before any discount.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
