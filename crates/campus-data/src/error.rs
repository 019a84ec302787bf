//! # Manager Error Types
//!
//! Typed errors for the persistence layer, one enum per manager.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error (file open/read/write)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Manager error `Unknown` variant ← low-level detail kept as #[source]  │
//! │       │                                                                 │
//! │  Validation / cross-entity checks → dedicated variants, detected        │
//! │  BEFORE any mutation                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Interface layer surfaces the message verbatim in a dialog              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is retried automatically. The checkout orchestrator additionally
//! rolls affected files back before surfacing an error (see the transaction
//! module).

use std::io;
use thiserror::Error;

use campus_core::ValidationError;

// =============================================================================
// Inventory
// =============================================================================

/// Errors from category, product and vendor operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Category code is already taken.
    #[error("Category already present: {0}")]
    CategoryAlreadyPresent(String),

    /// Referenced category does not exist.
    #[error("Category not available: {0}")]
    CategoryNotAvailable(String),

    /// Referenced product does not exist.
    #[error("Product not available: {0}")]
    ProductNotAvailable(String),

    /// Bar code is already used by some product in the store.
    #[error("Product bar code already exists: {0}")]
    ProductBarCodeExists(String),

    /// The product store holds no products at all.
    ///
    /// Distinguishes "no products yet" from "none below threshold" on the
    /// restocking report.
    #[error("No products in the store")]
    ZeroProducts,

    /// Referenced vendor does not exist under the category.
    #[error("Vendor not available: {0}")]
    VendorNotAvailable(String),

    /// Category still has vendors and cannot be removed yet.
    #[error("Category still has vendors: {0}")]
    CategoryHasVendors(String),

    /// A field failed format validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// File I/O failed; prior content is left as-is.
    #[error("Unknown inventory error")]
    Unknown(#[source] io::Error),
}

impl From<io::Error> for InventoryError {
    fn from(err: io::Error) -> Self {
        InventoryError::Unknown(err)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Errors from discount operations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Referenced discount does not exist.
    #[error("Discount not present in file: {0}")]
    NotPresent(String),

    /// Discount code is already taken.
    #[error("Discount already present: {0}")]
    AlreadyPresent(String),

    /// The pre-seeded default discount cannot be updated.
    #[error("Default discount is not updatable")]
    DefaultDiscountNotUpdatable,

    /// The pre-seeded default discount cannot be deleted.
    #[error("Default discount is not deletable")]
    DefaultDiscountNotDeletable,

    /// A field failed format validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// File I/O failed; prior content is left as-is.
    #[error("Unknown discount error")]
    Unknown(#[source] io::Error),
}

impl From<io::Error> for DiscountError {
    fn from(err: io::Error) -> Self {
        DiscountError::Unknown(err)
    }
}

// =============================================================================
// Member
// =============================================================================

/// Errors from member operations.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Member identifier is already taken.
    #[error("Member identifier already present: {0}")]
    IdentifierAlreadyPresent(String),

    /// Referenced member does not exist.
    #[error("Member not present in file: {0}")]
    NotPresent(String),

    /// A field failed format validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// File I/O failed; prior content is left as-is.
    #[error("Unknown member error")]
    Unknown(#[source] io::Error),
}

impl From<io::Error> for MemberError {
    fn from(err: io::Error) -> Self {
        MemberError::Unknown(err)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Errors from checkout orchestration.
///
/// Every validation variant is raised before the first write; write failures
/// roll the sale's files back and surface through the wrapped variants.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Customer is neither a member nor the public sentinel.
    #[error("Invalid member id: {0}")]
    InvalidMemberId(String),

    /// Discount code does not resolve to an existing discount.
    #[error("Invalid discount id: {0}")]
    InvalidDiscountId(String),

    /// Redemption exceeds the member's current balance.
    #[error("Invalid loyalty points applied: requested {requested}, available {available}")]
    InvalidLoyaltyPointsApplied { requested: u32, available: u32 },

    /// A cart line asks for more units than are on hand.
    #[error(
        "Requested quantity of {product} more than available: requested {requested}, available {available}"
    )]
    RequestedQuantityMoreThanAvailable {
        product: String,
        requested: u32,
        available: u32,
    },

    /// Inventory lookup or stock deduction failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Discount lookup failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Member lookup or loyalty update failed.
    #[error(transparent)]
    Member(#[from] MemberError),

    /// File I/O failed; affected files were rolled back.
    #[error("Unknown transaction error")]
    Unknown(#[source] io::Error),
}

impl From<io::Error> for TransactionError {
    fn from(err: io::Error) -> Self {
        TransactionError::Unknown(err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
