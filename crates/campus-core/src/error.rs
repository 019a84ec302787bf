//! # Validation Error Types
//!
//! Field-level validation failures for campus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  campus-core errors (this file)                                         │
//! │  └── ValidationError  - Field format/range failures                     │
//! │                                                                         │
//! │  campus-data errors (separate crate)                                    │
//! │  ├── InventoryError   - Category/Product/Vendor operations              │
//! │  ├── DiscountError    - Discount operations                             │
//! │  ├── MemberError      - Member operations                               │
//! │  └── TransactionError - Checkout orchestration                          │
//! │                                                                         │
//! │  Flow: ValidationError → manager error → interface layer dialog         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Input validation errors.
///
/// These occur when a field does not meet the persisted format's rules.
/// Detected before any mutation; the caller sees them verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Invalid format (wrong charset, wrong shape).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;
