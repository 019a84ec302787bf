//! # campus-data: Persistence Layer for Campus POS
//!
//! This crate provides flat-file persistence and sale orchestration for the
//! Campus POS system. Every entity kind lives in its own newline-delimited
//! text file under a single data directory.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Campus POS Data Flow                              │
//! │                                                                         │
//! │  Interface layer (CLI, GUI, test harness)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   campus-data (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌────────────────┐   │    │
//! │  │   │ StoreContext │   │    Managers    │   │  RecordStore   │   │    │
//! │  │   │ (context.rs) │   │ inventory.rs   │   │(record_store.rs│   │    │
//! │  │   │              │◄──│ discount.rs    │◄──│  append +      │   │    │
//! │  │   │ one handle,  │   │ member.rs      │   │  full rewrite) │   │    │
//! │  │   │ all managers │   │ transaction.rs │   │                │   │    │
//! │  │   └──────────────┘   └────────────────┘   └────────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     Flat Files (./data)                         │    │
//! │  │   Category.dat  Product.dat  Vendor{CODE}.dat                   │    │
//! │  │   Member.dat  Discount.dat  Transaction.dat                     │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line encoding and the domain types live in [`campus_core`]; this crate
//! owns the files and the cross-file consistency rules (identifier
//! generation, uniqueness, checkout atomicity with rollback).
//!
//! ## Module Organization
//!
//! - [`record_store`] - Generic line-based file store
//! - [`error`] - Per-manager error types
//! - [`inventory`] - Categories, products, per-category vendors
//! - [`discount`] - Discount CRUD and resolution
//! - [`member`] - Member CRUD and loyalty balances
//! - [`transaction`] - Sale validation, commit, rollback
//! - [`context`] - Configuration and the application-wide handle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campus_data::{StoreConfig, StoreContext};
//!
//! let context = StoreContext::open(StoreConfig::new("./data"))?;
//!
//! let member = context.members.find_member("ABZW123KL")?;
//! let discount = context.discount_for_customer(member.as_ref())?;
//! let receipt = context.checkout(&cart, &discount.code, "ABZW123KL", 20)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod context;
pub mod discount;
pub mod error;
pub mod inventory;
pub mod member;
pub mod record_store;
pub mod transaction;

// =============================================================================
// Re-exports
// =============================================================================

pub use context::{StoreConfig, StoreContext, DEFAULT_CONVERSION_RATE};
pub use error::{DiscountError, InventoryError, MemberError, TransactionError};
pub use record_store::RecordStore;

// Manager re-exports for convenience
pub use discount::DiscountManager;
pub use inventory::{InventoryManager, ProductDraft};
pub use member::MemberManager;
pub use transaction::{Receipt, TransactionManager};
