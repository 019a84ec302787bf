//! # Store Context
//!
//! Configuration and the single application-wide handle over all managers.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Startup                                    │
//! │                                                                         │
//! │  StoreConfig::new("./data") ← data directory + conversion rate          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreContext::open(config) ← opens every backing file once             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────────┐                      │
//! │  │              StoreContext                     │                      │
//! │  │  inventory    InventoryManager                │                      │
//! │  │  discounts    DiscountManager (PUBLIC seeded) │                      │
//! │  │  members      MemberManager                   │                      │
//! │  │  transactions TransactionManager              │                      │
//! │  └───────────────────────────────────────────────┘                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Interface layer borrows the context; one instance per process          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The context is constructed once at startup and passed by reference.
//! Operations are not internally synchronized; a single logical writer must
//! serialize mutations (one UI thread, or a mutex around the context).

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use campus_core::{Discount, Member, Money, SaleItem, Transaction};

use crate::discount::DiscountManager;
use crate::error::{DiscountError, TransactionError};
use crate::inventory::InventoryManager;
use crate::member::MemberManager;
use crate::transaction::{Receipt, TransactionManager};

/// Default currency units per loyalty point earned.
pub const DEFAULT_CONVERSION_RATE: i64 = 5;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("./data").conversion_rate(10);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding every backing file.
    pub data_dir: PathBuf,

    /// Currency units per one loyalty point earned.
    /// Default: 5
    pub conversion_rate: i64,
}

impl StoreConfig {
    /// Creates a configuration with the given data directory.
    ///
    /// The directory is created on open if it does not exist.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            conversion_rate: DEFAULT_CONVERSION_RATE,
        }
    }

    /// Sets the loyalty conversion rate.
    pub fn conversion_rate(mut self, rate: i64) -> Self {
        self.conversion_rate = rate;
        self
    }
}

// =============================================================================
// Context
// =============================================================================

/// Application-wide handle owning one instance of each manager.
///
/// Replaces per-manager global singletons: single-instance semantics come
/// from constructing the context once and borrowing it everywhere.
#[derive(Debug)]
pub struct StoreContext {
    pub inventory: InventoryManager,
    pub discounts: DiscountManager,
    pub members: MemberManager,
    pub transactions: TransactionManager,
}

impl StoreContext {
    /// Opens every backing store under the configured data directory.
    ///
    /// Files and the directory itself are created on first use, and the
    /// default PUBLIC discount is seeded if missing.
    pub fn open(config: StoreConfig) -> io::Result<Self> {
        info!(
            data_dir = %config.data_dir.display(),
            conversion_rate = config.conversion_rate,
            "Opening store"
        );
        Ok(StoreContext {
            inventory: InventoryManager::open(&config.data_dir)?,
            discounts: DiscountManager::open(&config.data_dir)?,
            members: MemberManager::open(&config.data_dir)?,
            transactions: TransactionManager::open(&config.data_dir, config.conversion_rate)?,
        })
    }

    /// Commits a sale across the inventory, member, and transaction stores.
    ///
    /// See [`TransactionManager::checkout`] for validation order and rollback
    /// behavior.
    pub fn checkout(
        &self,
        items: &[SaleItem],
        discount_code: &str,
        customer_id: &str,
        redeemed_points: u32,
    ) -> Result<Receipt, TransactionError> {
        self.transactions.checkout(
            &self.inventory,
            &self.discounts,
            &self.members,
            items,
            discount_code,
            customer_id,
            redeemed_points,
        )
    }

    /// Best discount for a customer: highest active one for a member, the
    /// PUBLIC record for a walk-in.
    pub fn discount_for_customer(
        &self,
        member: Option<&Member>,
    ) -> Result<Discount, DiscountError> {
        self.discounts.discount_for(member)
    }

    /// Discounted total of a cart without committing anything.
    pub fn sale_total(&self, items: &[SaleItem], discount: &Discount) -> Money {
        self.transactions.sale_total(items, discount)
    }

    /// Sale line items within a date range, both ends inclusive.
    pub fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, TransactionError> {
        self.transactions.transactions_between(from, to)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
