//! # Discount Manager
//!
//! CRUD over percentage discounts plus resolution of the best discount for a
//! customer at checkout time.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  member checkout:  highest-percentage discount that is active today     │
//! │                    and eligible for Member or All                       │
//! │  public checkout:  the pre-seeded PUBLIC record (0% off)                │
//! │  nothing active:   fall back to PUBLIC either way                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The PUBLIC record is seeded when the store opens and is protected from
//! update and deletion, so resolution always has a fallback.

use std::io;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use campus_core::{Discount, Eligibility, Member, Record};

use crate::error::DiscountError;
use crate::record_store::RecordStore;

/// File name of the discount collection.
const DISCOUNT_FILE: &str = "Discount.dat";

/// Manages the discount collection.
#[derive(Debug)]
pub struct DiscountManager {
    discounts: RecordStore<Discount>,
}

impl DiscountManager {
    /// Opens the discount store under `data_dir`, seeding the PUBLIC record
    /// on first use.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        let manager = DiscountManager {
            discounts: RecordStore::open(data_dir.join(DISCOUNT_FILE))?,
        };
        let seeded = manager
            .discounts
            .get_all()?
            .iter()
            .any(Discount::is_public_default);
        if !seeded {
            manager.discounts.add(&Discount::public_default())?;
            info!("Seeded default PUBLIC discount");
        }
        Ok(manager)
    }

    /// Lists every discount, PUBLIC included.
    pub fn all_discounts(&self) -> Result<Vec<Discount>, DiscountError> {
        Ok(self.discounts.get_all()?)
    }

    /// Looks a discount up by code.
    pub fn find_discount(&self, code: &str) -> Result<Option<Discount>, DiscountError> {
        let discounts = self.discounts.get_all()?;
        Ok(discounts.into_iter().find(|discount| discount.code == code))
    }

    /// Adds a discount with a unique code.
    pub fn add_discount(&self, discount: &Discount) -> Result<(), DiscountError> {
        campus_core::validation::validate_discount_code(&discount.code)?;
        campus_core::validation::validate_description(&discount.description)?;
        if self.find_discount(&discount.code)?.is_some() {
            return Err(DiscountError::AlreadyPresent(discount.code.clone()));
        }
        self.discounts.add(discount)?;
        debug!(code = %discount.code, "Added discount");
        Ok(())
    }

    /// Updates an existing discount in place. The PUBLIC record is immutable.
    pub fn update_discount(&self, discount: &Discount) -> Result<(), DiscountError> {
        if discount.is_public_default() {
            return Err(DiscountError::DefaultDiscountNotUpdatable);
        }
        campus_core::validation::validate_description(&discount.description)?;
        let existing = self
            .find_discount(&discount.code)?
            .ok_or_else(|| DiscountError::NotPresent(discount.code.clone()))?;
        self.discounts.replace(&existing.encode(), discount)?;
        debug!(code = %discount.code, "Updated discount");
        Ok(())
    }

    /// Removes a discount. The PUBLIC record cannot be removed.
    pub fn delete_discount(&self, code: &str) -> Result<(), DiscountError> {
        if code == campus_core::PUBLIC_DISCOUNT_CODE {
            return Err(DiscountError::DefaultDiscountNotDeletable);
        }
        let existing = self
            .find_discount(code)?
            .ok_or_else(|| DiscountError::NotPresent(code.to_string()))?;
        self.discounts.delete(&existing.encode())?;
        debug!(code, "Deleted discount");
        Ok(())
    }

    /// Resolves the discount applied to a checkout: the best active one for a
    /// member, the PUBLIC record for a walk-in customer.
    pub fn discount_for(&self, member: Option<&Member>) -> Result<Discount, DiscountError> {
        if member.is_none() {
            return Ok(self
                .find_discount(campus_core::PUBLIC_DISCOUNT_CODE)?
                .unwrap_or_else(Discount::public_default));
        }

        let today = Utc::now().date_naive();
        let best = self
            .discounts
            .get_all()?
            .into_iter()
            .filter(|discount| !discount.is_public_default())
            .filter(|discount| discount.validity.is_active_on(today))
            .filter(|discount| {
                matches!(discount.eligibility, Eligibility::Member | Eligibility::All)
            })
            .max_by_key(|discount| discount.percentage);

        match best {
            Some(discount) => Ok(discount),
            None => Ok(self
                .find_discount(campus_core::PUBLIC_DISCOUNT_CODE)?
                .unwrap_or_else(Discount::public_default)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
