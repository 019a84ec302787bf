//! # Transaction Manager
//!
//! Sale orchestration: validates the whole cart, computes the discounted
//! total, and commits the cross-file mutation set.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. stock check, every line item, against fresh product reads           │
//! │  2. discount code must resolve                                          │
//! │  3. customer must be a member or the PUBLIC sentinel                    │
//! │  4. redeemed points must not exceed the member's balance                │
//! │  5. total = Σ(price × qty), then percentage OFF the raw total           │
//! │  ─────────────────────── no writes above this line ──────────────────── │
//! │  6. commit: one shared id (max + 1), one transaction line per item,     │
//! │     stock deduction, loyalty adjustment (B − P + ⌊T / R⌋)               │
//! │  7. any write failure restores pre-commit images of all three files     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rollback restores raw file images captured before the first write, so even
//! corrupt-but-tolerated lines survive a failed sale byte for byte.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use campus_core::{
    Discount, LoyaltyPoints, Member, Money, Product, ProductId, SaleItem, Transaction,
    PUBLIC_CUSTOMER,
};

use crate::discount::DiscountManager;
use crate::error::TransactionError;
use crate::inventory::InventoryManager;
use crate::member::MemberManager;
use crate::record_store::RecordStore;

/// File name of the transaction collection.
const TRANSACTION_FILE: &str = "Transaction.dat";

/// Outcome of a committed sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Identifier shared by every line item of this sale.
    pub transaction_id: u64,

    /// Date of sale.
    pub date: NaiveDate,

    /// Total charged after the discount.
    pub total: Money,

    /// Loyalty points redeemed against this sale.
    pub points_redeemed: u32,

    /// Loyalty points earned from this sale.
    pub points_earned: u32,

    /// Member balance after the sale, absent for a walk-in customer.
    pub new_balance: Option<u32>,
}

/// The complete write set of a validated sale.
///
/// Built during checkout's validation phase so the commit phase only writes;
/// duplicate cart lines for one product collapse into a single entry of
/// `stock_updates`.
struct StagedSale<'a> {
    items: &'a [SaleItem],
    stock_updates: Vec<Product>,
    member_update: Option<Member>,
    customer_id: &'a str,
    total: Money,
    redeemed_points: u32,
    points_earned: u32,
    new_balance: Option<u32>,
}

/// Manages the transaction log and commits sales.
#[derive(Debug)]
pub struct TransactionManager {
    transactions: RecordStore<Transaction>,

    /// Currency units per one loyalty point earned.
    conversion_rate: i64,
}

impl TransactionManager {
    /// Opens the transaction store under `data_dir`.
    ///
    /// The conversion rate must be positive; every later loyalty computation
    /// divides by it.
    pub fn open(data_dir: &Path, conversion_rate: i64) -> io::Result<Self> {
        if conversion_rate <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "conversion rate must be a positive number of currency units per point",
            ));
        }
        Ok(TransactionManager {
            transactions: RecordStore::open(data_dir.join(TRANSACTION_FILE))?,
            conversion_rate,
        })
    }

    /// Lists every recorded line item.
    pub fn all_transactions(&self) -> Result<Vec<Transaction>, TransactionError> {
        Ok(self.transactions.get_all()?)
    }

    /// Line items dated within `[from, to]`, both ends inclusive.
    pub fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let transactions = self.transactions.get_all()?;
        Ok(transactions
            .into_iter()
            .filter(|transaction| transaction.date >= from && transaction.date <= to)
            .collect())
    }

    /// Discounted total of a cart: sum of line totals, then percentage off.
    pub fn sale_total(&self, items: &[SaleItem], discount: &Discount) -> Money {
        let raw: Money = items
            .iter()
            .fold(Money::zero(), |sum, item| sum + item.line_total());
        raw.percent_off(discount.percentage)
    }

    /// Validates and commits a sale.
    ///
    /// All validation happens against fresh reads before the first write; any
    /// failure leaves every file untouched. A write failure during the commit
    /// phase restores the transaction, product, and member files to their
    /// pre-commit images and surfaces the underlying error.
    ///
    /// ## Arguments
    /// * `items` — the cart; quantities are re-checked against current stock
    /// * `discount_code` — must resolve to an existing discount
    /// * `customer_id` — a member identifier, or [`PUBLIC_CUSTOMER`]
    /// * `redeemed_points` — loyalty points to redeem; must be 0 for a
    ///   walk-in customer
    #[allow(clippy::too_many_arguments)]
    pub fn checkout(
        &self,
        inventory: &InventoryManager,
        discounts: &DiscountManager,
        members: &MemberManager,
        items: &[SaleItem],
        discount_code: &str,
        customer_id: &str,
        redeemed_points: u32,
    ) -> Result<Receipt, TransactionError> {
        // Phase 1: validate everything against fresh reads and stage the
        // complete write set. No writes, and no fallible computation after
        // the first write.
        let mut checked_items = Vec::with_capacity(items.len());
        let mut stock_updates: Vec<Product> = Vec::new();
        let mut update_index: HashMap<ProductId, usize> = HashMap::new();
        for item in items {
            let product = inventory
                .find_product(&item.product.id)?
                .ok_or_else(|| TransactionError::RequestedQuantityMoreThanAvailable {
                    product: item.product.id.to_string(),
                    requested: item.quantity,
                    available: 0,
                })?;
            // Lines for the same product share one staged stock update, so
            // their quantities accumulate instead of overwriting each other.
            match update_index.get(&product.id) {
                Some(&index) => {
                    let staged = &mut stock_updates[index];
                    if item.quantity > staged.quantity {
                        return Err(TransactionError::RequestedQuantityMoreThanAvailable {
                            product: product.id.to_string(),
                            requested: product.quantity - staged.quantity + item.quantity,
                            available: product.quantity,
                        });
                    }
                    staged.quantity -= item.quantity;
                }
                None => {
                    if item.quantity > product.quantity {
                        return Err(TransactionError::RequestedQuantityMoreThanAvailable {
                            product: product.id.to_string(),
                            requested: item.quantity,
                            available: product.quantity,
                        });
                    }
                    update_index.insert(product.id.clone(), stock_updates.len());
                    stock_updates.push(product.with_quantity(product.quantity - item.quantity));
                }
            }
            checked_items.push(SaleItem::new(product, item.quantity));
        }

        let discount = discounts
            .find_discount(discount_code)?
            .ok_or_else(|| TransactionError::InvalidDiscountId(discount_code.to_string()))?;

        let member = self.resolve_customer(members, customer_id)?;
        let available = member
            .as_ref()
            .map(|member| member.loyalty_points.redeemable())
            .unwrap_or(0);
        if redeemed_points > available {
            return Err(TransactionError::InvalidLoyaltyPointsApplied {
                requested: redeemed_points,
                available,
            });
        }

        let total = self.sale_total(&checked_items, &discount);
        let (member_update, points_earned, new_balance) = match member {
            Some(member) => {
                let points_earned = self.points_earned(total);
                let balance = available - redeemed_points + points_earned;
                let mut updated = member;
                updated.loyalty_points = LoyaltyPoints::Balance(balance);
                (Some(updated), points_earned, Some(balance))
            }
            None => (None, 0, None),
        };
        debug!(customer_id, %total, "Cart validated");

        let staged = StagedSale {
            items: &checked_items,
            stock_updates,
            member_update,
            customer_id,
            total,
            redeemed_points,
            points_earned,
            new_balance,
        };

        // Phase 2: commit, with raw pre-images for rollback.
        let transaction_image = self.transactions.snapshot()?;
        let product_image = inventory.product_snapshot()?;
        let member_image = members.snapshot()?;

        match self.commit(inventory, members, &staged) {
            Ok(receipt) => {
                info!(
                    transaction_id = receipt.transaction_id,
                    customer_id,
                    total = %receipt.total,
                    "Committed sale"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(customer_id, error = %err, "Sale failed mid-commit, rolling back");
                // Attempt every restore even if one fails; the validation
                // error stays the caller-visible outcome.
                for (file, outcome) in [
                    ("transactions", self.transactions.restore(&transaction_image)),
                    ("products", inventory.product_restore(&product_image)),
                    ("members", members.restore(&member_image)),
                ] {
                    if let Err(restore_err) = outcome {
                        warn!(file, error = %restore_err, "Rollback write failed");
                    }
                }
                Err(err)
            }
        }
    }

    fn resolve_customer(
        &self,
        members: &MemberManager,
        customer_id: &str,
    ) -> Result<Option<Member>, TransactionError> {
        if customer_id == PUBLIC_CUSTOMER {
            return Ok(None);
        }
        members
            .find_member(customer_id)?
            .map(Some)
            .ok_or_else(|| TransactionError::InvalidMemberId(customer_id.to_string()))
    }

    /// Flushes a fully staged write set. Nothing in here computes; it only
    /// writes, so the rollback branch in [`checkout`](Self::checkout) covers
    /// every way this can go wrong.
    fn commit(
        &self,
        inventory: &InventoryManager,
        members: &MemberManager,
        staged: &StagedSale<'_>,
    ) -> Result<Receipt, TransactionError> {
        let transaction_id = self.next_transaction_id()?;
        let date = Utc::now().date_naive();

        for item in staged.items {
            self.transactions.add(&Transaction {
                id: transaction_id,
                product_id: item.product.id.clone(),
                customer_id: staged.customer_id.to_string(),
                quantity: item.quantity,
                date,
            })?;
        }
        for product in &staged.stock_updates {
            inventory.update_product_for_transaction(product)?;
        }
        if let Some(update) = &staged.member_update {
            members.update_member(update)?;
        }

        Ok(Receipt {
            transaction_id,
            date,
            total: staged.total,
            points_redeemed: staged.redeemed_points,
            points_earned: staged.points_earned,
            new_balance: staged.new_balance,
        })
    }

    /// Max existing identifier + 1, or 1 for an empty log.
    fn next_transaction_id(&self) -> Result<u64, TransactionError> {
        let max = self
            .transactions
            .get_all()?
            .iter()
            .map(|transaction| transaction.id)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    /// Points earned for a sale total: `floor(total / conversionRate)`.
    ///
    /// The rate was validated positive at open, so the division cannot trap
    /// and the result cannot go negative.
    fn points_earned(&self, total: Money) -> u32 {
        (total.cents() / (self.conversion_rate * 100)) as u32
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::{Category, Percentage, Product, ProductId, Record, PUBLIC_DISCOUNT_CODE};
    use chrono::Days;
    use tempfile::TempDir;

    use crate::error::MemberError;
    use crate::inventory::ProductDraft;

    fn open_manager(dir: &TempDir) -> TransactionManager {
        TransactionManager::open(dir.path(), 5).unwrap()
    }

    fn shirt(sequence: u32, price_cents: i64) -> Product {
        Product {
            id: ProductId::new("CLT", sequence),
            name: "Nike Cloths".to_string(),
            description: "Nike Cloths L size".to_string(),
            quantity: 50,
            price: Money::from_cents(price_cents),
            bar_code: format!("100{sequence}"),
            reorder_threshold: 10,
            reorder_quantity: 40,
        }
    }

    fn percent_off(bps: u32) -> Discount {
        Discount {
            code: "OPEN_DAY".to_string(),
            description: "Open day".to_string(),
            validity: campus_core::DiscountValidity::Always,
            percentage: Percentage::from_bps(bps),
            eligibility: campus_core::Eligibility::All,
        }
    }

    #[test]
    fn test_sale_total_applies_percentage_off() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        let items = vec![
            SaleItem::new(shirt(1, 5000), 2), // 100.00
            SaleItem::new(shirt(2, 2550), 4), // 102.00
        ];

        // 10% off 202.00 is 181.80, not 20.20.
        let total = manager.sale_total(&items, &percent_off(1000));
        assert_eq!(total, Money::from_cents(18_180));

        let undiscounted = manager.sale_total(&items, &Discount::public_default());
        assert_eq!(undiscounted, Money::from_cents(20_200));
    }

    #[test]
    fn test_points_earned_floors() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        // rate 5: 100.00 earns 20 points, 104.99 still earns 20.
        assert_eq!(manager.points_earned(Money::from_cents(10_000)), 20);
        assert_eq!(manager.points_earned(Money::from_cents(10_499)), 20);
        assert_eq!(manager.points_earned(Money::from_cents(499)), 0);
    }

    #[test]
    fn test_next_transaction_id_is_max_plus_one() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        assert_eq!(manager.next_transaction_id().unwrap(), 1);

        let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        for id in [3, 1] {
            manager
                .transactions
                .add(&Transaction {
                    id,
                    product_id: ProductId::new("CLT", 1),
                    customer_id: PUBLIC_CUSTOMER.to_string(),
                    quantity: 1,
                    date,
                })
                .unwrap();
        }
        assert_eq!(manager.next_transaction_id().unwrap(), 4);
    }

    #[test]
    fn test_transactions_between_is_inclusive() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        let base = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        for (id, offset) in [(1, 0), (2, 5), (3, 10)] {
            manager
                .transactions
                .add(&Transaction {
                    id,
                    product_id: ProductId::new("CLT", 1),
                    customer_id: PUBLIC_CUSTOMER.to_string(),
                    quantity: 1,
                    date: base + Days::new(offset),
                })
                .unwrap();
        }

        let hits = manager
            .transactions_between(base, base + Days::new(5))
            .unwrap();
        assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);

        let all = manager
            .transactions_between(base, base + Days::new(10))
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_open_rejects_non_positive_rate() {
        let dir = TempDir::new().unwrap();
        for rate in [0, -5] {
            let err = TransactionManager::open(dir.path(), rate).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
        assert!(TransactionManager::open(dir.path(), 1).is_ok());
    }

    #[test]
    fn test_failed_commit_restores_all_files() {
        let dir = TempDir::new().unwrap();
        let inventory = InventoryManager::open(dir.path()).unwrap();
        let discounts = DiscountManager::open(dir.path()).unwrap();
        let members = MemberManager::open(dir.path()).unwrap();
        let manager = open_manager(&dir);

        inventory
            .add_category(&Category::new("CLT", "Clothing"))
            .unwrap();
        let product = inventory
            .add_product(
                "CLT",
                &ProductDraft {
                    name: "Nike Cloths".to_string(),
                    description: "Nike Cloths L size".to_string(),
                    quantity: 50,
                    price: Money::from_cents(5000),
                    bar_code: "1001".to_string(),
                    reorder_threshold: 10,
                    reorder_quantity: 40,
                },
            )
            .unwrap();
        members
            .add_member(&Member::new("ABZW123KL", "Zara Khan"))
            .unwrap();

        let transaction_image = std::fs::read_to_string(dir.path().join(TRANSACTION_FILE)).unwrap();
        let product_image = std::fs::read_to_string(dir.path().join("Product.dat")).unwrap();
        let member_image = std::fs::read_to_string(dir.path().join("Member.dat")).unwrap();

        // The member update is the last commit write; failing it leaves the
        // transaction and product files already mutated.
        members.store().fail_next_write();
        let result = manager.checkout(
            &inventory,
            &discounts,
            &members,
            &[SaleItem::new(product.clone(), 2)],
            PUBLIC_DISCOUNT_CODE,
            "ABZW123KL",
            0,
        );
        assert!(matches!(
            result,
            Err(TransactionError::Member(MemberError::Unknown(_)))
        ));

        // Rollback put every file back byte for byte.
        assert_eq!(
            std::fs::read_to_string(dir.path().join(TRANSACTION_FILE)).unwrap(),
            transaction_image
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Product.dat")).unwrap(),
            product_image
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Member.dat")).unwrap(),
            member_image
        );
        assert_eq!(
            inventory.find_product(&product.id).unwrap().unwrap().quantity,
            50
        );
        assert!(manager.all_transactions().unwrap().is_empty());
    }

    #[test]
    fn test_transaction_line_round_trip() {
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
}
