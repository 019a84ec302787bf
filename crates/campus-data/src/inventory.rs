//! # Inventory Manager
//!
//! Categories, products, and per-category vendor lists.
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  data/Category.dat     one line per category                            │
//! │  data/Product.dat      one line per product, all categories mixed       │
//! │  data/VendorCLT.dat    vendors of category CLT (one file per category)  │
//! │  data/VendorSHO.dat    vendors of category SHO                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product identifiers are `{categoryCode}/{sequence}` where the sequence is
//! 1 + the highest sequence ever used under that category. Sequences are never
//! reused, even after deletions, so identifiers stay unique for the lifetime
//! of the store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use campus_core::validation;
use campus_core::{Category, Money, Product, ProductId, Record, Vendor};

use crate::error::InventoryError;
use crate::record_store::{RecordStore, FILE_EXTENSION};

/// File name of the category collection.
const CATEGORY_FILE: &str = "Category.dat";

/// File name of the product collection.
const PRODUCT_FILE: &str = "Product.dat";

/// Prefix of per-category vendor files (`Vendor{CODE}.dat`).
const VENDOR_FILE_PREFIX: &str = "Vendor";

/// Fields of a product before an identifier has been generated for it.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub price: Money,
    pub bar_code: String,
    pub reorder_threshold: u32,
    pub reorder_quantity: u32,
}

/// Manages the category, product, and vendor collections.
#[derive(Debug)]
pub struct InventoryManager {
    categories: RecordStore<Category>,
    products: RecordStore<Product>,
    data_dir: PathBuf,
}

impl InventoryManager {
    /// Opens the category and product stores under `data_dir`. Vendor stores
    /// are opened per category as needed.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        Ok(InventoryManager {
            categories: RecordStore::open(data_dir.join(CATEGORY_FILE))?,
            products: RecordStore::open(data_dir.join(PRODUCT_FILE))?,
            data_dir: data_dir.to_path_buf(),
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Lists every category.
    pub fn all_categories(&self) -> Result<Vec<Category>, InventoryError> {
        Ok(self.categories.get_all()?)
    }

    /// Looks a category up by code.
    pub fn find_category(&self, code: &str) -> Result<Option<Category>, InventoryError> {
        let categories = self.categories.get_all()?;
        Ok(categories.into_iter().find(|category| category.code == code))
    }

    /// Whether a category with the given code exists.
    pub fn has_category(&self, code: &str) -> Result<bool, InventoryError> {
        Ok(self.find_category(code)?.is_some())
    }

    /// Adds a category with a unique code, creating its empty vendor store.
    pub fn add_category(&self, category: &Category) -> Result<(), InventoryError> {
        validation::validate_category_code(&category.code)?;
        validation::validate_name(&category.name)?;
        if self.has_category(&category.code)? {
            return Err(InventoryError::CategoryAlreadyPresent(category.code.clone()));
        }
        self.categories.add(category)?;
        self.vendor_store(&category.code)?;
        debug!(code = %category.code, "Added category");
        Ok(())
    }

    /// Renames a category in place. The code is the key and cannot change.
    pub fn update_category(&self, category: &Category) -> Result<(), InventoryError> {
        validation::validate_name(&category.name)?;
        let existing = self
            .find_category(&category.code)?
            .ok_or_else(|| InventoryError::CategoryNotAvailable(category.code.clone()))?;
        self.categories.replace(&existing.encode(), category)?;
        debug!(code = %category.code, "Updated category");
        Ok(())
    }

    /// Removes a category and its vendor store.
    ///
    /// All vendors under the category must be removed first.
    pub fn delete_category(&self, code: &str) -> Result<(), InventoryError> {
        let existing = self
            .find_category(code)?
            .ok_or_else(|| InventoryError::CategoryNotAvailable(code.to_string()))?;
        if !self.all_vendors(code)?.is_empty() {
            return Err(InventoryError::CategoryHasVendors(code.to_string()));
        }
        fs::remove_file(self.vendor_path(code))?;
        self.categories.delete(&existing.encode())?;
        debug!(code, "Deleted category");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Lists every product across all categories.
    pub fn all_products(&self) -> Result<Vec<Product>, InventoryError> {
        Ok(self.products.get_all()?)
    }

    /// Looks a product up by identifier. Linear scan, first match.
    pub fn find_product(&self, id: &ProductId) -> Result<Option<Product>, InventoryError> {
        let products = self.products.get_all()?;
        Ok(products.into_iter().find(|product| product.id == *id))
    }

    /// Looks a product up by bar code. Linear scan, first match.
    pub fn find_product_by_bar_code(
        &self,
        bar_code: &str,
    ) -> Result<Option<Product>, InventoryError> {
        let products = self.products.get_all()?;
        Ok(products
            .into_iter()
            .find(|product| product.bar_code == bar_code))
    }

    /// Adds a product under an existing category, generating its identifier.
    ///
    /// The sequence number is 1 + the highest ever used under the category,
    /// so deleting a product never frees its identifier for reuse.
    pub fn add_product(
        &self,
        category_code: &str,
        draft: &ProductDraft,
    ) -> Result<Product, InventoryError> {
        validation::validate_name(&draft.name)?;
        validation::validate_description(&draft.description)?;
        validation::validate_bar_code(&draft.bar_code)?;
        if !self.has_category(category_code)? {
            return Err(InventoryError::CategoryNotAvailable(
                category_code.to_string(),
            ));
        }
        if self.find_product_by_bar_code(&draft.bar_code)?.is_some() {
            return Err(InventoryError::ProductBarCodeExists(draft.bar_code.clone()));
        }

        let next_sequence = self
            .products
            .get_all()?
            .iter()
            .filter(|product| product.id.category_code == category_code)
            .map(|product| product.id.sequence)
            .max()
            .unwrap_or(0)
            + 1;

        let product = Product {
            id: ProductId::new(category_code, next_sequence),
            name: draft.name.clone(),
            description: draft.description.clone(),
            quantity: draft.quantity,
            price: draft.price,
            bar_code: draft.bar_code.clone(),
            reorder_threshold: draft.reorder_threshold,
            reorder_quantity: draft.reorder_quantity,
        };
        self.products.add(&product)?;
        debug!(id = %product.id, "Added product");
        Ok(product)
    }

    /// Updates a product in place, re-checking bar code uniqueness.
    ///
    /// The check is store-wide and does not exempt the product's own record,
    /// so an update that keeps the bar code unchanged is rejected. Sale
    /// commits therefore use [`update_product_for_transaction`] instead.
    ///
    /// [`update_product_for_transaction`]: Self::update_product_for_transaction
    pub fn update_product(&self, product: &Product) -> Result<(), InventoryError> {
        if self.find_product_by_bar_code(&product.bar_code)?.is_some() {
            return Err(InventoryError::ProductBarCodeExists(
                product.bar_code.clone(),
            ));
        }
        self.update_product_for_transaction(product)
    }

    /// Updates a product in place without the bar code re-check.
    pub fn update_product_for_transaction(
        &self,
        product: &Product,
    ) -> Result<(), InventoryError> {
        validation::validate_name(&product.name)?;
        validation::validate_description(&product.description)?;
        let existing = self
            .find_product(&product.id)?
            .ok_or_else(|| InventoryError::ProductNotAvailable(product.id.to_string()))?;
        self.products.replace(&existing.encode(), product)?;
        debug!(id = %product.id, "Updated product");
        Ok(())
    }

    /// Removes a product. Its sequence number is never reused.
    pub fn delete_product(&self, id: &ProductId) -> Result<(), InventoryError> {
        let existing = self
            .find_product(id)?
            .ok_or_else(|| InventoryError::ProductNotAvailable(id.to_string()))?;
        self.products.delete(&existing.encode())?;
        debug!(%id, "Deleted product");
        Ok(())
    }

    /// Products in need of restocking (quantity at or below the threshold).
    ///
    /// Fails with [`InventoryError::ZeroProducts`] when the store holds no
    /// products at all, so callers can tell "nothing stocked yet" apart from
    /// "everything sufficiently stocked".
    pub fn products_below_threshold(&self) -> Result<Vec<Product>, InventoryError> {
        let products = self.products.get_all()?;
        if products.is_empty() {
            return Err(InventoryError::ZeroProducts);
        }
        Ok(products
            .into_iter()
            .filter(Product::is_below_threshold)
            .collect())
    }

    // =========================================================================
    // Vendors
    // =========================================================================

    /// Lists the vendors of a category.
    pub fn all_vendors(&self, category_code: &str) -> Result<Vec<Vendor>, InventoryError> {
        Ok(self.require_vendor_store(category_code)?.get_all()?)
    }

    /// Vendors able to supply a product: the vendor list of its owning
    /// category.
    pub fn vendors_for_product(&self, id: &ProductId) -> Result<Vec<Vendor>, InventoryError> {
        let product = self
            .find_product(id)?
            .ok_or_else(|| InventoryError::ProductNotAvailable(id.to_string()))?;
        self.all_vendors(&product.id.category_code)
    }

    /// Looks a vendor up by name under a category.
    pub fn find_vendor(
        &self,
        category_code: &str,
        name: &str,
    ) -> Result<Option<Vendor>, InventoryError> {
        let vendors = self.all_vendors(category_code)?;
        Ok(vendors.into_iter().find(|vendor| vendor.name == name))
    }

    /// Adds a vendor under an existing category.
    pub fn add_vendor(
        &self,
        category_code: &str,
        vendor: &Vendor,
    ) -> Result<(), InventoryError> {
        validation::validate_name(&vendor.name)?;
        validation::validate_description(&vendor.description)?;
        self.require_vendor_store(category_code)?.add(vendor)?;
        debug!(category_code, vendor = %vendor.name, "Added vendor");
        Ok(())
    }

    /// Removes a vendor from a category.
    pub fn delete_vendor(&self, category_code: &str, name: &str) -> Result<(), InventoryError> {
        let existing = self
            .find_vendor(category_code, name)?
            .ok_or_else(|| InventoryError::VendorNotAvailable(name.to_string()))?;
        self.require_vendor_store(category_code)?
            .delete(&existing.encode())?;
        debug!(category_code, vendor = name, "Deleted vendor");
        Ok(())
    }

    /// Removes every vendor of a category, keeping the file.
    pub fn delete_all_vendors(&self, category_code: &str) -> Result<(), InventoryError> {
        self.require_vendor_store(category_code)?.delete_all()?;
        debug!(category_code, "Cleared vendors");
        Ok(())
    }

    fn vendor_path(&self, category_code: &str) -> PathBuf {
        self.data_dir
            .join(format!("{VENDOR_FILE_PREFIX}{category_code}{FILE_EXTENSION}"))
    }

    fn vendor_store(&self, category_code: &str) -> io::Result<RecordStore<Vendor>> {
        RecordStore::open(self.vendor_path(category_code))
    }

    fn require_vendor_store(
        &self,
        category_code: &str,
    ) -> Result<RecordStore<Vendor>, InventoryError> {
        if !self.has_category(category_code)? {
            return Err(InventoryError::CategoryNotAvailable(
                category_code.to_string(),
            ));
        }
        Ok(self.vendor_store(category_code)?)
    }

    /// Raw image of the product file, for checkout rollback.
    pub(crate) fn product_snapshot(&self) -> io::Result<Vec<String>> {
        self.products.snapshot()
    }

    /// Restores a raw image captured by [`product_snapshot`](Self::product_snapshot).
    pub(crate) fn product_restore(&self, image: &[String]) -> io::Result<()> {
        self.products.restore(image)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_manager(dir: &TempDir) -> InventoryManager {
        InventoryManager::open(dir.path()).unwrap()
    }

    fn shirt_draft(bar_code: &str) -> ProductDraft {
        ProductDraft {
            name: "Nike Cloths".to_string(),
            description: "Nike Cloths L size".to_string(),
            quantity: 50,
            price: Money::from_cents(5000),
            bar_code: bar_code.to_string(),
            reorder_threshold: 10,
            reorder_quantity: 40,
        }
    }

    #[test]
    fn test_add_category_creates_vendor_store() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();

        assert!(manager.has_category("CLT").unwrap());
        assert!(dir.path().join("VendorCLT.dat").exists());
        assert!(manager.all_vendors("CLT").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_category_code_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();

        let result = manager.add_category(&Category::new("CLT", "Other"));
        assert!(matches!(
            result,
            Err(InventoryError::CategoryAlreadyPresent(_))
        ));
        assert_eq!(manager.all_categories().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_category_code_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        assert!(matches!(
            manager.add_category(&Category::new("cl", "Clothes")),
            Err(InventoryError::Invalid(_))
        ));
        assert!(matches!(
            manager.add_category(&Category::new("CLTS", "Clothes")),
            Err(InventoryError::Invalid(_))
        ));
    }

    #[test]
    fn test_update_category_name() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();

        manager
            .update_category(&Category::new("CLT", "Campus Clothes"))
            .unwrap();

        let stored = manager.find_category("CLT").unwrap().unwrap();
        assert_eq!(stored.name, "Campus Clothes");
    }

    #[test]
    fn test_delete_category_requires_empty_vendor_list() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();
        manager
            .add_vendor("CLT", &Vendor::new("Campus Prints", "Bulk supplier"))
            .unwrap();

        assert!(matches!(
            manager.delete_category("CLT"),
            Err(InventoryError::CategoryHasVendors(_))
        ));

        manager.delete_all_vendors("CLT").unwrap();
        manager.delete_category("CLT").unwrap();
        assert!(!manager.has_category("CLT").unwrap());
        assert!(!dir.path().join("VendorCLT.dat").exists());
    }

    #[test]
    fn test_product_sequence_monotonic_after_delete() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();

        let first = manager.add_product("CLT", &shirt_draft("1001")).unwrap();
        assert_eq!(first.id.to_string(), "CLT/1");

        let second = manager.add_product("CLT", &shirt_draft("1002")).unwrap();
        assert_eq!(second.id.to_string(), "CLT/2");

        manager.delete_product(&first.id).unwrap();
        let third = manager.add_product("CLT", &shirt_draft("1003")).unwrap();
        assert_eq!(third.id.to_string(), "CLT/3");
    }

    #[test]
    fn test_add_product_requires_category() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        let result = manager.add_product("CLT", &shirt_draft("1001"));
        assert!(matches!(
            result,
            Err(InventoryError::CategoryNotAvailable(_))
        ));
    }

    #[test]
    fn test_bar_code_unique_store_wide() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();
        manager.add_category(&Category::new("SHO", "Shoes")).unwrap();
        manager.add_product("CLT", &shirt_draft("1001")).unwrap();

        let result = manager.add_product("SHO", &shirt_draft("1001"));
        assert!(matches!(
            result,
            Err(InventoryError::ProductBarCodeExists(_))
        ));
    }

    #[test]
    fn test_find_product_by_bar_code() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();
        let added = manager.add_product("CLT", &shirt_draft("1001")).unwrap();

        let found = manager.find_product_by_bar_code("1001").unwrap().unwrap();
        assert_eq!(found, added);
        assert!(manager.find_product_by_bar_code("9999").unwrap().is_none());
    }

    #[test]
    fn test_update_product_rejects_unchanged_bar_code() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();
        let product = manager.add_product("CLT", &shirt_draft("1001")).unwrap();

        // The store-wide check sees the product's own record.
        let result = manager.update_product(&product.with_quantity(40));
        assert!(matches!(
            result,
            Err(InventoryError::ProductBarCodeExists(_))
        ));

        // The transaction variant applies the same change without the check.
        manager
            .update_product_for_transaction(&product.with_quantity(40))
            .unwrap();
        assert_eq!(
            manager.find_product(&product.id).unwrap().unwrap().quantity,
            40
        );
    }

    #[test]
    fn test_products_below_threshold() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();

        assert!(matches!(
            manager.products_below_threshold(),
            Err(InventoryError::ZeroProducts)
        ));

        let mut at_threshold = shirt_draft("1001");
        at_threshold.quantity = 10;
        let mut above_threshold = shirt_draft("1002");
        above_threshold.quantity = 11;
        let low = manager.add_product("CLT", &at_threshold).unwrap();
        manager.add_product("CLT", &above_threshold).unwrap();

        let report = manager.products_below_threshold().unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, low.id);
    }

    #[test]
    fn test_vendor_crud() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();

        let vendor = Vendor::new("Campus Prints", "Bulk supplier, on demand");
        manager.add_vendor("CLT", &vendor).unwrap();

        assert_eq!(
            manager.find_vendor("CLT", "Campus Prints").unwrap(),
            Some(vendor)
        );

        manager.delete_vendor("CLT", "Campus Prints").unwrap();
        assert!(manager.find_vendor("CLT", "Campus Prints").unwrap().is_none());
        assert!(matches!(
            manager.delete_vendor("CLT", "Campus Prints"),
            Err(InventoryError::VendorNotAvailable(_))
        ));
    }

    #[test]
    fn test_vendors_for_product_resolve_through_category() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_category(&Category::new("CLT", "Clothes")).unwrap();
        let product = manager.add_product("CLT", &shirt_draft("1001")).unwrap();
        let vendor = Vendor::new("Campus Prints", "Bulk supplier");
        manager.add_vendor("CLT", &vendor).unwrap();

        assert_eq!(manager.vendors_for_product(&product.id).unwrap(), vec![vendor]);
        assert!(matches!(
            manager.vendors_for_product(&ProductId::new("CLT", 99)),
            Err(InventoryError::ProductNotAvailable(_))
        ));
    }

    #[test]
    fn test_vendor_operations_require_category() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        let result = manager.add_vendor("CLT", &Vendor::new("Campus Prints", "Bulk"));
        assert!(matches!(
            result,
            Err(InventoryError::CategoryNotAvailable(_))
        ));
    }
}
