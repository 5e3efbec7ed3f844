//! The storefront smoke suite.
//!
//! Seed cases create the prerequisite resources; their bodies need
//! identifiers captured by the seeds before them, so each is built only once
//! those exist. The test cases are assembled afterwards with a
//! [`SuiteBuilder`] that appends a case only when its prerequisites were
//! captured, or when a preceding case will capture them.

use serde_json::json;
use storecheck_domain::{
    CaptureRule, CapturedIds, DomainResult, HttpMethod, Role, StatusExpectation, TestCase,
};

/// Identifier captured by the category seed.
pub const CATEGORY_ID: &str = "categoryId";
/// Identifier captured by the product seed.
pub const PRODUCT_ID: &str = "productId";
/// Identifier captured by the cart seed.
pub const CART_ITEM_ID: &str = "cartItemId";
/// Identifier captured by the first order seed.
pub const ORDER_ID: &str = "orderId";
/// Identifier captured by the second order seed.
pub const SECOND_ORDER_ID: &str = "orderId2";
/// Identifier captured from the wishlist listing.
pub const WISHLIST_ITEM_ID: &str = "wishlistItemId";

/// Appends case descriptors in execution order.
#[derive(Debug, Default)]
pub struct SuiteBuilder {
    cases: Vec<TestCase>,
}

impl SuiteBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a case.
    #[must_use]
    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Appends a case only if `name` has been captured.
    #[must_use]
    pub fn case_if_captured(self, ids: &CapturedIds, name: &str, case: TestCase) -> Self {
        if ids.contains(name) {
            self.case(case)
        } else {
            tracing::debug!(identifier = name, path = %case.path, "prerequisite missing, case omitted");
            self
        }
    }

    /// Returns the cases in append order.
    #[must_use]
    pub fn build(self) -> Vec<TestCase> {
        self.cases
    }
}

/// A prerequisite resource to create before the suite runs.
#[derive(Debug, Clone)]
pub struct SeedCase {
    /// Name used in logs and errors, e.g. `product`.
    pub resource: &'static str,
    /// Create call; carries the capture rule for the new identifier.
    pub case: TestCase,
    /// Whether a failure aborts the run.
    pub required: bool,
}

/// Builds the category seed. Optional: products may have no category.
#[must_use]
pub fn category_seed() -> SeedCase {
    SeedCase {
        resource: "category",
        case: TestCase::new(
            Role::Admin,
            HttpMethod::Post,
            "/api/categories",
            StatusExpectation::created(),
        )
        .with_json(json!({"name": "Test Category"}))
        .capturing(CaptureRule::object(CATEGORY_ID)),
        required: false,
    }
}

/// Builds the product seed, attaching the category when one was created.
#[must_use]
pub fn product_seed(ids: &CapturedIds) -> SeedCase {
    SeedCase {
        resource: "product",
        case: TestCase::new(
            Role::Admin,
            HttpMethod::Post,
            "/api/products",
            StatusExpectation::created(),
        )
        .with_json(json!({
            "name": "Vexo Tee",
            "description": "Y2K glass tee",
            "price": 19.99,
            "stock": 5,
            "categoryId": ids.get(CATEGORY_ID),
        }))
        .capturing(CaptureRule::object(PRODUCT_ID)),
        required: true,
    }
}

/// Builds the cart seed.
///
/// # Errors
///
/// Returns an error if the product was not captured.
pub fn cart_seed(ids: &CapturedIds) -> DomainResult<SeedCase> {
    let product_id = ids.require(PRODUCT_ID)?;
    Ok(SeedCase {
        resource: "cart item",
        case: TestCase::new(
            Role::Customer,
            HttpMethod::Post,
            "/api/cart",
            StatusExpectation::created(),
        )
        .with_json(json!({"productId": product_id, "quantity": 2}))
        .capturing(CaptureRule::object(CART_ITEM_ID)),
        required: true,
    })
}

/// Builds an order seed capturing its identifier under `capture_as`.
///
/// # Errors
///
/// Returns an error if the product was not captured.
pub fn order_seed(ids: &CapturedIds, capture_as: &str) -> DomainResult<SeedCase> {
    let product_id = ids.require(PRODUCT_ID)?;
    Ok(SeedCase {
        resource: "order",
        case: TestCase::new(
            Role::Customer,
            HttpMethod::Post,
            "/api/orders",
            StatusExpectation::created(),
        )
        .with_json(json!({"items": [{"productId": product_id, "quantity": 1}]}))
        .capturing(CaptureRule::object(capture_as)),
        required: true,
    })
}

/// Builds the test cases once seeding has finished.
///
/// # Errors
///
/// Returns an error if the product was not captured.
pub fn storefront_cases(ids: &CapturedIds) -> DomainResult<Vec<TestCase>> {
    use HttpMethod::{Delete, Get, Patch, Post};
    use Role::{Admin, Customer};

    let ok = || StatusExpectation::exact(200);
    let product_id = ids.require(PRODUCT_ID)?;

    let builder = SuiteBuilder::new()
        // Categories
        .case(TestCase::new(Customer, Get, "/api/categories", ok()))
        .case_if_captured(
            ids,
            CATEGORY_ID,
            TestCase::new(Admin, Patch, "/api/categories/{categoryId}", ok())
                .with_json(json!({"name": "Test Cat Renamed"})),
        )
        .case(
            TestCase::new(Customer, Post, "/api/categories", StatusExpectation::forbidden())
                .with_json(json!({"name": "Nope"})),
        )
        // Products
        .case(TestCase::new(Customer, Get, "/api/products", ok()))
        .case(TestCase::new(Customer, Get, "/api/products/{productId}", ok()))
        .case(
            TestCase::new(Admin, Patch, "/api/products/{productId}", ok())
                .with_json(json!({"stock": 7, "price": 21.5})),
        )
        .case(
            TestCase::new(Customer, Post, "/api/products", StatusExpectation::forbidden())
                .with_json(json!({"name": "Nope", "price": 1})),
        )
        // Wishlist
        .case(
            TestCase::new(Customer, Post, "/api/wishlist", StatusExpectation::created())
                .with_json(json!({"productId": product_id})),
        )
        .case(
            TestCase::new(Customer, Get, "/api/wishlist", ok())
                .capturing(CaptureRule::first_item(WISHLIST_ITEM_ID)),
        )
        .case(TestCase::new(Customer, Delete, "/api/wishlist/{wishlistItemId}", ok()))
        // Cart
        .case(TestCase::new(Customer, Get, "/api/cart", ok()))
        .case(
            TestCase::new(Customer, Patch, "/api/cart/{cartItemId}", ok())
                .with_json(json!({"quantity": 1})),
        )
        .case(TestCase::new(Customer, Delete, "/api/cart/{cartItemId}", ok()))
        // Orders
        .case(TestCase::new(Customer, Get, "/api/orders", ok()))
        .case(TestCase::new(Customer, Get, "/api/orders/{orderId}", ok()))
        .case(TestCase::new(Customer, Post, "/api/orders/cancel/{orderId}", ok()))
        // Shipments & receipts
        .case(
            TestCase::new(Customer, Post, "/api/shipments/{orderId2}", StatusExpectation::forbidden())
                .with_json(json!({"carrier": "UPS", "trackingNumber": "TEST123"})),
        )
        .case(
            TestCase::new(Admin, Post, "/api/shipments/{orderId2}", StatusExpectation::created())
                .with_json(json!({"carrier": "UPS", "trackingNumber": "TEST123"})),
        )
        .case(
            TestCase::new(Admin, Patch, "/api/shipments/{orderId2}", ok())
                .with_json(json!({"status": "in_transit"})),
        )
        .case(
            TestCase::new(Admin, Post, "/api/receipts/{orderId2}", StatusExpectation::created())
                .with_json(json!({"pdfUrl": "https://example.com/r.pdf"})),
        )
        // Admin stats
        .case(TestCase::new(Customer, Get, "/api/admin/stats", StatusExpectation::forbidden()))
        .case(TestCase::new(Admin, Get, "/api/admin/stats", ok()));

    Ok(builder.build())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seeded(with_category: bool) -> CapturedIds {
        let mut ids = CapturedIds::new();
        if with_category {
            ids.capture(CATEGORY_ID, "c1").unwrap();
        }
        ids.capture(PRODUCT_ID, "p1").unwrap();
        ids.capture(CART_ITEM_ID, "ci1").unwrap();
        ids.capture(ORDER_ID, "o1").unwrap();
        ids.capture(SECOND_ORDER_ID, "o2").unwrap();
        ids
    }

    fn position(cases: &[TestCase], method: HttpMethod, path: &str) -> usize {
        cases
            .iter()
            .position(|c| c.method == method && c.path.as_str() == path)
            .unwrap()
    }

    #[test]
    fn test_category_patch_needs_category() {
        let with = storefront_cases(&seeded(true)).unwrap();
        let without = storefront_cases(&seeded(false)).unwrap();
        assert_eq!(with.len(), without.len() + 1);
        assert!(
            without
                .iter()
                .all(|c| c.path.as_str() != "/api/categories/{categoryId}")
        );
    }

    #[test]
    fn test_cart_patch_before_delete() {
        let cases = storefront_cases(&seeded(true)).unwrap();
        let patch = position(&cases, HttpMethod::Patch, "/api/cart/{cartItemId}");
        let delete = position(&cases, HttpMethod::Delete, "/api/cart/{cartItemId}");
        assert!(patch < delete);
    }

    #[test]
    fn test_wishlist_listing_captures_before_delete() {
        let cases = storefront_cases(&seeded(true)).unwrap();
        let listing = position(&cases, HttpMethod::Get, "/api/wishlist");
        let delete = position(&cases, HttpMethod::Delete, "/api/wishlist/{wishlistItemId}");
        assert_eq!(listing + 1, delete);
        assert_eq!(
            cases[listing].capture,
            Some(CaptureRule::first_item(WISHLIST_ITEM_ID))
        );
    }

    #[test]
    fn test_admin_only_writes_have_forbidden_customer_twin() {
        let cases = storefront_cases(&seeded(true)).unwrap();
        for (method, path) in [
            (HttpMethod::Post, "/api/categories"),
            (HttpMethod::Post, "/api/products"),
            (HttpMethod::Post, "/api/shipments/{orderId2}"),
            (HttpMethod::Get, "/api/admin/stats"),
        ] {
            let customer = &cases[position(&cases, method, path)];
            assert_eq!(customer.role, Role::Customer, "{path}");
            assert_eq!(customer.expected, StatusExpectation::forbidden(), "{path}");
        }
        let shipment_admin = position(&cases, HttpMethod::Post, "/api/shipments/{orderId2}");
        assert_eq!(cases[shipment_admin].role, Role::Customer);
        assert_eq!(cases[shipment_admin + 1].role, Role::Admin);
        assert_eq!(cases[shipment_admin + 1].expected, StatusExpectation::created());
    }

    #[test]
    fn test_seeds_need_product() {
        let ids = CapturedIds::new();
        assert!(cart_seed(&ids).is_err());
        assert!(order_seed(&ids, ORDER_ID).is_err());
        assert!(storefront_cases(&ids).is_err());
    }

    #[test]
    fn test_product_seed_without_category() {
        let seed = product_seed(&CapturedIds::new());
        assert!(seed.required);
        assert_eq!(seed.case.body.unwrap()["categoryId"], serde_json::Value::Null);
        assert!(!category_seed().required);
    }
}
