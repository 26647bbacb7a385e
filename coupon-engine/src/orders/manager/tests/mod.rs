use super::*;
use crate::pricing::CatalogRuleMatcher;
use crate::testing::{make_rule, make_stop_rule};
use rust_decimal_macros::dec;
use shared::models::{ActionType, CouponRule};

fn create_test_manager(max_coupons: usize) -> (CouponManager, Arc<CatalogRuleMatcher>) {
    let storage = CouponStorage::open_in_memory().unwrap();
    let matcher = Arc::new(CatalogRuleMatcher::new());
    let manager = CouponManager::with_storage(storage, matcher.clone(), max_coupons, 2);
    (manager, matcher)
}

/// Manager with rules A (10%), B (5%), C (3 off) and STOP (20%, stops processing)
fn create_catalog_manager(max_coupons: usize) -> (CouponManager, Arc<CatalogRuleMatcher>) {
    let (manager, matcher) = create_test_manager(max_coupons);
    matcher.add_rule_with_codes(make_rule(1, ActionType::ByPercent, dec!(10)), &["A"]);
    matcher.add_rule_with_codes(make_rule(2, ActionType::ByPercent, dec!(5)), &["B"]);
    matcher.add_rule_with_codes(make_rule(3, ActionType::CartFixed, dec!(3)), &["C"]);
    matcher.add_rule_with_codes(make_stop_rule(4, ActionType::ByPercent, dec!(20)), &["STOP"]);
    (manager, matcher)
}

/// Cart with a single 100.00 line
fn create_cart_with_items(manager: &CouponManager, customer_id: Option<i64>) -> String {
    let cart = manager.create_cart(customer_id, 1).unwrap();
    manager
        .add_items(&cart.id, vec![CartLine::new("sku-1", "Widget", dec!(100), 1)])
        .unwrap();
    cart.id
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

fn capped_rule(id: i64, per_coupon: Option<u32>, per_customer: Option<u32>) -> CouponRule {
    let mut rule = make_rule(id, ActionType::ByPercent, dec!(10));
    rule.uses_per_coupon = per_coupon;
    rule.uses_per_customer = per_customer;
    rule
}

mod test_coupons;
