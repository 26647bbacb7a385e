use super::*;

#[test]
fn test_apply_preserves_order() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));

    let applied = manager.apply_coupons(&cart_id, codes(&["C", "A", "B"])).unwrap();
    assert_eq!(applied, codes(&["C", "A", "B"]));

    let cart = manager.get_cart(&cart_id).unwrap();
    assert_eq!(cart.coupon_codes, codes(&["C", "A", "B"]));
    assert_eq!(cart.coupon_code, None);
}

#[test]
fn test_max_coupons_scenario() {
    // MaxCoupons = 2: apply [A, B], append [C] fails, replace with [C] succeeds
    let (manager, _) = create_catalog_manager(2);
    let cart_id = create_cart_with_items(&manager, Some(1));

    manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap();

    let err = manager.append_coupons(&cart_id, codes(&["C"])).unwrap_err();
    assert!(matches!(err, CouponError::TooManyCoupons));
    assert_eq!(manager.get_cart(&cart_id).unwrap().coupon_codes, codes(&["A", "B"]));

    let replaced = manager.replace_coupons(&cart_id, codes(&["C"])).unwrap();
    assert_eq!(replaced, codes(&["C"]));
    let cart = manager.get_cart(&cart_id).unwrap();
    assert_eq!(cart.coupon_codes, codes(&["C"]));
    assert_eq!(cart.coupon_code.as_deref(), Some("C"));
}

#[test]
fn test_single_coupon_mode() {
    let (manager, _) = create_catalog_manager(1);
    let cart_id = create_cart_with_items(&manager, None);

    let err = manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap_err();
    assert!(matches!(err, CouponError::TooManyCoupons));
    assert!(manager.get_cart(&cart_id).unwrap().coupon_codes.is_empty());
}

#[test]
fn test_append_keeps_existing_order() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));

    manager.apply_coupons(&cart_id, codes(&["B"])).unwrap();
    let result = manager.append_coupons(&cart_id, codes(&["A"])).unwrap();
    assert_eq!(result, codes(&["B", "A"]));
}

#[test]
fn test_rejection_leaves_set_unchanged() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A"])).unwrap();

    let err = manager
        .append_coupons(&cart_id, codes(&["NOPE", "B"]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"The following coupon codes could not be applied: "NOPE"."#
    );
    assert_eq!(manager.get_cart(&cart_id).unwrap().coupon_codes, codes(&["A"]));
}

#[test]
fn test_duplicate_code_rejected() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A"])).unwrap();

    let err = manager.append_coupons(&cart_id, codes(&["A"])).unwrap_err();
    assert!(matches!(err, CouponError::CouponsNotApplicable(ref c) if c == &codes(&["A"])));
}

#[test]
fn test_one_coupon_per_rule() {
    let (manager, matcher) = create_catalog_manager(3);
    matcher.add_coupon("A-ALT", 1);
    let cart_id = create_cart_with_items(&manager, Some(1));

    let err = manager
        .apply_coupons(&cart_id, codes(&["A", "A-ALT"]))
        .unwrap_err();
    assert_eq!(err.codes(), codes(&["A-ALT"]).as_slice());
}

#[test]
fn test_stop_rule_rejects_later_codes() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));

    let err = manager
        .apply_coupons(&cart_id, codes(&["STOP", "A"]))
        .unwrap_err();
    assert_eq!(err.codes(), codes(&["A"]).as_slice());

    // Stop rule last is fine
    manager.apply_coupons(&cart_id, codes(&["A", "STOP"])).unwrap();
}

#[test]
fn test_append_after_stop_rule_rejected() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A", "STOP"])).unwrap();

    let err = manager.append_coupons(&cart_id, codes(&["B"])).unwrap_err();
    assert!(matches!(err, CouponError::CouponsNotApplicable(ref c) if c == &codes(&["B"])));
    assert_eq!(
        manager.get_cart(&cart_id).unwrap().coupon_codes,
        codes(&["A", "STOP"])
    );
}

#[test]
fn test_large_quantity_cart_accepts_coupons() {
    let (manager, _) = create_catalog_manager(3);
    let cart = manager.create_cart(Some(1), 1).unwrap();
    manager
        .add_items(
            &cart.id,
            vec![
                CartLine::new("bolt", "Bolt", dec!(0.01), u32::MAX),
                CartLine::new("nut", "Nut", dec!(0.01), 1),
            ],
        )
        .unwrap();
    // Re-adding the same SKU saturates the line
    let cart = manager
        .add_items(&cart.id, vec![CartLine::new("bolt", "Bolt", dec!(0.01), 1)])
        .unwrap();
    assert_eq!(cart.item_qty(), u64::from(u32::MAX) + 1);

    manager.apply_coupons(&cart.id, codes(&["C"])).unwrap();
    let totals = manager.collect_totals(&cart.id).unwrap();
    assert_eq!(totals.item_discount, dec!(3));
}

#[test]
fn test_empty_cart_rejected() {
    let (manager, _) = create_catalog_manager(3);
    let cart = manager.create_cart(Some(1), 1).unwrap();

    let err = manager.apply_coupons(&cart.id, codes(&["A"])).unwrap_err();
    assert!(matches!(err, CouponError::EmptyCart));
}

#[test]
fn test_usage_cap_checked_on_apply() {
    let (manager, matcher) = create_test_manager(3);
    matcher.add_rule_with_codes(capped_rule(9, Some(1), None), &["ONCE"]);

    let first = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&first, codes(&["ONCE"])).unwrap();
    manager.place_order(&first).unwrap();

    let second = create_cart_with_items(&manager, Some(2));
    let err = manager.apply_coupons(&second, codes(&["ONCE"])).unwrap_err();
    assert_eq!(err.codes(), codes(&["ONCE"]).as_slice());
}

#[test]
fn test_remove_is_idempotent() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap();

    let after = manager.remove_coupons(&cart_id, codes(&["A"])).unwrap();
    assert_eq!(after, codes(&["B"]));
    assert_eq!(manager.get_cart(&cart_id).unwrap().coupon_code.as_deref(), Some("B"));

    let again = manager.remove_coupons(&cart_id, codes(&["A"])).unwrap();
    assert_eq!(again, codes(&["B"]));

    // Unknown codes are ignored
    let unknown = manager.remove_coupons(&cart_id, codes(&["ZZZ"])).unwrap();
    assert_eq!(unknown, codes(&["B"]));
}

#[test]
fn test_remove_all_leaves_no_coupon() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap();

    assert!(manager.remove_all_coupons(&cart_id).unwrap().is_empty());
    assert!(manager.remove_all_coupons(&cart_id).unwrap().is_empty());

    let cart = manager.get_cart(&cart_id).unwrap();
    assert!(cart.coupon_codes.is_empty());
    assert_eq!(cart.coupon_code, None);
}

#[test]
fn test_remove_skips_validation() {
    let (manager, matcher) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap();

    // B's coupon disappears from the catalog; removing A still succeeds
    matcher.remove_coupon("B");
    let after = manager.remove_coupons(&cart_id, codes(&["A"])).unwrap();
    assert_eq!(after, codes(&["B"]));
}

#[test]
fn test_unknown_cart() {
    let (manager, _) = create_catalog_manager(3);
    let err = manager.apply_coupons("missing", codes(&["A"])).unwrap_err();
    assert!(matches!(err, CouponError::CartNotFound(ref id) if id == "missing"));
}

#[test]
fn test_collect_totals_sequential() {
    let (manager, _) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap();

    let totals = manager.collect_totals(&cart_id).unwrap();
    assert_eq!(totals.lines.len(), 2);
    assert_eq!(totals.lines[0].code, "A");
    assert_eq!(totals.lines[1].amount, dec!(4.50));
    assert_eq!(totals.grand_total, dec!(85.50));
}

#[test]
fn test_collect_totals_skips_unresolved_codes() {
    let (manager, matcher) = create_catalog_manager(3);
    let cart_id = create_cart_with_items(&manager, Some(1));
    manager.apply_coupons(&cart_id, codes(&["A", "B"])).unwrap();

    matcher.remove_coupon("A");
    let totals = manager.collect_totals(&cart_id).unwrap();
    assert_eq!(totals.lines.len(), 1);
    assert_eq!(totals.lines[0].code, "B");
    assert_eq!(totals.grand_total, dec!(95));
}

#[test]
fn test_coupon_events_broadcast() {
    let (manager, _) = create_catalog_manager(3);
    let mut rx = manager.subscribe();
    let cart_id = create_cart_with_items(&manager, Some(1));

    manager.apply_coupons(&cart_id, codes(&["A"])).unwrap();
    let _ = manager.append_coupons(&cart_id, codes(&["NOPE"]));

    let event = rx.try_recv().unwrap();
    assert_eq!(
        event,
        CouponEvent::CouponsChanged {
            cart_id: cart_id.clone(),
            coupon_codes: codes(&["A"]),
        }
    );
    // Rejected mutation publishes nothing
    assert!(rx.try_recv().is_err());
}
