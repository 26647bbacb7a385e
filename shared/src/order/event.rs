//! Coupon events published after each committed change

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponEvent {
    /// A cart's coupon set was applied, appended, replaced or removed
    CouponsChanged {
        cart_id: String,
        coupon_codes: Vec<String>,
    },
    /// A source cart was merged into a destination cart
    CartsMerged {
        source_cart_id: String,
        destination_cart_id: String,
        coupon_codes: Vec<String>,
        /// Codes silently dropped by post-merge validation
        dropped_codes: Vec<String>,
    },
    /// Usage consumed for every applied rule
    OrderPlaced {
        order_id: String,
        cart_id: String,
        coupon_codes: Vec<String>,
    },
    /// Usage released for every applied rule
    OrderCancelled {
        order_id: String,
        coupon_codes: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialize_tagged() {
        let event = CouponEvent::OrderCancelled {
            order_id: "o-1".to_string(),
            coupon_codes: vec!["A".to_string()],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"ORDER_CANCELLED","order_id":"o-1","coupon_codes":["A"]}"#
        );
    }
}
