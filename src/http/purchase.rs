//! Purchase detection in outbound order responses.

use serde::Deserialize;

/// Micro-dollars in one cent.
pub const MICROS_PER_CENT: u64 = 10_000;

/// Aggregate of one completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub items: u64,
    /// Order total in micro-dollars; menu prices are fractions of a cent.
    pub revenue_micros: u64,
}

#[derive(Deserialize)]
struct OrderBody {
    items: Option<Vec<Item>>,
    order: Option<Box<OrderBody>>,
}

#[derive(Deserialize)]
struct Item {
    #[serde(default)]
    price: f64,
}

/// Read the item list from a purchase response body, either top-level
/// `items` or `order.items`. Returns `None` when there is no item list.
pub fn inspect(body: &[u8]) -> Option<Purchase> {
    let parsed: OrderBody = serde_json::from_slice(body).ok()?;
    let items = match (parsed.items, parsed.order) {
        (Some(items), _) => items,
        (None, Some(order)) => order.items?,
        (None, None) => return None,
    };

    let total: f64 = items.iter().map(|i| i.price).sum();
    let micros = (total * 1_000_000.0).round().max(0.0) as u64;
    Some(Purchase {
        items: items.len() as u64,
        revenue_micros: micros,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_items() {
        let body = br#"{"items":[{"price":0.05},{"price":0.10}]}"#;
        assert_eq!(
            inspect(body),
            Some(Purchase {
                items: 2,
                revenue_micros: 150_000
            })
        );
    }

    #[test]
    fn test_nested_order_items() {
        let body = br#"{"order":{"franchiseId":1,"items":[{"menuId":1,"description":"Veggie","price":0.0038}]},"jwt":"x"}"#;
        assert_eq!(
            inspect(body),
            Some(Purchase {
                items: 1,
                revenue_micros: 3_800
            })
        );
    }

    #[test]
    fn test_no_item_list() {
        assert_eq!(inspect(br#"{"message":"Failed to fulfill order"}"#), None);
        assert_eq!(inspect(b"not json"), None);
        assert_eq!(inspect(b""), None);
    }

    #[test]
    fn test_empty_order() {
        assert_eq!(
            inspect(br#"{"items":[]}"#),
            Some(Purchase {
                items: 0,
                revenue_micros: 0
            })
        );
    }
}
