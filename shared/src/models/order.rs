//! Order Model

use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Forward-only chain pending → preparing → ready → completed, with
/// cancellation allowed from any non-terminal state. Completion happens
/// through payment (pending and ready orders are payable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Preparing) => true,
            (OrderStatus::Preparing, OrderStatus::Ready) => true,
            // payment completes pending or ready orders
            (OrderStatus::Pending, OrderStatus::Completed) => true,
            (OrderStatus::Ready, OrderStatus::Completed) => true,
            (from, OrderStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Order channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
        }
    }
}

/// Per-item preparation status (kitchen workflow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Preparing,
    Ready,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Preparing => "preparing",
            ItemStatus::Ready => "ready",
        }
    }

    pub fn parse(s: &str) -> Option<ItemStatus> {
        match s {
            "pending" => Some(ItemStatus::Pending),
            "preparing" => Some(ItemStatus::Preparing),
            "ready" => Some(ItemStatus::Ready),
            _ => None,
        }
    }

    /// Items only move forward: pending → preparing → ready.
    pub fn can_transition(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Preparing) | (ItemStatus::Preparing, ItemStatus::Ready)
        )
    }
}

/// Order entity (订单)
///
/// Monetary fields are price snapshots taken at order time; later menu
/// edits never change an existing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub table_id: Option<i64>,
    pub user_id: i64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub discount: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Unit price snapshot at order time
    pub price: f64,
    pub subtotal: f64,
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub prepared_at: Option<i64>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: OrderType,
    pub items: Vec<OrderItemCreate>,
    #[serde(default)]
    pub discount: f64,
    pub notes: Option<String>,
}

/// Line item of a create-order payload (client sends no prices)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_only_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition(Preparing));
        assert!(Preparing.can_transition(Ready));
        assert!(Ready.can_transition(Completed));
        assert!(Pending.can_transition(Completed));

        assert!(!Preparing.can_transition(Pending));
        assert!(!Ready.can_transition(Preparing));
        assert!(!Preparing.can_transition(Completed));
        assert!(!Completed.can_transition(Pending));
    }

    #[test]
    fn cancel_from_non_terminal_only() {
        use OrderStatus::*;
        assert!(Pending.can_transition(Cancelled));
        assert!(Preparing.can_transition(Cancelled));
        assert!(Ready.can_transition(Cancelled));
        assert!(!Completed.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Cancelled));
    }

    #[test]
    fn item_transitions() {
        use ItemStatus::*;
        assert!(Pending.can_transition(Preparing));
        assert!(Preparing.can_transition(Ready));
        assert!(!Pending.can_transition(Ready));
        assert!(!Ready.can_transition(Preparing));
    }
}
