//! Payment Model

use serde::{Deserialize, Serialize};

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    QrCode,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::QrCode => "qr_code",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

/// Payment entity (支付记录)
///
/// One payment per order; full settlement only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub payment_number: String,
    pub order_id: i64,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub paid_at: i64,
}

/// Process payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub order_id: i64,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
}
