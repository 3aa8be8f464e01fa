//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity (菜品)
///
/// `price` is the selling price, `cost_price` feeds profit reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub cost_price: f64,
    pub image: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub preparation_time: Option<i32>,
    pub spicy_level: i32,
    pub calories: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Menu item with category name (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItemWithCategory {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub cost_price: f64,
    pub image: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub preparation_time: Option<i32>,
    pub spicy_level: i32,
    pub calories: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub cost_price: Option<f64>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub preparation_time: Option<i32>,
    pub spicy_level: Option<i32>,
    pub calories: Option<i32>,
}

/// Update menu item payload (partial)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub cost_price: Option<f64>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub preparation_time: Option<i32>,
    pub spicy_level: Option<i32>,
    pub calories: Option<i32>,
}
