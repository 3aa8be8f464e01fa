//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`users`] - 用户管理接口 (管理员)
//! - [`categories`] - 菜单分类接口
//! - [`menu_items`] - 菜品管理接口
//! - [`tables`] - 桌台管理接口
//! - [`orders`] - 订单管理接口
//! - [`kitchen`] - 厨房工作流接口
//! - [`payments`] - 支付接口
//! - [`reports`] - 报表接口
//! - [`dashboard`] - 仪表盘接口
//! - [`settings`] - 系统设置接口

pub mod auth;
pub mod health;
pub mod users;

// Catalog API
pub mod categories;
pub mod menu_items;
pub mod tables;

// Workflow API
pub mod kitchen;
pub mod orders;
pub mod payments;

// Reporting API
pub mod dashboard;
pub mod reports;
pub mod settings;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
