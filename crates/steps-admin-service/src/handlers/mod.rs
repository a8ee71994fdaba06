//! HTTP 请求处理器模块

pub mod catalog;
pub mod coefficient;
pub mod export;
pub mod family;
pub mod order;
pub mod promo;
pub mod referral;
pub mod settings;
pub mod stats;
pub mod user_view;
