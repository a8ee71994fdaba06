//! Bot 端 HTTP 请求处理器

pub mod catalog;
pub mod order;
pub mod profile;
pub mod promo;
pub mod start;
pub mod walk;
