//! MyPham VN - storefront backend for a cosmetics shop
//!
//! Catalog browsing, a session-scoped shopping cart, a simulated checkout,
//! a blog, contact forms and an admin surface, all held in memory.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
