// src/web/handlers/mod.rs

// Declare handler modules
pub mod admin_handlers;
pub mod auth_handlers;
pub mod product_handlers;
