// src/services/mod.rs

// Declare service modules
pub mod auth_service;
pub mod catalog;
pub mod ingestion;
pub mod product_store;
