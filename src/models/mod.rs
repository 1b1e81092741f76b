// src/models/mod.rs

//! Contains data structures representing database entities.

pub mod product;
pub mod session;

pub use product::{Category, FrameType, Gender, NewProduct, Product, ProductImage, ProductSummary, Review};
pub use session::AdminSessionRecord;
