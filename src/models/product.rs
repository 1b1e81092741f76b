// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Review ratings are integers on a 1..=4 scale.
pub const REVIEW_RATING_MIN: i32 = 1;
pub const REVIEW_RATING_MAX: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
  Eyeglasses,
  Sunglasses,
  #[serde(rename = "Contact Lenses")]
  ContactLenses,
  Accessories,
}

impl Category {
  pub const ALLOWED: [&'static str; 4] = ["Eyeglasses", "Sunglasses", "Contact Lenses", "Accessories"];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Eyeglasses => "Eyeglasses",
      Category::Sunglasses => "Sunglasses",
      Category::ContactLenses => "Contact Lenses",
      Category::Accessories => "Accessories",
    }
  }
}

impl FromStr for Category {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Eyeglasses" => Ok(Category::Eyeglasses),
      "Sunglasses" => Ok(Category::Sunglasses),
      "Contact Lenses" => Ok(Category::ContactLenses),
      "Accessories" => Ok(Category::Accessories),
      _ => Err(()),
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameType {
  #[serde(rename = "Full Rim")]
  FullRim,
  #[serde(rename = "Half Rim")]
  HalfRim,
  Rimless,
}

impl FrameType {
  pub const ALLOWED: [&'static str; 3] = ["Full Rim", "Half Rim", "Rimless"];

  pub fn as_str(&self) -> &'static str {
    match self {
      FrameType::FullRim => "Full Rim",
      FrameType::HalfRim => "Half Rim",
      FrameType::Rimless => "Rimless",
    }
  }
}

impl FromStr for FrameType {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Full Rim" => Ok(FrameType::FullRim),
      "Half Rim" => Ok(FrameType::HalfRim),
      "Rimless" => Ok(FrameType::Rimless),
      _ => Err(()),
    }
  }
}

impl fmt::Display for FrameType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  Men,
  Women,
  Unisex,
}

impl Gender {
  pub const ALLOWED: [&'static str; 3] = ["Men", "Women", "Unisex"];

  pub fn as_str(&self) -> &'static str {
    match self {
      Gender::Men => "Men",
      Gender::Women => "Women",
      Gender::Unisex => "Unisex",
    }
  }
}

impl FromStr for Gender {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Men" => Ok(Gender::Men),
      "Women" => Ok(Gender::Women),
      "Unisex" => Ok(Gender::Unisex),
      _ => Err(()),
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A reference to an image hosted outside this service. The bytes never
/// pass through here; the admin upload widget hands us both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
  pub url: String,
  pub public_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  pub rating: i32,
}

/// The full persisted product document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub price: f64,
  pub category: Category,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub brand: Option<String>,
  pub images: Vec<ProductImage>,
  pub stock: i32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub frame_type: Option<FrameType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender: Option<Gender>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub color: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub material: Option<String>,
  pub rating: f64,
  pub num_reviews: i32,
  pub reviews: Vec<Review>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The projection served on list views; heavy fields (`reviews`,
/// `description`, ...) are never selected for these.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
  pub price: f64,
  pub images: Vec<ProductImage>,
  pub category: Category,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub brand: Option<String>,
  pub rating: f64,
  pub num_reviews: i32,
}

/// A validated candidate document, ready for the store. Produced only by
/// the ingestion service; id, timestamps and the rating aggregate are
/// filled in at insert time.
#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub price: f64,
  pub category: Category,
  pub brand: Option<String>,
  pub images: Vec<ProductImage>,
  pub stock: i32,
  pub frame_type: Option<FrameType>,
  pub gender: Option<Gender>,
  pub color: Option<String>,
  pub material: Option<String>,
  pub reviews: Vec<Review>,
}

/// Derives the stored rating aggregate from the review sequence. The
/// aggregate is recomputed by whichever path mutates `reviews`, which
/// keeps `num_reviews == reviews.len()` an invariant of the store.
pub fn recompute_rating(reviews: &[Review]) -> (f64, i32) {
  if reviews.is_empty() {
    return (0.0, 0);
  }
  let sum: i32 = reviews.iter().map(|r| r.rating).sum();
  (f64::from(sum) / reviews.len() as f64, reviews.len() as i32)
}
