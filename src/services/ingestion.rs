// src/services/ingestion.rs

//! The admin write path: validate a raw multi-field submission and persist
//! it as a new Product. Each request is one atomic validate-then-insert;
//! failures surface immediately and are never retried.

use serde::Deserialize;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::product::{Category, FrameType, Gender, NewProduct, Product, ProductImage};
use crate::services::product_store;

/// Raw text fields collected from the admin form. Everything arrives as a
/// string; parsing and enum checks happen in [`validate`].
#[derive(Debug, Default)]
pub struct ProductSubmission {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<String>,
  pub category: Option<String>,
  pub brand: Option<String>,
  pub stock: Option<String>,
  pub frame_type: Option<String>,
  pub gender: Option<String>,
  pub color: Option<String>,
  pub material: Option<String>,
  /// JSON-encoded array of `{url, publicId}` references.
  pub images: Option<String>,
}

impl ProductSubmission {
  /// Routes one form field into the submission. Unknown field names are
  /// ignored, matching a form that may carry extra widget state.
  pub fn set(&mut self, field: &str, value: String) {
    match field {
      "name" => self.name = Some(value),
      "description" => self.description = Some(value),
      "price" => self.price = Some(value),
      "category" => self.category = Some(value),
      "brand" => self.brand = Some(value),
      "stock" => self.stock = Some(value),
      "frameType" => self.frame_type = Some(value),
      "gender" => self.gender = Some(value),
      "color" => self.color = Some(value),
      "material" => self.material = Some(value),
      "images" => self.images = Some(value),
      other => warn!("Ignoring unknown product form field '{}'.", other),
    }
  }
}

// Wire shape of one image entry inside the JSON-encoded `images` field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageEntry {
  #[serde(default)]
  url: String,
  #[serde(default)]
  public_id: String,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_images(raw: Option<&str>) -> Result<Vec<ProductImage>> {
  let Some(raw) = raw else {
    return Ok(Vec::new());
  };
  let entries: Vec<ImageEntry> = serde_json::from_str(raw)
    .map_err(|e| AppError::Validation(format!("Images must be a JSON array of {{url, publicId}} objects: {}", e)))?;
  entries
    .into_iter()
    .map(|entry| {
      if entry.url.trim().is_empty() || entry.public_id.trim().is_empty() {
        Err(AppError::Validation(
          "Each image must have a url and publicId".to_string(),
        ))
      } else {
        Ok(ProductImage {
          url: entry.url,
          public_id: entry.public_id,
        })
      }
    })
    .collect()
}

/// Checks required fields and enum membership, turning the raw submission
/// into a candidate document. Empty-string fields count as absent.
pub fn validate(submission: &ProductSubmission) -> Result<NewProduct> {
  let name = present(&submission.name)
    .ok_or_else(|| AppError::Validation("Name, price, and category are required".to_string()))?;
  let price_raw = present(&submission.price)
    .ok_or_else(|| AppError::Validation("Name, price, and category are required".to_string()))?;
  let category_raw = present(&submission.category)
    .ok_or_else(|| AppError::Validation("Name, price, and category are required".to_string()))?;

  let price = price_raw
    .parse::<f64>()
    .ok()
    .filter(|p| p.is_finite() && *p >= 0.0)
    .ok_or_else(|| AppError::Validation("Price must be a non-negative number".to_string()))?;

  let category = category_raw
    .parse::<Category>()
    .map_err(|_| AppError::Validation(format!("Category must be one of: {}", Category::ALLOWED.join(", "))))?;

  let frame_type = match present(&submission.frame_type) {
    Some(raw) => Some(
      raw
        .parse::<FrameType>()
        .map_err(|_| AppError::Validation(format!("Frame type must be one of: {}", FrameType::ALLOWED.join(", "))))?,
    ),
    None => None,
  };

  let gender = match present(&submission.gender) {
    Some(raw) => Some(
      raw
        .parse::<Gender>()
        .map_err(|_| AppError::Validation(format!("Gender must be one of: {}", Gender::ALLOWED.join(", "))))?,
    ),
    None => None,
  };

  let images = parse_images(present(&submission.images))?;

  // Absent or unparseable stock falls back to 0; an explicit negative is
  // a violation of the stock >= 0 invariant, not a fallback case.
  let stock = match present(&submission.stock) {
    Some(raw) => match raw.parse::<i32>() {
      Ok(n) if n < 0 => {
        return Err(AppError::Validation("Stock cannot be negative".to_string()));
      }
      Ok(n) => n,
      Err(_) => 0,
    },
    None => 0,
  };

  Ok(NewProduct {
    name: name.to_string(),
    description: present(&submission.description).map(str::to_string),
    price,
    category,
    brand: present(&submission.brand).map(str::to_string),
    images,
    stock,
    frame_type,
    gender,
    color: present(&submission.color).map(str::to_string),
    material: present(&submission.material).map(str::to_string),
    reviews: Vec::new(),
  })
}

/// Validates and persists an admin submission. Nothing is written when
/// validation fails.
#[instrument(name = "ingestion::create_product", skip(pool, submission))]
pub async fn create_product(pool: &PgPool, timeout: Duration, submission: &ProductSubmission) -> Result<Product> {
  let candidate = validate(submission)?;
  let product = product_store::insert(pool, timeout, &candidate).await?;
  info!("Created product {} ('{}').", product.id, product.name);
  Ok(product)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minimal_submission() -> ProductSubmission {
    let mut submission = ProductSubmission::default();
    submission.set("name", "Aviator".to_string());
    submission.set("price", "1499".to_string());
    submission.set("category", "Sunglasses".to_string());
    submission
  }

  #[test]
  fn minimal_submission_validates() {
    let candidate = validate(&minimal_submission()).unwrap();
    assert_eq!(candidate.name, "Aviator");
    assert!((candidate.price - 1499.0).abs() < f64::EPSILON);
    assert_eq!(candidate.category, Category::Sunglasses);
    assert!(candidate.frame_type.is_none());
    assert!(candidate.images.is_empty());
    assert_eq!(candidate.stock, 0);
    assert!(candidate.reviews.is_empty());
  }

  #[test]
  fn missing_required_fields_are_rejected_together() {
    for field in ["name", "price", "category"] {
      let mut submission = minimal_submission();
      submission.set(field, String::new());
      let err = validate(&submission).unwrap_err();
      match err {
        AppError::Validation(msg) => assert_eq!(msg, "Name, price, and category are required"),
        other => panic!("expected validation error, got {:?}", other),
      }
    }
  }

  #[test]
  fn unknown_category_names_the_allowed_set() {
    let mut submission = minimal_submission();
    submission.set("category", "Hats".to_string());
    match validate(&submission).unwrap_err() {
      AppError::Validation(msg) => {
        assert_eq!(
          msg,
          "Category must be one of: Eyeglasses, Sunglasses, Contact Lenses, Accessories"
        );
      }
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn optional_enums_are_checked_when_present() {
    let mut submission = minimal_submission();
    submission.set("frameType", "Wire Rim".to_string());
    match validate(&submission).unwrap_err() {
      AppError::Validation(msg) => assert_eq!(msg, "Frame type must be one of: Full Rim, Half Rim, Rimless"),
      other => panic!("expected validation error, got {:?}", other),
    }

    let mut submission = minimal_submission();
    submission.set("gender", "Kids".to_string());
    match validate(&submission).unwrap_err() {
      AppError::Validation(msg) => assert_eq!(msg, "Gender must be one of: Men, Women, Unisex"),
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn negative_price_is_rejected() {
    let mut submission = minimal_submission();
    submission.set("price", "-5".to_string());
    assert!(matches!(validate(&submission), Err(AppError::Validation(_))));
  }

  #[test]
  fn images_require_both_url_and_public_id() {
    let mut submission = minimal_submission();
    submission.set(
      "images",
      r#"[{"url": "https://img.example.com/a.jpg", "publicId": "a"}, {"url": "https://img.example.com/b.jpg"}]"#
        .to_string(),
    );
    match validate(&submission).unwrap_err() {
      AppError::Validation(msg) => assert_eq!(msg, "Each image must have a url and publicId"),
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn images_preserve_submission_order() {
    let mut submission = minimal_submission();
    submission.set(
      "images",
      r#"[{"url": "https://img.example.com/1.jpg", "publicId": "one"},
          {"url": "https://img.example.com/2.jpg", "publicId": "two"},
          {"url": "https://img.example.com/3.jpg", "publicId": "three"}]"#
        .to_string(),
    );
    let candidate = validate(&submission).unwrap();
    let ids: Vec<&str> = candidate.images.iter().map(|i| i.public_id.as_str()).collect();
    assert_eq!(ids, vec!["one", "two", "three"]);
  }

  #[test]
  fn malformed_images_json_is_a_validation_error() {
    let mut submission = minimal_submission();
    submission.set("images", "not json".to_string());
    assert!(matches!(validate(&submission), Err(AppError::Validation(_))));
  }

  #[test]
  fn stock_defaults_to_zero_when_unparseable() {
    let mut submission = minimal_submission();
    submission.set("stock", "plenty".to_string());
    assert_eq!(validate(&submission).unwrap().stock, 0);

    let mut submission = minimal_submission();
    submission.set("stock", "7".to_string());
    assert_eq!(validate(&submission).unwrap().stock, 7);
  }

  #[test]
  fn negative_stock_is_rejected() {
    let mut submission = minimal_submission();
    submission.set("stock", "-3".to_string());
    assert!(matches!(validate(&submission), Err(AppError::Validation(_))));
  }
}
