// src/services/catalog.rs

//! Catalog reads: translate list-request parameters into a store predicate,
//! run the paginated fetch, and shape the response envelope.

use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::product::{Category, FrameType, Gender, Product, ProductSummary};
use crate::services::product_store::{self, ProductFilter};

/// Default page size for catalog listings.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Raw list-request parameters, prior to sanitization.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub category: Option<String>,
  pub gender: Option<String>,
  pub frame_type: Option<String>,
  pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current_page: i64,
  pub total_pages: i64,
  pub total_products: i64,
  pub limit: i64,
}

#[derive(Debug)]
pub struct CatalogPage {
  pub products: Vec<ProductSummary>,
  pub pagination: Pagination,
}

pub fn total_pages(total_products: i64, limit: i64) -> i64 {
  if total_products == 0 {
    0
  } else {
    (total_products + limit - 1) / limit
  }
}

/// Rows to skip for `page`. Saturates so an absurd client-supplied page
/// number stays a valid offset instead of overflowing the multiplication.
fn page_offset(page: i64, limit: i64) -> i64 {
  page.saturating_sub(1).saturating_mul(limit)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Builds the store predicate from the request parameters. Returns `None`
/// when a filter value lies outside its enumeration: the store only holds
/// enum members, so such a filter can match nothing and the empty page is
/// answered without a round-trip.
fn build_filter(params: &ListParams) -> Option<ProductFilter> {
  let mut filter = ProductFilter::default();
  if let Some(category) = non_empty(&params.category) {
    filter.category = Some(category.parse::<Category>().ok()?);
  }
  if let Some(gender) = non_empty(&params.gender) {
    filter.gender = Some(gender.parse::<Gender>().ok()?);
  }
  if let Some(frame_type) = non_empty(&params.frame_type) {
    filter.frame_type = Some(frame_type.parse::<FrameType>().ok()?);
  }
  if let Some(search) = non_empty(&params.search) {
    filter.search = Some(search.to_string());
  }
  Some(filter)
}

/// Lists at most `limit` products for `page`, with the pagination envelope
/// computed against the full filtered count. An empty store yields a
/// genuinely empty list with `totalProducts` 0; there is no placeholder
/// content on this path.
#[instrument(name = "catalog::list_products", skip(pool, params))]
pub async fn list_products(pool: &PgPool, timeout: Duration, params: &ListParams) -> Result<CatalogPage> {
  let page = params.page.unwrap_or(1).max(1);
  let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
  let skip = page_offset(page, limit);

  let Some(filter) = build_filter(params) else {
    info!("List filter holds a value outside its enumeration; answering the empty page.");
    return Ok(CatalogPage {
      products: Vec::new(),
      pagination: Pagination {
        current_page: page,
        total_pages: 0,
        total_products: 0,
        limit,
      },
    });
  };

  let products = product_store::find_page(pool, timeout, &filter, skip, limit).await?;
  let total_products = product_store::count(pool, timeout, &filter).await?;

  info!(
    "Fetched {} of {} matching products (page {}, limit {}).",
    products.len(),
    total_products,
    page,
    limit
  );

  Ok(CatalogPage {
    products,
    pagination: Pagination {
      current_page: page,
      total_pages: total_pages(total_products, limit),
      total_products,
      limit,
    },
  })
}

/// Fetches the full document for `id`; absence is a `NotFound`, not a fault.
#[instrument(name = "catalog::get_product", skip(pool), fields(product_id = %id))]
pub async fn get_product(pool: &PgPool, timeout: Duration, id: Uuid) -> Result<Product> {
  product_store::find_by_id(pool, timeout, id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_pages_rounds_up() {
    assert_eq!(total_pages(0, 12), 0);
    assert_eq!(total_pages(1, 12), 1);
    assert_eq!(total_pages(12, 12), 1);
    assert_eq!(total_pages(13, 12), 2);
    assert_eq!(total_pages(25, 8), 4);
  }

  #[test]
  fn page_offset_saturates_instead_of_overflowing() {
    assert_eq!(page_offset(1, 12), 0);
    assert_eq!(page_offset(3, 12), 24);
    assert_eq!(page_offset(i64::MAX, 12), i64::MAX);
    assert_eq!(page_offset(i64::MAX, i64::MAX), i64::MAX);
  }

  #[tokio::test]
  async fn absurd_page_numbers_reach_the_store_without_panicking() {
    // No database behind this pool; the listing must get as far as the
    // store call (and fail there) rather than overflow computing the skip.
    let pool = sqlx::PgPool::connect_lazy("postgres://optika@127.0.0.1:1/optika").unwrap();
    let params = ListParams {
      page: Some(i64::MAX),
      limit: Some(12),
      ..Default::default()
    };
    let result = list_products(&pool, std::time::Duration::from_millis(50), &params).await;
    assert!(result.is_err());
  }

  #[test]
  fn build_filter_parses_known_enum_values() {
    let params = ListParams {
      category: Some("Contact Lenses".to_string()),
      gender: Some("Unisex".to_string()),
      frame_type: Some("Half Rim".to_string()),
      search: Some("Ray".to_string()),
      ..Default::default()
    };
    let filter = build_filter(&params).unwrap();
    assert_eq!(filter.category, Some(Category::ContactLenses));
    assert_eq!(filter.gender, Some(Gender::Unisex));
    assert_eq!(filter.frame_type, Some(FrameType::HalfRim));
    assert_eq!(filter.search.as_deref(), Some("Ray"));
  }

  #[test]
  fn build_filter_treats_empty_strings_as_absent() {
    let params = ListParams {
      category: Some(String::new()),
      search: Some("   ".to_string()),
      ..Default::default()
    };
    let filter = build_filter(&params).unwrap();
    assert!(filter.category.is_none());
    assert!(filter.search.is_none());
  }

  #[test]
  fn build_filter_rejects_values_outside_the_enumeration() {
    let params = ListParams {
      category: Some("Hats".to_string()),
      ..Default::default()
    };
    assert!(build_filter(&params).is_none());
  }

  #[test]
  fn pagination_serializes_with_camel_case_keys() {
    let pagination = Pagination {
      current_page: 2,
      total_pages: 5,
      total_products: 49,
      limit: 12,
    };
    let value = serde_json::to_value(&pagination).unwrap();
    assert_eq!(value["currentPage"], 2);
    assert_eq!(value["totalPages"], 5);
    assert_eq!(value["totalProducts"], 49);
    assert_eq!(value["limit"], 12);
  }
}
