// src/services/product_store.rs

//! Persistence for Product documents: insert, lookup, filtered page fetch
//! and count. All calls run under a bounded timeout so a wedged store
//! surfaces as an error instead of a hung request.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::product::{
  recompute_rating, Category, FrameType, Gender, NewProduct, Product, ProductImage, ProductSummary, Review,
  REVIEW_RATING_MAX, REVIEW_RATING_MIN,
};

/// The conjunctive predicate derived from list-request parameters.
/// `search` contributes a disjunctive substring clause over name/brand.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
  pub category: Option<Category>,
  pub gender: Option<Gender>,
  pub frame_type: Option<FrameType>,
  pub search: Option<String>,
}

const PRODUCT_COLUMNS: &str =
  "id, name, description, price, category, brand, images, stock, frame_type, gender, color, material, rating, num_reviews, reviews, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, name, price, images, category, brand, rating, num_reviews";

/// Documents page in insertion order (`created_at ASC, id ASC`) so repeated
/// list calls see a deterministic sequence.
const PAGE_ORDER: &str = " ORDER BY created_at ASC, id ASC";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: Uuid,
  name: String,
  description: Option<String>,
  price: f64,
  category: String,
  brand: Option<String>,
  images: Json<Vec<ProductImage>>,
  stock: i32,
  frame_type: Option<String>,
  gender: Option<String>,
  color: Option<String>,
  material: Option<String>,
  rating: f64,
  num_reviews: i32,
  reviews: Json<Vec<Review>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
  type Error = AppError;

  fn try_from(row: ProductRow) -> Result<Self> {
    // The migration CHECK constraints guarantee these parses; a failure
    // means the row was written outside this service.
    let category = row
      .category
      .parse::<Category>()
      .map_err(|_| AppError::Internal(format!("product {} holds unknown category '{}'", row.id, row.category)))?;
    let frame_type = parse_optional_enum::<FrameType>(row.frame_type.as_deref())
      .map_err(|v| AppError::Internal(format!("product {} holds unknown frame type '{}'", row.id, v)))?;
    let gender = parse_optional_enum::<Gender>(row.gender.as_deref())
      .map_err(|v| AppError::Internal(format!("product {} holds unknown gender '{}'", row.id, v)))?;

    Ok(Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      category,
      brand: row.brand,
      images: row.images.0,
      stock: row.stock,
      frame_type,
      gender,
      color: row.color,
      material: row.material,
      rating: row.rating,
      num_reviews: row.num_reviews,
      reviews: row.reviews.0,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
  id: Uuid,
  name: String,
  price: f64,
  images: Json<Vec<ProductImage>>,
  category: String,
  brand: Option<String>,
  rating: f64,
  num_reviews: i32,
}

impl TryFrom<SummaryRow> for ProductSummary {
  type Error = AppError;

  fn try_from(row: SummaryRow) -> Result<Self> {
    let category = row
      .category
      .parse::<Category>()
      .map_err(|_| AppError::Internal(format!("product {} holds unknown category '{}'", row.id, row.category)))?;
    Ok(ProductSummary {
      id: row.id,
      name: row.name,
      price: row.price,
      images: row.images.0,
      category,
      brand: row.brand,
      rating: row.rating,
      num_reviews: row.num_reviews,
    })
  }
}

fn parse_optional_enum<T: std::str::FromStr>(value: Option<&str>) -> std::result::Result<Option<T>, String> {
  match value {
    None => Ok(None),
    Some(s) => s.parse::<T>().map(Some).map_err(|_| s.to_string()),
  }
}

/// Runs a store query under `timeout`. Expiry maps to `Unavailable`, every
/// other failure to `Sqlx`; the caller never blocks past the bound. The
/// session queries in `auth_service` go through this too.
pub(crate) async fn bounded<T, F>(timeout: Duration, query: F) -> Result<T>
where
  F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
  match tokio::time::timeout(timeout, query).await {
    Ok(result) => result.map_err(AppError::Sqlx),
    Err(_) => Err(AppError::Unavailable("store query timed out".to_string())),
  }
}

/// Escapes LIKE metacharacters so a search term matches itself literally.
fn escape_like(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len());
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

/// Appends the WHERE clause for `filter` to `builder`.
fn push_predicate<'args>(builder: &mut QueryBuilder<'args, Postgres>, filter: &'args ProductFilter) {
  builder.push(" WHERE TRUE");
  if let Some(category) = filter.category {
    builder.push(" AND category = ").push_bind(category.as_str());
  }
  if let Some(gender) = filter.gender {
    builder.push(" AND gender = ").push_bind(gender.as_str());
  }
  if let Some(frame_type) = filter.frame_type {
    builder.push(" AND frame_type = ").push_bind(frame_type.as_str());
  }
  if let Some(search) = &filter.search {
    let pattern = format!("%{}%", escape_like(search));
    builder.push(" AND (name ILIKE ").push_bind(pattern.clone());
    builder.push(" OR brand ILIKE ").push_bind(pattern);
    builder.push(")");
  }
}

/// Persists a validated candidate document. Generates the id and
/// timestamps and derives the rating aggregate from `reviews`.
#[instrument(name = "product_store::insert", skip(pool, new_product), fields(product_name = %new_product.name))]
pub async fn insert(pool: &PgPool, timeout: Duration, new_product: &NewProduct) -> Result<Product> {
  // Review ratings share the write-time range check the enum fields get.
  if new_product
    .reviews
    .iter()
    .any(|r| !(REVIEW_RATING_MIN..=REVIEW_RATING_MAX).contains(&r.rating))
  {
    return Err(AppError::Validation(format!(
      "Review rating must be between {} and {}",
      REVIEW_RATING_MIN, REVIEW_RATING_MAX
    )));
  }

  let id = Uuid::new_v4();
  let now = Utc::now();
  let (rating, num_reviews) = recompute_rating(&new_product.reviews);

  let query = sqlx::query_as::<_, ProductRow>(
    "INSERT INTO products (id, name, description, price, category, brand, images, stock, frame_type, gender, color, material, rating, num_reviews, reviews, created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
     RETURNING id, name, description, price, category, brand, images, stock, frame_type, gender, color, material, rating, num_reviews, reviews, created_at, updated_at",
  )
  .bind(id)
  .bind(&new_product.name)
  .bind(&new_product.description)
  .bind(new_product.price)
  .bind(new_product.category.as_str())
  .bind(&new_product.brand)
  .bind(Json(&new_product.images))
  .bind(new_product.stock)
  .bind(new_product.frame_type.map(|f| f.as_str()))
  .bind(new_product.gender.map(|g| g.as_str()))
  .bind(&new_product.color)
  .bind(&new_product.material)
  .bind(rating)
  .bind(num_reviews)
  .bind(Json(&new_product.reviews))
  .bind(now)
  .bind(now)
  .fetch_one(pool);

  let row = bounded(timeout, query).await?;
  row.try_into()
}

/// Fetches the full document for `id`, or `None` when no match exists.
#[instrument(name = "product_store::find_by_id", skip(pool), fields(product_id = %id))]
pub async fn find_by_id(pool: &PgPool, timeout: Duration, id: Uuid) -> Result<Option<Product>> {
  let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
  let query = sqlx::query_as::<_, ProductRow>(&sql).bind(id).fetch_optional(pool);

  match bounded(timeout, query).await? {
    Some(row) => Ok(Some(row.try_into()?)),
    None => Ok(None),
  }
}

/// Fetches at most `limit` list-view projections after skipping `skip`
/// matches, in insertion order.
#[instrument(name = "product_store::find_page", skip(pool, filter))]
pub async fn find_page(
  pool: &PgPool,
  timeout: Duration,
  filter: &ProductFilter,
  skip: i64,
  limit: i64,
) -> Result<Vec<ProductSummary>> {
  let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", SUMMARY_COLUMNS));
  push_predicate(&mut builder, filter);
  builder.push(PAGE_ORDER);
  builder.push(" LIMIT ").push_bind(limit);
  builder.push(" OFFSET ").push_bind(skip);

  let rows: Vec<SummaryRow> = bounded(timeout, builder.build_query_as().fetch_all(pool)).await?;
  rows.into_iter().map(ProductSummary::try_from).collect()
}

/// Counts documents matching `filter`, independent of skip/limit.
#[instrument(name = "product_store::count", skip(pool, filter))]
pub async fn count(pool: &PgPool, timeout: Duration, filter: &ProductFilter) -> Result<i64> {
  let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
  push_predicate(&mut builder, filter);

  bounded(timeout, builder.build_query_scalar::<i64>().fetch_one(pool)).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_like_neutralizes_metacharacters() {
    assert_eq!(escape_like("50% off"), "50\\% off");
    assert_eq!(escape_like("ray_ban"), "ray\\_ban");
    assert_eq!(escape_like("a\\b"), "a\\\\b");
    assert_eq!(escape_like("Ray-Ban"), "Ray-Ban");
  }

  #[test]
  fn empty_filter_builds_a_bare_predicate() {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
    let filter = ProductFilter::default();
    push_predicate(&mut builder, &filter);
    assert_eq!(builder.sql(), "SELECT COUNT(*) FROM products WHERE TRUE");
  }

  #[test]
  fn filters_combine_conjunctively_with_a_disjunctive_search() {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM products");
    let filter = ProductFilter {
      category: Some(Category::Sunglasses),
      gender: Some(Gender::Men),
      frame_type: Some(FrameType::Rimless),
      search: Some("Ray".to_string()),
    };
    push_predicate(&mut builder, &filter);
    let sql = builder.sql();
    assert!(sql.contains("AND category = $1"));
    assert!(sql.contains("AND gender = $2"));
    assert!(sql.contains("AND frame_type = $3"));
    assert!(sql.contains("AND (name ILIKE $4 OR brand ILIKE $5)"));
  }

  #[tokio::test]
  async fn bounded_times_out_instead_of_hanging() {
    let result: Result<i64> =
      bounded(Duration::from_millis(10), std::future::pending::<std::result::Result<i64, sqlx::Error>>()).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
  }

  #[tokio::test]
  async fn insert_rejects_out_of_range_review_ratings() {
    // Rejected before any query; no database sits behind this pool.
    let pool = PgPool::connect_lazy("postgres://optika@127.0.0.1:1/optika").unwrap();
    let candidate = NewProduct {
      name: "Aviator".to_string(),
      description: None,
      price: 1499.0,
      category: Category::Sunglasses,
      brand: None,
      images: Vec::new(),
      stock: 0,
      frame_type: None,
      gender: None,
      color: None,
      material: None,
      reviews: vec![Review { rating: 5 }],
    };
    let err = insert(&pool, Duration::from_millis(50), &candidate).await.unwrap_err();
    match err {
      AppError::Validation(msg) => assert_eq!(msg, "Review rating must be between 1 and 4"),
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn corrupt_category_surfaces_as_internal_error() {
    let row = SummaryRow {
      id: Uuid::new_v4(),
      name: "x".to_string(),
      price: 1.0,
      images: Json(Vec::new()),
      category: "Hats".to_string(),
      brand: None,
      rating: 0.0,
      num_reviews: 0,
    };
    assert!(matches!(ProductSummary::try_from(row), Err(AppError::Internal(_))));
  }
}
