// src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::catalog::{self, ListParams};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub category: Option<String>,
  pub gender: Option<String>,
  #[serde(rename = "frameType")]
  pub frame_type: Option<String>,
  pub search: Option<String>,
}

impl From<ListProductsQuery> for ListParams {
  fn from(query: ListProductsQuery) -> Self {
    ListParams {
      page: query.page,
      limit: query.limit,
      category: query.category,
      gender: query.gender,
      frame_type: query.frame_type,
      search: query.search,
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let params: ListParams = query_params.into_inner().into();
  let page = catalog::list_products(&app_state.db_pool, app_state.config.db_timeout, &params).await?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "products": page.products,
      "pagination": page.pagination,
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let raw_id = path.into_inner();
  // A malformed id is a caller error, not an absent document.
  let product_id = Uuid::parse_str(raw_id.trim())
    .map_err(|_| AppError::Validation(format!("'{}' is not a valid product id", raw_id)))?;

  let product = catalog::get_product(&app_state.db_pool, app_state.config.db_timeout, product_id).await?;
  info!("Product {} fetched successfully.", product_id);

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "product": product,
  })))
}
