// src/web/routes.rs

use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// This function is called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Catalog Routes
      .route(
        "/productcard",
        web::get().to(crate::web::handlers::product_handlers::list_products_handler),
      )
      .route(
        "/product-details/{id}",
        web::get().to(crate::web::handlers::product_handlers::get_product_handler),
      )
      // Admin Routes (the addproduct handler requires a valid session)
      .service(
        web::scope("/admin")
          .route(
            "/login",
            web::post().to(crate::web::handlers::auth_handlers::admin_login_handler),
          )
          .route(
            "/addproduct",
            web::post().to(crate::web::handlers::admin_handlers::add_product_handler),
          ),
      ),
  );
}
