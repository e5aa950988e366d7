//! HTTP request handlers

pub mod catalog;
pub mod download;
pub mod error;
pub mod health;
pub mod upload;

use actix_web::web;

/// Register every route. The catalog path is deployment-specific.
pub fn configure(cfg: &mut web::ServiceConfig, catalog_path: &str) {
    cfg.service(upload::upload)
        .service(download::download)
        .service(health::health)
        .route(catalog_path, web::get().to(catalog::list_files));
}
