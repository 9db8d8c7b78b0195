pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod utils;

use actix_web::web;

/// JSON API routes, shared by the binary and the API tests. Static file
/// mounts (`/uploads`, the frontend) are wired up in `main`.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(handlers::health::health)))
        .service(
            web::resource("/api/employees")
                .route(web::get().to(handlers::employee::list_employees))
                .route(web::post().to(handlers::employee::create_employee)),
        )
        .service(
            web::resource("/api/employees/{id}")
                .route(web::get().to(handlers::employee::get_employee))
                .route(web::put().to(handlers::employee::update_employee))
                .route(web::delete().to(handlers::employee::delete_employee)),
        );
}
