use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::env;

use staffdir_backend::utils::uploads::UploadStore;
use staffdir_backend::{api_routes, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:4000".to_string());
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string());

    let pool = db::create_pool().await;
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize the database schema");

    let uploads = UploadStore::new(&upload_dir);
    uploads.ensure_dir()?;

    info!("Starting server at {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(uploads.clone()))
            .configure(api_routes)
            .service(Files::new("/uploads", uploads.dir()))
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
