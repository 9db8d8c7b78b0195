use sqlx::PgPool;
use std::env;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS employees (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    department  TEXT,
    designation TEXT,
    project     TEXT,
    type        TEXT,
    status      TEXT,
    image_path  TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)";

pub async fn create_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to the database")
}

pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
