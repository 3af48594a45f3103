use std::sync::Arc;

use sqlx::PgPool;

use crate::schema::SchemaSource;
use crate::template::Resolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Live field schema. Default: PgSchemaSource over the same pool.
    pub schema: Arc<dyn SchemaSource>,
    /// Carries the configured nesting limit for every render.
    pub resolver: Resolver,
}
