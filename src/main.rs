//! Course API server: reads settings from the environment (and `.env`), creates the
//! database if needed, applies table migrations, and serves the REST routes.

use course_api::config::{builtin, load_from_path};
use course_api::{app_router, apply_migrations, connect, ensure_database_exists, resolve, AppState, Backend, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("course_api=info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    let backend = Backend::from_url(&settings.database_url)?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings).await?;

    let config = match &settings.models_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading model declarations");
            load_from_path(path).await?
        }
        None => builtin::course_catalog(Some(settings.max_students_per_course)),
    };
    let model = resolve(&config)?;
    apply_migrations(&pool, backend, &model).await?;

    let app = app_router(&settings, AppState::new(pool, model));
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
