mod config;
mod doc;
mod dtos;
mod error;
mod extractors;
mod routes;
mod state;
mod utils;

use crate::{config::Config, doc::ApiDoc, state::AppState, utils::shutdown::shutdown_signal};
use axum::Router;
use log::{error, info};
use migration::{Migrator, MigratorTrait};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_oauth2_resource_server::server::OAuth2ResourceServer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("database: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("bearer token validation: {0}")]
    OAuth(String),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the application. When `oauth` is set, API routes require a valid
/// bearer token; `/`, `/health` and the docs stay open.
fn app(state: AppState, oauth: Option<OAuth2ResourceServer>) -> Router {
    let mut api = routes::api_router();
    if let Some(oauth) = oauth {
        api = api.layer(ServiceBuilder::new().layer(oauth.into_layer()));
    }

    Router::new()
        .merge(routes::public_router())
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let db = database::db::create_connection(&config.database_url).await?;
    if config.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Database schema is up to date");
    }

    let oauth = match &config.oidc_issuer_url {
        Some(issuer) => Some(
            <OAuth2ResourceServer>::builder()
                .issuer_url(issuer.as_str())
                .build()
                .await
                .map_err(|err| StartupError::OAuth(format!("{err:?}")))?,
        ),
        None => {
            info!("OIDC_ISSUER_URL not set, trusting actor headers");
            None
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Running axum on http://{}", config.bind_address);

    axum::serve(listener, app(AppState::new(db), oauth))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}
