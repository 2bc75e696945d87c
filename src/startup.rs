use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{
    configuration::Settings,
    routes::{documents_router, health_check},
    storage::DocumentStore,
};

pub struct Application {
    listener: TcpListener,
    router: Router,
    port: u16,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, std::io::Error> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );

        let listener = TcpListener::bind(address).await?;
        let port = listener.local_addr()?.port();

        let store = DocumentStore::open(&settings.storage.data_dir)
            .await
            .map_err(|error| {
                tracing::error!(?error, "document store could not be opened");
                std::io::Error::other(error)
            })?;

        let router = build_router(Arc::new(store), settings.application.cors_permissive);

        Ok(Self {
            listener,
            router,
            port,
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

pub fn build_router(store: Arc<DocumentStore>, cors_permissive: bool) -> Router {
    let router = Router::new()
        .nest("/api/documents", documents_router())
        .route("/health_check", get(health_check))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(store);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
