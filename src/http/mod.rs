//! HTTP surface of the download service.

use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

pub mod error;
mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

pub struct HttpServer {
    bind_address: SocketAddr,
    state: AppState,
}

impl HttpServer {
    pub fn new(bind_address: SocketAddr, state: AppState) -> Self {
        HttpServer { bind_address, state }
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> std::io::Result<()> {
        let address = self.bind_address;
        let router = build_router(self.state);
        info!("starting the http server on http://{address}");

        let listener = tokio::net::TcpListener::bind(address).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }
}
