pub mod cli;
pub mod pages;
pub mod session;
pub mod upstream;

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

use pages::PagesState;
use upstream::UpstreamClient;

pub struct ServerConfig {
    /// Base URL of the upstream API server (auth endpoints + GraphQL)
    pub upstream_endpoint: Url,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let upstream = UpstreamClient::new(config.upstream_endpoint.clone());
    pages::router(PagesState { upstream })
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
