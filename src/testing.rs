//! Local HTTP server for exercising the real clients.

use std::net::SocketAddr;

/// Serves `app` on an ephemeral port and returns its base url.
pub async fn serve(app: axum::Router) -> String {
    let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);

    format!("http://{addr}")
}
