//! Shared helpers for unit tests

use axum::Router;
use url::Url;

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_backend(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock backend");
    });

    Url::parse(&format!("http://{addr}")).expect("mock backend URL")
}
