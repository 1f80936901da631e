//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral localhost port with connection info, so
/// the default request lookup sees the peer address.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// GET `url` and return the status code and trimmed body.
pub async fn fetch(client: &reqwest::Client, url: &str) -> (u16, String) {
    let res = client.get(url).send().await.expect("gate unreachable");
    let status = res.status().as_u16();
    let body = res.text().await.unwrap();
    (status, body.trim().to_string())
}
