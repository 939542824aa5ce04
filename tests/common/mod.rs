//! Shared infrastructure for HTTP integration tests.
//!
//! Fake provider APIs run in-process on an ephemeral port so the real
//! reqwest adapters can be exercised end to end.

#![allow(dead_code)]

pub mod fake_nowpayments;
pub mod fake_stripe;

use axum::Router;

/// Serves `app` on `127.0.0.1:0` and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}
