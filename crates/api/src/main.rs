#[tokio::main]
async fn main() {
    pitline_observability::init();

    let config = pitline_infra::AuthConfig::from_env()
        .expect("auth configuration (set PITLINE_JWT_SECRET)");

    let app = pitline_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
