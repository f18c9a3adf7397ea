use classlink::logging::init_tracing;
use classlink::metrics::{init_metrics, metrics_app};
use classlink::router::init_router;
use classlink::state::init_app_state;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    let state = init_app_state().await;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .expect("Failed to run database migrations");
    info!("Database migrations applied");

    if let Some(handle) = init_metrics() {
        let metrics_port: u16 = std::env::var("METRICS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(9100);
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", metrics_port))
                .await
                .expect("Failed to bind metrics listener");
            info!(port = metrics_port, "Metrics endpoint listening");
            axum::serve(listener, metrics_app(handle))
                .await
                .expect("Metrics server failed");
        });
    }

    let app = init_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind server port");

    println!("🚀 Server running on http://localhost:{port}");
    println!("📚 Swagger UI available at http://localhost:{port}/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:{port}/scalar");

    axum::serve(listener, app).await.expect("Server failed");
}
