use std::sync::Arc;
use stock_scan_rust::{api, AppConfig, SessionRegistry};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 扫码会话表
    let registry = Arc::new(SessionRegistry::new(config.scan.clone()));
    info!(
        debounce_ms = config.scan.debounce_ms,
        lock_release_ms = config.scan.lock_release_ms,
        "Scan session registry created"
    );

    let app = api::router(registry);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/sessions                          - open a scan session");
    info!("  POST /api/sessions/:id/scans                - submit a scan");
    info!("  GET  /api/sessions/:id/items                - current line items");
    info!("  GET  /api/sessions/:id/summary              - totals and scan counters");
    info!("  POST /api/sessions/:id/clear                - clear (silent or confirmed)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
