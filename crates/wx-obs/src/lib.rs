use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging/tracing for a binary.
///
/// `RUST_LOG` is respected and defaults to info with debug for the store
/// and both engines. Set `WX_LOG_JSON=1` for collector-friendly JSON lines.
pub fn init(service_name: &str) {
    let default_filter = "info,wx_db=debug,wx_ingest=debug,wx_stats=debug";
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(env_filter));

    let json = std::env::var("WX_LOG_JSON").is_ok_and(|v| v == "1");
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(service = %service_name, "observability initialized");
}
