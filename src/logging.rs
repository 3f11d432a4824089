use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// JSON lines on stdout; `RUST_LOG` overrides the `info` default.
pub fn init() {
    let fmt_layer = fmt::layer().json().flatten_event(true).with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
