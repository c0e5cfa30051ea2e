use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_tree::time::Uptime;
use tracing_tree::HierarchicalLayer;

/// Installs the global subscriber. Filtering follows `RUST_LOG` and defaults
/// to `info`. Calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let tree = HierarchicalLayer::new(2)
        .with_targets(true)
        .with_indent_lines(true)
        .with_timer(Uptime::default());
    if tracing_subscriber::registry().with(filter).with(tree).try_init().is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
