use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Used when `RUST_LOG` is unset: request spans from `tower_http` plus the
/// store and editor events of this crate.
pub const DEFAULT_FILTER: &str = "docstore=debug,tower_http=debug";

pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let formatting_layer = tracing_subscriber::fmt::layer().with_target(true);
    Registry::default().with(env_filter).with(formatting_layer)
}

/// Installs `subscriber` globally and routes `log` records from dependencies
/// into it. Panics when called twice.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("logger init succeeded");
    set_global_default(subscriber).expect("set subscriber succeeded");
}
