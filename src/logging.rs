use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "plate_catalog=info,plate_server=info";

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();
}
