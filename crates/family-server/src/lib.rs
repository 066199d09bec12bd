pub mod config;
pub mod seed;

/// Install the fmt subscriber, honouring `RUST_LOG` when set.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "family_server=debug,family_api=debug,family_db=info,tower_http=debug".into()
            }),
        )
        .init();
}
