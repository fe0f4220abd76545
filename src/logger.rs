use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise les logs; `RUST_LOG` remplace le filtre par defaut
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "damdfe_render=debug,info"
    } else {
        "damdfe_render=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}
