use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the log sink. Logs go to stderr so report output on stdout
/// stays machine readable.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "bkflash=debug,bkflash_cli=debug,bkflash_kernel=debug,bkflash_storage=debug"
    } else {
        "bkflash=info,bkflash_cli=info,bkflash_kernel=info,bkflash_storage=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
