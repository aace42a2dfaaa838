use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

mod command;
mod util;

fn main() -> anyhow::Result<()> {
    // stdout carries tables and JSON, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("ALINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    command::run()
}
