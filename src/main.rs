use anyhow::anyhow;
use clap::Parser;
use tinysh::config::Config;
use tinysh::input;
use tinysh::shell::Shell;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    let mut source = input::open(&config);
    Shell::new(config).run(source.as_mut());

    // Command exit statuses are never propagated.
    Ok(())
}
