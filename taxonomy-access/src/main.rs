use clap::Parser;
use taxonomy_access::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let controller = taxonomy_access::controller(&config).await?;
    let out = run(&controller, cli.command).await?;
    print!("{}", out);
    Ok(())
}
