use parquery::engine;
use parquery::frontend::start_all;
use parquery::logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    info!("Bootstrapping query engine");
    engine::duck::bootstrap()?;

    info!("Parquery is starting...");
    start_all().await?;

    Ok(())
}
