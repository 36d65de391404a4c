use solwatch::{Result, TARGET};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = solwatch::cli::run().await {
        tracing::error!(target: TARGET, "{}", e);
        std::process::exit(1);
    }
    Ok(())
}
