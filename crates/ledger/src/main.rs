use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use ledger::Chain;
use ledger::http::LedgerApi;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(name = "ledger", about = "Hash-chained book checkout ledger")]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "LEDGER_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let chain = Chain::new()?;
    for block in chain.blocks() {
        tracing::info!(
            position = block.position,
            commitment = %block.commitment,
            predecessor = %block.predecessor_commitment,
            payload = %serde_json::to_string(&block.payload)?,
            "chain initialized with genesis block"
        );
    }

    let api = LedgerApi::new(Arc::new(RwLock::new(chain)));
    let listener = TcpListener::bind(cli.listen).await?;

    tracing::info!(address = %listener.local_addr()?, "listening");
    api.run(listener).await?;

    Ok(())
}
