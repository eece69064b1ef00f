use distributed_mapreduce::engine::server::EngineServer;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <port>", args[0]);
        eprintln!("Example: {} 9000", args[0]);

        std::process::exit(1);
    }

    let port: u16 = args[1].parse()?;

    let server = EngineServer::bind(port)?;
    tracing::info!("Engine started on port {}", port);
    tracing::info!("Press Ctrl+C to shutdown");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    server.run(shutdown_rx).await
}
