use clap::Parser;
use log::info;
use server::network::Server;
use server::session::SessionManager;
use server::state::GameState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on (falls back to the PORT environment
    /// variable, then 3000)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let port = args
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(3000);

    let address = format!("{}:{}", args.host, port);
    let server = Server::bind(&address).await?;
    info!("Game server running on ws://{}", server.local_addr());

    server.run(SessionManager::new(GameState::new())).await
}
