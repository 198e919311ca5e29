use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3000")]
    server: String,

    /// Directory the map editor persists maps into
    #[arg(long, default_value = ".tileworld")]
    store_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: WASD/arrows to move, +/- to change speed");
    info!("Editor: E to toggle, 1-5 to pick terrain, click to paint");
    info!("Map persistence: F5 saves, F9 restores through the server");

    let mut client = client::network::Client::new(&args.store_dir);
    client.run(&args.server).await
}
