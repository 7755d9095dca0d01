//! The entry point for the development storage server.
//!
//! Seeds one device with its mount points, sets up tracing and serves the
//! routes built by `objfs_store::router`.

use clap::Parser;
use objfs_store::{Store, router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "objfs-store", version, about = "In-memory object store for objfs")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Name of the device to provision.
    #[arg(long, default_value = "Objfs")]
    device: String,

    /// Mount points created on the device. Repeat for several.
    #[arg(long = "mount-point", default_values = ["Archive", "Sync"])]
    mount_points: Vec<String>,

    /// Account quota in bytes. Unlimited when omitted.
    #[arg(long)]
    capacity: Option<u64>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Uses `RUST_LOG` env var or defaults to "objfs_store=debug,tower_http=debug".
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "objfs_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut store = Store::new(args.capacity);
    store.add_device(&args.device, &args.mount_points);
    tracing::info!(device = %args.device, mount_points = ?args.mount_points, "provisioned account");

    let app = router(store.shared());

    tracing::debug!("listening on {}", args.listen);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    axum::serve(listener, app).await
}
