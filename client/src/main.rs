//! Entry point for the `objfs` mount.
//!
//! 1. Parses the mountpoint (and options) from the command line.
//! 2. Loads `config.toml` and the account credentials from the environment.
//! 3. Builds the HTTP object store, the adapter and its FUSE bridge.
//! 4. Mounts the filesystem and blocks until it is unmounted.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use fuser::MountOption;
use objfs::config::{self, Credentials};
use objfs::{FsOptions, HttpStore, MountedFs, ObjectFs, Owner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "objfs", version, about = "Mount a remote object storage account")]
struct Cli {
    /// Directory to mount the account on.
    mountpoint: PathBuf,

    /// Configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Detach from the terminal after startup.
    #[arg(long)]
    background: bool,
}

// No #[tokio::main]: the FUSE session runs on this thread and the HTTP store
// drives its own runtime with block_on.
fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "objfs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{}", e.render());
            eprintln!("usage: objfs <MOUNTPOINT>");
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(&cli.config);
    info!(?config, "configuration loaded");
    let credentials = Credentials::from_env()?;
    // Daemonizing moves to `/`, so relative mountpoints must be resolved first.
    let mountpoint = cli
        .mountpoint
        .canonicalize()
        .with_context(|| format!("mountpoint {} is not accessible", cli.mountpoint.display()))?;

    if cli.background {
        daemonize::Daemonize::new()
            .working_directory("/")
            .start()
            .context("cannot detach from terminal")?;
    }

    // The store owns a Tokio runtime, so it is built only after forking.
    let store = HttpStore::new(&config, credentials).context("cannot create storage client")?;
    let owner = Owner::of(&mountpoint).context("cannot read mountpoint owner")?;
    let core = ObjectFs::new(Arc::new(store), FsOptions::from(&config), owner);
    let filesystem = MountedFs::new(core, Duration::from_secs(config.kernel_attr_timeout_seconds));

    let mut options = vec![MountOption::AutoUnmount, MountOption::FSName("objfs".to_string())];
    if config.read_only {
        options.push(MountOption::RO);
    }

    info!(mountpoint = %mountpoint.display(), "mounting filesystem");
    fuser::mount2(filesystem, &mountpoint, &options)
        .with_context(|| format!("failed to mount at {}", mountpoint.display()))?;
    Ok(())
}
