// =============================================================================
// mxstate - Main Entry Point
// =============================================================================
//
// Project: mxstate - Matrix room state tracking application service
// Author: arkSong (arksong2018@gmail.com)
// Date: 2024-12-11
// Version: 0.11.0-alpha
// License: Apache 2.0 / MIT
//
// Description:
//   Loads the configuration, installs the tracing subscriber and serves the
//   application service API until Ctrl+C or SIGTERM.
//
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use mxstate::{
    appservice::Appservice,
    clap::{self as cli, Commands},
    core::{Event, MembershipResolver, RoomRegistry, ROOM_MEMBER},
    Config,
};
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[cfg(all(not(target_env = "msvc"), feature = "jemalloc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(all(not(target_env = "msvc"), feature = "jemalloc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let start_time = Instant::now();
    let args = cli::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("It looks like your config is invalid. The following error occurred: {e}");
            std::process::exit(1);
        }
    };
    if let Some(log_level) = args.log_level {
        config.log = log_level;
    }

    init_tracing(&config.log)?;
    info!("🚀 Starting mxstate {}", cli::version());

    match args.command {
        Commands::Start { address, port } => {
            if let Some(address) = address {
                config.address = address;
                info!("📡 Address override from CLI: {}", config.address);
            }
            if let Some(port) = port {
                config.port = port;
                info!("🔌 Port override from CLI: {}", config.port);
            }
            config.validate()?;

            info!("⏰ Startup took {:?}", start_time.elapsed());
            run_server(config).await
        }
        Commands::CheckConfig => {
            let mut shown = config.clone();
            shown.appservice.hs_token = "<redacted>".to_string();
            println!("{}", toml::to_string_pretty(&shown)?);
            info!("✅ Configuration is valid");
            Ok(())
        }
    }
}

fn init_tracing(directive: &str) -> anyhow::Result<()> {
    let filter_layer = match EnvFilter::try_new(directive) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("It looks like your log filter is invalid. The following error occurred while parsing it: {e}");
            EnvFilter::new("warn")
        }
    };

    let subscriber = tracing_subscriber::Registry::default()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::Layer::new());
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the tracing subscriber")
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let registry = Arc::new(RoomRegistry::new(config.store.clone()));
    let appservice = Arc::new(Appservice::new(config.appservice.clone(), Arc::clone(&registry)));

    appservice.add_listener(move |event: &Event| {
        if event.event_type != ROOM_MEMBER {
            return;
        }
        let (Some(room_id), Some(user_id)) = (&event.room_id, &event.state_key) else {
            return;
        };
        if let Some(room) = registry.get(room_id) {
            debug!(
                room_id = %room_id,
                user_id = %user_id,
                membership = %room.get_membership_state(user_id),
                "👥 Membership updated"
            );
        }
    });

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 mxstate listening on: {}", addr);

    axum::serve(listener, appservice.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("👋 mxstate stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let sig: &str;

    tokio::select! {
        _ = ctrl_c => { sig = "Ctrl+C"; },
        _ = terminate => { sig = "SIGTERM"; },
    }

    warn!("Received {}, shutting down...", sig);
}
