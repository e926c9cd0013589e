//! Command-line host for the live queue booth coordinator.
//!
//! Each subcommand mounts a coordinator for one booth code, so a previously
//! paid entry is resumed from its recovery record before anything else runs.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

use client::domain::ports::RecoveryStore;
use client::domain::{
    BoothCoordinator, BoothPorts, BoothState, BoothView, JoinIntake, MediaKey, SessionCode,
};
use client::outbound::http::HttpMarketplaceApi;
use client::outbound::push::BroadcastPushHub;
use client::outbound::recovery::{CapFsRecoveryStore, InMemoryRecoveryStore};
use client::settings::LiveQueueSettings;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "live-queue",
    about = "Join, watch and leave a vendor's live queue",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show the booth and any resumed entry.
    Status {
        /// Booth code shared by the vendor.
        code: String,
    },
    /// Join the queue, confirm the payment hold and follow the entry.
    Join {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        question: String,
        /// Storage key of an uploaded photo.
        #[arg(long)]
        photo_key: Option<String>,
        /// Storage key of an uploaded audio note.
        #[arg(long)]
        audio_key: Option<String>,
    },
    /// Follow a resumed entry until it finishes.
    Watch { code: String },
    /// Leave the queue while still waiting.
    Leave { code: String },
}

impl Command {
    fn code(&self) -> &str {
        match self {
            Self::Status { code }
            | Self::Join { code, .. }
            | Self::Watch { code }
            | Self::Leave { code } => code,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let cli = Cli::parse();
    // Settings come from the environment and config files only; the command
    // line belongs to clap.
    let settings = LiveQueueSettings::load_from_iter([OsString::from("live-queue")])
        .map_err(|error| eyre!("failed to load live queue settings: {error}"))?;
    let code = SessionCode::new(cli.command.code())
        .map_err(|error| eyre!("invalid booth code: {error}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(cli.command, code, &settings))
}

fn init_tracing() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
        .map_err(|error| eyre!("failed to initialise tracing: {error}"))
}

async fn run(command: Command, code: SessionCode, settings: &LiveQueueSettings) -> Result<()> {
    let ports = build_ports(settings)?;
    let mut booth = BoothCoordinator::new(code, ports, settings.coordinator_config());
    booth.mount().await;
    render(&booth.view())?;

    match command {
        Command::Status { .. } => Ok(()),
        Command::Watch { .. } => follow(&mut booth).await,
        Command::Join {
            name,
            email,
            question,
            photo_key,
            audio_key,
            ..
        } => {
            let intake = JoinIntake {
                name,
                email,
                question,
                photo: photo_key.map(MediaKey::new),
                audio: audio_key.map(MediaKey::new),
            };
            booth.join(intake).await?;
            render(&booth.view())?;
            booth.confirm_authorization().await?;
            render(&booth.view())?;
            follow(&mut booth).await
        }
        Command::Leave { .. } => {
            // A resumed entry reads as loading until its first snapshot.
            while booth.state() == BoothState::Loading {
                if booth.next_update().await.is_none() {
                    break;
                }
            }
            booth.leave().await?;
            render(&booth.view())
        }
    }
}

fn build_ports(settings: &LiveQueueSettings) -> Result<BoothPorts> {
    let base_url = settings.api_base_url()?;
    let api = Arc::new(
        HttpMarketplaceApi::new(base_url, settings.request_timeout())
            .wrap_err("failed to build marketplace client")?,
    );
    let recovery: Arc<dyn RecoveryStore> = if settings.ephemeral_recovery {
        Arc::new(InMemoryRecoveryStore::new())
    } else {
        let root = settings.recovery_dir();
        Arc::new(CapFsRecoveryStore::open(&root).wrap_err_with(|| {
            format!("failed to open recovery directory {}", root.display())
        })?)
    };

    Ok(BoothPorts {
        directory: api.clone(),
        membership: api.clone(),
        positions: api.clone(),
        // No push channel is wired for the CLI; polling alone drives updates.
        push: Arc::new(BroadcastPushHub::new()),
        payments: api,
        recovery,
    })
}

/// Print every state change until the entry reaches a final state or
/// nothing is tracked any more.
async fn follow(booth: &mut BoothCoordinator) -> Result<()> {
    let mut last = booth.state();
    while !booth.state().is_terminal() {
        let Some(state) = booth.next_update().await else {
            break;
        };
        if state != last {
            render(&booth.view())?;
            last = state;
        }
    }
    Ok(())
}

fn render(view: &BoothView) -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "state={}", view.state)?;
    if let Some(session) = &view.session {
        write!(
            out,
            " session={} status={} price={} waiting={}",
            session.id, session.status, session.price, session.queue_count
        )?;
    }
    if let Some(position) = &view.position {
        write!(
            out,
            " entry={} position={}/{}",
            position.entry_id, position.position, position.total_waiting
        )?;
    }
    if !view.reconnect_supported {
        write!(out, " reconnect=unavailable")?;
    }
    if let Some(error) = &view.error {
        write!(out, " error={error:?}")?;
    }
    writeln!(out)?;
    Ok(())
}
