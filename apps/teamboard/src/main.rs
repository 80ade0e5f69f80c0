mod config;
mod nav;
mod render;

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    BoardController, DragEnd, DragKind, DropLocation, FeedState, Gateway, HttpGateway,
    MemoryGateway, Notification, Notifier, PresenceController, Snapshot, SpeakerFeed,
};
use shared::{
    domain::{Office, Slice, Speaker, Weekday},
    protocol::GatewayEvent,
};
use tokio::sync::{
    broadcast::{self, error::TryRecvError},
    watch,
};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream, WatchStream},
    Stream, StreamExt,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "teamboard", about = "Office presence and stand-up board")]
struct Cli {
    /// TOML settings file; `teamboard.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    gateway_url: Option<String>,
    /// Work against a local JSON snapshot instead of the remote store.
    #[arg(long)]
    offline: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Offices(OfficesCommand),
    #[command(subcommand)]
    Standup(StandupCommand),
    Nav {
        #[arg(long, value_enum, default_value_t = Section::Standup)]
        section: Section,
    },
}

#[derive(Subcommand, Debug)]
enum OfficesCommand {
    List,
    Add {
        name: String,
    },
    Delete {
        /// Office id or name.
        office: String,
    },
    /// Adds the current user to a day, or removes them when already present.
    Toggle {
        office: String,
        day: Weekday,
        #[arg(long, value_enum, default_value_t = SliceArg::Full)]
        slice: SliceArg,
    },
    /// Removes every presence of every office.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum StandupCommand {
    Board,
    AddProject {
        name: String,
    },
    MoveProject {
        project: String,
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
    },
    MoveSpeaker {
        speaker: String,
        #[arg(long)]
        from_column: String,
        #[arg(long)]
        from_index: i64,
        #[arg(long)]
        to_column: String,
        #[arg(long)]
        to_index: i64,
    },
    /// Redraws the board whenever speakers or projects change.
    Watch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SliceArg {
    Full,
    Morning,
    Afternoon,
}

impl From<SliceArg> for Slice {
    fn from(value: SliceArg) -> Self {
        match value {
            SliceArg::Full => Slice::FullDay,
            SliceArg::Morning => Slice::Morning,
            SliceArg::Afternoon => Slice::Afternoon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    Standup,
    Offices,
}

enum Backend {
    Remote(Arc<HttpGateway>),
    Offline {
        gateway: Arc<MemoryGateway>,
        store: PathBuf,
    },
}

impl Backend {
    async fn open(settings: &Settings, offline: bool) -> Result<Self> {
        if offline {
            let snapshot = load_snapshot(&settings.offline_store).await?;
            info!(store = %settings.offline_store.display(), "offline: snapshot loaded");
            return Ok(Self::Offline {
                gateway: Arc::new(MemoryGateway::from_snapshot(snapshot)),
                store: settings.offline_store.clone(),
            });
        }
        let gateway = HttpGateway::new(&settings.gateway_url)?;
        info!(url = %settings.gateway_url, "gateway: using remote store");
        Ok(Self::Remote(Arc::new(gateway)))
    }

    fn gateway(&self) -> Arc<dyn Gateway> {
        match self {
            Self::Remote(gateway) => Arc::clone(gateway) as Arc<dyn Gateway>,
            Self::Offline { gateway, .. } => Arc::clone(gateway) as Arc<dyn Gateway>,
        }
    }

    /// Best effort: the board still refreshes on its timer without the change feed.
    async fn connect_change_feed(&self) {
        if let Self::Remote(gateway) = self {
            if let Err(err) = gateway.connect_change_feed().await {
                warn!(error = %err, "gateway: change feed unavailable, polling only");
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        if let Self::Offline { gateway, store } = self {
            save_snapshot(store, &gateway.snapshot().await).await?;
        }
        Ok(())
    }
}

async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("invalid offline store '{}'", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Snapshot::default()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to read offline store '{}'", path.display()))
        }
    }
}

async fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(snapshot)?;
    tokio::fs::write(path, raw)
        .await
        .with_context(|| format!("failed to write offline store '{}'", path.display()))
}

/// Matches an office by id first, then by case-insensitive name.
fn resolve_office<'a>(offices: &'a [Office], key: &str) -> Result<&'a Office> {
    offices
        .iter()
        .find(|office| office.id.as_str() == key)
        .or_else(|| {
            offices
                .iter()
                .find(|office| office.name.eq_ignore_ascii_case(key.trim()))
        })
        .ok_or_else(|| anyhow!("no office matches '{key}'"))
}

/// `y`, `yes`, `o` and `oui` confirm; anything else, including EOF, declines.
fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    print!("{prompt} [o/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "o" | "oui"
    ))
}

fn drain_notifications(rx: &mut broadcast::Receiver<Notification>) {
    loop {
        match rx.try_recv() {
            Ok(notification) => println!("{}", render::notification(&notification)),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "notifications dropped"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

async fn run_offices(
    command: OfficesCommand,
    gateway: Arc<dyn Gateway>,
    notifier: Notifier,
    settings: &Settings,
) -> Result<()> {
    let controller = PresenceController::new(gateway, notifier, settings.current_user());
    match command {
        OfficesCommand::List => {
            print!("{}", render::presence(&controller.board().await?));
        }
        OfficesCommand::Add { name } => {
            if controller.add_office(&name).await?.is_none() {
                println!("Nom de bureau vide, rien n'a été créé");
            }
        }
        OfficesCommand::Delete { office } => {
            let offices = controller.offices().await?;
            let office = resolve_office(&offices, &office)?;
            controller.delete_office(&office.id).await?;
        }
        OfficesCommand::Toggle { office, day, slice } => {
            let offices = controller.offices().await?;
            let office = resolve_office(&offices, &office)?;
            controller.toggle(office, day, slice.into()).await?;
        }
        OfficesCommand::Clear { yes } => {
            let request = controller.request_clear_all();
            let confirmed = yes
                || confirm(
                    "Supprimer les présences de tous les bureaux ?",
                    &mut io::stdin().lock(),
                )?;
            if confirmed {
                request.confirm().await?;
            } else {
                request.cancel();
                println!("Annulé");
            }
        }
    }
    Ok(())
}

async fn run_standup(
    command: StandupCommand,
    backend: &Backend,
    notifier: Notifier,
    settings: &Settings,
) -> Result<()> {
    let controller = BoardController::new(backend.gateway(), notifier);
    match command {
        StandupCommand::Board => {
            let projects = controller.projects().await?;
            let speakers = backend.gateway().list_speakers().await?;
            print!("{}", render::board(&projects, &FeedState::Ready(speakers)));
        }
        StandupCommand::AddProject { name } => {
            if controller.add_project(&name).await?.is_none() {
                println!("Nom de projet vide, rien n'a été créé");
            }
        }
        StandupCommand::MoveProject { project, from, to } => {
            let board = controller.board().await?;
            let drag = DragEnd {
                draggable_id: project,
                kind: DragKind::Project,
                source: DropLocation::new("board", from),
                destination: Some(DropLocation::new("board", to)),
            };
            if controller.handle_drag_end(&board, &drag).await?.is_none() {
                println!("Aucun déplacement");
            }
        }
        StandupCommand::MoveSpeaker {
            speaker,
            from_column,
            from_index,
            to_column,
            to_index,
        } => {
            let board = controller.board().await?;
            let drag = DragEnd {
                draggable_id: speaker,
                kind: DragKind::Speaker,
                source: DropLocation::new(from_column, from_index),
                destination: Some(DropLocation::new(to_column, to_index)),
            };
            if controller.handle_drag_end(&board, &drag).await?.is_none() {
                println!("Aucun déplacement");
            }
        }
        StandupCommand::Watch => watch_board(&controller, backend, settings).await?,
    }
    Ok(())
}

/// Speaker states to draw: every feed update, and the latest one again when projects change.
fn board_redraws(
    speakers: watch::Receiver<FeedState<Vec<Speaker>>>,
    changes: broadcast::Receiver<GatewayEvent>,
) -> impl Stream<Item = FeedState<Vec<Speaker>>> {
    let latest = speakers.clone();
    let project_changes = BroadcastStream::new(changes).filter_map(move |event| match event {
        Ok(GatewayEvent::ProjectsChanged) | Err(BroadcastStreamRecvError::Lagged(_)) => {
            Some(latest.borrow().clone())
        }
        Ok(_) => None,
    });
    WatchStream::new(speakers).merge(project_changes)
}

async fn watch_board(
    controller: &BoardController,
    backend: &Backend,
    settings: &Settings,
) -> Result<()> {
    backend.connect_change_feed().await;
    let gateway = backend.gateway();
    let changes = gateway.subscribe();
    let feed = SpeakerFeed::spawn(gateway, settings.speaker_refresh());
    let redraws = board_redraws(feed.subscribe(), changes);
    tokio::pin!(redraws);
    info!(refresh = ?settings.speaker_refresh(), "board: watching speakers and projects");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            update = redraws.next() => {
                let Some(state) = update else { break };
                let projects = match controller.projects().await {
                    Ok(projects) => projects,
                    Err(err) => {
                        warn!(error = %err, "board: project list failed");
                        continue;
                    }
                };
                println!("{}", render::board(&projects, &state));
            }
            _ = &mut shutdown => {
                info!("board: watch stopped");
                break;
            }
        }
    }
    Ok(())
}

fn run_nav(section: Section, settings: &Settings) -> Result<()> {
    match section {
        Section::Standup => {
            let today = chrono::Local::now().date_naive();
            let bar = nav::StandupNav::new(today, &settings.meet_url)?;
            print!("{}", render::standup_nav(&bar));
        }
        Section::Offices => print!("{}", render::offices_nav(&nav::offices_links())),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.gateway_url {
        settings.gateway_url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Command::Nav { section } = cli.command {
        return run_nav(section, &settings);
    }

    let backend = Backend::open(&settings, cli.offline).await?;
    let notifier = Notifier::new();
    let mut notifications = notifier.subscribe();

    let outcome = match cli.command {
        Command::Offices(command) => {
            run_offices(command, backend.gateway(), notifier, &settings).await
        }
        Command::Standup(command) => run_standup(command, &backend, notifier, &settings).await,
        Command::Nav { .. } => Ok(()),
    };
    drain_notifications(&mut notifications);
    outcome?;

    backend.persist().await
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
