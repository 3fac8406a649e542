use clap::{Parser, Subcommand};
use owo_colors::{OwoColorize, Stream};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tk_core::config::DEFAULT_CONFIG_FILE;
use tk_core::tracker::DEFAULT_COMMIT_AUTHOR;
use tk_core::types::{CommitRecord, IssueId};
use tk_core::{SyncScheduler, Tracker, TrackerError, VcsConfig, VcsService};
use tk_db::DbStore;
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = ".tracker/tracker.db";
const DEFAULT_PORT: u16 = 4830;

#[derive(Parser)]
#[command(name = "tk", about = "Issue tracker VCS integration")]
struct Cli {
    /// VCS configuration document (.json or .toml).
    #[arg(long, global = true, env = "TK_VCS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// HTTP API plus background sync.
    Serve,
    /// Commits referencing an issue across every repository.
    Commits {
        issue: String,
        #[arg(long)]
        json: bool,
    },
    /// Raw diff of one revision.
    Diff { repo: String, revision: String },
    /// Applies a commit message to the issues it references.
    Webhook {
        #[arg(long)]
        message: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Pulls or updates every repository once, or keeps syncing with --watch.
    Sync {
        #[arg(long)]
        watch: bool,
    },
    /// Configured repositories.
    Repos,
    Openapi,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{} {err}",
                "error:".if_supports_color(Stream::Stderr, |text| text.red())
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), TrackerError> {
    let config = VcsConfig::load_or_default(&cli.config);
    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Commits { issue, json } => {
            let issue = parse_issue(&issue)?;
            let commits = VcsService::from_config(&config).commits(issue).await;
            if json {
                println!("{}", to_json(&commits)?);
            } else {
                print_commits(&commits);
            }
            Ok(())
        }
        Command::Diff { repo, revision } => {
            let diff = VcsService::from_config(&config)
                .diff(&repo, &revision)
                .await?;
            print!("{diff}");
            Ok(())
        }
        Command::Webhook { message, author } => {
            let tracker = open_tracker(&db_path())?;
            let author = author.unwrap_or_else(|| DEFAULT_COMMIT_AUTHOR.to_string());
            let outcome = tracker.webhooks().process_commit(&message, &author);
            println!("{}", to_json(&outcome)?);
            Ok(())
        }
        Command::Sync { watch } => sync(&config, watch).await,
        Command::Repos => {
            let service = VcsService::from_config(&config);
            println!("{}", to_json(&service.registry().summaries())?);
            Ok(())
        }
        Command::Openapi => {
            println!("{}", tk_serve::openapi::generate_spec());
            Ok(())
        }
    }
}

async fn serve(config: &VcsConfig) -> Result<(), TrackerError> {
    let db_path = db_path();
    open_tracker(&db_path)?;
    let port = std::env::var("TK_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

    let service = Arc::new(VcsService::from_config(config));
    SyncScheduler::new(Arc::clone(&service), config.auto_sync.enabled).start();

    let state = tk_serve::AppState::new(db_path, service);
    tk_serve::serve(state, addr)
        .await
        .map_err(|err| TrackerError::Internal {
            message: err.to_string(),
        })
}

async fn sync(config: &VcsConfig, watch: bool) -> Result<(), TrackerError> {
    let service = Arc::new(VcsService::from_config(config));
    if !watch {
        let reports = service.sync_all().await;
        println!("{}", to_json(&reports)?);
        return Ok(());
    }
    let scheduler = SyncScheduler::new(service, config.auto_sync.enabled);
    if !scheduler.start() {
        return Err(TrackerError::Internal {
            message: "auto-sync is disabled in the configuration".to_string(),
        });
    }
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| TrackerError::Internal {
            message: err.to_string(),
        })
}

fn db_path() -> PathBuf {
    std::env::var("TK_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
}

fn open_tracker(path: &Path) -> Result<Tracker<DbStore>, TrackerError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| TrackerError::Internal {
            message: format!("{}: {err}", parent.display()),
        })?;
    }
    let conn = tk_db::schema::open_and_migrate(path).map_err(|err| TrackerError::Internal {
        message: err.to_string(),
    })?;
    Ok(Tracker::new(DbStore::new(conn)))
}

fn parse_issue(value: &str) -> Result<IssueId, TrackerError> {
    IssueId::parse(value).map_err(|err| {
        TrackerError::Issue(tk_core::error::IssueError::InvalidInput {
            message: err.to_string(),
        })
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, TrackerError> {
    serde_json::to_string_pretty(value).map_err(|err| TrackerError::Internal {
        message: err.to_string(),
    })
}

fn print_commits(commits: &[CommitRecord]) {
    if commits.is_empty() {
        println!("no commits");
        return;
    }
    for commit in commits {
        println!(
            "{} {} {} {} {}",
            commit
                .revision
                .if_supports_color(Stream::Stdout, |text| text.yellow()),
            format!("[{}]", commit.repo).if_supports_color(Stream::Stdout, |text| text.cyan()),
            commit.date.if_supports_color(Stream::Stdout, |text| text.dimmed()),
            commit.author,
            commit.message
        );
    }
}
