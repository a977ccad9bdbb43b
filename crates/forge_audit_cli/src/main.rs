//! forge-audit CLI - export repository activity from GitHub and Forgejo.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::Term;
use forge_audit::ProviderKind;
use forge_audit::input::read_logins;
use forge_audit::model::User;
use tracing_subscriber::EnvFilter;

use crate::commands::export::ExportKind;
use crate::commands::limits::OutputFormat;
use crate::commands::shared::{Resolved, open_pool, resolve_repository_names, resolve_tokens};

#[derive(Parser)]
#[command(name = "forge-audit")]
#[command(version)]
#[command(about = "Export repository activity from GitHub and Forgejo")]
#[command(
    long_about = "forge-audit reads commits, contributors, issues, pull requests, branches, \
invites, workflow runs and wiki pages from GitHub or Forgejo (and other Gitea-compatible \
forges). Several tokens can be given; each request goes to the token with the most quota left."
)]
#[command(after_long_help = r#"EXAMPLES
    Export commits with changed files for two repositories:
        $ forge-audit --repo rust-lang/rust --repo tokio-rs/tokio commits

    Rotate between tokens and read the repository list from a file:
        $ forge-audit --tokens-file tokens.txt --list repos.txt issues --comments

    Export pull requests from a Forgejo instance, including forks:
        $ forge-audit --base-url https://codeberg.org --list repos.txt --forks pulls

    Show remaining quota of every token:
        $ forge-audit --tokens-file tokens.txt limits

CONFIGURATION
    forge-audit reads configuration from:
      1. ~/.config/forge-audit/config.toml (or $XDG_CONFIG_HOME/forge-audit/config.toml)
      2. ./forge-audit.toml
      3. Environment variables (FORGE_AUDIT_ prefix, __ between section and key)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    FORGE_AUDIT_FORGE__PROVIDER      github or forgejo
    FORGE_AUDIT_FORGE__BASE_URL      API host (required for forgejo)
    FORGE_AUDIT_FORGE__TOKEN         Access token
    FORGE_AUDIT_FORGE__TOKENS_FILE   File with one token per line
    FORGE_AUDIT_EXPORT__PACING_MS    Delay between requests (default: 50)
    RUST_LOG                         Log filter (default: forge_audit=info,forge_audit_cli=info)
"#)]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every export.
#[derive(Debug, Clone, Args)]
pub(crate) struct GlobalArgs {
    /// Forge provider (inferred from --base-url when omitted)
    #[arg(short, long, global = true)]
    pub(crate) provider: Option<ProviderKind>,

    /// API host; required for Forgejo, a GitHub Enterprise root for GitHub
    #[arg(short, long, global = true)]
    pub(crate) base_url: Option<String>,

    /// Access token (repeat for several tokens)
    #[arg(short, long, global = true)]
    pub(crate) token: Vec<String>,

    /// File with one token per line
    #[arg(short = 'T', long, global = true)]
    pub(crate) tokens_file: Option<PathBuf>,

    /// Repository as owner/name (repeatable)
    #[arg(short, long, global = true)]
    pub(crate) repo: Vec<String>,

    /// File with one owner/name per line
    #[arg(short, long, global = true)]
    pub(crate) list: Option<PathBuf>,

    /// Also export every fork of each repository
    #[arg(short, long, global = true)]
    pub(crate) forks: bool,

    /// Delay between consecutive requests in milliseconds (0 disables)
    #[arg(long, global = true)]
    pub(crate) pacing_ms: Option<u64>,

    /// Output format (default: table on a terminal, json otherwise)
    #[arg(short, long, value_enum, global = true)]
    pub(crate) output: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export commits
    Commits {
        /// Skip the per-commit request for changed files and line counts
        #[arg(long)]
        no_files: bool,
    },
    /// Export per-contributor commit counts and repository permission
    Contributors,
    /// Export issues
    Issues {
        #[command(flatten)]
        extras: ThreadOptions,
    },
    /// Export pull requests
    Pulls {
        #[command(flatten)]
        extras: ThreadOptions,
    },
    /// Export branches with their tip commit
    Branches,
    /// Export pending invitations
    ///
    /// On Forgejo, which has no invitation API, every candidate who is not
    /// yet a collaborator is reported instead.
    Invites {
        /// File with one candidate login per line
        #[arg(short, long)]
        candidates: Option<PathBuf>,
    },
    /// Export workflow runs (GitHub only)
    WorkflowRuns,
    /// Export wiki pages (Forgejo only)
    Wiki,
    /// Show remaining quota per token
    Limits,
}

/// Extras fetched per issue or pull request.
#[derive(Debug, Clone, Args)]
struct ThreadOptions {
    /// Include comments
    #[arg(long)]
    comments: bool,

    /// Include the assignment history from the timeline
    #[arg(long)]
    assignees: bool,
}

fn init_tracing() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("forge_audit=info,forge_audit_cli=info"),
    };

    // Records go to stdout, so logs must not.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn export_kind(command: Commands) -> Result<Option<ExportKind>, Box<dyn std::error::Error>> {
    let kind = match command {
        Commands::Commits { no_files } => ExportKind::Commits {
            include_files: !no_files,
        },
        Commands::Contributors => ExportKind::Contributors,
        Commands::Issues { extras } => ExportKind::Issues {
            comments: extras.comments,
            assignees: extras.assignees,
        },
        Commands::Pulls { extras } => ExportKind::PullRequests {
            comments: extras.comments,
            assignees: extras.assignees,
        },
        Commands::Branches => ExportKind::Branches,
        Commands::Invites { candidates } => {
            let candidates = match candidates {
                Some(path) => read_logins(&path)
                    .map_err(|e| format!("Failed to read candidates {}: {}", path.display(), e))?
                    .into_iter()
                    .map(User::from_login)
                    .collect(),
                None => Vec::new(),
            };
            ExportKind::Invites { candidates }
        }
        Commands::WorkflowRuns => ExportKind::WorkflowRuns,
        Commands::Wiki => ExportKind::Wiki,
        Commands::Limits => return Ok(None),
    };
    Ok(Some(kind))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();
    let resolved = Resolved::new(&cli.global, &config);
    let output = cli.global.output.unwrap_or(if Term::stdout().is_term() {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    });

    let tokens = resolve_tokens(&cli.global, &config)?;
    let pool = open_pool(&resolved, &tokens).await?;

    match export_kind(cli.command)? {
        Some(kind) => {
            let names = resolve_repository_names(&cli.global.repo, cli.global.list.as_ref())?;
            commands::export::handle_export(kind, &pool, names, resolved.include_forks, output)
                .await?;
        }
        None => commands::limits::handle_limits(&pool, output).await?,
    }

    Ok(())
}
