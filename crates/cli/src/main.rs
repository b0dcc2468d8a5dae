use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use sbxctl_core::{
    Credentials, Endpoints, ExpiringCache, FileStore, MemoryStore, Session, SystemClock,
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod code;
mod config;
mod cred;
mod output;
mod sandbox;

use config::Settings;

/// Resolved options shared by every command
#[derive(Clone, Debug)]
pub struct Context {
    pub settings: Settings,
    pub no_cache: bool,
    pub json: bool,
    pub assume_yes: bool,
}

impl Context {
    pub fn new(settings: Settings, no_cache: bool, json: bool, assume_yes: bool) -> Self {
        Context {
            settings,
            no_cache,
            json,
            assume_yes,
        }
    }

    /// Build the per-invocation session. Fails on missing credentials before
    /// any network call is made.
    pub fn session(&self) -> Result<Session, String> {
        let credentials = Credentials::new(
            self.settings.client_id.clone(),
            self.settings.client_secret.clone(),
        )
        .map_err(|e| e.to_string())?;

        let mut endpoints = Endpoints::default();
        if let Some(auth_url) = &self.settings.auth_url {
            endpoints = endpoints
                .with_auth_url(auth_url)
                .map_err(|e| e.to_string())?;
        }
        if let Some(api_url) = &self.settings.api_url {
            endpoints = endpoints
                .with_api_url(api_url)
                .map_err(|e| e.to_string())?;
        }

        Session::new(credentials, endpoints, self.cache()?).map_err(|e| e.to_string())
    }

    /// `--no-cache` keeps entries in memory for this invocation only
    fn cache(&self) -> Result<ExpiringCache, String> {
        if self.no_cache {
            debug!("Using in-memory cache");
            return Ok(ExpiringCache::new(MemoryStore::new(), SystemClock));
        }
        let store = match &self.settings.cache_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::in_user_cache_dir().map_err(|e| e.to_string())?,
        };
        debug!(dir = %store.dir().display(), "Using file cache");
        Ok(ExpiringCache::new(store, SystemClock))
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "sbx - manage on-demand sandboxes", long_about = None)]
struct Opts {
    #[command(flatten)]
    global: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// API client id
    #[arg(long = "client-id", env = "SBX_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(
        long = "client-secret",
        env = "SBX_CLIENT_SECRET",
        global = true,
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Token endpoint URL
    #[arg(long = "auth-url", env = "SBX_AUTH_URL", global = true)]
    pub auth_url: Option<String>,

    /// Sandbox admin API base URL
    #[arg(long = "api-url", env = "SBX_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory for the token and sandbox list cache
    #[arg(long = "cache-dir", env = "SBX_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Settings file (default: <config dir>/sbxctl/config.toml)
    #[arg(long = "config", short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Do not read or write the cache on disk
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Skip the confirmation prompt for operations on several sandboxes
    #[arg(long = "yes", short = 'y', global = true)]
    pub yes: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// List all sandboxes (always refreshes the cached list)
    List(sandbox::ListCommand),
    /// Start every sandbox matching a host name fragment or id
    Start(sandbox::OperateCommand),
    /// Stop every sandbox matching a host name fragment or id
    Stop(sandbox::OperateCommand),
    /// Restart every sandbox matching a host name fragment or id
    Restart(sandbox::OperateCommand),
    /// Show details of every sandbox matching a host name fragment or id
    #[command(name = "s-info")]
    SInfo(sandbox::InfoCommand),
    /// Report usage credits of a realm
    Cred(cred::CredCommand),
    /// List code versions on an instance
    #[command(name = "code-list")]
    CodeList(code::ListCommand),
    /// Activate the most recent code version matching a fragment
    #[command(name = "code-activate")]
    CodeActivate(code::ActivateCommand),
}

#[tokio::main]
async fn main() {
    // clap reads `env` defaults during parsing, so .env must be loaded first
    load_env_file(Path::new("."));

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            process::exit(e.exit_code());
        }
    };

    setup_log(opts.global.verbose);

    let settings = match Settings::resolve(&opts.global) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let ctx = Context::new(
        settings,
        opts.global.no_cache,
        opts.global.json,
        opts.global.yes,
    );

    if let Err(e) = handle_command(opts.command, &ctx).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Load environment variables from a .env file in `dir`
fn load_env_file(dir: &Path) {
    let env_file_path = dir.join(".env");

    match dotenvy::from_path(&env_file_path) {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => {
            eprintln!(
                "Warning: Failed to load .env file at {}: {}",
                env_file_path.display(),
                e
            );
        }
    }
}

/// Logs go to stderr so stdout stays clean for results and JSON.
fn setup_log(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

async fn handle_command(command: Command, ctx: &Context) -> Result<(), String> {
    use sbxctl_types::SandboxOperation;

    match command {
        Command::List(cmd) => cmd.execute(ctx).await,
        Command::Start(cmd) => cmd.execute(SandboxOperation::Start, ctx).await,
        Command::Stop(cmd) => cmd.execute(SandboxOperation::Stop, ctx).await,
        Command::Restart(cmd) => cmd.execute(SandboxOperation::Restart, ctx).await,
        Command::SInfo(cmd) => cmd.execute(ctx).await,
        Command::Cred(cmd) => cmd.execute(ctx).await,
        Command::CodeList(cmd) => cmd.execute(ctx).await,
        Command::CodeActivate(cmd) => cmd.execute(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_parse_subcommand_names() {
        let opts = Opts::try_parse_from(["sbx", "s-info", "zzzz-s01"]).unwrap();
        assert!(matches!(opts.command, Command::SInfo(_)));

        let opts = Opts::try_parse_from(["sbx", "code-activate", "host.example.com", "rel"]).unwrap();
        assert!(matches!(opts.command, Command::CodeActivate(_)));

        let opts = Opts::try_parse_from(["sbx", "cred", "zzzz", "last-month"]).unwrap();
        assert!(matches!(opts.command, Command::Cred(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let opts =
            Opts::try_parse_from(["sbx", "stop", "zzzz", "--yes", "-vv", "--no-cache"]).unwrap();
        assert!(opts.global.yes);
        assert!(opts.global.no_cache);
        assert_eq!(opts.global.verbose, 2);
    }

    #[test]
    fn test_missing_target_is_a_parse_error() {
        assert!(Opts::try_parse_from(["sbx", "start"]).is_err());
        assert!(Opts::try_parse_from(["sbx", "code-activate", "host"]).is_err());
    }

    fn with_cache_dir(dir: &Path, no_cache: bool) -> Context {
        let settings = Settings {
            cache_dir: Some(dir.to_path_buf()),
            ..Settings::default()
        };
        Context::new(settings, no_cache, false, false)
    }

    async fn fill(cache: &ExpiringCache) -> String {
        cache
            .get_or_compute("sandbox-list", TimeDelta::minutes(1), false, || async {
                Ok("zzzz-s01".to_string())
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_cache_never_touches_the_cache_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("sbx");

        let cache = with_cache_dir(&dir, true).cache().unwrap();
        assert_eq!(fill(&cache).await, "zzzz-s01");
        assert_eq!(cache.lookup::<String>("sandbox-list").as_deref(), Some("zzzz-s01"));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_cache_dir_is_used_by_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("sbx");

        let cache = with_cache_dir(&dir, false).cache().unwrap();
        fill(&cache).await;
        assert!(dir.join("sandbox-list.json").exists());

        // a later invocation sees the entry
        let cache = with_cache_dir(&dir, false).cache().unwrap();
        assert_eq!(cache.lookup::<String>("sandbox-list").as_deref(), Some("zzzz-s01"));
    }

    #[test]
    fn test_session_requires_credentials() {
        let ctx = Context::new(Settings::default(), true, false, false);
        let err = ctx.session().err().unwrap();
        assert!(err.contains("client id"), "{err}");
    }
}
