//! jal-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `JAL_*` environment variables, opens the SQLite store and either serves
//! HTTP or runs one maintenance command against the store.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```
//! cargo run -p jal-server -- hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand, ValueEnum};
use jal_core::{activity::ImportKind, store::{SchemeStore, WriteMode}};
use jal_server::{
  AppState, ServerConfig,
  import::{ImportRequest, import_workbook},
  repair::repair_all,
  translate::HttpTranslator,
};
use jal_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Jal water-scheme monitor server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Import a scheme status workbook.
  ImportSchemes(ImportArgs),
  /// Import a village water-supply workbook.
  ImportWaterData(ImportArgs),
  /// Regenerate dashboard URLs and rewrite missing or stale ones.
  RepairUrls {
    /// Report drift without writing.
    #[arg(long)]
    dry_run: bool,
  },
  /// Recompute region summaries from the scheme rows.
  RefreshRegions,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[derive(clap::Args)]
struct ImportArgs {
  file: PathBuf,

  /// What to do with rows that already exist.
  #[arg(long, value_enum, default_value_t = Mode::Skip)]
  mode: Mode,

  /// Import even if this workbook was imported before.
  #[arg(long)]
  force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
  Skip,
  Replace,
}

impl From<Mode> for WriteMode {
  fn from(m: Mode) -> Self {
    match m {
      Mode::Skip => WriteMode::Skip,
      Mode::Replace => WriteMode::Replace,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let command = cli.command.unwrap_or(Command::Serve);

  if let Command::HashPassword = command {
    let password = rpassword_or_stdin()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("JAL").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(dir) = store_path.parent()
    && !dir.as_os_str().is_empty()
  {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {dir:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_region_aliases(server_cfg.aliases());

  match command {
    Command::Serve => serve(store, server_cfg).await,
    Command::ImportSchemes(args) => {
      import(&store, &server_cfg, ImportKind::SchemeStatus, args).await
    }
    Command::ImportWaterData(args) => {
      import(&store, &server_cfg, ImportKind::WaterData, args).await
    }
    Command::RepairUrls { dry_run } => {
      let counts = repair_all(&store, &server_cfg.dashboard, dry_run).await?;
      println!("{}", serde_json::to_string_pretty(&counts)?);
      Ok(())
    }
    Command::RefreshRegions => {
      let regions = store
        .refresh_region_summaries()
        .await
        .context("failed to refresh region summaries")?;
      for r in &regions {
        println!(
          "{:<28} schemes {:>4}/{:<4} villages {:>5}/{:<5}",
          r.region_name,
          r.fully_completed_schemes,
          r.total_schemes_integrated,
          r.fully_completed_villages,
          r.total_villages_integrated,
        );
      }
      Ok(())
    }
    Command::HashPassword => Ok(()),
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  if server_cfg.admin_password_hash.is_empty() {
    tracing::warn!("admin_password_hash is not set; admin routes will refuse every request");
  }

  let translator =
    HttpTranslator::new(&server_cfg.translate).context("failed to build translation client")?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, server_cfg, translator);
  let app = jal_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import(
  store: &SqliteStore,
  server_cfg: &ServerConfig,
  kind: ImportKind,
  args: ImportArgs,
) -> anyhow::Result<()> {
  let bytes = tokio::fs::read(&args.file)
    .await
    .with_context(|| format!("failed to read {:?}", args.file))?;
  let request = ImportRequest {
    bytes,
    file_name: args
      .file
      .file_name()
      .map(|n| n.to_string_lossy().into_owned()),
    mode: args.mode.into(),
    force: args.force,
  };

  let summary = import_workbook(store, server_cfg, &server_cfg.aliases(), kind, request)
    .await
    .with_context(|| format!("failed to import {:?}", args.file))?;

  for e in summary.report.errors() {
    eprintln!("{} row {}: {}", e.sheet, e.row, e.message);
  }
  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}

/// Read one line from stdin as the password.
fn rpassword_or_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
