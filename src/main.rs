// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use locsync::app_config::{self, Config};
use locsync::credentials::{ChainedCredentials, EnvCredentials};
use locsync::database::{self, DatabaseConnection, KeyStore, Repository};
use locsync::language_utils;
use locsync::providers::openai::OpenAIClient;
use locsync::translation::ReconciliationService;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the keys a locale is missing relative to the baseline
    #[command(group(ArgGroup::new("target").required(true).args(["locale", "all"])))]
    Sync {
        /// Locale to reconcile (e.g. 'ru', 'pt-BR')
        locale: Option<String>,

        /// Reconcile every configured locale
        #[arg(long)]
        all: bool,
    },

    /// List the keys a locale is missing, without translating
    Missing {
        /// Locale to inspect
        locale: String,
    },

    /// Export a locale as a flat key → text JSON object
    Export {
        /// Locale to export
        locale: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a flat key → text JSON object into a locale, all or nothing
    Import {
        /// Locale to import into
        locale: String,

        /// JSON file to read
        file: PathBuf,
    },

    /// Show per-locale completeness against the baseline
    Stats,

    /// Manage provider credentials stored in the database
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },

    /// Generate shell completions for locsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialAction {
    /// Store a secret and make it the active one for its service
    Set { service: String, secret: String },

    /// Deactivate every stored secret of a service
    Clear { service: String },
}

/// locsync - keep translation locales in step with a baseline locale
#[derive(Parser, Debug)]
#[command(name = "locsync")]
#[command(version)]
#[command(about = "AI-assisted translation store reconciliation")]
#[command(long_about = "locsync finds the keys each locale is missing relative to the baseline \
locale and fills them through an AI translation backend, batch first, then key by key.

EXAMPLES:
    locsync sync ru                           # Reconcile Russian
    locsync sync --all                        # Reconcile every configured locale
    locsync missing de                        # Dry run: list what German lacks
    locsync export fr -o fr.json              # Export French as flat JSON
    locsync import es es.json                 # Import Spanish atomically
    locsync credential set openai sk-...      # Store an API key in the database
    locsync completions bash > locsync.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Database file (overrides the configuration)
    #[arg(long, env = "LOCSYNC_DATABASE", global = true)]
    database: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with the most verbose level; the effective level
    // is lowered through set_max_level once the configuration is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "locsync", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let repo = open_repository(&config, cli.database.as_deref())?;

    match cli.command {
        Commands::Sync { locale, all } => run_sync(&config, repo, locale, all).await,
        Commands::Missing { locale } => run_missing(&config, repo, &locale).await,
        Commands::Export { locale, output } => run_export(&repo, &locale, output.as_deref()).await,
        Commands::Import { locale, file } => run_import(&repo, &locale, &file).await,
        Commands::Stats => run_stats(&config, &repo).await,
        Commands::Credential { action } => run_credential(&repo, action).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load, override and validate the configuration
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn open_repository(config: &Config, database_override: Option<&Path>) -> Result<Repository> {
    let path = match database_override.map(Path::to_path_buf).or_else(|| config.database_path()) {
        Some(path) => path,
        None => DatabaseConnection::default_database_path()?,
    };

    info!("Using database {}", path.display());
    let db = DatabaseConnection::new(&path)?;
    Ok(Repository::new(db))
}

fn build_service(config: &Config, repo: Repository) -> ReconciliationService {
    let translation = &config.translation;

    let credentials = ChainedCredentials::new()
        .push(
            EnvCredentials::new()
                .with_variable(&translation.credential_service, &translation.credential_env_var),
        )
        .push(repo.clone());

    let provider = OpenAIClient::from_config(translation, Arc::new(credentials));

    ReconciliationService::new(
        &config.baseline_locale,
        translation.models.clone(),
        Arc::new(provider),
        Arc::new(repo),
        translation.pacing(),
    )
}

fn ensure_supported(config: &Config, locale: &str) -> Result<String> {
    config.resolve_locale(locale).map(str::to_string).ok_or_else(|| {
        anyhow!(
            "Locale '{}' is not in supported_locales ({})",
            locale,
            config.supported_locales.join(", ")
        )
    })
}

fn progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    let template_result = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} keys ({percent}%) {msg} {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(template_result.progress_chars("█▓▒░"));
    progress_bar
}

async fn run_sync(config: &Config, repo: Repository, locale: Option<String>, all: bool) -> Result<()> {
    let service = build_service(config, repo);

    let pb = progress_bar();

    let results = if all {
        service
            .reconcile_all_with_progress(&config.target_locales(), |locale, done, total| {
                pb.set_message(locale.to_string());
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await
    } else {
        let requested = locale.ok_or_else(|| anyhow!("A locale or --all is required"))?;
        let locale = ensure_supported(config, &requested)?;
        pb.set_message(locale.clone());

        let stats = service
            .reconcile_locale_with_progress(&locale, |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await?;
        vec![stats]
    };

    pb.finish_and_clear();

    for stats in &results {
        if stats.is_complete() {
            info!("✅ {}", stats);
        } else {
            warn!("{}", stats);
            warn!("Unresolved keys for {}: {}", stats.locale, stats.failed_keys.join(", "));
        }
    }

    Ok(())
}

async fn run_missing(config: &Config, repo: Repository, locale: &str) -> Result<()> {
    let locale = ensure_supported(config, locale)?;
    let service = build_service(config, repo);

    let missing = service.missing_keys(&locale).await?;
    info!("{} is missing {} key(s)", locale, missing.len());

    let mut stdout = std::io::stdout();
    for key in missing {
        writeln!(stdout, "{}", key)?;
    }
    Ok(())
}

async fn run_export(repo: &Repository, locale: &str, output: Option<&Path>) -> Result<()> {
    let entries = repo.export_locale(locale).await?;
    let json = serde_json::to_string_pretty(&entries).context("Failed to serialize export")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export file: {}", path.display()))?;
            info!("Exported {} entries of {} to {}", entries.len(), locale, path.display());
        }
        None => writeln!(std::io::stdout(), "{}", json)?,
    }
    Ok(())
}

async fn run_import(repo: &Repository, locale: &str, file: &Path) -> Result<()> {
    language_utils::validate_locale_code(locale)?;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    let entries: BTreeMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("Import file must be a flat JSON object of strings: {}", file.display()))?;

    repo.bulk_import(locale, &entries).await?;
    info!("Imported {} entries into {}", entries.len(), locale);
    Ok(())
}

async fn run_stats(config: &Config, repo: &Repository) -> Result<()> {
    let stats = database::get_statistics(repo, &config.baseline_locale, &config.supported_locales).await?;

    let mut stdout = std::io::stdout();
    for locale_stats in &stats {
        writeln!(stdout, "{}", locale_stats)?;
    }

    let db_stats = repo.connection().stats()?;
    info!("{}", db_stats);
    Ok(())
}

async fn run_credential(repo: &Repository, action: CredentialAction) -> Result<()> {
    match action {
        CredentialAction::Set { service, secret } => {
            repo.add_credential(&service, &secret).await?;
            info!("Stored credential for {}", service);
        }
        CredentialAction::Clear { service } => {
            let cleared = repo.deactivate_credentials(&service).await?;
            info!("Deactivated {} credential(s) for {}", cleared, service);
        }
    }
    Ok(())
}
