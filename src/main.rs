/// wrike-export: exporta hierarquia, tasks, attachments e audit log do Wrike
///
/// Cada comando escreve JSON lines em stdout (um registro por linha);
/// logs vão para stderr.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use wrike::attachments::AttachmentManager;
use wrike::audit_log::{AggregateOptions, AuditLogAggregator};
use wrike::folders::FolderManager;
use wrike::hierarchy;
use wrike::tasks::TaskManager;
use wrike::types::{AuditLogQuery, EventDateRange, FolderScope};
use wrike::WrikeClient;

use wrike_export::config::Settings;
use wrike_export::output::JsonLinesWriter;
use wrike_export::utils::{logging::*, AppError};

/// Exportador Wrike - linha de comando para a API v4
#[derive(Parser)]
#[command(name = "wrike-export")]
#[command(version)]
#[command(about = "Exporta dados do Wrike em JSON lines", long_about = None)]
struct Cli {
    /// Token da API (ou use WRIKE_API_TOKEN)
    #[arg(short = 't', long, env = "WRIKE_API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// URL base da API (padrão vem de config/default.toml)
    #[arg(long, env = "WRIKE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Achata objetos aninhados em colunas
    #[arg(long, global = true)]
    flat: bool,

    /// Separador usado com --flat (padrão: export.flatten_separator)
    #[arg(long, global = true)]
    sep: Option<String>,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    All,
    Folders,
    Projects,
}

impl From<ScopeArg> for FolderScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::All => FolderScope::All,
            ScopeArg::Folders => FolderScope::FoldersOnly,
            ScopeArg::Projects => FolderScope::ProjectsOnly,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Folders/projects do space com parent, children e level
    Tree {
        #[arg(short = 's', long)]
        space: String,

        #[arg(long, value_enum, default_value = "all")]
        scope: ScopeArg,

        /// Apenas id, title e level
        #[arg(long)]
        slim: bool,
    },

    /// Tipo (folder/project) de cada nó do space
    Kinds {
        #[arg(short = 's', long)]
        space: String,
    },

    /// Tasks do space com level
    Tasks {
        #[arg(short = 's', long)]
        space: String,

        #[arg(long)]
        slim: bool,
    },

    /// Attachments de folders, projects e tasks do space
    Attachments {
        #[arg(short = 's', long)]
        space: String,

        #[arg(long)]
        slim: bool,
    },

    /// Audit log completo (segue nextPageToken)
    Audit {
        /// Uma linha por par de `details` (event, description)
        #[arg(long)]
        reframe: bool,

        /// Limite de páginas (padrão: export.max_pages)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Início do intervalo (RFC 3339, inclusivo)
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// Fim do intervalo (RFC 3339, exclusivo)
        #[arg(long)]
        end: Option<DateTime<Utc>>,

        /// Filtra por operação (repetível)
        #[arg(long = "op")]
        operations: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 .env antes do clap (`env = ...`) e do EnvFilter (RUST_LOG)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if !dotenv_loaded {
        log_dotenv_missing();
    }

    let mut settings = Settings::new()
        .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {}", e)))?;
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    if let Some(token) = &cli.token {
        settings.wrike.token = token.clone();
    }
    if let Some(base_url) = &cli.base_url {
        settings.wrike.base_url = base_url.clone();
    }
    settings.validate()?;

    run(&cli, &settings).await?;
    Ok(())
}

async fn run(cli: &Cli, settings: &Settings) -> Result<(), AppError> {
    let client = WrikeClient::from_config(&settings.to_client_config())?;

    let stdout = std::io::stdout().lock();
    let mut writer = JsonLinesWriter::new(stdout);
    if cli.flat {
        let sep = cli.sep.clone().unwrap_or_else(|| settings.export.flatten_separator.clone());
        writer = writer.flattened(sep);
    }

    match &cli.command {
        Commands::Tree { space, scope, slim } => {
            let nodes = FolderManager::new(client).folder_tree(space, (*scope).into()).await?;
            let count = if *slim {
                writer.write_all(&hierarchy::extract_projection(&nodes, None, &[])?)?
            } else {
                writer.write_all(&nodes)?
            };
            log_export_finished("folders", count);
        }
        Commands::Kinds { space } => {
            let kinds = FolderManager::new(client).folder_kinds(space, &["title", "level"]).await?;
            log_export_finished("kinds", writer.write_all(&kinds)?);
        }
        Commands::Tasks { space, slim } => {
            let tasks = TaskManager::new(client).tasks_in_space(space, *slim).await?;
            log_export_finished("tasks", writer.write_all(&tasks)?);
        }
        Commands::Attachments { space, slim } => {
            let attachments = AttachmentManager::new(client).attachments_in_space(space, *slim).await?;
            log_export_finished("attachments", writer.write_all(&attachments)?);
        }
        Commands::Audit { reframe, max_pages, start, end, operations } => {
            let options = AggregateOptions {
                query: AuditLogQuery {
                    event_date: Some(EventDateRange::new(*start, *end)).filter(|r| !r.is_empty()),
                    operations: operations.clone(),
                    page_size: settings.export.page_size,
                },
                max_iterations: max_pages.or(settings.export.max_pages),
                reframe: *reframe,
            };

            let result = AuditLogAggregator::new(client).aggregate(&options).await;
            log_audit_result(&result);

            let count = match &result.exploded {
                Some(rows) => writer.write_all(rows)?,
                None => writer.write_all(&result.entries)?,
            };
            log_export_finished("audit log", count);

            // Dados parciais já foram escritos; o código de saída sinaliza a falha
            if let Some(err) = result.error() {
                return Err(AppError::AuditIncomplete(err.clone()));
            }
        }
    }

    Ok(())
}
