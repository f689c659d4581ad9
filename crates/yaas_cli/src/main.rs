use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yaas_core::{ArticleStorage, CurationAgent, Tool};
use yaas_inference::agent::DEFAULT_MAX_STEPS;
use yaas_inference::workflow::{default_backfill_plan, run_backfill, run_curation};
use yaas_inference::{create_model, ToolAgent};
use yaas_scrapers::{ContentFetcher, NewsDiscoverer};
use yaas_storage::{create_storage, ArticleSaver, StorageConfig};
use yaas_web::AppState;

mod check;

use check::CheckReport;

const STORAGE_RETRIES: u32 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about = "Curates stories about young African founders", long_about = None)]
struct Cli {
    /// Connection string for the article store
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
    #[arg(long, default_value = "postgres", help = "Storage backend: postgres (default), sqlite, memory")]
    storage: String,
    /// Enforce unique source URLs at the database level
    #[arg(long)]
    unique_source_url: bool,
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value = "openai", help = "Chat model: openai (default), dummy")]
    model: String,
    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    model_url: Option<String>,
    #[arg(long)]
    model_name: Option<String>,
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,
    #[arg(long, env = "EXA_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the article API and the frontend page
    Serve {
        #[arg(long, default_value = "0.0.0.0:5000")]
        addr: SocketAddr,
        #[arg(long, default_value = "public")]
        public_dir: PathBuf,
    },
    /// Run one discovery and curation pass
    Curate,
    /// Populate historical articles topic by topic
    Backfill {
        /// Only process this year
        #[arg(long)]
        year: Option<i32>,
        /// Pause between agent calls (e.g. 2s, 500ms, 1m 30s)
        #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
        delay: Duration,
    },
    /// Smoke test the deployment
    Check,
    /// Create the articles table and indexes
    InitDb,
}

impl Cli {
    fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        let mut config = StorageConfig {
            max_connections: self.max_connections,
            unique_source_url: self.unique_source_url,
            ..StorageConfig::default()
        };
        match (&self.database_url, self.storage.as_str()) {
            (Some(url), _) => config.url = url.clone(),
            (None, "postgres") => bail!("DATABASE_URL is required for the postgres backend"),
            _ => {}
        }
        Ok(config)
    }

    /// Value of a required setting, from its flag or its environment variable.
    fn configured(&self, env_name: &str) -> Option<String> {
        match env_name {
            "DATABASE_URL" => self.database_url.clone(),
            "OPENAI_API_KEY" => self.api_key.clone(),
            "EXA_API_KEY" => self.search_api_key.clone(),
            _ => std::env::var(env_name).ok(),
        }
    }

    fn inference_config(&self) -> yaas_inference::Config {
        yaas_inference::Config {
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            model_url: self.model_url.clone(),
        }
    }
}

async fn connect_storage(cli: &Cli) -> anyhow::Result<Arc<dyn ArticleStorage>> {
    let config = cli.storage_config()?;
    let mut attempt = 1;

    loop {
        match create_storage(&cli.storage, &config).await {
            Ok(storage) => {
                info!("🏦 Storage initialized (using {})", storage.name());
                return Ok(storage);
            }
            Err(e @ yaas_core::Error::Config(_)) => return Err(e.into()),
            Err(e) if attempt < STORAGE_RETRIES => {
                warn!(error = %e, "Storage initialization failed, retrying {}/{}...", attempt, STORAGE_RETRIES);
                attempt += 1;
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("could not connect to {} storage", cli.storage));
            }
        }
    }
}

fn build_agent(cli: &Cli, storage: Arc<dyn ArticleStorage>) -> anyhow::Result<ToolAgent> {
    let model = create_model(&cli.model, &cli.inference_config())?;
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(NewsDiscoverer::new()?),
        Arc::new(ContentFetcher::new()?),
        Arc::new(ArticleSaver::new(storage)),
    ];
    info!("🧠 Agent ready (model {}, {} tools)", model.name(), tools.len());
    Ok(ToolAgent::new(model, tools).with_max_steps(cli.max_steps))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutting down");
}

async fn run_checks(cli: &Cli) -> CheckReport {
    let mut report = CheckReport::default();
    println!("🧪 Starting YAAS smoke test...\n");

    let storage = match connect_storage(cli).await {
        Ok(storage) => {
            report.record("Database", check::check_storage(storage.as_ref()).await);
            Some(storage)
        }
        Err(e) => {
            report.record("Database", Err(format!("{:#}", e)));
            None
        }
    };

    let agent = match storage.clone().map(|storage| build_agent(cli, storage)) {
        Some(Ok(agent)) => Ok(agent),
        Some(Err(e)) => Err(format!("{:#}", e)),
        None => Err("storage unavailable".to_string()),
    };
    let agent = agent
        .as_ref()
        .map(|agent| agent as &dyn CurationAgent)
        .map_err(String::as_str);
    check::record_agent_checks(&mut report, agent).await;
    report.record("Workflows", check::check_workflows());

    report.record("Environment", check::check_env(|name| cli.configured(name)));

    if let Some(storage) = storage {
        storage.close().await;
    }
    report.print_summary();
    report
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { addr, public_dir } => {
            let storage = connect_storage(&cli).await?;
            let state = AppState::new(storage.clone(), public_dir.clone());
            let served = yaas_web::serve(*addr, state, shutdown_signal()).await;
            storage.close().await;
            served?;
        }
        Commands::Curate => {
            let storage = connect_storage(&cli).await?;
            let agent = build_agent(&cli, storage.clone())?;
            let report = run_curation(&agent).await;
            storage.close().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
        }
        Commands::Backfill { year, delay } => {
            let plan: Vec<_> = default_backfill_plan()
                .into_iter()
                .filter(|entry| year.map_or(true, |y| entry.year == y))
                .collect();
            if plan.is_empty() {
                bail!("No backfill topics for year {}", year.unwrap_or_default());
            }

            let storage = connect_storage(&cli).await?;
            let agent = build_agent(&cli, storage.clone())?;
            info!(agent = agent.name(), "🦗 Backfilling {} year(s)", plan.len());
            let report = run_backfill(&agent, &plan, *delay).await;
            storage.close().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Check => {
            let report = run_checks(&cli).await;
            if report.failed() > 0 {
                println!("\n⚠️ Some checks failed. Please review the errors above.");
                std::process::exit(1);
            }
            println!("\n🎉 All checks passed!");
        }
        Commands::InitDb => {
            let storage = connect_storage(&cli).await?;
            info!("✨ Articles table ready");
            storage.close().await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backfill_delay_parsing() {
        let delay = |raw: &str| match Cli::try_parse_from(["yaas", "backfill", "--delay", raw]) {
            Ok(Cli { command: Commands::Backfill { delay, .. }, .. }) => Ok(delay),
            Ok(other) => panic!("unexpected command: {:?}", other.command),
            Err(e) => Err(e.kind()),
        };
        assert_eq!(delay("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(delay("1m 30s"), Ok(Duration::from_secs(90)));
        assert_eq!(delay("1m30s"), Ok(Duration::from_secs(90)));
        assert!(delay("").is_err());
        assert!(delay("3").is_err());
        assert!(delay("soon").is_err());
        assert!(delay("307445734561825862m").is_err());
        assert!(delay("99999999999999999999999h").is_err());
    }

    #[test]
    fn test_backfill_defaults() {
        let cli = Cli::try_parse_from(["yaas", "--storage", "memory", "backfill"]).unwrap();
        assert_eq!(cli.max_steps, DEFAULT_MAX_STEPS);
        match cli.command {
            Commands::Backfill { year, delay } => {
                assert_eq!(year, None);
                assert_eq!(delay, Duration::from_secs(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::try_parse_from(["yaas", "--model", "dummy", "serve", "--addr", "127.0.0.1:8080"]).unwrap();
        assert_eq!(cli.model, "dummy");
        match cli.command {
            Commands::Serve { addr, public_dir } => {
                assert_eq!(addr.port(), 8080);
                assert_eq!(public_dir, PathBuf::from("public"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_storage_config() {
        let cli = Cli::try_parse_from([
            "yaas",
            "--storage",
            "sqlite",
            "--database-url",
            "sqlite:test.db",
            "--unique-source-url",
            "init-db",
        ])
        .unwrap();
        let config = cli.storage_config().unwrap();
        assert_eq!(config.url, "sqlite:test.db");
        assert!(config.unique_source_url);
        assert_eq!(config.max_connections, 5);
    }

    #[tokio::test]
    async fn test_agent_registers_curation_tools() {
        let cli = Cli::try_parse_from(["yaas", "--storage", "memory", "--model", "dummy", "curate"]).unwrap();
        let storage = connect_storage(&cli).await.unwrap();
        let agent = build_agent(&cli, storage).unwrap();
        let mut ids = agent.tool_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec!["article-fetcher", "article-saver", "news-scraper"]);
    }
}
