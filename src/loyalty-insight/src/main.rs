//! Loyalty Insight: behavioral segmentation and campaign recommendation
//! for loyalty programs.
//!
//! Runs either as an HTTP API (`serve`) or as a one-shot batch over the
//! stored sample datasets (`run`).

use clap::{Args, Parser, Subcommand};
use insight_agents::{CustomerProcessor, PipelineOrchestrator, StaticDataSource};
use insight_api::ApiServer;
use insight_core::config::AppConfig;
use insight_core::DomainRegistry;
use insight_loyalty::CampaignRecommender;
use insight_reasoning::{Explainer, GroqExplainer, ReasoningAgent, StaticExplainer};
use insight_segmentation::SegmentationEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "loyalty-insight")]
#[command(about = "Behavioral segmentation and loyalty campaign recommendation")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, global = true, env = "LOYALTY_INSIGHT__NODE_ID")]
    node_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API and metrics exporter
    Serve(ServeArgs),
    /// Analyze the stored datasets and print the results as JSON
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// HTTP port (overrides config)
    #[arg(long, env = "LOYALTY_INSIGHT__API__HTTP_PORT")]
    http_port: Option<u16>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Domain to analyze; repeat for several (default: all built-in domains)
    #[arg(long = "domain")]
    domains: Vec<String>,

    /// Audience size used for campaign economics (overrides config)
    #[arg(long)]
    audience_size: Option<u32>,

    /// Directory holding `<domain>/customers.json` and `transactions.json`
    #[arg(long)]
    data_dir: Option<String>,

    /// Use template explanations instead of calling the language model
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "loyalty_insight=info,insight_agents=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }

    match cli.command {
        Command::Serve(args) => {
            if let Some(port) = args.http_port {
                config.api.http_port = port;
            }
            serve(config).await
        }
        Command::Run(args) => {
            if let Some(size) = args.audience_size {
                config.pipeline.default_audience_size = size;
            }
            if let Some(dir) = args.data_dir {
                config.pipeline.data_dir = dir;
            }
            if args.offline {
                config.llm.enabled = false;
            }
            run(config, args.domains).await
        }
    }
}

/// Model-backed explainer when enabled and credentialed, templates otherwise.
fn build_explainer(config: &AppConfig) -> Arc<dyn Explainer> {
    if !config.llm.enabled {
        info!("Language model disabled, using template explanations");
        return Arc::new(StaticExplainer::new());
    }
    match GroqExplainer::new(&config.llm) {
        Ok(explainer) => Arc::new(explainer),
        Err(e) => {
            warn!(error = %e, "Language model unavailable, using template explanations");
            Arc::new(StaticExplainer::new())
        }
    }
}

fn build_orchestrator(config: &AppConfig, registry: Arc<DomainRegistry>) -> PipelineOrchestrator {
    let reasoning = ReasoningAgent::new(
        build_explainer(config),
        Duration::from_millis(config.llm.timeout_ms),
    );
    let processor = CustomerProcessor::new(
        Arc::new(SegmentationEngine::new()),
        reasoning,
        CampaignRecommender::new(),
    );
    PipelineOrchestrator::new(
        registry,
        Arc::new(processor),
        config.pipeline.max_concurrency,
    )
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        data_dir = %config.pipeline.data_dir,
        "Loyalty Insight starting up"
    );

    let registry = Arc::new(DomainRegistry::builtin());
    let orchestrator = Arc::new(build_orchestrator(&config, registry));
    let source = Arc::new(StaticDataSource::new(config.pipeline.data_dir.clone()));

    let api_server = ApiServer::new(config.clone(), orchestrator, source);

    if let Err(e) = api_server.start_metrics() {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Loyalty Insight is ready to serve traffic");

    api_server.start_http().await
}

async fn run(config: AppConfig, domains: Vec<String>) -> anyhow::Result<()> {
    let registry = Arc::new(DomainRegistry::builtin());
    let domains = if domains.is_empty() {
        registry.names().map(str::to_string).collect()
    } else {
        domains
    };

    let orchestrator = build_orchestrator(&config, registry);
    let source = StaticDataSource::new(config.pipeline.data_dir.clone());

    for domain in domains {
        info!(domain = %domain, "Running pipeline");
        let output = orchestrator
            .run(&domain, &source, config.pipeline.default_audience_size)
            .await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
