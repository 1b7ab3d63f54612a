//! CLI entry point for the supply metrics loader.
//!
//! Provides subcommands for listing aggregated entities, printing a single
//! entity scorecard, and inspecting the dimensions a metric model supports.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use supply_metrics::{
    config::LoaderConfig,
    infra::{models::ModelIdConfig, ontology::OntologyMetricClient},
    loaders::{
        loader::EntityLoader,
        profile::{CUSTOMER, EntityProfile, MATERIAL, SUPPLIER},
    },
    output::{append_records, print_json},
    services::metric_api::{MetricApi, ModelResolver},
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "supply_metrics")]
#[command(about = "Load and aggregate supply-chain entity metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EntityKind {
    Supplier,
    Customer,
    Material,
}

impl EntityKind {
    fn profile(self) -> &'static EntityProfile {
        match self {
            EntityKind::Supplier => &SUPPLIER,
            EntityKind::Customer => &CUSTOMER,
            EntityKind::Material => &MATERIAL,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List entities ranked by total amount
    List {
        #[arg(short, long, value_enum, default_value_t = EntityKind::Supplier)]
        entity: EntityKind,

        /// Only show the first N entities (0 = all)
        #[arg(short = 'n', long, default_value_t = 20)]
        top: usize,

        /// CSV file to append results to
        #[arg(short, long)]
        output: Option<String>,

        /// Print the list as JSON instead of one line per entity
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the scorecard of one entity, or of every entity with --all
    Scorecard {
        /// Entity code, e.g. a supplier code
        #[arg(value_name = "CODE", required_unless_present = "all")]
        code: Option<String>,

        /// Print scorecards for every loaded entity, in list order
        #[arg(long, conflicts_with = "code")]
        all: bool,

        #[arg(short, long, value_enum, default_value_t = EntityKind::Supplier)]
        entity: EntityKind,
    },
    /// Show the grouping dimensions the entity's metric model supports
    Dimensions {
        #[arg(short, long, value_enum, default_value_t = EntityKind::Supplier)]
        entity: EntityKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/supply_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("supply_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = LoaderConfig::from_env()?;

    let resolver = match &config.model_map_path {
        Some(path) => ModelIdConfig::load(path)?,
        None => {
            warn!("MODEL_MAP_PATH not set, using fallback model ids");
            ModelIdConfig::default()
        }
    };
    let api: Arc<dyn MetricApi> = Arc::new(OntologyMetricClient::from_config(&config)?);
    let resolver: Arc<dyn ModelResolver> = Arc::new(resolver);
    let loader_for = |kind: EntityKind| {
        EntityLoader::new(
            api.clone(),
            resolver.clone(),
            kind.profile(),
            config.settings.clone(),
        )
    };

    match cli.command {
        Commands::List {
            entity,
            top,
            output,
            json,
        } => {
            let loader = loader_for(entity);
            let mut entities = loader.load_list().await;
            if top > 0 {
                entities.truncate(top);
            }

            if json {
                print_json(&entities)?;
            } else {
                for (i, e) in entities.iter().enumerate() {
                    info!(
                        rank = i + 1,
                        code = %e.code,
                        name = %e.name,
                        total_amount = e.total_amount,
                        records = e.record_count,
                        "Entity"
                    );
                }
            }

            if let Some(path) = output {
                append_records(&path, loader.profile().kind, &entities)?;
                info!(path = %path, rows = entities.len(), "Entities written");
            }
        }
        Commands::Scorecard { code, all, entity } => {
            let loader = loader_for(entity);
            match code {
                Some(code) if !all => match loader.scorecard(&code).await {
                    Some(card) => print_json(&card)?,
                    None => warn!(code = %code, kind = loader.profile().kind, "Entity not found"),
                },
                _ => {
                    let cards = loader.scorecards().await;
                    info!(kind = loader.profile().kind, count = cards.len(), "Scorecards ready");
                    print_json(&cards)?;
                }
            }
        }
        Commands::Dimensions { entity } => {
            let loader = loader_for(entity);
            let dimensions = loader.discover_dimensions().await?;
            info!(
                kind = loader.profile().kind,
                count = dimensions.len(),
                "Supported dimensions"
            );
            for dimension in &dimensions {
                info!(dimension = %dimension, "Dimension");
            }
        }
    }

    Ok(())
}
