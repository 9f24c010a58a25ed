use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steerx_core::{DialSetting, Embedder, HashingEmbedder, SteeringConfig, VectorStore};
use steerx_similarity::{presets, DescriptorSet, SemanticValidator};
use steerx_steering::{DimensionExpander, SteeringEngine, VectorLearner};
use steerx_storage::{DatasetOptions, FileVectorStore, PairDataset, SnapshotManager};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Learn, compose and validate semantic steering vectors
#[derive(Parser, Debug)]
#[command(name = "steerx")]
#[command(about = "Learn, compose and validate semantic steering vectors", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// JSON config file (missing keys use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Learn a dimension from a contrastive pair file and store it
    Learn {
        dimension: String,
        /// Pair dataset (JSON, or CSV by extension)
        #[arg(short, long)]
        pairs: PathBuf,
        /// Also derive these dimensions from the same pairs (comma separated)
        #[arg(long, value_delimiter = ',')]
        expand: Vec<String>,
        /// Add a prompt-prefixed copy of every prompted pair
        #[arg(long)]
        with_prompt_context: bool,
    },
    /// Report the principal directions of a pair file without storing anything
    Expand {
        primary: String,
        #[arg(short, long)]
        pairs: PathBuf,
        #[arg(short, default_value_t = 4)]
        k: usize,
    },
    /// Show the stored steering vectors
    Info,
    /// Steer the embedding of a text and report how far it moved
    Compose {
        text: String,
        /// Dial as name=value, repeatable
        #[arg(long = "dial", required = true)]
        dials: Vec<String>,
        #[arg(long)]
        strength: Option<f32>,
        /// Print the steered vector itself
        #[arg(long)]
        vector: bool,
    },
    /// Score a text against dial settings
    Validate {
        text: String,
        #[arg(long = "dial", required = true)]
        dials: Vec<String>,
        /// Extra descriptor file, merged over the built-in presets
        #[arg(long)]
        descriptors: Option<PathBuf>,
    },
    /// Pick the candidate that best matches the dials
    Select {
        #[arg(required = true)]
        candidates: Vec<String>,
        #[arg(long = "dial")]
        dials: Vec<String>,
        #[arg(long)]
        descriptors: Option<PathBuf>,
    },
    /// Archive, list or restore the stored vectors
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotAction {
    Create,
    List,
    Restore { name: String },
}

#[derive(Serialize)]
struct ComposeOutput {
    dials: DialSetting,
    strength: f32,
    base_norm: f64,
    steered_norm: f64,
    cosine_to_base: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    steered: Option<Vec<f32>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => SteeringConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SteeringConfig::default(),
    };

    info!("SteerX v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(config.hashing_dim)?);
    let store = Arc::new(FileVectorStore::open(&args.data_dir).context("opening vector store")?);
    let engine = SteeringEngine::new(embedder.clone(), store.clone(), config.clone());

    match args.command {
        Command::Learn {
            dimension,
            pairs,
            expand,
            with_prompt_context,
        } => {
            let dataset = PairDataset::load_with(&pairs, DatasetOptions { with_prompt_context })
                .with_context(|| format!("reading pairs from {}", pairs.display()))?;
            if expand.is_empty() {
                print_json(&engine.learn(&dimension, &dataset.examples)?)?;
            } else {
                let (learned, expansion) =
                    engine.learn_with_expansion(&dimension, &dataset.examples, expand.as_slice())?;
                print_json(&serde_json::json!({ "learned": learned, "expansion": expansion }))?;
            }
        }
        Command::Expand { primary, pairs, k } => {
            let dataset = PairDataset::load(&pairs).with_context(|| format!("reading pairs from {}", pairs.display()))?;
            let learner = VectorLearner::new(embedder.clone(), config.clone());
            let embeddings = learner.embed_examples(&primary, &dataset.examples)?;
            let expansion = DimensionExpander::new(config.clone()).expand_with_report(&primary, &embeddings, k)?;
            print_json(&expansion.report)?;
        }
        Command::Info => print_json(&engine.info())?,
        Command::Compose {
            text,
            dials,
            strength,
            vector,
        } => {
            let dials = parse_dials(&dials)?;
            let strength = strength.unwrap_or(config.default_strength);
            let base = embedder.embed(&text)?;
            let steered = engine.compose(&base, &dials, Some(strength))?;
            print_json(&ComposeOutput {
                base_norm: base.norm(),
                steered_norm: steered.norm(),
                cosine_to_base: base.cosine_similarity(&steered),
                steered: vector.then(|| steered.as_slice().to_vec()),
                dials,
                strength,
            })?;
        }
        Command::Validate {
            text,
            dials,
            descriptors,
        } => {
            let validator = SemanticValidator::new(embedder, load_descriptors(descriptors.as_deref())?, config)?;
            let report = validator.validate(&parse_dials(&dials)?, &text)?;
            print_json(&serde_json::json!({
                "results": report.results,
                "mean_alignment": report.mean_alignment(),
            }))?;
        }
        Command::Select {
            candidates,
            dials,
            descriptors,
        } => {
            let validator = SemanticValidator::new(embedder, load_descriptors(descriptors.as_deref())?, config)?;
            print_json(&validator.select_best(&parse_dials(&dials)?, candidates.as_slice())?)?;
        }
        Command::Snapshot { action } => {
            let manager = SnapshotManager::new(args.data_dir.join("snapshots"))?;
            match action {
                SnapshotAction::Create => print_json(&manager.create(&store.snapshot())?)?,
                SnapshotAction::List => print_json(&manager.list()?)?,
                SnapshotAction::Restore { name } => {
                    let restored = manager.load(&name)?;
                    store.replace_all(restored.iter().cloned().collect())?;
                    info!("Restored {} vectors from {}", restored.len(), name);
                    print_json(&store.snapshot().info())?;
                }
            }
        }
    }

    Ok(())
}

fn parse_dials(assignments: &[String]) -> Result<DialSetting> {
    let mut dials = DialSetting::new();
    for assignment in assignments {
        let (name, value) = DialSetting::parse_assignment(assignment)?;
        dials.set(name, value)?;
    }
    Ok(dials)
}

fn load_descriptors(path: Option<&Path>) -> Result<DescriptorSet> {
    let mut set = presets::all();
    if let Some(path) = path {
        set.merge(DescriptorSet::from_file(path).with_context(|| format!("reading descriptors {}", path.display()))?);
    }
    Ok(set)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
