//! Name-model training binary.
//!
//! Loads a names file (one name per line), trains the MLP language model with
//! full-batch Adam, writes JSONL per-epoch metrics, and prints generated names
//! to stdout, one per line. Progress logging goes to stderr via `tracing`
//! (`RUST_LOG` controls the level; default `info`).

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use namegen::data::{build_examples, load_names, train_eval_split, Vocabulary};
use namegen::{evaluate, generate_many, Config, GenerationPolicy, Mlp, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "namegen-train",
    about = "Train a character-level MLP on a list of names and sample new ones"
)]
struct Args {
    /// Names file, one name per line
    #[arg(long, default_value = "data/names.txt")]
    names: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output metrics file (JSONL, appended)
    #[arg(long)]
    metrics_file: Option<PathBuf>,

    /// Context window width
    #[arg(long)]
    context_length: Option<usize>,

    /// Character embedding width
    #[arg(long)]
    embedding_dim: Option<usize>,

    /// Hidden layer width
    #[arg(long)]
    hidden_units: Option<usize>,

    /// Adam learning rate
    #[arg(long)]
    learning_rate: Option<f32>,

    /// Number of full-batch epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Number of names to generate after training
    #[arg(long)]
    samples: Option<usize>,

    /// Maximum characters per generated name
    #[arg(long)]
    max_length_cap: Option<usize>,

    /// RNG seed for initialization and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of examples held out for evaluation (0 = train on everything)
    #[arg(long, default_value_t = 0.0)]
    eval_fraction: f32,

    /// Skip names that hit the length cap instead of failing
    #[arg(long)]
    best_effort: bool,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(v) = self.context_length {
            config.context_length = v;
        }
        if let Some(v) = self.embedding_dim {
            config.embedding_dim = v;
        }
        if let Some(v) = self.hidden_units {
            config.hidden_units = v;
        }
        if let Some(v) = self.learning_rate {
            config.learning_rate = v;
        }
        if let Some(v) = self.epochs {
            config.epochs = v;
        }
        if let Some(v) = self.samples {
            config.sample_count = v;
        }
        if let Some(v) = self.max_length_cap {
            config.max_length_cap = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn open_metrics(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open metrics file {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    let names = load_names(&args.names)?;
    let vocab = Vocabulary::build(&names)?;
    let (contexts, targets) = build_examples(&names, &vocab, config.context_length)?;
    info!(
        names = names.len(),
        vocab_size = vocab.size(),
        examples = targets.len(),
        "corpus loaded"
    );

    let (train_contexts, train_targets, eval_contexts, eval_targets) =
        train_eval_split(&contexts.view(), &targets.view(), args.eval_fraction);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = Mlp::new(config.model_dims(vocab.size()), &mut rng)?;
    let mut trainer = Trainer::new(model.dims(), config.trainer_config())?;

    let mut metrics_file = args
        .metrics_file
        .as_deref()
        .map(open_metrics)
        .transpose()?;
    let mut write_error = None;

    let history = trainer.fit_with(
        &mut model,
        train_contexts.view(),
        train_targets.view(),
        |metrics| {
            if write_error.is_some() {
                return;
            }
            if let Some(file) = metrics_file.as_mut() {
                let event = serde_json::json!({
                    "event": "epoch",
                    "epoch": metrics.epoch,
                    "loss": metrics.loss,
                    "grad_norm": metrics.grad_norm,
                    "elapsed_secs": metrics.elapsed_secs,
                });
                if let Err(e) = writeln!(file, "{event}") {
                    write_error = Some(e);
                }
            }
        },
    )?;
    if let Some(e) = write_error {
        return Err(e).context("failed to write metrics event");
    }

    if !eval_targets.is_empty() {
        let eval_loss = evaluate(&model, eval_contexts.view(), eval_targets.view())?;
        info!(eval_loss, eval_examples = eval_targets.len(), "held-out evaluation");
    }

    if let Some(file) = metrics_file.as_mut() {
        let event = serde_json::json!({
            "event": "training_complete",
            "epochs": history.len(),
            "final_loss": history.last(),
        });
        writeln!(file, "{event}").context("failed to write metrics event")?;
    }

    let mut options = config.generate_options();
    if args.best_effort {
        options.policy = GenerationPolicy::BestEffort;
    }
    let generated = generate_many(
        &model,
        &vocab,
        config.context_length,
        config.sample_count,
        &options,
    )?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for name in generated {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
