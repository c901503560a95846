//! Command line front-end for the party prediction pipeline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use party_predictor::dataset::SummaryOptions;
use party_predictor::{ElectionPipeline, PipelineConfig, Query};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Parser)]
#[clap(author, version, about)]
struct Opt {
    /// Pipeline configuration file (`.toml` or `.json`).
    ///
    /// `PARTY_PREDICTOR_*` environment variables are applied on top of it.
    #[clap(long, short, env = "PARTY_PREDICTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set, e.g. `debug` or `party_predictor=trace`.
    #[clap(long, short, default_value = "info")]
    log: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Clean the raw election export into the cleaned dataset.
    Clean,
    /// Retrain the classifier on the cleaned dataset and persist the artifacts.
    Train {
        /// Print the training report as JSON.
        #[clap(long)]
        json: bool,
    },
    /// Predict the winning party.
    Predict {
        /// State name as it appears in the dataset
        #[clap(long)]
        state: String,
        /// Election year
        #[clap(long)]
        year: i32,
        /// Voter turnout percentage
        #[clap(long)]
        turnout: f64,
        /// Victory margin
        #[clap(long, allow_negative_numbers = true)]
        margin: f64,
        /// Print the probability of every party instead of the winner.
        #[clap(long)]
        proba: bool,
    },
    /// List the states of the cleaned dataset.
    States,
    /// Validate a CSV file and replace the cleaned dataset with it.
    ReplaceDataset {
        /// Replacement dataset
        file: PathBuf,
    },
    /// Print descriptive statistics of the cleaned dataset as JSON.
    Summary {
        /// Entries in the top parties and top states lists
        #[clap(long, default_value_t = party_predictor::DEFAULT_SUMMARY_TOP_N)]
        top_n: usize,
        /// Bins of the margin histogram
        #[clap(long, default_value_t = party_predictor::DEFAULT_HISTOGRAM_BINS)]
        bins: usize,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_environment_overrides()?,
        None => PipelineConfig::load_from_environment()?,
    };
    config.validate()?;
    Ok(config)
}

fn run(opt: Opt) -> anyhow::Result<()> {
    let config = load_config(opt.config.as_ref())?;
    let pipeline = ElectionPipeline::new(config)?;

    match opt.command {
        Command::Clean => {
            let report = pipeline.clean_raw_dataset()?;
            println!("Cleaned {} rows", report.num_rows);
            for (column, nulls) in &report.null_counts {
                println!("{:>12} {}", column, nulls);
            }
        }
        Command::Train { json } => {
            let report = pipeline.train()?;
            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report);
            }
        }
        Command::Predict {
            state,
            year,
            turnout,
            margin,
            proba,
        } => {
            let query = Query::new(state, year, turnout, margin);
            if proba {
                for (party, p) in pipeline.predict_proba(&query)? {
                    println!("{:<12} {:.4}", party, p);
                }
            } else {
                println!("Predicted party: {}", pipeline.predict_query(&query)?);
            }
        }
        Command::States => {
            for state in pipeline.list_known_states()? {
                println!("{}", state);
            }
        }
        Command::ReplaceDataset { file } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            pipeline.replace_dataset(&bytes)?;
            println!("Dataset replaced, retrain to refresh the model");
        }
        Command::Summary { top_n, bins } => {
            let options = SummaryOptions {
                top_n,
                histogram_bins: bins,
            };
            println!("{}", pipeline.summary_with(&options)?.to_json()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    let env = env_logger::Env::default().default_filter_or(opt.log.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();

    match run(opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
