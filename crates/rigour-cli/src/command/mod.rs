use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rigour_core::{ItemLookup, JudgementSet, load_judgements};

use self::{
    analyze::AnalyzeArg, bayes_diagnostics::BayesDiagnosticsArg, judge_fit::JudgeFitArg,
};

mod analyze;
mod bayes_diagnostics;
mod judge_fit;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Fit all four ranking methods, join their scores, and report the
    /// correlation matrix between them
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Fit (or load from cache) the Bayesian Bradley-Terry model and print
    /// its convergence diagnostics and posterior tables
    BayesDiagnostics(#[clap(flatten)] BayesDiagnosticsArg),
    /// Fit the frequentist Bradley-Terry model and print the per-judge
    /// infit table with outlier flags
    JudgeFit(#[clap(flatten)] JudgeFitArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::BayesDiagnostics(arg) => bayes_diagnostics::run(&arg)?,
        Mode::JudgeFit(arg) => judge_fit::run(&arg)?,
    }
    Ok(())
}

/// Input selection shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DataArgs {
    /// Path to the judgement CSV
    #[arg(long)]
    data: PathBuf,
    /// Study to filter the judgements to
    #[arg(long, default_value = "study2")]
    study: String,
    /// Judgement dimension to filter to
    #[arg(long, default_value = "rigour")]
    dimension: String,
}

impl DataArgs {
    pub(crate) fn load(&self) -> anyhow::Result<JudgementSet> {
        let lookup = ItemLookup::default_proofs();
        let set = load_judgements(&self.data, &self.study, &self.dimension, &lookup)
            .with_context(|| format!("Failed to load judgements from {}", self.data.display()))?;

        eprintln!(
            "Loaded {} judgements ({} items, {} judges) for {}/{}",
            set.len(),
            set.items().len(),
            set.judges().len(),
            set.study,
            set.dimension,
        );
        if !set.unknown_ids.is_empty() {
            eprintln!(
                "Warning: {} item id(s) not in the lookup table: {:?}",
                set.unknown_ids.len(),
                set.unknown_ids,
            );
        }
        Ok(set)
    }
}
