use std::path::PathBuf;

use rigour_models::{
    bayes::BayesConfig,
    btm,
    elo::{self, EloConfig},
    pagerank,
};
use rigour_report::{
    CorrelationMatrix, ScoreTable, correlation_matrix,
    render::{render_correlation_matrix, render_score_table},
};
use rigour_stats::correlation::CorrelationMethod;
use serde::Serialize;

use crate::{cache, command::DataArgs, util::Output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum MethodArg {
    Pearson,
    Spearman,
    Kendall,
}

impl From<MethodArg> for CorrelationMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Pearson => Self::Pearson,
            MethodArg::Spearman => Self::Spearman,
            MethodArg::Kendall => Self::Kendall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    data: DataArgs,
    /// Correlation coefficient for the comparison matrix
    #[arg(long, value_enum, default_value = "pearson")]
    method: MethodArg,
    /// RNG seed threaded into the Bayesian and Elo fits
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Directory for cached Bayesian fits
    #[arg(long, default_value = "fittedmodels")]
    cache_dir: PathBuf,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,
}

#[derive(Debug, Serialize)]
struct AnalyzeReport<'a> {
    study: &'a str,
    dimension: &'a str,
    score_table: &'a ScoreTable,
    correlations: &'a CorrelationMatrix,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let set = arg.data.load()?;

    eprintln!("Fitting frequentist Bradley-Terry model...");
    let btm_fit = btm::fit(&set.judgements)?;
    eprintln!(
        "  {} iterations, converged: {}, reliability: {:.3}",
        btm_fit.summary.iterations, btm_fit.summary.converged, btm_fit.summary.reliability,
    );

    let bayes_config = BayesConfig {
        seed: arg.seed,
        ..BayesConfig::default()
    };
    let (bayes_fit, from_cache) = cache::load_or_fit(&arg.cache_dir, &set, &bayes_config)?;
    if from_cache {
        eprintln!("Loaded Bayesian Bradley-Terry fit from cache");
    } else {
        eprintln!(
            "Fitted Bayesian Bradley-Terry model ({} iterations, acceptance rate {:.3})",
            bayes_fit.config.iterations, bayes_fit.acceptance_rate,
        );
    }

    eprintln!("Simulating Elo runs...");
    let elo_config = EloConfig {
        seed: arg.seed,
        ..EloConfig::default()
    };
    let elo_fit = elo::fit(&set.judgements, &elo_config)?;

    eprintln!("Computing PageRank...");
    let pagerank_fit = pagerank::fit(&set.judgements)?;

    let table = ScoreTable::assemble(
        &btm_fit.scores(),
        &bayes_fit.scores(),
        &elo_fit.scores(),
        &pagerank_fit.scores(),
    );
    let matrix = correlation_matrix(&table, arg.method.into());

    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        FormatArg::Text => {
            let mut text = render_score_table(&table);
            text.push('\n');
            text.push_str(&render_correlation_matrix(&matrix));
            output.write_text(&text)?;
        }
        FormatArg::Json => {
            output.write_json(AnalyzeReport {
                study: &set.study,
                dimension: &set.dimension,
                score_table: &table,
                correlations: &matrix,
            })?;
        }
    }

    Ok(())
}
