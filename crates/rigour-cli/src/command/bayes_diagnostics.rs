use std::{fmt::Write as _, path::PathBuf};

use rigour_models::bayes::{BayesConfig, BayesFit};

use crate::{cache, command::DataArgs, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BayesDiagnosticsArg {
    #[clap(flatten)]
    data: DataArgs,
    /// RNG seed for the MCMC run
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Directory for cached Bayesian fits
    #[arg(long, default_value = "fittedmodels")]
    cache_dir: PathBuf,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &BayesDiagnosticsArg) -> anyhow::Result<()> {
    let set = arg.data.load()?;

    let config = BayesConfig {
        seed: arg.seed,
        ..BayesConfig::default()
    };
    let (fit, from_cache) = cache::load_or_fit(&arg.cache_dir, &set, &config)?;
    if from_cache {
        eprintln!("Loaded Bayesian Bradley-Terry fit from cache");
    }

    let mut output = Output::from_output_path(arg.output.clone())?;
    output.write_text(&render(&fit))?;
    Ok(())
}

fn render(fit: &BayesFit) -> String {
    let mut text = String::new();

    let _ = writeln!(
        text,
        "Bayesian Bradley-Terry diagnostics ({} iterations, {} burn-in, seed {})",
        fit.config.iterations, fit.config.burn_in, fit.config.seed,
    );
    let _ = writeln!(
        text,
        "Retained draws: {}, acceptance rate: {:.3}",
        fit.draws.len(),
        fit.acceptance_rate,
    );
    text.push('\n');

    let _ = writeln!(
        text,
        "{:<12} {:>10} {:>10} {:>10} {:>10}",
        "item", "mean", "hpdi_low", "hpdi_high", "ess",
    );
    for row in fit.parameter_table() {
        let _ = writeln!(
            text,
            "{:<12} {:>10.4} {:>10.4} {:>10.4} {:>10.1}",
            row.item, row.mean, row.hpdi_low, row.hpdi_high, row.ess,
        );
    }
    text.push('\n');

    let _ = writeln!(text, "{:<12} {:>10}", "item", "mean_rank");
    for row in fit.rank_table() {
        let _ = writeln!(text, "{:<12} {:>10.2}", row.item, row.mean_rank);
    }
    text.push('\n');

    let _ = writeln!(text, "Posterior P(row beats column):");
    let _ = write!(text, "{:<12}", "");
    for item in &fit.items {
        let _ = write!(text, " {item:>10}");
    }
    text.push('\n');
    let probabilities = fit.win_probability_table();
    for (i, item) in fit.items.iter().enumerate() {
        let _ = write!(text, "{item:<12}");
        for (j, p) in probabilities[i].iter().enumerate() {
            if i == j {
                let _ = write!(text, " {:>10}", "-");
            } else {
                let _ = write!(text, " {p:>10.3}");
            }
        }
        text.push('\n');
    }

    text
}
