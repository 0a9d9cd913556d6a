use std::{fmt::Write as _, path::PathBuf};

use rigour_models::btm::{self, BtmFit};

use crate::{command::DataArgs, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct JudgeFitArg {
    #[clap(flatten)]
    data: DataArgs,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &JudgeFitArg) -> anyhow::Result<()> {
    let set = arg.data.load()?;
    let fit = btm::fit(&set.judgements)?;

    let mut output = Output::from_output_path(arg.output.clone())?;
    output.write_text(&render(&fit))?;
    Ok(())
}

fn render(fit: &BtmFit) -> String {
    let mut text = String::new();

    let s = &fit.summary;
    let _ = writeln!(
        text,
        "Bradley-Terry fit: {} items, {} judges, {} comparisons",
        s.n_items, s.n_judges, s.n_comparisons,
    );
    let _ = writeln!(
        text,
        "{} iterations, converged: {}, separation reliability: {:.3}",
        s.iterations, s.converged, s.reliability,
    );
    text.push('\n');

    let _ = writeln!(
        text,
        "{:<12} {:>10} {:>10}",
        "item", "strength", "std_error",
    );
    for effect in &fit.effects {
        let _ = writeln!(
            text,
            "{:<12} {:>10.4} {:>10.4}",
            effect.item, effect.strength, effect.std_error,
        );
    }
    text.push('\n');

    let _ = writeln!(
        text,
        "{:<12} {:>12} {:>8} {:>8}",
        "judge", "comparisons", "infit", "outlier",
    );
    for judge in &fit.judges {
        let _ = writeln!(
            text,
            "{:<12} {:>12} {:>8.3} {:>8}",
            judge.judge,
            judge.comparisons,
            judge.infit,
            if judge.outlier { "yes" } else { "" },
        );
    }

    let outliers = fit.outlier_judges().count();
    text.push('\n');
    let _ = writeln!(text, "{outliers} judge(s) flagged as misfitting");

    text
}
