use std::{io, path::PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use retrofit_core::VariantRatios;
use retrofit_matcher::{
    DEFAULT_TOP_GROUPS, Query, RecommendError, Recommendation, Recommender,
    normalization::DegeneratePolicy,
};

use crate::{
    schema::report::{RecommendOutcome, RecommendReport},
    util::{self, Output, OutputFormat},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RecommendArg {
    /// Simulation dataset: a workbook JSON file or a directory of partition tables
    #[arg(long)]
    dataset: PathBuf,
    /// Construction date (DD.MM.YYYY, YYYY-MM-DD or YYYY)
    #[arg(long, value_parser = util::parse_date)]
    date: NaiveDate,
    /// V/A ratio of the building
    #[arg(long, value_parser = util::parse_non_negative)]
    va: f64,
    /// AW/BF ratio of the building
    #[arg(long, value_parser = util::parse_non_negative)]
    awbf: f64,
    /// Window share in percent, rounded to the nearest simulated bucket
    #[arg(long, value_parser = util::parse_percentage)]
    window_share: f64,
    /// Built-up area in m² (not used for matching)
    #[arg(long, value_parser = util::parse_non_negative)]
    floor_area: Option<f64>,
    /// Number of measure groups to report
    #[arg(long, default_value_t = DEFAULT_TOP_GROUPS)]
    top: usize,
    /// What to do when all simulations share the same V/A or AW/BF
    #[arg(long, default_value = "collapse")]
    degenerate: DegeneratePolicy,
    /// JSON file with custom era thresholds
    #[arg(long)]
    era_table: Option<PathBuf>,
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RecommendArg) -> anyhow::Result<()> {
    let source = util::open_dataset(&arg.dataset)?;
    let recommender = Recommender::default()
        .with_eras(util::read_era_table(arg.era_table.as_deref())?)
        .with_policy(arg.degenerate)
        .with_top_groups(arg.top);
    let query = Query {
        construction_date: arg.date,
        ratios: VariantRatios {
            va: arg.va,
            awbf: arg.awbf,
        },
        window_share_percent: arg.window_share,
        floor_area: arg.floor_area,
    };

    let report = RecommendReport {
        generated_at: Utc::now(),
        query,
        outcome: outcome(recommender.recommend(&*source, &query))?,
    };

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    match arg.format {
        OutputFormat::Text => output.write_with(|out| write_text(out, &report)),
        OutputFormat::Json => output.write_json(&report),
    }
}

/// Maps a pipeline result to a report outcome.
///
/// A partition without simulations at the bucket is reported, not fatal.
fn outcome(result: Result<Recommendation, RecommendError>) -> anyhow::Result<RecommendOutcome> {
    match result {
        Ok(recommendation) => Ok(RecommendOutcome::Matched { recommendation }),
        Err(RecommendError::NoCandidates(e)) => {
            tracing::warn!("{e}");
            Ok(RecommendOutcome::NoCandidates {
                bucket: e.bucket,
                message: e.to_string(),
            })
        }
        Err(e) => Err(e).context("Failed to recommend renovation measures"),
    }
}

fn write_text<W>(out: &mut W, report: &RecommendReport) -> io::Result<()>
where
    W: io::Write,
{
    if let RecommendOutcome::Matched { recommendation } = &report.outcome {
        writeln!(out, "Partition: {}", recommendation.partition)?;
    }
    writeln!(
        out,
        "Window share {}% was rounded to {} for the analysis.",
        report.query.window_share_percent,
        report.bucket()
    )?;

    let recommendation = match &report.outcome {
        RecommendOutcome::NoCandidates { message, .. } => return writeln!(out, "{message}"),
        RecommendOutcome::Matched { recommendation } => recommendation,
    };
    let matched = &recommendation.matched;
    writeln!(
        out,
        "Closest simulated building: V/A {:.3}, AW/BF {:.3} (distance {:.4}, {} candidates)",
        matched.ratios.va, matched.ratios.awbf, matched.distance, matched.candidates
    )?;
    writeln!(out)?;
    writeln!(out, "Best measure groups:")?;
    for group in &recommendation.groups {
        writeln!(out)?;
        writeln!(
            out,
            "## {} (mean savings {:.2}%)",
            group.group, group.mean_savings_percent
        )?;
        for measure in &group.measures {
            writeln!(
                out,
                "- {}: {:.2}% energy savings",
                measure.measure, measure.savings_percent
            )?;
        }
    }
    Ok(())
}
