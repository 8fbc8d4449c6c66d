use std::{collections::BTreeMap, io, path::PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use retrofit_core::{RecordPool, VariantRatios};
use retrofit_dataset::load_pool;
use retrofit_matcher::aggregate;
use retrofit_stats::descriptive::DescriptiveStats;

use crate::{
    schema::report::{BucketSummary, GroupSummary, PartitionSummary, RatioSummary},
    util::{self, Output, OutputFormat},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Simulation dataset: a workbook JSON file or a directory of partition tables
    #[arg(long)]
    dataset: PathBuf,
    #[command(flatten)]
    selector: PartitionSelector,
    /// JSON file with custom era thresholds
    #[arg(long)]
    era_table: Option<PathBuf>,
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = false)]
struct PartitionSelector {
    /// Partition name
    #[arg(long)]
    partition: Option<String>,
    /// Construction date selecting the partition (DD.MM.YYYY, YYYY-MM-DD or YYYY)
    #[arg(long, value_parser = util::parse_date)]
    date: Option<NaiveDate>,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let partition = match (&arg.selector.partition, arg.selector.date) {
        (Some(partition), _) => partition.clone(),
        (None, Some(date)) => util::read_era_table(arg.era_table.as_deref())?
            .resolve(date)?
            .to_owned(),
        (None, None) => anyhow::bail!("Either --partition or --date is required"),
    };

    let source = util::open_dataset(&arg.dataset)?;
    let pool = load_pool(&*source, &partition)
        .with_context(|| format!("Failed to load partition '{partition}'"))?;
    let summary = summarize(&partition, &pool)?;

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    match arg.format {
        OutputFormat::Text => output.write_with(|out| write_text(out, &summary)),
        OutputFormat::Json => output.write_json(&summary),
    }
}

fn summarize(partition: &str, pool: &RecordPool) -> anyhow::Result<PartitionSummary> {
    let variants = pool
        .iter()
        .map(|r| (r.variant_index, r.ratios))
        .collect::<BTreeMap<usize, VariantRatios>>();
    let ratio_summary = |f: fn(&VariantRatios) -> f64| {
        DescriptiveStats::new(variants.values().map(f))
            .map(RatioSummary::from)
            .with_context(|| format!("Partition '{partition}' has no usable measure rows"))
    };

    // every measure row appears once per variant
    let mut buckets = BTreeMap::new();
    for record in pool.iter().filter(|r| r.variant_index == 0) {
        *buckets.entry(record.bucket).or_insert(0) += 1;
    }

    let groups = aggregate::rank_groups(pool)
        .into_iter()
        .map(|ranking| GroupSummary {
            group: ranking.group,
            records: ranking.measures.len(),
            mean_savings_percent: ranking.mean_savings_percent,
            max_savings_percent: ranking
                .measures
                .iter()
                .map(|m| m.savings_percent)
                .fold(f64::NEG_INFINITY, f64::max),
        })
        .collect();

    Ok(PartitionSummary {
        partition: partition.to_owned(),
        records: pool.len(),
        variants: variants.len(),
        buckets: buckets
            .into_iter()
            .map(|(bucket, measures)| BucketSummary { bucket, measures })
            .collect(),
        va: ratio_summary(|r| r.va)?,
        awbf: ratio_summary(|r| r.awbf)?,
        groups,
    })
}

fn write_text<W>(out: &mut W, summary: &PartitionSummary) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(out, "Partition: {}", summary.partition)?;
    writeln!(
        out,
        "{} records, {} building variants",
        summary.records, summary.variants
    )?;
    for (name, ratio) in [("V/A", &summary.va), ("AW/BF", &summary.awbf)] {
        writeln!(
            out,
            "{name}: min {:.3}, max {:.3}, mean {:.3}, median {:.3}",
            ratio.min, ratio.max, ratio.mean, ratio.median
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Measures per window share:")?;
    for bucket in &summary.buckets {
        writeln!(out, "- {}: {}", bucket.bucket, bucket.measures)?;
    }
    writeln!(out)?;
    writeln!(out, "Savings per measure group (all variants):")?;
    for group in &summary.groups {
        writeln!(
            out,
            "- {}: mean {:.2}%, max {:.2}% ({} simulations)",
            group.group, group.mean_savings_percent, group.max_savings_percent, group.records
        )?;
    }
    Ok(())
}
