use std::{io, path::PathBuf};

use crate::{
    schema::report::PartitionEntry,
    util::{self, Output, OutputFormat},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PartitionsArg {
    /// Simulation dataset to check for the partitions' tables
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// JSON file with custom era thresholds
    #[arg(long)]
    era_table: Option<PathBuf>,
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PartitionsArg) -> anyhow::Result<()> {
    let eras = util::read_era_table(arg.era_table.as_deref())?;
    let available = match &arg.dataset {
        Some(path) => Some(util::open_dataset(path)?.partitions()?),
        None => None,
    };

    let entries = eras
        .thresholds()
        .iter()
        .map(|threshold| PartitionEntry {
            since: threshold.since,
            partition: threshold.partition.clone(),
            present: available
                .as_ref()
                .map(|names| names.contains(&threshold.partition)),
        })
        .collect::<Vec<_>>();
    for name in available.iter().flatten() {
        if !entries.iter().any(|e| &e.partition == name) {
            tracing::warn!(partition = %name, "dataset table is not reachable from any era");
        }
    }

    let mut output = Output::from_output_path(arg.output.as_deref())?;
    match arg.format {
        OutputFormat::Text => output.write_with(|out| write_text(out, &entries)),
        OutputFormat::Json => output.write_json(&entries),
    }
}

fn write_text<W>(out: &mut W, entries: &[PartitionEntry]) -> io::Result<()>
where
    W: io::Write,
{
    for entry in entries {
        let since = entry.since.format("%d.%m.%Y");
        match entry.present {
            None | Some(true) => writeln!(out, "{since}  {}", entry.partition)?,
            Some(false) => writeln!(out, "{since}  {}  (missing in dataset)", entry.partition)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_text_marks_missing_partitions() {
        let entries = [
            PartitionEntry {
                since: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
                partition: "ab 01.01.1900".to_owned(),
                present: Some(true),
            },
            PartitionEntry {
                since: NaiveDate::from_ymd_opt(1945, 1, 1).unwrap(),
                partition: "ab 01.01.1945".to_owned(),
                present: Some(false),
            },
        ];
        let mut buf = vec![];
        write_text(&mut buf, &entries).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "01.01.1900  ab 01.01.1900\n01.01.1945  ab 01.01.1945  (missing in dataset)\n"
        );
    }
}
