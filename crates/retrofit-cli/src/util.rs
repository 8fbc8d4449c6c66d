use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::NaiveDate;
use retrofit_core::{EraTable, EraThreshold};
use retrofit_dataset::{
    source::{SheetDirectory, TableSource},
    table::Workbook,
};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn from_output_path(output_path: Option<&Path>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.finish()
    }

    /// Writes a text report with `f` and flushes.
    pub fn write_with<F>(&mut self, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        f(self).with_context(|| format!("Failed to write to {}", self.display_path()))?;
        self.finish()
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        if let Output::File { path, .. } = self {
            tracing::info!(path = %path.display(), "wrote report");
        }
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Open the simulation dataset at `path`
///
/// A directory is read as one `<partition>.json` file per partition, any
/// other path as a single workbook JSON file holding all partitions.
pub fn open_dataset(path: &Path) -> anyhow::Result<Box<dyn TableSource>> {
    if path.is_dir() {
        tracing::debug!(path = %path.display(), "using sheet directory dataset");
        return Ok(Box::new(SheetDirectory::new(path)));
    }
    let workbook: Workbook = read_json_file("dataset", path)?;
    tracing::debug!(
        path = %path.display(),
        sheets = workbook.sheets.len(),
        "loaded workbook dataset"
    );
    Ok(Box::new(workbook))
}

/// Load the era table from `path`, or the standard table if `None`
pub fn read_era_table(path: Option<&Path>) -> anyhow::Result<EraTable> {
    let Some(path) = path else {
        return Ok(EraTable::standard());
    };
    let thresholds: Vec<EraThreshold> = read_json_file("era table", path)?;
    anyhow::ensure!(
        !thresholds.is_empty(),
        "Era table file contains no thresholds: {}",
        path.display()
    );
    Ok(EraTable::new(thresholds))
}

/// Parse a construction date given as `DD.MM.YYYY`, `YYYY-MM-DD` or `YYYY`
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(year) = s.parse::<i32>() {
        return NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| format!("invalid year: {s}"));
    }
    ["%d.%m.%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("invalid date '{s}', expected DD.MM.YYYY, YYYY-MM-DD or YYYY"))
}

pub fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value < 0.0 {
        return Err(format!("{value} is negative"));
    }
    Ok(value)
}

pub fn parse_percentage(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{value} is not within 0 to 100"));
    }
    Ok(value)
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid number: {s}"))
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` takes precedence over the verbosity given on the command line.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1976, 11, 15).unwrap();
        assert_eq!(parse_date("15.11.1976"), Ok(expected));
        assert_eq!(parse_date("1976-11-15"), Ok(expected));
        assert_eq!(
            parse_date("1976"),
            Ok(NaiveDate::from_ymd_opt(1976, 1, 1).unwrap())
        );
        assert!(parse_date("31.02.1976").is_err());
        assert!(parse_date("gestern").is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_non_negative("0,45"), Ok(0.45));
        assert!(parse_non_negative("-1").is_err());
        assert!(parse_non_negative("NaN").is_err());
        assert_eq!(parse_percentage("100"), Ok(100.0));
        assert!(parse_percentage("100.5").is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>().ok(), Some(OutputFormat::Text));
    }

    #[test]
    fn test_read_era_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eras.json");
        fs::write(
            &path,
            r#"[
                {"since": "2000-01-01", "partition": "A"},
                {"since": "2010-01-01", "partition": "B"}
            ]"#,
        )
        .unwrap();

        let eras = read_era_table(Some(&path)).unwrap();
        let date = |year| NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        assert_eq!(eras.resolve(date(2005)).unwrap(), "A");
        assert_eq!(eras.resolve(date(2010)).unwrap(), "B");
        assert!(eras.resolve(date(1999)).is_err());

        assert_eq!(read_era_table(None).unwrap(), EraTable::standard());
    }

    #[test]
    fn test_read_empty_era_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eras.json");
        fs::write(&path, "[]").unwrap();
        let err = read_era_table(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Era table file contains no thresholds"));
    }

    #[test]
    fn test_open_sheet_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ab 01.01.1945.json"),
            r#"[
                ["V/A", null, 0.4, 0.8],
                ["AW/BF", null, 1.2, 0.6],
                ["Fenstertausch 3-fach", 20, 8.0, 6.0]
            ]"#,
        )
        .unwrap();

        let source = open_dataset(dir.path()).unwrap();
        assert_eq!(source.partitions().unwrap(), ["ab 01.01.1945"]);
        let table = source.load_table("ab 01.01.1945").unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!(
            source
                .load_table("ab 01.01.1960")
                .unwrap_err()
                .is_partition_not_found()
        );
    }
}
