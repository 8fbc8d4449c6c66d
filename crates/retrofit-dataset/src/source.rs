//! Retrieval of wide tables by partition name.

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::PathBuf,
};

use crate::table::{WideTable, Workbook};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum LoadError {
    #[display("partition '{partition}' not found in dataset")]
    PartitionNotFound { partition: String },
    #[display("failed to read {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A dataset from which the wide table of a partition can be loaded.
pub trait TableSource {
    /// Loads the wide table backing `partition`.
    ///
    /// Returns [`LoadError::PartitionNotFound`] if the dataset has no table
    /// for the partition.
    fn load_table(&self, partition: &str) -> Result<WideTable, LoadError>;

    /// Names of all partitions present in the dataset.
    fn partitions(&self) -> Result<Vec<String>, LoadError>;
}

impl TableSource for Workbook {
    fn load_table(&self, partition: &str) -> Result<WideTable, LoadError> {
        self.sheets
            .get(partition)
            .cloned()
            .ok_or_else(|| LoadError::PartitionNotFound {
                partition: partition.to_owned(),
            })
    }

    fn partitions(&self) -> Result<Vec<String>, LoadError> {
        Ok(self.sheets.keys().cloned().collect())
    }
}

/// A directory holding one `<partition>.json` table file per partition.
#[derive(Debug, Clone)]
pub struct SheetDirectory {
    root: PathBuf,
}

impl SheetDirectory {
    const EXTENSION: &str = "json";

    pub fn new<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { root: root.into() }
    }

    fn sheet_path(&self, partition: &str) -> PathBuf {
        self.root.join(format!("{partition}.{}", Self::EXTENSION))
    }
}

impl TableSource for SheetDirectory {
    fn load_table(&self, partition: &str) -> Result<WideTable, LoadError> {
        let path = self.sheet_path(partition);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::PartitionNotFound {
                    partition: partition.to_owned(),
                });
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), "reading sheet");
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| LoadError::Parse { path, source })
    }

    fn partitions(&self) -> Result<Vec<String>, LoadError> {
        let io_error = |source: io::Error| LoadError::Io {
            path: self.root.clone(),
            source,
        };
        let mut partitions = vec![];
        for entry in fs::read_dir(&self.root).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == Self::EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                partitions.push(stem.to_owned());
            }
        }
        partitions.sort();
        Ok(partitions)
    }
}
