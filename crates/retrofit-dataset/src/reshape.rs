//! Wide-to-long reshaping of simulation tables.

use retrofit_core::{RecordPool, SimulationRecord, VariantRatios, WindowShareBucket};

use crate::table::{Cell, WideTable};

const VA_ROW: usize = 0;
const AWBF_ROW: usize = 1;
const FIRST_MEASURE_ROW: usize = 2;
const MEASURE_COLUMN: usize = 0;
const BUCKET_COLUMN: usize = 1;
const FIRST_VARIANT_COLUMN: usize = 2;

/// The wide table does not have the expected shape.
///
/// Row and column numbers are 0-based indices into the table.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum MalformedTableError {
    #[display("table has {rows} rows, expected the V/A and AW/BF rows followed by measure rows")]
    TooFewRows { rows: usize },
    #[display("table has no building variant columns")]
    NoVariants,
    #[display("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("row {row}, column {column}: expected a number, found {found}")]
    NotANumber {
        row: usize,
        column: usize,
        found: String,
    },
    #[display("row {row}: missing measure description")]
    MissingMeasure { row: usize },
}

#[derive(Debug)]
struct MeasureRow {
    description: String,
    bucket: WindowShareBucket,
    savings: Vec<f64>,
}

/// Reshapes a wide table into a record pool.
///
/// Emits one record per (variant column, measure row), variant by variant.
/// Trailing blank cells of a row and blank measure rows are ignored. Measure
/// rows whose window share is not a simulated bucket are skipped with a
/// warning, so the result may be empty.
pub fn reshape(table: &WideTable) -> Result<RecordPool, MalformedTableError> {
    let rows = trimmed_rows(table);
    if rows.len() <= FIRST_MEASURE_ROW {
        return Err(MalformedTableError::TooFewRows { rows: rows.len() });
    }

    let width = rows[VA_ROW].len();
    if width <= FIRST_VARIANT_COLUMN {
        return Err(MalformedTableError::NoVariants);
    }
    for (row, cells) in rows.iter().enumerate() {
        let separator = row >= FIRST_MEASURE_ROW && cells.is_empty();
        if !separator && cells.len() != width {
            return Err(MalformedTableError::RaggedRow {
                row,
                expected: width,
                found: cells.len(),
            });
        }
    }

    let va = numbers(VA_ROW, &rows[VA_ROW][FIRST_VARIANT_COLUMN..])?;
    let awbf = numbers(AWBF_ROW, &rows[AWBF_ROW][FIRST_VARIANT_COLUMN..])?;
    let mut measures = vec![];
    for (i, cells) in rows[FIRST_MEASURE_ROW..].iter().enumerate() {
        if cells.is_empty() {
            continue;
        }
        if let Some(measure) = measure_row(FIRST_MEASURE_ROW + i, cells)? {
            measures.push(measure);
        }
    }

    let records = va
        .iter()
        .zip(&awbf)
        .enumerate()
        .flat_map(|(variant_index, (&va, &awbf))| {
            let ratios = VariantRatios { va, awbf };
            measures.iter().map(move |measure| SimulationRecord {
                variant_index,
                ratios,
                measure: measure.description.clone(),
                bucket: measure.bucket,
                savings_percent: measure.savings[variant_index],
            })
        })
        .collect::<RecordPool>();

    tracing::debug!(
        variants = va.len(),
        measures = measures.len(),
        records = records.len(),
        "reshaped wide table"
    );
    Ok(records)
}

fn trimmed_rows(table: &WideTable) -> Vec<&[Cell]> {
    let mut rows = table
        .rows
        .iter()
        .map(|cells| {
            let len = cells
                .iter()
                .rposition(|cell| !cell.is_blank())
                .map_or(0, |i| i + 1);
            &cells[..len]
        })
        .collect::<Vec<_>>();
    while rows.last().is_some_and(|cells| cells.is_empty()) {
        rows.pop();
    }
    rows
}

fn numbers(row: usize, cells: &[Cell]) -> Result<Vec<f64>, MalformedTableError> {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| number(row, FIRST_VARIANT_COLUMN + i, cell))
        .collect()
}

fn number(row: usize, column: usize, cell: &Cell) -> Result<f64, MalformedTableError> {
    cell.as_number()
        .filter(|value| value.is_finite())
        .ok_or_else(|| MalformedTableError::NotANumber {
            row,
            column,
            found: cell.to_string(),
        })
}

/// Parses a measure row, or returns `None` if its window share is not one of
/// the simulated buckets.
fn measure_row(row: usize, cells: &[Cell]) -> Result<Option<MeasureRow>, MalformedTableError> {
    let description = cells[MEASURE_COLUMN]
        .as_text()
        .ok_or(MalformedTableError::MissingMeasure { row })?;
    let bucket_cell = &cells[BUCKET_COLUMN];
    let Some(bucket) = bucket_cell
        .as_number()
        .and_then(WindowShareBucket::from_exact)
    else {
        tracing::warn!(
            row,
            measure = %description,
            window_share = %bucket_cell,
            "skipping measure row with unsupported window share"
        );
        return Ok(None);
    };
    let savings = numbers(row, &cells[FIRST_VARIANT_COLUMN..])?;
    Ok(Some(MeasureRow {
        description,
        bucket,
        savings,
    }))
}
