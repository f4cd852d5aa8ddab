//! Export the dataset rows to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::table::SalesTable;
use crate::error::AppError;

/// Write every row of `table` (header included) to a CSV file.
pub fn write_rows_csv(path: &Path, table: &SalesTable) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::runtime(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    write_rows(file, table)?;

    log::info!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Same as `write_rows_csv` but into memory.
pub fn rows_to_csv_string(table: &SalesTable) -> Result<String, AppError> {
    let bytes = write_rows(Vec::new(), table)?;
    String::from_utf8(bytes).map_err(|e| AppError::runtime(format!("CSV is not UTF-8: {e}")))
}

/// Serialize the rows into `out` and hand it back once flushed.
fn write_rows<W: Write>(out: W, table: &SalesTable) -> Result<W, AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in table.rows() {
        writer
            .serialize(row)
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::generate_sample;
    use crate::domain::{AnalysisConfig, Product, Region, SalesRow};

    #[test]
    fn csv_has_header_and_rows() {
        let d = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let table = SalesTable::new(vec![
            SalesRow::new(d, Region::West, Product::ProductC, 1200.5, 800.25),
            SalesRow::new(d, Region::North, Product::ProductA, 100.0, 75.0),
        ]);

        let csv = rows_to_csv_string(&table).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,region,product,sales,cost,profit");
        assert_eq!(lines[1], "2023-05-01,West,Product C,1200.5,800.25,400.25");
        assert_eq!(lines[2], "2023-05-01,North,Product A,100.0,75.0,25.0");
    }

    #[test]
    fn export_file_matches_table() {
        let table = generate_sample(&AnalysisConfig::default()).unwrap();
        let path = std::env::temp_dir().join(format!("sales-lens-rows-{}.csv", std::process::id()));

        write_rows_csv(&path, &table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,region,product,sales,cost,profit");
        assert_eq!(lines.len(), table.len() + 1);
        assert!(lines[1].starts_with("2023-01-01,North,Product A,"));
        assert_eq!(text, rows_to_csv_string(&table).unwrap());
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let path = std::env::temp_dir().join("sales-lens-no-such-dir").join("rows.csv");
        let err = write_rows_csv(&path, &SalesTable::default()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
