//! Write the report as JSON.
//!
//! The JSON mirrors `report::Report`: overview, describe, group-bys, pivot,
//! monthly trend, correlation and top rows. Undefined values (NaN) become `null`.

use std::fs::File;
use std::path::Path;

use crate::error::AppError;
use crate::report::Report;

pub fn write_summary_json(path: &Path, report: &Report) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::runtime(format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::runtime(format!("Failed to write summary JSON: {e}")))?;

    log::info!("wrote summary to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::data::generate_sample;
    use crate::domain::AnalysisConfig;
    use crate::report::build_report;

    #[test]
    fn summary_serializes_with_expected_sections() {
        let config = AnalysisConfig::default();
        let table = generate_sample(&config).unwrap();
        let report = build_report(table.len(), &table, &config);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["rows_generated"], 144);
        assert_eq!(value["overview"]["rows"], 144);
        assert_eq!(value["pivot"]["regions"][0], "North");
        assert_eq!(value["pivot"]["products"][2], "Product C");
        assert_eq!(value["monthly"].as_array().unwrap().len(), 12);
        assert!(value["monthly"][0]["pct_change"].is_null());
        assert_eq!(value["sales_by_region"]["key"], "region");
        assert_eq!(value["top_rows"].as_array().unwrap().len(), config.top_n);
    }

    #[test]
    fn summary_file_round_trips() {
        let config = AnalysisConfig::default();
        let table = generate_sample(&config).unwrap();
        let report = build_report(table.len(), &table, &config);
        let path = std::env::temp_dir().join(format!("sales-lens-summary-{}.json", std::process::id()));

        super::write_summary_json(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rows_generated"], 144);
        assert_eq!(value["correlation"]["measures"].as_array().unwrap().len(), 4);
        assert!(text.contains("\n  \"overview\""));
    }
}
