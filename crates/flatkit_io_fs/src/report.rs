//! Flatten report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{SpecFlattenError, SpecFlattenRecord};

/// Aggregate counters and diagnostics for one `flatten_copy` run.
#[derive(Debug, Default, Clone)]
pub struct ReportFlatten {
    /// Total regular-file candidates seen by the walker.
    pub cnt_scanned: u64,
    /// Number of scanned files that passed the filters.
    pub cnt_matched: u64,
    /// Number of files committed (or planned, in dry-run) to the destination.
    pub cnt_copied: u64,
    /// Number of copies that needed a collision suffix.
    pub cnt_renamed: u64,
    /// Number of sources/entries skipped.
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal/copy.
    pub warnings: Vec<String>,
    /// Per-file failures.
    pub errors: Vec<SpecFlattenError>,
    /// `source -> destination` mapping, in copy order.
    pub records: Vec<SpecFlattenRecord>,
}

impl ReportFlatten {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_renamed".to_string(), self.cnt_renamed);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} copied={} renamed={} skipped={} errors={} warnings={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_renamed"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportFlatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FLATTEN]"))
    }
}

/// Mutable accumulator for flatten statistics.
///
/// Every warning, error and record is also emitted as a `tracing` event, so
/// the log and the final report never disagree.
#[derive(Debug, Default, Clone)]
pub struct ReportFlattenBuilder {
    report: ReportFlatten,
}

impl ReportFlattenBuilder {
    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.report.cnt_matched += 1;
    }

    /// Increment skipped count by one.
    pub fn add_skipped(&mut self) {
        self.report.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        tracing::warn!("{warning}");
        self.report.warnings.push(warning);
    }

    /// Add a warning for a skipped entry.
    pub fn add_skipped_with_warning(&mut self, warning: String) {
        self.add_skipped();
        self.add_warning(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        tracing::error!("Error copying {}: {exception}", path.display());
        self.report.errors.push(SpecFlattenError { path, exception });
    }

    /// Record one committed mapping; `if_renamed` marks a collision suffix.
    pub fn add_copied(&mut self, spec_record: SpecFlattenRecord, if_renamed: bool) {
        tracing::info!(
            "Copied: {} -> {}",
            spec_record.path_file_src.display(),
            spec_record.path_file_dst.display()
        );
        self.report.cnt_copied += 1;
        if if_renamed {
            self.report.cnt_renamed += 1;
        }
        self.report.records.push(spec_record);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportFlatten {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ReportFlatten, ReportFlattenBuilder};
    use crate::spec::SpecFlattenRecord;

    #[test]
    fn report_to_dict_and_format() {
        let report = ReportFlatten {
            cnt_scanned: 8,
            cnt_matched: 5,
            cnt_copied: 4,
            cnt_renamed: 1,
            cnt_skipped: 2,
            warnings: vec!["w".to_string()],
            errors: vec![],
            records: vec![],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 8);
        assert_eq!(dict_counts["cnt_renamed"], 1);
        assert_eq!(dict_counts["cnt_errors"], 0);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[FLATTEN]");
        assert_eq!(
            txt,
            "[FLATTEN] scanned=8 matched=5 copied=4 renamed=1 skipped=2 errors=0 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_accumulates_records_and_errors() {
        let mut builder = ReportFlattenBuilder::default();
        builder.add_scanned();
        builder.add_matched();
        builder.add_copied(
            SpecFlattenRecord {
                path_file_src: PathBuf::from("src/a.txt"),
                path_file_dst: PathBuf::from("dst/a_1.txt"),
            },
            true,
        );
        builder.add_skipped_with_warning("Source path 'x' does not exist, skipping".to_string());
        builder.add_error(PathBuf::from("src/b.txt"), "boom".to_string());

        let report = builder.build();
        assert_eq!(report.cnt_copied, 1);
        assert_eq!(report.cnt_renamed, 1);
        assert_eq!(report.cnt_skipped, 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.records[0].path_file_dst, PathBuf::from("dst/a_1.txt"));
    }
}
