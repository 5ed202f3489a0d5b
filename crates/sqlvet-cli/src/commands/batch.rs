//! Batch command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use sqlvet::batch::sql_files_in;
use sqlvet::{BatchReport, BatchSummary, Checker, validate_file};

use crate::style::colors::SemanticStyle;
use crate::style::{
    print_error_item, print_header, print_invalid, print_labeled, print_spacer, print_valid,
    print_warning_item,
};

pub fn run(checker: &Checker, paths: &[PathBuf], json: bool) -> Result<bool> {
    let files = expand(paths)?;
    let reports = files
        .iter()
        .map(|file| validate_file(checker, file))
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
            print_spacer();
        }
        print_totals(&reports);
    }

    Ok(reports.iter().all(BatchReport::all_valid))
}

/// Replaces each directory with the `*.sql` files it contains.
fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(sql_files_in(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn print_report(report: &BatchReport) {
    let source = report
        .source
        .as_deref()
        .map_or_else(|| "<script>".to_string(), |p: &Path| p.display().to_string());
    print_header(&source.code());

    for entry in &report.entries {
        let line = format!("#{} {}", entry.number, entry.sql);
        if entry.is_valid {
            print_valid(&line);
        } else {
            print_invalid(&line);
        }
        for error in &entry.errors {
            print_error_item(error);
        }
        for warning in &entry.warnings {
            print_warning_item(warning);
        }
    }

    print_summary(&report.summary);
}

fn print_summary(summary: &BatchSummary) {
    print_labeled(
        "Summary",
        &format!(
            "{}/{} valid, {} invalid, {} warnings",
            summary.valid, summary.total, summary.invalid, summary.warnings
        ),
    );
}

fn print_totals(reports: &[BatchReport]) {
    if reports.len() < 2 {
        return;
    }
    let total = reports.iter().fold(BatchSummary::default(), |acc, r| BatchSummary {
        total: acc.total + r.summary.total,
        valid: acc.valid + r.summary.valid,
        invalid: acc.invalid + r.summary.invalid,
        warnings: acc.warnings + r.summary.warnings,
    });
    print_header(&format!("{} files", reports.len()));
    print_summary(&total);
}
