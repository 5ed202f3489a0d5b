//! Analyze command implementation.

use anyhow::Result;
use sqlvet::{AnalysisReport, Checker, DialectFeatures};

use crate::style::colors::SemanticStyle;
use crate::style::{
    print_error_item, print_header, print_invalid, print_labeled, print_labeled_list,
    print_spacer, print_valid, print_warning_item,
};

pub fn run(checker: &Checker, sql: &str, json: bool) -> Result<bool> {
    let report = checker.analyze_query(sql);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.is_valid)
}

fn print_report(report: &AnalysisReport) {
    print_header(&format!("{} analysis", report.dialect));
    print_labeled("SQL", &report.sql.code());
    print_spacer();

    if report.is_valid {
        print_valid("Valid");
    } else {
        print_invalid("Invalid");
    }
    for error in &report.errors {
        print_error_item(error);
    }
    for warning in &report.warnings {
        print_warning_item(warning);
    }

    if let Some(analysis) = &report.analysis {
        print_spacer();
        print_labeled("Statement", &analysis.kind.to_string());
        print_labeled_list("Tables", &analysis.tables);
        print_labeled_list("Columns", &analysis.columns);
        print_labeled_list("Functions", &analysis.functions);
        print_labeled_list("Clauses", &analysis.clauses);
    }

    let features = feature_labels(&report.features);
    if !features.is_empty() {
        print_spacer();
        print_labeled_list("Dialect features", &features);
    }
}

fn feature_labels(features: &DialectFeatures) -> Vec<String> {
    let mut labels = Vec::new();
    if features.single {
        labels.push("SINGLE".to_string());
    }
    if let Some(rows) = features.up_to_rows {
        labels.push(format!("UP TO {rows} ROWS"));
    }
    if features.bypassing_buffer {
        labels.push("BYPASSING BUFFER".to_string());
    }
    if features.client_specified {
        labels.push("CLIENT SPECIFIED".to_string());
    }
    labels.extend(features.stripped_clauses.iter().cloned());
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_labels_in_fixed_order() {
        let features = DialectFeatures {
            single: true,
            up_to_rows: Some(5),
            client_specified: true,
            ..DialectFeatures::default()
        };
        assert_eq!(
            feature_labels(&features),
            vec!["SINGLE", "UP TO 5 ROWS", "CLIENT SPECIFIED"]
        );
    }

    #[test]
    fn no_features_no_labels() {
        assert!(feature_labels(&DialectFeatures::default()).is_empty());
    }
}
