//! Check command implementation.

use anyhow::Result;
use sqlvet::Checker;

use crate::style::{print_error_item, print_invalid, print_valid, print_warning_item};

pub fn run(checker: &Checker, sql: &str, json: bool) -> Result<bool> {
    let result = checker.check_syntax(sql);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result.is_valid);
    }

    let dialect = checker.dialect();
    if result.is_valid {
        print_valid(&format!("Valid {dialect} statement"));
    } else {
        print_invalid(&format!("Invalid {dialect} statement"));
    }
    for error in &result.errors {
        print_error_item(error);
    }
    for warning in &result.warnings {
        print_warning_item(warning);
    }

    Ok(result.is_valid)
}
