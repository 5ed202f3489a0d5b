//! CLI command implementations.
//!
//! Each command returns whether everything it validated was valid; `main`
//! turns that into the exit code.

pub mod analyze;
pub mod batch;
pub mod check;
pub mod version;

use std::io::Read;

use anyhow::{Context, Result};

/// Returns `arg`, or all of stdin when `arg` is `-`.
pub fn read_sql(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut sql = String::new();
    std::io::stdin()
        .read_to_string(&mut sql)
        .context("Failed to read SQL from stdin")?;
    Ok(sql)
}
