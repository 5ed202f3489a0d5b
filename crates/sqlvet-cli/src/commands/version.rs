//! Version command implementation.

use crate::style::colors::SemanticStyle;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("sqlvet {VERSION}");
    println!();
    println!("Semantic validation for ABAP SQL and Ariba AQL.");
    println!();
    println!("Dialects:");
    println!("  {}   ABAP Open SQL", "abap".code());
    println!("  {}    Ariba Query Language", "aql".code());
    println!();
    println!("Build info:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
}
