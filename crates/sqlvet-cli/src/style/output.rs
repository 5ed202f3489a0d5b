//! Output helpers for consistent verdict formatting.

use super::colors::SemanticStyle;

pub fn print_valid(msg: &str) {
    println!("{} {}", "✓".valid(), msg);
}

pub fn print_invalid(msg: &str) {
    println!("{} {}", "✗".invalid(), msg);
}

/// Prints one error line under a verdict.
pub fn print_error_item(msg: &str) {
    println!("  {} {}", "•".invalid(), msg);
}

/// Prints one warning line under a verdict.
pub fn print_warning_item(msg: &str) {
    println!("  {} {}", "⚠".warning(), msg);
}

pub fn print_header(title: &str) {
    println!("{}", title.header());
}

/// Prints a labeled key-value pair with indentation.
pub fn print_labeled(key: &str, value: &str) {
    println!("  {}: {}", key.muted(), value);
}

/// Prints a list value, or a dimmed dash when empty.
pub fn print_labeled_list(key: &str, values: &[String]) {
    if values.is_empty() {
        print_labeled(key, &"-".muted());
    } else {
        print_labeled(key, &values.join(", "));
    }
}

pub fn print_spacer() {
    println!();
}
