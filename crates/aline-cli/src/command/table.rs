//! Plain-text table helpers shared by the commands

pub(super) fn print_title(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
}

pub(super) fn print_separator(width: usize) {
    println!("  {}", "-".repeat(width));
}

/// Printed in place of a table without rows.
pub(super) fn print_empty(what: &str) {
    println!("  (no {what})");
}
