//! Operator-facing status lines.
//!
//! Every step of the pipeline reports through these so the output reads as a
//! linear transcript of what was done.

pub fn step(message: &str) {
    println!("==> {message}");
}

pub fn success(message: &str) {
    println!("✓ {message}");
}

pub fn warning(message: &str) {
    println!("⚠ {message}");
}

pub fn error(message: &str) {
    eprintln!("✗ {message}");
}

pub fn info(message: &str) {
    println!("  {message}");
}
