//! Code-metadata adapters.

mod scanner;

pub use scanner::SourceScanner;
