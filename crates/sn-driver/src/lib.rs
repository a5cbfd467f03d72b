//! The `sindarin` command-line front end (component C8).
//!
//! Everything upstream of this crate (`sn-lexer`, `sn-parser`, `sn-binder`,
//! `sn-checker`) is a library with no notion of the filesystem, argv, or
//! process exit codes; this crate is the thin shell that wires them
//! together into a runnable tool.

pub mod args;
pub mod driver;
pub mod error;

pub use args::CliArgs;
pub use driver::{compile, CompileOutcome};
pub use error::CompileError;
