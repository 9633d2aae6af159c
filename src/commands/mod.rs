//! # CLI Command Implementations
//!
//! One file per subcommand of `airone`. Each holds an `Args` struct derived
//! with `clap` and an `execute` function that calls into the `airone`
//! library and reports the result to the terminal.

pub mod add;
pub mod completions;
pub mod install;
