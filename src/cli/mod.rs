//! # CLI Module
//!
//! Command-line interface of the `taggen` binary.
//!
//! ## Commands
//!
//! ### `run`
//!
//! Runs the pipeline described by a `taggen.toml`:
//!
//! ```bash
//! taggen run --config taggen.toml
//! ```
//!
//! Files under `input` go through, in order:
//!
//! 1. `+build ignore` removal (`drop_build_ignore = true`)
//! 2. tag processing with every configured handler
//! 3. package rename (`package = "..."`)
//! 4. import additions (`imports`, `named_imports`)
//! 5. write-out to `output` with `suffix` (when `output` is set)
//!
//! Handlers register in table order: `[[field]]`, `[[templater]]`,
//! `[[collection]]`, `[[inception]]`. Deferred collection and inception
//! handlers render after the whole pipeline finished, in the same order.
//!
//! ### `scan`
//!
//! Lists tagged declarations without writing anything:
//!
//! ```bash
//! taggen scan models
//! taggen scan models --namespace markers --json
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use clap::Parser;
//! use taggen::cli::{run_cli, Cli};
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;


pub use commands::{run_cli, run_config, scan, Cli, Commands, RunSummary, ScanEntry};
