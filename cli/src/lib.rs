//! Library half of the `goodcommit` command-line tool.
//!
//! The binary keeps a whole commitment ledger (records, treasury book,
//! in-memory token balances and the operator registry) in one JSON state
//! file, rebuilds the engine from it on every invocation, and writes it back
//! after a successful mutating command.

pub mod admin;
pub mod clap_app;
pub mod cli;
pub mod commitment;
pub mod output;
pub mod state;
