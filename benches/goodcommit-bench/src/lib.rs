//! GoodCommit Benchmark Suite
//!
//! Run all benchmarks:
//! ```bash
//! cargo bench -p goodcommit-bench
//! ```
//!
//! Run a specific benchmark group:
//! ```bash
//! cargo bench -p goodcommit-bench --bench engine_bench
//! cargo bench -p goodcommit-bench --bench reward_bench
//! ```

pub mod helpers;
