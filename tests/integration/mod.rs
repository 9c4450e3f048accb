//! Integration test suite for rubygems-import
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **find_deps**: locating, resolving, and validating whole source trees
//! - **interception**: build scripts routed through the interceptor
//! - **cli**: the `rubygems-import` binary

mod cli;
mod find_deps;
mod interception;
