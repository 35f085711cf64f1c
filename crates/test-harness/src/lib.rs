//! Test harness for clamping setup selection.
//!
//! Scripts parts, assemblies and machinable features against the mock
//! kernel, computes and ranks clamping configurations, and checks results
//! with assertions that explain what went wrong.
//!
//! # Key Components
//!
//! - [`SetupBench`]: fluent API over named parts, bodies and features
//! - [`helpers`]: error type and part builders
//! - [`assertions`]: rich assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod workflow;

pub use helpers::HarnessError;
pub use workflow::{BenchReport, SetupBench};
