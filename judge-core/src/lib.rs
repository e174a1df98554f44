/// Helper for compiling source into an executable
pub mod compiler;
pub mod error;
/// Verdict decision and the test-suite driver
pub mod judge;
/// Discovering `N.in`/`N.out` test data
pub mod package;
/// Runtime essentials for running a program under a timing wrapper
pub mod run;
pub mod utils;
pub mod workspace;
