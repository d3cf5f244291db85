//! jsxgrade-core: parsing, feature extraction, and test grading for learner
//! JSX/TypeScript submissions.
//!
//! The pipeline is source text → [`syntax::parse`] → [`extract::extract`]
//! → [`FeatureContext`] → per-case judging in [`engine::Grader`].

pub mod analysis;
pub mod cache;
pub mod checker;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod pattern;
pub mod suite;
pub mod syntax;

pub use context::FeatureContext;
pub use engine::Grader;
pub use error::{CheckerError, ParseError};
pub use model::{TestCase, TestKind, TestResult, TestSuite, TestSuiteResult};
