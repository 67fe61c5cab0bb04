//! Rulekeeper Domain Layer
//!
//! This crate contains the domain model for Rulekeeper and the one piece of
//! local business logic the toolkit owns: reconciling rule collections.
//! Everything that talks to the outside world (files, HTTP, terminals) lives
//! in other crates and plugs in through the traits defined here.
//!
//! ## Key Concepts
//!
//! - **Rule**: An atomic, testable statement extracted from a policy document
//! - **Source files**: The set of documents a rule originated from
//! - **Edit**: A proposed delete or merge over the rule collection
//! - **Validation result**: A verdict for one rule against one document
//! - **RuleStore**: The authoritative, insertion-ordered collection for a run
//!
//! ## Architecture
//!
//! - Pure logic only, no I/O
//! - Serialization shapes match the flat JSON documents the CLI persists
//! - Trait definitions for the LLM boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod edit;
pub mod priority;
pub mod rule;
pub mod store;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use content::ContentPart;
pub use edit::Edit;
pub use priority::Priority;
pub use rule::{Quote, Rule, RuleDraft, RuleId};
pub use store::{EditReport, ReconcileError, RuleCandidate, RuleStore, UnknownIdPolicy};
pub use traits::{LlmProvider, StructuredRequest};
pub use validation::{ValidationResult, Verdict};
