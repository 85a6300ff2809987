//! Variable declarations and their resolution.
//!
//! A [`Variable`] describes one configurable value of a deployable unit:
//! its type, its default (a literal or a scripted expression), an optional
//! enumeration constraint and the stages it applies to. Resolution turns a
//! declaration into a concrete value given caller overrides and an
//! evaluation environment.

pub mod errors;
pub mod resolve;
pub mod types;
pub mod variable;

pub use errors::VarError;
pub use resolve::{DEFAULT_MAX_ITEMS_DEPTH, Overrides, ResolveOptions};
pub use types::{DefaultValue, Entry, Items};
pub use variable::Variable;
