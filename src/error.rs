//! Typed failure conditions for the normalization core.
//!
//! Only one condition is allowed to stop a pipeline run: a column the
//! caller declared as required (the row's primary label) that no matching
//! strategy could resolve. Everything else degrades in place: a cell that
//! fails numeric coercion becomes a missing value and is tallied in the
//! frame's [`CoercionReport`](crate::rows::CoercionReport), and an
//! empty result set is a valid state the presentation layer renders as
//! "no data".

use thiserror::Error;

use crate::schema::CanonicalField;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A field the caller marked as required could not be bound to any
    /// input column by the active matching strategy.
    #[error("required column '{0}' could not be resolved from the input headers")]
    MissingRequiredColumn(CanonicalField),
}
