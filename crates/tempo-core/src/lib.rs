//! Query-expression engine for the tempo time-tracking client.
//!
//! This crate is the pure, synchronous part of the client:
//! - `timeexpr`: compiling free-form time descriptions into timestamps
//! - `hierarchy`: resolving name paths against the project/folder forest
//! - `aggregate`: rolling record durations up through that forest
//!
//! Transport, argument parsing, and rendering live in the sibling crates.

pub mod aggregate;
pub mod hierarchy;
pub mod timeexpr;
pub mod types;

pub use aggregate::{HierRow, Hierarchy, MISSING_PARENTS_LABEL, RecordTally};
pub use hierarchy::{Catalog, KindFilter, NodeSource, ResolveError, SourceError};
pub use timeexpr::InvalidExpression;
pub use types::{
    DISCONNECTED, Node, NodeId, NodeKind, ROOT, Record, RecordKind, RecordType, VariableType,
};
