//! The generic paginated list core shared by every entity list.
//!
//! [`ListDataSource`] turns a `(QueryMode, ListQuery)` pair into at most one honoured
//! request and publishes the outcome; [`ListController`] decides when to reload and
//! with which mode. Per-entity behaviour lives behind [`EntityDescriptor`].

mod controller;
mod data_source;
mod descriptor;
mod query;

use serde::Serialize;

pub use controller::{LinkOutcome, ListController};
pub use data_source::{ListDataSource, ListPhase, ListState};
pub use descriptor::EntityDescriptor;
pub use query::{ListQuery, ListSettings, QueryMode, Relation};

/// A row held by a list: identified by a numeric id and carrying the `linked` flag
/// flipped by link/unlink toggles.
pub trait Record: Clone + PartialEq + Send + Sync + Serialize + 'static {
    fn id(&self) -> i64;
    fn linked(&self) -> bool;
    fn set_linked(&mut self, linked: bool);
}
