//! Core contracts for menuguard.
//!
//! This crate defines the snapshot model for the menu dataset (menus, menu
//! pages, menu items, dishes and their cleaned copies), dynamically typed
//! cell values, and the structural checks a snapshot must pass before any
//! integrity constraint is evaluated.

pub mod error;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use schema::{Snapshot, Table};
pub use types::{Entity, Stage, TableRef, Value};
pub use validation::validate_snapshot;
