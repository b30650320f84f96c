//! Signal database and DBC parser
//!
//! This module contains the DBC loader, the accumulated signal database and
//! the per-message signal catalog.

pub mod catalog;
pub mod database;
pub mod dbc;

// Re-export key types for convenience
pub use catalog::SignalCatalog;
pub use database::{
    ByteOrder, DatabaseStats, DbcContents, MessageDefinition, MultiplexRole,
    MultiplexValueDef, SignalDatabase, SignalDefinition, ValueDescriptionDef, ValueType,
};
