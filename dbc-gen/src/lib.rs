//! DBC Stub Generator Library
//!
//! Turns CAN databases (DBC files) into Toit classes that decode raw frames
//! into physical values.
//!
//! # Architecture
//!
//! - Loads messages, extended multiplex facts (`SG_MUL_VAL_`) and value
//!   descriptions (`VAL_`) from one or more DBC files
//! - Resolves each message's multiplexing into a class tree, including
//!   multi-level (extended) multiplexing
//! - Emits one class per tree node plus a decoder class whose `decode`
//!   branches on switch values and returns the most specific class
//! - Emits named constants for value descriptions
//!
//! The library does NOT:
//! - Implement the runtime bit reader or physical conversion the generated
//!   code calls
//! - Encode messages
//! - Validate databases beyond what tree construction needs
//!
//! Command-line handling lives in the application layer (dbc-gen-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use dbc_gen::{Generator, GeneratorConfig, UnmatchedSwitch};
//! use std::path::Path;
//!
//! let config = GeneratorConfig::new().with_unmatched_switch(UnmatchedSwitch::Fail);
//! let mut generator = Generator::with_config(config);
//! generator.add_dbc(Path::new("powertrain.dbc")).unwrap();
//! generator.add_dbc(Path::new("diagnostics.dbc")).unwrap();
//!
//! let source = generator.render().unwrap();
//! print!("{}", source);
//! ```

// Public modules
pub mod codegen;
pub mod config;
pub mod generator;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use codegen::{Emitter, MultiplexNode, MultiplexResolution, ToitEmitter};
pub use config::{GeneratorConfig, UnmatchedSwitch};
pub use generator::Generator;
pub use signals::DatabaseStats;
pub use types::{Discriminator, GenError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
