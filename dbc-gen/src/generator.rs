//! Main generator API
//!
//! The Generator struct is the entry point for loading DBC files and
//! producing decoder stubs from them.

use crate::codegen::decode_tree::emit_message;
use crate::codegen::emitter::Emitter;
use crate::codegen::multiplex::{resolve, MultiplexNode};
use crate::codegen::toit::ToitEmitter;
use crate::codegen::value_desc::emit_value_descriptions;
use crate::config::GeneratorConfig;
use crate::signals::database::{DatabaseStats, MessageDefinition, SignalDatabase};
use crate::types::{GenError, Result};
use rayon::prelude::*;
use std::path::Path;

/// The main generator struct - entry point for all generation operations
pub struct Generator {
    /// Internal signal database (loaded from DBC files)
    signal_db: SignalDatabase,
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator with the default configuration
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            signal_db: SignalDatabase::new(),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Load a DBC file and add its definitions to the signal database
    ///
    /// # Example
    /// ```no_run
    /// use dbc_gen::Generator;
    /// use std::path::Path;
    ///
    /// let mut generator = Generator::new();
    /// generator.add_dbc(Path::new("powertrain.dbc")).unwrap();
    /// ```
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        let contents = crate::signals::dbc::parse_dbc_file(path)?;
        self.signal_db.extend(contents);
        Ok(())
    }

    /// Parse DBC text and add its definitions to the signal database
    pub fn add_dbc_str(&mut self, source: &str, content: &str) -> Result<()> {
        let contents = crate::signals::dbc::parse_dbc_str(source, content)?;
        self.signal_db.extend(contents);
        Ok(())
    }

    /// Get statistics about the loaded database
    pub fn database_stats(&self) -> DatabaseStats {
        self.signal_db.stats()
    }

    /// Messages selected by the configuration, in input order
    fn selected_messages(&self) -> Vec<&MessageDefinition> {
        self.signal_db
            .messages()
            .iter()
            .filter(|m| self.config.should_generate(m.can_id()))
            .collect()
    }

    /// Resolve the multiplex tree of every selected message, in input order
    pub fn resolve_all(&self) -> Vec<(&MessageDefinition, MultiplexNode)> {
        let messages = self.selected_messages();
        let resolve_one = |message: &&MessageDefinition| {
            let facts = self.signal_db.multiplex_values_for(message.id);
            resolve(message, facts).tree()
        };

        let trees: Vec<MultiplexNode> = if self.config.parallel {
            messages.par_iter().map(resolve_one).collect()
        } else {
            messages.iter().map(resolve_one).collect()
        };

        messages.into_iter().zip(trees).collect()
    }

    /// Drive an emitter through the whole database
    pub fn generate<E: Emitter + ?Sized>(&self, emitter: &mut E) -> Result<()> {
        self.config.validate()?;

        let resolved = self.resolve_all();
        log::info!(
            "Generating {} messages ({} skipped by filter)",
            resolved.len(),
            self.signal_db.messages().len() - resolved.len()
        );

        emitter.import(&self.config.runtime_module)?;
        emitter.blank_line()?;

        for (message, tree) in &resolved {
            log::debug!(
                "{} (0x{:X}): {} classes, depth {}",
                message.name,
                message.can_id(),
                tree.node_count(),
                tree.depth()
            );
            emit_message(emitter, message, tree, &self.config)?;
        }

        if self.config.value_descriptions {
            let descriptions = self
                .signal_db
                .value_descriptions()
                .iter()
                .filter(|d| self.config.should_generate(d.can_id()));
            emit_value_descriptions(emitter, descriptions)?;
        }

        Ok(())
    }

    /// Generate Toit source for the whole database
    pub fn render(&self) -> Result<String> {
        let mut emitter = ToitEmitter::new(Vec::new());
        self.generate(&mut emitter)?;
        String::from_utf8(emitter.into_inner())
            .map_err(|e| GenError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
