//! Per-message signal lookup by name

use crate::signals::database::{MessageDefinition, SignalDefinition};
use std::collections::HashMap;

/// Index of one message's signals by name
///
/// Borrowed from the message, so it lives only for one generation pass.
#[derive(Debug)]
pub struct SignalCatalog<'a> {
    by_name: HashMap<&'a str, &'a SignalDefinition>,
}

impl<'a> SignalCatalog<'a> {
    /// Build the index for a message
    ///
    /// Signal names are unique within a message; if a database violates that,
    /// the first declaration wins.
    pub fn new(message: &'a MessageDefinition) -> Self {
        let mut by_name = HashMap::with_capacity(message.signals.len());
        for signal in &message.signals {
            if by_name.contains_key(signal.name.as_str()) {
                log::warn!(
                    "Message '{}' declares signal '{}' more than once, keeping the first",
                    message.name,
                    signal.name
                );
                continue;
            }
            by_name.insert(signal.name.as_str(), signal);
        }
        Self { by_name }
    }

    /// Look up a signal by name
    pub fn get(&self, name: &str) -> Option<&'a SignalDefinition> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
