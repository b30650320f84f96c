//! Signal database
//!
//! Accumulates message definitions, extended multiplex facts and value
//! descriptions from one or more DBC files, preserving discovery order.

use std::collections::HashMap;

/// Mask clearing the extended-frame flag DBC stores in bit 31 of message IDs
const CAN_ID_MASK: u32 = 0x1FFF_FFFF;

/// A complete CAN message definition
#[derive(Debug, Clone)]
pub struct MessageDefinition {
    /// Message ID as written in the DBC (bit 31 set for extended frames)
    pub id: u32,
    /// Message name
    pub name: String,
    /// Message size in bytes
    pub size: usize,
    /// Sender ECU name (optional)
    pub sender: Option<String>,
    /// All signals in this message, in declaration order
    pub signals: Vec<SignalDefinition>,
    /// Source file (DBC filename)
    pub source: String,
}

impl MessageDefinition {
    /// CAN identifier as it appears on the bus
    pub fn can_id(&self) -> u32 {
        self.id & CAN_ID_MASK
    }
}

/// A CAN signal definition
#[derive(Debug, Clone)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Start bit as declared in the DBC
    pub start_bit: u16,
    /// Length in bits
    pub length: u16,
    /// Byte order
    pub byte_order: ByteOrder,
    /// Value type (signed/unsigned)
    pub value_type: ValueType,
    /// Scale factor to convert raw value to physical value
    pub factor: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// Minimum physical value
    pub min: f64,
    /// Maximum physical value
    pub max: f64,
    /// Engineering unit (e.g., "km/h", "V")
    pub unit: Option<String>,
    /// Multiplexing role of this signal
    pub multiplex: MultiplexRole,
}

impl SignalDefinition {
    /// This signal's value selects among sibling groups
    pub fn is_multiplexer_switch(&self) -> bool {
        matches!(
            self.multiplex,
            MultiplexRole::Switch | MultiplexRole::MultiplexedSwitch(_)
        )
    }

    /// This signal is only present for certain switch values
    pub fn is_multiplexed(&self) -> bool {
        self.switch_value().is_some()
    }

    /// Switch value declared on the signal itself (simple multiplexing)
    pub fn switch_value(&self) -> Option<u64> {
        match self.multiplex {
            MultiplexRole::Multiplexed(v) | MultiplexRole::MultiplexedSwitch(v) => Some(v),
            MultiplexRole::Plain | MultiplexRole::Switch => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.value_type == ValueType::Signed
    }
}

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Signed integer
    Signed,
    /// Unsigned integer
    Unsigned,
}

/// Multiplex indicator of a signal (`M`, `m<n>`, `m<n>M` in DBC syntax)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplexRole {
    /// Always present
    Plain,
    /// Multiplexer switch, itself always present
    Switch,
    /// Present when the message's switch equals the value
    Multiplexed(u64),
    /// Multiplexed signal that is also a switch for a deeper level
    MultiplexedSwitch(u64),
}

/// Extended multiplexing fact (`SG_MUL_VAL_`): one value range per fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplexValueDef {
    /// Message ID as written in the DBC
    pub message_id: u32,
    /// Gated signal
    pub signal: String,
    /// Switch signal gating it
    pub switch: String,
    /// First value of the inclusive range
    pub range_start: u64,
    /// Last value of the inclusive range
    pub range_end: u64,
}

/// Enumerated value descriptions of one signal (`VAL_`)
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDescriptionDef {
    /// Message ID as written in the DBC
    pub message_id: u32,
    /// Signal the descriptions belong to
    pub signal_name: String,
    /// (raw value, label) pairs in declaration order
    pub values: Vec<(f64, String)>,
}

impl ValueDescriptionDef {
    /// CAN identifier of the owning message, without the extended-frame flag
    pub fn can_id(&self) -> u32 {
        self.message_id & CAN_ID_MASK
    }
}

/// Everything extracted from a single DBC file
#[derive(Debug, Clone, Default)]
pub struct DbcContents {
    pub messages: Vec<MessageDefinition>,
    pub multiplex_values: Vec<MultiplexValueDef>,
    pub value_descriptions: Vec<ValueDescriptionDef>,
}

/// The accumulated signal database
///
/// Messages are kept in discovery order and never deduplicated; extended
/// multiplex facts are grouped by message ID.
#[derive(Debug, Default)]
pub struct SignalDatabase {
    /// All message definitions in the order they were loaded
    messages: Vec<MessageDefinition>,

    /// Extended multiplex facts by DBC message ID
    multiplex_values: HashMap<u32, Vec<MultiplexValueDef>>,

    /// Value descriptions in the order they were loaded
    value_descriptions: Vec<ValueDescriptionDef>,
}

impl SignalDatabase {
    /// Create a new empty signal database
    pub fn new() -> Self {
        Self::default()
    }

    /// Append everything parsed from one DBC file
    pub fn extend(&mut self, contents: DbcContents) {
        self.messages.extend(contents.messages);
        for fact in contents.multiplex_values {
            self.add_multiplex_value(fact);
        }
        self.value_descriptions.extend(contents.value_descriptions);
    }

    /// Add a message definition to the database
    pub fn add_message(&mut self, message: MessageDefinition) {
        self.messages.push(message);
    }

    /// Add an extended multiplex fact
    pub fn add_multiplex_value(&mut self, fact: MultiplexValueDef) {
        self.multiplex_values
            .entry(fact.message_id)
            .or_default()
            .push(fact);
    }

    /// Add a value description
    pub fn add_value_description(&mut self, description: ValueDescriptionDef) {
        self.value_descriptions.push(description);
    }

    /// All messages in discovery order
    pub fn messages(&self) -> &[MessageDefinition] {
        &self.messages
    }

    /// Extended multiplex facts for a message, in discovery order
    pub fn multiplex_values_for(&self, message_id: u32) -> &[MultiplexValueDef] {
        self.multiplex_values
            .get(&message_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All value descriptions in discovery order
    pub fn value_descriptions(&self) -> &[ValueDescriptionDef] {
        &self.value_descriptions
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.iter().map(|m| m.signals.len()).sum(),
            num_multiplex_values: self.multiplex_values.values().map(Vec::len).sum(),
            num_value_descriptions: self.value_descriptions.len(),
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
    /// Total number of extended multiplex facts
    pub num_multiplex_values: usize,
    /// Total number of value description tables
    pub num_value_descriptions: usize,
}
