//! DBC file parser
//!
//! Parses Vector DBC files with the can-dbc crate and converts messages,
//! extended multiplex facts (`SG_MUL_VAL_`) and signal value descriptions
//! (`VAL_`) into our internal records.

use crate::signals::database::{
    ByteOrder, DbcContents, MessageDefinition, MultiplexRole, MultiplexValueDef,
    SignalDefinition, ValueDescriptionDef, ValueType,
};
use crate::types::{GenError, Result};
use std::path::Path;

/// Parse a DBC file and return everything the generator consumes
pub fn parse_dbc_file(path: &Path) -> Result<DbcContents> {
    log::info!("Parsing DBC file: {:?}", path);

    // Read the DBC file as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path)
        .map_err(|e| GenError::ReadError(format!("{:?}: {}", path, e)))?;

    let dbc_content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            // Latin-1 maps every byte to the code point of the same value
            log::warn!("DBC file {:?} is not UTF-8, decoding as Latin-1", path);
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let source_filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc");

    let contents = parse_dbc_str(source_filename, &dbc_content)?;

    log::info!(
        "Parsed {} messages, {} multiplex values, {} value descriptions from {:?}",
        contents.messages.len(),
        contents.multiplex_values.len(),
        contents.value_descriptions.len(),
        path
    );

    Ok(contents)
}

/// Parse DBC text; `source` names the origin in errors and message records
pub fn parse_dbc_str(source: &str, dbc_content: &str) -> Result<DbcContents> {
    let dbc = can_dbc::DBC::from_slice(dbc_content.as_bytes()).map_err(|e| {
        GenError::DbcParseError(format!("{}: {:?}", source, e))
    })?;

    let messages = dbc
        .messages()
        .iter()
        .map(|m| convert_message(m, source))
        .collect();

    let multiplex_values = dbc
        .extended_multiplex()
        .iter()
        .flat_map(convert_extended_multiplex)
        .collect();

    let value_descriptions = dbc
        .value_descriptions()
        .iter()
        .filter_map(convert_value_description)
        .collect();

    Ok(DbcContents {
        messages,
        multiplex_values,
        value_descriptions,
    })
}

/// Convert a can-dbc message to our MessageDefinition
fn convert_message(dbc_msg: &can_dbc::Message, source: &str) -> MessageDefinition {
    MessageDefinition {
        id: dbc_msg.message_id().0,
        name: dbc_msg.message_name().to_string(),
        size: *dbc_msg.message_size() as usize,
        sender: match dbc_msg.transmitter() {
            can_dbc::Transmitter::NodeName(name) => Some(name.to_string()),
            _ => None,
        },
        signals: dbc_msg.signals().iter().map(convert_signal).collect(),
        source: source.to_string(),
    }
}

/// Convert a can-dbc signal to our SignalDefinition
fn convert_signal(dbc_sig: &can_dbc::Signal) -> SignalDefinition {
    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let value_type = match *dbc_sig.value_type() {
        can_dbc::ValueType::Signed => ValueType::Signed,
        can_dbc::ValueType::Unsigned => ValueType::Unsigned,
    };

    let multiplex = match dbc_sig.multiplexer_indicator() {
        can_dbc::MultiplexIndicator::Plain => MultiplexRole::Plain,
        can_dbc::MultiplexIndicator::Multiplexor => MultiplexRole::Switch,
        can_dbc::MultiplexIndicator::MultiplexedSignal(value) => MultiplexRole::Multiplexed(*value),
        can_dbc::MultiplexIndicator::MultiplexorAndMultiplexedSignal(value) => {
            MultiplexRole::MultiplexedSwitch(*value)
        }
    };

    SignalDefinition {
        name: dbc_sig.name().to_string(),
        start_bit: *dbc_sig.start_bit() as u16,
        length: *dbc_sig.signal_size() as u16,
        byte_order,
        value_type,
        factor: *dbc_sig.factor(),
        offset: *dbc_sig.offset(),
        min: *dbc_sig.min(),
        max: *dbc_sig.max(),
        unit: if dbc_sig.unit().is_empty() {
            None
        } else {
            Some(dbc_sig.unit().to_string())
        },
        multiplex,
    }
}

/// One fact per value range of an `SG_MUL_VAL_` entry
fn convert_extended_multiplex(ext: &can_dbc::ExtendedMultiplex) -> Vec<MultiplexValueDef> {
    ext.mappings()
        .iter()
        .map(|mapping| MultiplexValueDef {
            message_id: ext.message_id().0,
            signal: ext.signal_name().to_string(),
            switch: ext.multiplexor_signal_name().to_string(),
            range_start: *mapping.min_value(),
            range_end: *mapping.max_value(),
        })
        .collect()
}

/// Signal value descriptions; environment variable descriptions are not generated
fn convert_value_description(desc: &can_dbc::ValueDescription) -> Option<ValueDescriptionDef> {
    match desc {
        can_dbc::ValueDescription::Signal {
            message_id,
            signal_name,
            value_descriptions,
        } => Some(ValueDescriptionDef {
            message_id: message_id.0,
            signal_name: signal_name.to_string(),
            values: value_descriptions
                .iter()
                .map(|v| (*v.a(), v.b().to_string()))
                .collect(),
        }),
        can_dbc::ValueDescription::EnvironmentVariable { .. } => {
            log::debug!("Skipping environment variable value description");
            None
        }
    }
}
