//! Bit layout and physical conversion policy
//!
//! Generated decode code bakes the start offset and the conversion decision
//! into literals, so both functions here must stay bit-for-bit stable.

use crate::signals::database::{ByteOrder, SignalDefinition};

/// Start offset handed to the runtime reader for a signal
///
/// Little-endian (Intel) signals use the declared start bit unchanged.
///
/// Big-endian (Motorola) start bits name the MSB in "sawtooth" numbering:
/// bit 7 of byte 0 is the first bit on the wire, bit 0 of byte 0 the eighth.
/// The offset is `8 * byte + (bit_in_byte + 1) - size`, which can be negative
/// for signals crossing byte boundaries.
pub fn start_offset(signal: &SignalDefinition) -> i64 {
    match signal.byte_order {
        ByteOrder::LittleEndian => i64::from(signal.start_bit),
        ByteOrder::BigEndian => big_endian_offset(signal.start_bit, signal.length),
    }
}

fn big_endian_offset(start_bit: u16, size: u16) -> i64 {
    let start_bit = i64::from(start_bit);
    let byte_index = start_bit / 8;
    let bit_in_byte = start_bit % 8 + 1;
    byte_index * 8 + bit_in_byte - i64::from(size)
}

/// Whether generated code must call the physical conversion after reading
///
/// The raw value is used directly only for signals declared as
/// `[0|2^(size-1)]` with factor 1 and offset 0. Comparisons are exact.
#[allow(clippy::float_cmp)]
pub fn needs_conversion(signal: &SignalDefinition) -> bool {
    let raw_max = 2f64.powi(i32::from(signal.length) - 1);
    !(signal.max == raw_max && signal.min == 0.0 && signal.factor == 1.0 && signal.offset == 0.0)
}
