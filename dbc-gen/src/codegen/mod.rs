//! Code generation
//!
//! Multiplex resolution, bit layout policy and the emitters that turn a
//! resolved message into target source.

pub mod decode_tree;
pub mod emitter;
pub mod layout;
pub mod multiplex;
pub mod toit;
pub mod value_desc;

pub use emitter::{Emitter, Param, ParamKind, TypeRef};
pub use multiplex::{resolve, MultiplexNode, MultiplexResolution};
pub use toit::ToitEmitter;

/// Whole values at or beyond this magnitude do not fit a 64-bit integer
const INT_LITERAL_LIMIT: f64 = 9_223_372_036_854_775_808.0;
/// Non-zero magnitudes below this are written in exponent form
const SMALL_LITERAL_LIMIT: f64 = 1e-4;

/// Whether `value` can be written as an integer literal
pub(crate) fn is_int_literal(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() < INT_LITERAL_LIMIT
}

/// Shortest decimal form of a number, without a trailing `.0` for whole values
///
/// Values outside the 64-bit integer range, and very small fractions, use
/// exponent form so they always read back as float literals.
pub(crate) fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite()
        && (magnitude >= INT_LITERAL_LIMIT || (magnitude != 0.0 && magnitude < SMALL_LITERAL_LIMIT))
    {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-40.0), "-40");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(0.000125), "0.000125");
    }

    #[test]
    fn test_format_number_out_of_integer_range() {
        assert_eq!(format_number(1.8446744073709552e19), "1.8446744073709552e19");
        assert_eq!(format_number(-9.223372036854775808e18), "-9.223372036854776e18");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-5), "2.5e-5");
        assert_eq!(format_number(4294967295.0), "4294967295");
    }

    #[test]
    fn test_is_int_literal() {
        assert!(is_int_literal(0.0));
        assert!(is_int_literal(-128.0));
        assert!(!is_int_literal(0.5));
        assert!(!is_int_literal(1.8446744073709552e19));
    }
}
