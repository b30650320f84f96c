//! Named constants for signal value descriptions

use crate::codegen::emitter::{Emitter, TypeRef};
use crate::codegen::{format_number, is_int_literal};
use crate::signals::database::ValueDescriptionDef;
use std::io;

/// Emit one constant per (value, label) pair, one block per signal
pub fn emit_value_descriptions<'a, E, I>(e: &mut E, descriptions: I) -> io::Result<()>
where
    E: Emitter + ?Sized,
    I: IntoIterator<Item = &'a ValueDescriptionDef>,
{
    for description in descriptions {
        e.blank_line()?;
        for (value, label) in &description.values {
            let ty = if is_int_literal(*value) {
                TypeRef::Int
            } else {
                TypeRef::Number
            };
            let name = constant_name(&description.signal_name, label, *value);
            e.constant(&name, ty, &format_number(*value))?;
        }
    }
    Ok(())
}

/// `UPPER(snake(signal) + "_" + snake(label))`
///
/// Labels without any identifier characters fall back to the value itself.
pub fn constant_name(signal: &str, label: &str, value: f64) -> String {
    let mut suffix = to_snake_case(label);
    if suffix.is_empty() {
        suffix = to_snake_case(&format_number(value).replace('-', "neg "));
    }
    let prefix = to_snake_case(signal);
    let name = match (prefix.is_empty(), suffix.is_empty()) {
        (false, false) => format!("{}_{}", prefix, suffix),
        (true, _) => suffix,
        (false, true) => prefix,
    };
    name.to_uppercase()
}

/// Lower snake case: word breaks at lower→upper transitions and before the
/// last capital of an acronym, any other character run becomes one `_`
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    let mut pending_break = false;

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            pending_break = !out.is_empty();
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                pending_break = true;
            }
        }
        if pending_break && !out.is_empty() {
            out.push('_');
        }
        pending_break = false;
        out.extend(c.to_lowercase());
    }
    out
}
