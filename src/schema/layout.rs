//! Signal layout resolver.
//!
//! Turns one declarative signal spec into concrete [`Signal`] instances:
//! bit width, signedness, float/fixed classification, scale, bounds and
//! start bit. The only spec kind producing more than one signal is a
//! bitset, which fans out into one boolean per item.

use std::collections::BTreeMap;

use crate::schema::model::{InlineSpec, SignalSpec, TypeDef};
use crate::types::errors::{GenerateError, LayoutError, SchemaError};
use crate::types::signal::{ByteOrder, Signal};

/// Supported storage widths, in bits. Every resolved width is rounded up to
/// the smallest ladder entry that holds it.
pub const SIZE_LADDER: [u16; 5] = [1, 8, 16, 32, 64];

/// A message payload never exceeds one 64 bit word.
pub const MAX_PAYLOAD_BITS: u32 = 64;

/// Width, signedness and float flag of a primitive type name.
fn primitive(name: &str) -> Option<(u16, bool, bool)> {
    let spec = match name {
        "bool" => (1, false, false),
        "uint8" => (8, false, false),
        "uint16" => (16, false, false),
        "uint32" => (32, false, false),
        "uint64" => (64, false, false),
        "int8" => (8, true, false),
        "int16" => (16, true, false),
        "int32" => (32, true, false),
        "int64" => (64, true, false),
        "float32" => (32, false, true),
        "float64" => (64, false, true),
        _ => return None,
    };
    Some(spec)
}

/// Smallest ladder entry holding `bits`, or `None` past 64.
fn clamp_to_ladder(bits: u32) -> Option<u16> {
    SIZE_LADDER
        .iter()
        .copied()
        .find(|&step| u32::from(step) >= bits)
}

/// Bits needed to distinguish `steps` raw values: `ceil(log2(steps))`,
/// never less than one bit.
fn width_for_steps(steps: f64) -> u32 {
    let bits = steps.log2().ceil();
    if bits < 1.0 { 1 } else { bits as u32 }
}

/// Largest raw value representable in `width` bits, as a float.
fn raw_span(width: u16) -> f64 {
    ((1u128 << width) - 1) as f64
}

fn start_bit(offset: u32, width: u16, byte_order: ByteOrder) -> u32 {
    match byte_order {
        ByteOrder::LittleEndian => offset,
        // Big-endian signals carry the index of their highest bit.
        ByteOrder::BigEndian => offset + u32::from(width) - 1,
    }
}

/// Two's-complement physical bounds of a `width`-bit integer.
fn integer_bounds(width: u16, signed: bool) -> (f64, f64) {
    if signed {
        let half = (1u128 << (width - 1)) as f64;
        (-half, half - 1.0)
    } else {
        (0.0, raw_span(width))
    }
}

/// Resolves one signal spec at bit cursor `offset` inside `message`.
///
/// Returns the advanced cursor and the resolved signals. Only bitset
/// references return more than one signal; everything else returns exactly
/// one.
pub fn resolve(
    message: &str,
    name: &str,
    spec: &SignalSpec,
    offset: u32,
    types: &BTreeMap<String, TypeDef>,
    byte_order: ByteOrder,
) -> Result<(u32, Vec<Signal>), GenerateError> {
    match spec {
        SignalSpec::Inline(inline) => {
            let signal = resolve_inline(message, name, inline, offset, byte_order)?;
            let next = offset + u32::from(signal.length);
            Ok((next, vec![signal]))
        }
        SignalSpec::Reference(type_name) => match types.get(type_name) {
            Some(def) if def.kind == "enum" => {
                let signal = resolve_enum(message, name, def, offset, byte_order)?;
                let next = offset + u32::from(signal.length);
                Ok((next, vec![signal]))
            }
            Some(def) if def.kind == "bitset" => {
                Ok(resolve_bitset(name, def, offset, byte_order))
            }
            Some(def) => {
                // Primitive alias: the declared kind names the storage type.
                let signal =
                    resolve_primitive(message, name, &def.kind, offset, byte_order)?;
                let next = offset + u32::from(signal.length);
                Ok((next, vec![signal]))
            }
            None => {
                let signal = resolve_primitive(message, name, type_name, offset, byte_order)?;
                let next = offset + u32::from(signal.length);
                Ok((next, vec![signal]))
            }
        },
    }
}

/// Inline spec: forced width or range/precision computation, plus the float
/// scale optimization.
fn resolve_inline(
    message: &str,
    name: &str,
    spec: &InlineSpec,
    offset: u32,
    byte_order: ByteOrder,
) -> Result<Signal, GenerateError> {
    let mut is_float = spec.kind.starts_with("float");
    let mut forced_signed = false;

    // Normalized declared range, if any: the schema writes [max, min].
    let range = spec.range.map(|[a, b]| if a < b { (a, b) } else { (b, a) });

    let width: u16 = if let Some(force) = &spec.force {
        let (width, signed, float) =
            primitive(force).ok_or_else(|| LayoutError::UnknownPrimitive {
                signal: name.to_string(),
                type_name: force.clone(),
            })?;
        forced_signed = signed;
        is_float |= float;
        width
    } else {
        let (min, max) = range.ok_or_else(|| SchemaError::MissingRange {
            message: message.to_string(),
            signal: name.to_string(),
        })?;
        let precision = spec.precision.ok_or_else(|| SchemaError::MissingRange {
            message: message.to_string(),
            signal: name.to_string(),
        })?;
        if precision <= 0.0 {
            return Err(SchemaError::InvalidPrecision {
                message: message.to_string(),
                signal: name.to_string(),
            }
            .into());
        }
        if max <= min {
            return Err(LayoutError::ZeroWidth {
                message: message.to_string(),
                signal: name.to_string(),
            }
            .into());
        }
        let bits = width_for_steps((max - min) / precision);
        clamp_to_ladder(bits).ok_or_else(|| LayoutError::PayloadOverflow {
            message: message.to_string(),
            bits,
        })?
    };

    let is_signed = spec
        .signed
        .unwrap_or_else(|| forced_signed || range.is_some_and(|(min, _)| min < 0.0));

    let (minimum, maximum) = match range {
        Some(bounds) => bounds,
        None if is_float => float_bounds(width),
        None => integer_bounds(width, is_signed),
    };

    // Post-hoc precision tightening: spend the whole raw range of the
    // chosen width instead of the declared step.
    let optimize = spec.optimize.unwrap_or(true);
    let scale = if is_float && optimize && range.is_some() {
        (maximum - minimum).abs() / raw_span(width)
    } else {
        spec.precision.unwrap_or(1.0)
    };

    Ok(Signal {
        name: name.to_string(),
        start_bit: start_bit(offset, width, byte_order),
        length: width,
        is_float,
        is_signed,
        scale,
        offset: 0.0,
        minimum,
        maximum,
        choices: None,
    })
}

fn float_bounds(width: u16) -> (f64, f64) {
    if width == 32 {
        (f64::from(f32::MIN), f64::from(f32::MAX))
    } else {
        (f64::MIN, f64::MAX)
    }
}

/// Named enum: width from the item count, choices from the item order.
fn resolve_enum(
    message: &str,
    name: &str,
    def: &TypeDef,
    offset: u32,
    byte_order: ByteOrder,
) -> Result<Signal, GenerateError> {
    let bits = width_for_steps(def.items.len() as f64);
    let width = clamp_to_ladder(bits).ok_or_else(|| LayoutError::PayloadOverflow {
        message: message.to_string(),
        bits,
    })?;

    let choices: BTreeMap<u64, String> = def
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| (index as u64, item.clone()))
        .collect();

    Ok(Signal {
        name: name.to_string(),
        start_bit: start_bit(offset, width, byte_order),
        length: width,
        is_float: false,
        is_signed: false,
        scale: 1.0,
        offset: 0.0,
        minimum: 0.0,
        maximum: def.items.len().saturating_sub(1) as f64,
        choices: Some(choices),
    })
}

/// Named bitset: fans out into one single-bit boolean per item, each
/// advancing the cursor by one bit.
fn resolve_bitset(
    name: &str,
    def: &TypeDef,
    offset: u32,
    byte_order: ByteOrder,
) -> (u32, Vec<Signal>) {
    let mut cursor = offset;
    let mut signals: Vec<Signal> = Vec::with_capacity(def.items.len());
    for item in &def.items {
        signals.push(Signal {
            name: format!("{name}_{item}"),
            start_bit: start_bit(cursor, 1, byte_order),
            length: 1,
            is_float: false,
            is_signed: false,
            scale: 1.0,
            offset: 0.0,
            minimum: 0.0,
            maximum: 1.0,
            choices: None,
        });
        cursor += 1;
    }
    (cursor, signals)
}

/// Bare primitive reference: width and signedness from the type name,
/// bounds from the width.
fn resolve_primitive(
    message: &str,
    name: &str,
    type_name: &str,
    offset: u32,
    byte_order: ByteOrder,
) -> Result<Signal, GenerateError> {
    let (width, is_signed, is_float) =
        primitive(type_name).ok_or_else(|| SchemaError::UnknownType {
            message: message.to_string(),
            signal: name.to_string(),
            type_name: type_name.to_string(),
        })?;

    let (minimum, maximum) = if is_float {
        float_bounds(width)
    } else {
        integer_bounds(width, is_signed)
    };

    Ok(Signal {
        name: name.to_string(),
        start_bit: start_bit(offset, width, byte_order),
        length: width,
        is_float,
        is_signed,
        scale: 1.0,
        offset: 0.0,
        minimum,
        maximum,
        choices: None,
    })
}
