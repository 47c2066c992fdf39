//! # emit
//!
//! `emit` is the module containing the text emitters that consume an
//! assembled [`Database`](crate::types::database::Database): Protocol-Buffer
//! schemas, watchdog interval headers and C introspection tables. All of
//! them are pure `Database` to `String` transformations.

#[cfg(feature = "c-utils")]
pub mod c_utils;
#[cfg(feature = "proto")]
pub mod proto;
#[cfg(feature = "watchdog")]
pub mod watchdog;

#[cfg(feature = "c-utils")]
use crate::types::signal::Signal;

/// Returns `true` when the generated C code must go through a floating
/// point conversion for this signal: either a float encoding, or a
/// fixed-point scale with a fractional part.
#[cfg(feature = "c-utils")]
pub(crate) fn is_float_conversion(signal: &Signal) -> bool {
    signal.is_float || signal.scale.fract() != 0.0
}

/// C storage type of a signal, e.g. `uint16_t`, `int32_t`, `float`.
#[cfg(feature = "c-utils")]
pub(crate) fn c_type_name(signal: &Signal) -> String {
    if is_float_conversion(signal) {
        if signal.length == 32 {
            "float".to_string()
        } else {
            "double".to_string()
        }
    } else {
        let width = signal.length.max(8);
        if signal.is_signed {
            format!("int{width}_t")
        } else {
            format!("uint{width}_t")
        }
    }
}

#[cfg(all(test, feature = "c-utils"))]
mod tests {
    use super::*;

    #[test]
    fn test_c_type_name() {
        let mut sig = Signal {
            length: 16,
            scale: 1.0,
            ..Signal::default()
        };
        assert_eq!(c_type_name(&sig), "uint16_t");

        sig.is_signed = true;
        assert_eq!(c_type_name(&sig), "int16_t");

        // Fractional scale forces a float conversion even for fixed-point.
        sig.scale = 0.5;
        assert_eq!(c_type_name(&sig), "double");

        sig.is_float = true;
        sig.length = 32;
        assert_eq!(c_type_name(&sig), "float");

        // Single-bit signals are stored in a byte.
        let flag = Signal {
            length: 1,
            scale: 1.0,
            ..Signal::default()
        };
        assert_eq!(c_type_name(&flag), "uint8_t");
    }
}
