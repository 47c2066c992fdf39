use std::collections::BTreeMap;

/// Byte order of a message payload.
///
/// Decides how a signal's `start_bit` is derived from the running bit
/// cursor during layout:
/// - little-endian (Intel): `start_bit` is the lowest bit of the span;
/// - big-endian (Motorola): `start_bit` is the highest bit of the span.
#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

/// Represents one scalar or boolean field packed into a message payload.
///
/// A `Signal` is produced by the layout resolver from its declarative spec
/// (explicit range+precision, forced type, enum or bitset item) and is
/// immutable afterwards.
///
/// # Fields
/// - `name`: signal name, unique within its message.
/// - `start_bit`: 0-based position of the first bit, following the
///   message's [`ByteOrder`] convention.
/// - `length`: bit width, one of {1, 8, 16, 32, 64}.
/// - `is_float`: float encoding family (mutually exclusive with fixed-point).
/// - `is_signed`: signedness; meaningful only when `is_float` is false.
/// - `scale`, `offset`: affine transform `physical = raw * scale + offset`.
/// - `minimum`, `maximum`: physical-value bounds, from the declared range or
///   from the bit width when no range was given.
/// - `choices`: optional mapping from raw value to symbolic name (enum).
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Signal {
    pub name: String,
    pub start_bit: u32,
    pub length: u16,
    pub is_float: bool,
    pub is_signed: bool,
    pub scale: f64,
    pub offset: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub choices: Option<BTreeMap<u64, String>>,
}

impl Signal {
    /// Returns `true` for single-bit boolean signals (bitset items, `bool`).
    pub fn is_bool(&self) -> bool {
        self.length == 1 && self.choices.is_none()
    }

    /// Returns the symbolic name for a raw value, when this signal is an enum.
    pub fn choice_name(&self, raw: u64) -> Option<&str> {
        self.choices.as_ref()?.get(&raw).map(String::as_str)
    }

    /// Applies the affine transform to a raw storage value.
    pub fn physical_from_raw(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }

    /// Lowest and highest bit index occupied by this signal, linearized
    /// according to the given byte order.
    ///
    /// Used to verify that no two signals of a message overlap.
    pub fn bit_span(&self, byte_order: ByteOrder) -> (u32, u32) {
        let width = self.length as u32;
        match byte_order {
            ByteOrder::LittleEndian => (self.start_bit, self.start_bit + width - 1),
            ByteOrder::BigEndian => (self.start_bit + 1 - width, self.start_bit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_signal() -> Signal {
        Signal {
            name: "speed".into(),
            start_bit: 8,
            length: 16,
            is_float: false,
            is_signed: false,
            scale: 0.1,
            offset: 0.0,
            minimum: 0.0,
            maximum: 250.0,
            choices: None,
        }
    }

    #[test]
    fn test_physical_from_raw() {
        let sig: Signal = build_test_signal();
        assert_eq!(sig.physical_from_raw(1250.0), 125.0);
    }

    #[test]
    fn test_choice_name() {
        let mut sig: Signal = build_test_signal();
        assert!(sig.choice_name(0).is_none());

        let mut choices: BTreeMap<u64, String> = BTreeMap::new();
        choices.insert(0, "IDLE".to_string());
        choices.insert(1, "RUNNING".to_string());
        sig.choices = Some(choices);

        assert_eq!(sig.choice_name(1), Some("RUNNING"));
        assert!(sig.choice_name(7).is_none());
    }

    #[test]
    fn test_bit_span_little_endian() {
        let sig: Signal = build_test_signal();
        assert_eq!(sig.bit_span(ByteOrder::LittleEndian), (8, 23));
    }

    #[test]
    fn test_bit_span_big_endian() {
        // Big-endian start_bit is the highest bit of the span.
        let sig = Signal {
            start_bit: 23,
            ..build_test_signal()
        };
        assert_eq!(sig.bit_span(ByteOrder::BigEndian), (8, 23));
    }
}
