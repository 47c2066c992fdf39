use crate::types::signal::{ByteOrder, Signal};

/// One schema-defined CAN frame template.
///
/// Built once during database assembly and read-only afterwards. A schema
/// entry with more than one sending node expands into one `Message` per
/// `(name, sender)` pair, each with its own allocated `frame_id`; the
/// expanded messages share the same signal layout.
///
/// # Fields
/// - `frame_id`: unique numeric identifier, allocator-assigned or fixed.
/// - `name`: unique name within the database (`<schema name>_<sender>` for
///   expanded multi-sender entries).
/// - `byte_size`: payload length in bytes, from the highest used bit offset
///   rounded up to whole bytes.
/// - `signals`: signals in schema declaration order (not bit order).
/// - `cycle_time`: period in ms for cyclic messages; `None` for one-shot.
/// - `topic_name` / `topic_id`: grouping metadata used by the ID allocator;
///   absent for fixed-ID messages.
/// - `sender`: sending node of this concrete frame, when declared.
/// - `receivers`: receiving node names.
/// - `byte_order`: payload byte order used for the signal layout.
/// - `comment`: free-form description from the schema.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Message {
    pub frame_id: u32,
    pub name: String,
    pub byte_size: u16,
    pub signals: Vec<Signal>,
    pub cycle_time: Option<u32>,
    pub topic_name: Option<String>,
    pub topic_id: Option<u32>,
    pub sender: Option<String>,
    pub receivers: Vec<String>,
    pub byte_order: ByteOrder,
    pub comment: String,
}

impl Message {
    /// Returns a signal by name. The search is **case-insensitive**.
    pub fn get_signal_by_name(&self, name: &str) -> Option<&Signal> {
        self.signals
            .iter()
            .find(|sig| sig.name.eq_ignore_ascii_case(name))
    }

    /// Returns `true` when the message is sent periodically.
    pub fn is_cyclic(&self) -> bool {
        self.cycle_time.is_some()
    }

    /// Total number of payload bits actually occupied by signals.
    pub fn used_bits(&self) -> u32 {
        self.signals.iter().map(|sig| sig.length as u32).sum()
    }

    /// Checks that no two signals overlap in the payload.
    pub fn spans_disjoint(&self) -> bool {
        let mut spans: Vec<(u32, u32)> = self
            .signals
            .iter()
            .map(|sig| sig.bit_span(self.byte_order))
            .collect();
        spans.sort_unstable();
        spans.windows(2).all(|pair| pair[0].1 < pair[1].0)
    }
}
