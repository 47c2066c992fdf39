//! Deterministic frame ID allocation.
//!
//! IDs pack a priority-ordered slot and a topic into one fixed-width
//! integer: `((slot * messages_per_priority + seq) << topic_bits) + topic`.
//! Topics are enumerated in sorted order so two runs over the same schema
//! always produce the same assignment.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::schema::model::MessageDef;
use crate::types::errors::AllocError;

/// Bit layout of the generated IDs.
///
/// The ID space of one topic holds `2^message_bits` slots, split into
/// `max_priority + 1` equal buckets. Two conventions ship as presets; any
/// other split can be built directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdConfig {
    pub message_bits: u32,
    pub topic_bits: u32,
    pub max_priority: u8,
}

impl IdConfig {
    /// 6 message bits, 5 topic bits, 8 priority levels.
    pub const WIDE: IdConfig = IdConfig {
        message_bits: 6,
        topic_bits: 5,
        max_priority: 7,
    };

    /// 8 message bits, 3 topic bits, 4 priority levels.
    pub const COMPACT: IdConfig = IdConfig {
        message_bits: 8,
        topic_bits: 3,
        max_priority: 3,
    };

    /// Capacity of one topic+priority bucket.
    pub const fn messages_per_priority(&self) -> u32 {
        (1 << self.message_bits) / (self.max_priority as u32 + 1)
    }

    /// Number of distinct topics the layout can address.
    pub const fn max_topics(&self) -> usize {
        1 << self.topic_bits
    }
}

impl Default for IdConfig {
    fn default() -> Self {
        IdConfig::WIDE
    }
}

/// Per-topic ID generator.
///
/// Owns one cursor per priority bucket for the duration of a single
/// allocation pass; never shared across runs.
pub struct IdAllocator<'a> {
    config: IdConfig,
    topic_id: u32,
    cursors: Vec<u32>,
    reserved: &'a HashSet<u32>,
}

impl<'a> IdAllocator<'a> {
    pub fn new(config: IdConfig, topic_id: u32, reserved: &'a HashSet<u32>) -> Self {
        IdAllocator {
            config,
            topic_id,
            cursors: vec![0; config.max_priority as usize + 1],
            reserved,
        }
    }

    /// Assigns the next free ID in bucket `slot`.
    ///
    /// `slot` counts from the top of the topic's space: slot 0 fills the
    /// lowest addresses. Candidates colliding with a reserved ID are
    /// skipped transparently; they still consume bucket capacity.
    pub fn next(&mut self, slot: u8, message: &str) -> Result<u32, AllocError> {
        let per_priority = self.config.messages_per_priority();
        let mut seq = self.cursors[slot as usize];
        loop {
            if seq >= per_priority {
                return Err(AllocError::BucketOverflow {
                    message: message.to_string(),
                    limit: per_priority,
                });
            }
            self.cursors[slot as usize] = seq + 1;
            let scoped = per_priority * u32::from(slot) + seq;
            let global = (scoped << self.config.topic_bits) + self.topic_id;
            if !self.reserved.contains(&global) {
                return Ok(global);
            }
            seq += 1;
        }
    }
}

/// Dense topic IDs for every topic name used by `messages`, in sorted
/// name order.
pub fn topic_ids(
    messages: &[MessageDef],
    config: IdConfig,
) -> Result<BTreeMap<String, u32>, AllocError> {
    let names: BTreeSet<&str> = messages
        .iter()
        .filter_map(|message| message.topic.as_deref())
        .collect();

    if names.len() > config.max_topics() {
        return Err(AllocError::TopicOverflow {
            count: names.len(),
            limit: config.max_topics(),
        });
    }

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index as u32))
        .collect())
}

/// Allocated IDs per message, keyed by variant name.
///
/// Single-sender messages carry one entry keyed by their own name;
/// multi-sender messages carry one `{message}_{sender}` entry per sender.
pub type AllocatedIds = BTreeMap<String, BTreeMap<String, u32>>;

/// Runs a full allocation pass over `messages`.
///
/// Fixed-ID messages bypass the allocator entirely and never consume
/// bucket capacity; their IDs are expected to already be part of
/// `reserved`. A schema priority of `p` (0 = most urgent) lands in bucket
/// `max_priority - p`, so urgent messages take the high end of the numeric
/// range. A walked message without a priority is an error.
pub fn allocate(
    messages: &[MessageDef],
    config: IdConfig,
    reserved: &HashSet<u32>,
) -> Result<AllocatedIds, AllocError> {
    let topics = topic_ids(messages, config)?;
    let mut ids = AllocatedIds::new();

    for (topic, &topic_id) in &topics {
        let mut generator = IdAllocator::new(config, topic_id, reserved);

        for message in messages.iter().filter(|message| {
            message.topic.as_deref() == Some(topic.as_str()) && message.fixed_id.is_none()
        }) {
            let priority = message.priority.ok_or_else(|| AllocError::MissingPriority {
                message: message.name.clone(),
            })?;
            if priority > config.max_priority {
                return Err(AllocError::PriorityOutOfRange {
                    message: message.name.clone(),
                    priority,
                    max: config.max_priority,
                });
            }
            let slot = config.max_priority - priority;

            let entry = ids.entry(message.name.clone()).or_default();
            for variant in message.variant_names() {
                let global = generator.next(slot, &message.name)?;
                entry.insert(variant, global);
            }
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(name: &str, topic: &str, priority: u8) -> MessageDef {
        serde_json::from_str(&format!(
            r#"{{"name": "{name}", "sending": ["ecu"], "topic": "{topic}", "priority": {priority}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_end_to_end_bucket_math() {
        // COMPACT: 64 ids per bucket, topic "drive" -> topic_id 0.
        // priority 0 -> slot 3 -> scoped 192 -> (192 << 3) + 0 = 1536
        // priority 1 -> slot 2 -> scoped 128 -> (128 << 3) + 0 = 1024
        let messages = vec![
            message("cmd", "drive", 0),
            message("status", "drive", 1),
        ];
        let reserved = HashSet::new();
        let ids = allocate(&messages, IdConfig::COMPACT, &reserved).unwrap();

        assert_eq!(ids["cmd"]["cmd"], 1536);
        assert_eq!(ids["status"]["status"], 1024);
    }

    #[test]
    fn test_determinism() {
        let messages = vec![
            message("b_msg", "zeta", 2),
            message("a_msg", "alpha", 1),
            message("c_msg", "alpha", 1),
        ];
        let reserved = HashSet::new();
        let first = allocate(&messages, IdConfig::WIDE, &reserved).unwrap();
        let second = allocate(&messages, IdConfig::WIDE, &reserved).unwrap();
        assert_eq!(first, second);

        // Topics get dense sorted ids: alpha = 0, zeta = 1.
        assert_eq!(first["a_msg"]["a_msg"] & 0b11111, 0);
        assert_eq!(first["b_msg"]["b_msg"] & 0b11111, 1);
    }

    #[test]
    fn test_sequential_within_bucket() {
        let messages = vec![
            message("first", "drive", 1),
            message("second", "drive", 1),
        ];
        let reserved = HashSet::new();
        let ids = allocate(&messages, IdConfig::COMPACT, &reserved).unwrap();
        assert_eq!(
            ids["second"]["second"],
            ids["first"]["first"] + (1 << IdConfig::COMPACT.topic_bits)
        );
    }

    #[test]
    fn test_bucket_capacity_boundary() {
        // Exactly messages_per_priority allocations succeed; one more fails.
        let config = IdConfig::COMPACT;
        let reserved = HashSet::new();
        let mut generator = IdAllocator::new(config, 0, &reserved);
        for _ in 0..config.messages_per_priority() {
            generator.next(0, "filler").unwrap();
        }
        let err = generator.next(0, "overflow").unwrap_err();
        assert!(matches!(
            err,
            AllocError::BucketOverflow { ref message, limit: 64 } if message == "overflow"
        ));
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let config = IdConfig::COMPACT;
        // First two candidates of slot 0 / topic 0 are 0 and 8; reserve them.
        let reserved: HashSet<u32> = [0, 8].into_iter().collect();
        let mut generator = IdAllocator::new(config, 0, &reserved);
        let id = generator.next(0, "m").unwrap();
        assert_eq!(id, 16);
        assert!(!reserved.contains(&id));
    }

    #[test]
    fn test_fixed_id_message_consumes_no_bucket_slot() {
        // A message carrying both a topic and a fixed id never touches the
        // bucket: its sibling keeps the bucket's first slot.
        let boot: MessageDef = serde_json::from_str(
            r#"{"name": "boot", "sending": ["ecu"], "topic": "drive", "priority": 0, "fixed_id": 99}"#,
        )
        .unwrap();
        let messages = vec![boot, message("cmd", "drive", 0)];
        let reserved: HashSet<u32> = [99].into_iter().collect();
        let ids = allocate(&messages, IdConfig::COMPACT, &reserved).unwrap();

        assert!(!ids.contains_key("boot"));
        assert_eq!(ids["cmd"]["cmd"], 1536);
    }

    #[test]
    fn test_missing_priority_is_fatal() {
        let def: MessageDef =
            serde_json::from_str(r#"{"name": "m", "sending": ["ecu"], "topic": "drive"}"#)
                .unwrap();
        let err = allocate(&[def], IdConfig::COMPACT, &HashSet::new()).unwrap_err();
        assert!(matches!(err, AllocError::MissingPriority { ref message } if message == "m"));
    }

    #[test]
    fn test_priority_out_of_range() {
        let messages = vec![message("m", "drive", 9)];
        let reserved = HashSet::new();
        let err = allocate(&messages, IdConfig::WIDE, &reserved).unwrap_err();
        assert!(matches!(err, AllocError::PriorityOutOfRange { priority: 9, max: 7, .. }));
    }

    #[test]
    fn test_topic_overflow() {
        let messages: Vec<MessageDef> = (0..9)
            .map(|index| message(&format!("m{index}"), &format!("topic{index}"), 0))
            .collect();
        let reserved = HashSet::new();
        let err = allocate(&messages, IdConfig::COMPACT, &reserved).unwrap_err();
        assert!(matches!(err, AllocError::TopicOverflow { count: 9, limit: 8 }));
    }

    #[test]
    fn test_multi_sender_variants() {
        let mut def = message("status", "drive", 0);
        def.sending = vec!["front".into(), "rear".into()];
        let reserved = HashSet::new();
        let ids = allocate(&[def], IdConfig::COMPACT, &reserved).unwrap();

        let variants = &ids["status"];
        assert_eq!(variants.len(), 2);
        assert_ne!(variants["status_front"], variants["status_rear"]);
    }
}
