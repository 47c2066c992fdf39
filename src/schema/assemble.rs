//! Database assembly.
//!
//! Walks the parsed message definitions, runs the ID allocator and the
//! layout resolver, and produces the finalized [`Database`] every emitter
//! consumes.

use std::collections::{BTreeSet, HashSet};

use crate::schema::idalloc::{self, IdConfig};
use crate::schema::layout::{self, MAX_PAYLOAD_BITS};
use crate::schema::model::{MessageDef, NetworkSchema, SignalSpec};
use crate::types::database::Database;
use crate::types::errors::{GenerateError, LayoutError, SchemaError};
use crate::types::message::Message;
use crate::types::node::Node;
use crate::types::signal::{ByteOrder, Signal};

/// Collects the externally mandated frame IDs of a schema, failing when two
/// messages claim the same one.
pub fn fixed_ids(schema: &NetworkSchema) -> Result<HashSet<u32>, SchemaError> {
    let mut ids: HashSet<u32> = HashSet::new();
    for message in &schema.messages {
        if let Some(id) = message.fixed_id
            && !ids.insert(id)
        {
            return Err(SchemaError::DuplicateFixedId {
                name: message.name.clone(),
                id,
            });
        }
    }
    Ok(ids)
}

/// Structural validation, run before any allocation: every message needs a
/// topic or a fixed ID, topic messages need a priority, names must be
/// unique, endianness must be well-formed.
fn validate(schema: &NetworkSchema) -> Result<(), SchemaError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for message in &schema.messages {
        if !seen.insert(message.name.as_str()) {
            return Err(SchemaError::DuplicateMessage {
                name: message.name.clone(),
            });
        }
        if message.topic.is_none() && message.fixed_id.is_none() {
            return Err(SchemaError::MissingTopic {
                message: message.name.clone(),
            });
        }
        if message.topic.is_some() && message.priority.is_none() {
            return Err(SchemaError::MissingPriority {
                message: message.name.clone(),
            });
        }
        byte_order_of(message)?;
    }
    Ok(())
}

fn byte_order_of(message: &MessageDef) -> Result<ByteOrder, SchemaError> {
    match message.endianness.as_deref() {
        None | Some("little") => Ok(ByteOrder::LittleEndian),
        Some("big") => Ok(ByteOrder::BigEndian),
        Some(other) => Err(SchemaError::InvalidEndianness {
            message: message.name.clone(),
            value: other.to_string(),
        }),
    }
}

/// Resolves the full signal layout of one message definition.
///
/// Returns the signals in declaration order and the payload size in bytes.
fn resolve_contents(
    schema: &NetworkSchema,
    def: &MessageDef,
    byte_order: ByteOrder,
) -> Result<(Vec<Signal>, u16), GenerateError> {
    let mut offset: u32 = 0;
    let mut signals: Vec<Signal> = Vec::new();

    for (name, value) in &def.contents {
        let spec: SignalSpec =
            serde_json::from_value(value.clone()).map_err(SchemaError::Json)?;
        let (next, mut resolved) =
            layout::resolve(&def.name, name, &spec, offset, &schema.types, byte_order)?;
        offset = next;
        signals.append(&mut resolved);
    }

    if offset > MAX_PAYLOAD_BITS {
        return Err(LayoutError::PayloadOverflow {
            message: def.name.clone(),
            bits: offset,
        }
        .into());
    }

    Ok((signals, offset.div_ceil(8) as u16))
}

/// Assembles a parsed schema into a [`Database`].
///
/// `reserved` carries frame IDs already taken by sibling databases; the
/// schema's own fixed IDs are added to it before allocation so generated
/// IDs never collide with either.
pub fn assemble(
    schema: &NetworkSchema,
    config: IdConfig,
    reserved: &HashSet<u32>,
) -> Result<Database, GenerateError> {
    validate(schema)?;

    let mut blacklist = reserved.clone();
    blacklist.extend(fixed_ids(schema)?);

    let ids = idalloc::allocate(&schema.messages, config, &blacklist)?;
    let topics = idalloc::topic_ids(&schema.messages, config)?;

    let mut db = Database::default();
    db.name = schema.name.clone().unwrap_or_default();

    // Nodes first: union of all senders and receivers, sorted.
    let mut node_names: BTreeSet<&str> = BTreeSet::new();
    for message in &schema.messages {
        node_names.extend(message.sending.iter().map(String::as_str));
        node_names.extend(message.receiving.iter().map(String::as_str));
    }
    for name in node_names {
        db.add_node(Node::new(name));
    }

    for def in &schema.messages {
        let byte_order = byte_order_of(def)?;
        let (signals, byte_size) = resolve_contents(schema, def, byte_order)?;

        let template = Message {
            frame_id: 0,
            name: def.name.clone(),
            byte_size,
            signals,
            cycle_time: def.interval,
            topic_name: def.topic.clone(),
            topic_id: def.topic.as_deref().and_then(|t| topics.get(t).copied()),
            sender: def.sending.first().cloned(),
            receivers: def.receiving.clone(),
            byte_order,
            comment: def.description.clone().unwrap_or_default(),
        };

        if let Some(fixed) = def.fixed_id {
            // Fixed-ID messages bypass the allocator and never expand per
            // sender; they carry no topic metadata.
            db.add_message(Message {
                frame_id: fixed,
                topic_name: None,
                topic_id: None,
                ..template
            });
        } else if def.sending.len() > 1 {
            for sender in &def.sending {
                let variant = format!("{}_{}", def.name, sender);
                let frame_id = ids[&def.name][&variant];
                db.add_message(Message {
                    frame_id,
                    name: variant,
                    sender: Some(sender.clone()),
                    ..template.clone()
                });
            }
        } else {
            db.add_message(Message {
                frame_id: ids[&def.name][&def.name],
                ..template
            });
        }
    }

    Ok(db)
}
