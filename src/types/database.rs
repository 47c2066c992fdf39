//! Assembled network model.
//!
//! The in-memory representation of one CAN network once the schema has been
//! loaded: the ordered list of messages (with their resolved signals), the
//! declared nodes, and normalized lookup maps for fast access. Built once
//! per load and consumed read-only by every emitter.

use std::collections::HashMap;

use crate::types::message::Message;
use crate::types::node::Node;

/// Index of a message within `Database.messages`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct MessageId(pub usize);

/// Index of a node within `Database.nodes`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct NodeId(pub usize);

/// The ordered collection of all messages plus the declared nodes.
///
/// ### Internal lookups
/// - `msg_by_id`: lookup by numeric frame ID;
/// - `msg_by_name`: **case-insensitive** lookup by message name;
/// - `node_by_name`: **case-insensitive** lookup by node name.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Database {
    /// Logical database name (schema `name`, or the file stem).
    pub name: String,
    /// Messages in assembly order.
    pub messages: Vec<Message>,
    /// Declared nodes, sorted by name.
    pub nodes: Vec<Node>,

    msg_by_id: HashMap<u32, MessageId>,
    msg_by_name: HashMap<String, MessageId>,
    node_by_name: HashMap<String, NodeId>,
}

impl Database {
    // ---- Adders: keep the lookup maps coherent ----

    /// Adds a node and indexes it by lowercase name.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id: NodeId = NodeId(self.nodes.len());
        let key: String = node.name.to_lowercase();
        self.nodes.push(node);
        self.node_by_name.insert(key, id);
        id
    }

    /// Adds a message and indexes it by frame ID and lowercase name.
    pub fn add_message(&mut self, msg: Message) -> MessageId {
        let id: MessageId = MessageId(self.messages.len());
        self.msg_by_id.insert(msg.frame_id, id);
        self.msg_by_name.insert(msg.name.to_lowercase(), id);
        self.messages.push(msg);
        id
    }

    // ---- Public accessors ----

    /// Returns a message by its numeric frame ID.
    pub fn get_message_by_id(&self, frame_id: u32) -> Option<&Message> {
        self.msg_by_id
            .get(&frame_id)
            .map(|&mid| &self.messages[mid.0])
    }

    /// Returns a message by name. The search is **case-insensitive**.
    pub fn get_message_by_name(&self, name: &str) -> Option<&Message> {
        self.msg_by_name
            .get(&name.to_lowercase())
            .map(|&mid| &self.messages[mid.0])
    }

    /// Returns a node by name. The search is **case-insensitive**.
    pub fn get_node_by_name(&self, name: &str) -> Option<&Node> {
        self.node_by_name
            .get(&name.to_lowercase())
            .map(|&nid| &self.nodes[nid.0])
    }

    /// Iterates messages in assembly order.
    pub fn iter_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Frame IDs of every message, in assembly order.
    pub fn frame_ids(&self) -> Vec<u32> {
        self.messages.iter().map(|msg| msg.frame_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let mut db: Database = Database::default();
        db.add_node(Node::new("Gateway"));
        db.add_message(Message {
            frame_id: 1536,
            name: "drive_command".into(),
            ..Message::default()
        });

        assert_eq!(db.get_message_by_id(1536).unwrap().name, "drive_command");
        assert!(db.get_message_by_id(1537).is_none());

        // Name lookups are case-insensitive.
        assert!(db.get_message_by_name("Drive_Command").is_some());
        assert!(db.get_node_by_name("gateway").is_some());
        assert!(db.get_node_by_name("motor").is_none());

        assert_eq!(db.frame_ids(), vec![1536]);
    }
}
