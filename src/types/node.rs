/// Represents a network node (device/ECU) declared by the schema.
///
/// Nodes are collected from the union of every message's `sending` and
/// `receiving` lists, sorted by name so the assembled database is
/// reproducible.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Node {
    pub name: String,
    pub comment: String,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Node {
            name: name.to_string(),
            comment: String::new(),
        }
    }
}
