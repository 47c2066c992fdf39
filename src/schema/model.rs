//! Serde model of the network schema document.
//!
//! Mirrors the JSON shape one-to-one; semantic resolution (widths, bounds,
//! IDs) happens in [`layout`](crate::schema::layout) and
//! [`idalloc`](crate::schema::idalloc).

use std::collections::BTreeMap;

use serde_derive::Deserialize;
use serde_json::{Map, Value};

/// Root of a network schema document.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSchema {
    /// Logical network name; falls back to the file stem when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub messages: Vec<MessageDef>,
    /// Named reusable type declarations (enums, bitsets, primitive aliases).
    #[serde(default)]
    pub types: BTreeMap<String, TypeDef>,
}

/// One message entry of the schema.
///
/// `contents` keeps the field declaration order of the document
/// (`serde_json` is built with `preserve_order`); that order drives the bit
/// placement of the signals.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub sending: Vec<String>,
    #[serde(default)]
    pub receiving: Vec<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub fixed_id: Option<u32>,
    /// Period in ms for cyclic messages.
    #[serde(default, alias = "cycle_time")]
    pub interval: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    /// `"little"` (default) or `"big"`.
    #[serde(default)]
    pub endianness: Option<String>,
    /// Ordered signal-name to signal-spec mapping.
    #[serde(default)]
    pub contents: Map<String, Value>,
}

/// Declarative per-signal specification.
///
/// Either a bare reference to a declared/primitive type, or an inline object
/// with explicit encoding parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignalSpec {
    Reference(String),
    Inline(InlineSpec),
}

/// Inline signal specification.
#[derive(Debug, Clone, Deserialize)]
pub struct InlineSpec {
    /// Base type family, e.g. `"int"`, `"uint"`, `"float32"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Primitive that fixes the bit width directly, bypassing the
    /// range/precision computation.
    #[serde(default)]
    pub force: Option<String>,
    /// Declared physical range as `[max, min]`.
    #[serde(default)]
    pub range: Option<[f64; 2]>,
    /// Physical resolution of one raw step.
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub signed: Option<bool>,
    /// Recompute the float scale to exploit the full raw range of the
    /// chosen width. Defaults to `true`.
    #[serde(default)]
    pub optimize: Option<bool>,
}

/// A named reusable type declaration.
///
/// `kind` is `"enum"`, `"bitset"`, or the name of a primitive the alias
/// stands for.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl MessageDef {
    /// Variant names this entry expands to: one per sender when more than
    /// one node sends the message, otherwise the plain message name.
    pub fn variant_names(&self) -> Vec<String> {
        if self.sending.len() > 1 {
            self.sending
                .iter()
                .map(|device| format!("{}_{}", self.name, device))
                .collect()
        } else {
            vec![self.name.clone()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_def() {
        let text = r#"{
            "name": "steer_status",
            "sending": ["steer"],
            "receiving": ["dashboard"],
            "priority": 2,
            "topic": "drive",
            "interval": 100,
            "contents": {
                "angle": {"type": "float32", "range": [180, -180], "precision": 0.1},
                "mode": "steer_mode"
            }
        }"#;
        let def: MessageDef = serde_json::from_str(text).unwrap();
        assert_eq!(def.name, "steer_status");
        assert_eq!(def.priority, Some(2));
        assert_eq!(def.interval, Some(100));

        // Declaration order of contents must survive parsing.
        let keys: Vec<&String> = def.contents.keys().collect();
        assert_eq!(keys, ["angle", "mode"]);

        let angle: SignalSpec = serde_json::from_value(def.contents["angle"].clone()).unwrap();
        match angle {
            SignalSpec::Inline(spec) => {
                assert_eq!(spec.kind, "float32");
                assert_eq!(spec.range, Some([180.0, -180.0]));
            }
            SignalSpec::Reference(_) => panic!("expected inline spec"),
        }

        let mode: SignalSpec = serde_json::from_value(def.contents["mode"].clone()).unwrap();
        assert!(matches!(mode, SignalSpec::Reference(name) if name == "steer_mode"));
    }

    #[test]
    fn test_cycle_time_alias() {
        let text = r#"{"name": "m", "cycle_time": 50}"#;
        let def: MessageDef = serde_json::from_str(text).unwrap();
        assert_eq!(def.interval, Some(50));
    }

    #[test]
    fn test_variant_names() {
        let mut def: MessageDef = serde_json::from_str(r#"{"name": "status"}"#).unwrap();
        assert_eq!(def.variant_names(), ["status"]);

        def.sending = vec!["front".into(), "rear".into()];
        assert_eq!(def.variant_names(), ["status_front", "status_rear"]);
    }
}
