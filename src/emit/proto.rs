//! Protocol-Buffer schema emitter.
//!
//! Derives a proto3 document from an assembled database: one enum per
//! choice-bearing signal, one `message` block per CAN message, plus the
//! `_inner_timestamp` field the telemetry pipeline appends to every sample.

use std::collections::BTreeMap;

use crate::types::database::Database;
use crate::types::message::Message;
use crate::types::signal::Signal;

/// Proto field type of a signal.
///
/// Choice-bearing signals reference their generated enum; floats map to
/// `float`/`double` by width; single-bit signals map to `bool`; everything
/// else maps to the narrowest proto3 integer that holds the storage width.
fn proto_type_name(database_name: &str, message_name: &str, signal: &Signal) -> String {
    if signal.choices.is_some() {
        return enum_name(database_name, message_name, &signal.name);
    }
    if signal.is_float {
        let name = if signal.length == 32 { "float" } else { "double" };
        return name.to_string();
    }
    if signal.length == 1 {
        return "bool".to_string();
    }
    // proto3 has no narrow integers: 8 and 16 bit signals widen to 32.
    let width = if signal.length <= 32 { 32 } else { 64 };
    if signal.is_signed {
        format!("int{width}")
    } else {
        format!("uint{width}")
    }
}

fn enum_name(database_name: &str, message_name: &str, signal_name: &str) -> String {
    format!("{database_name}_{message_name}_{signal_name}").to_lowercase()
}

fn generate_enums(database_name: &str, messages: &[Message]) -> String {
    // Keyed map keeps the output stable across runs.
    let mut enums: BTreeMap<String, &BTreeMap<u64, String>> = BTreeMap::new();
    for msg in messages {
        for signal in &msg.signals {
            if let Some(choices) = &signal.choices {
                enums.insert(enum_name(database_name, &msg.name, &signal.name), choices);
            }
        }
    }

    let mut out = String::new();
    for (name, choices) in enums {
        out.push_str(&format!("enum {name} {{\n"));
        for (raw, choice) in choices {
            out.push_str(&format!("\t{choice} = {raw};\n"));
        }
        out.push_str("}\n");
    }
    out
}

fn generate_messages(database_name: &str, messages: &[Message]) -> String {
    let mut out = String::new();
    for msg in messages {
        out.push_str(&format!("message {}{{\n", msg.name));
        let mut field = 1;
        for signal in &msg.signals {
            out.push_str(&format!(
                "\t{} {} = {};\n",
                proto_type_name(database_name, &msg.name, signal),
                signal.name,
                field
            ));
            field += 1;
        }
        out.push_str(&format!("\tuint64 _inner_timestamp = {field};\n"));
        out.push_str("}\n");
    }
    out
}

/// Generates the proto3 schema for the whole database.
pub fn generate_proto(database: &Database, database_name: &str) -> String {
    format!(
        "syntax = \"proto3\";\npackage {database_name};\n\n\n{enums}\n{messages}\n",
        enums = generate_enums(database_name, &database.messages),
        messages = generate_messages(database_name, &database.messages),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn build_test_database() -> Database {
        let mut db = Database::default();
        let mut choices: BTreeMap<u64, String> = BTreeMap::new();
        choices.insert(0, "IDLE".into());
        choices.insert(1, "RUN".into());

        db.add_message(Message {
            frame_id: 1536,
            name: "cmd".into(),
            byte_size: 3,
            signals: vec![
                Signal {
                    name: "throttle".into(),
                    length: 16,
                    is_float: true,
                    scale: 200.0 / 65535.0,
                    minimum: -100.0,
                    maximum: 100.0,
                    ..Signal::default()
                },
                Signal {
                    name: "mode".into(),
                    start_bit: 16,
                    length: 1,
                    scale: 1.0,
                    maximum: 1.0,
                    choices: Some(choices),
                    ..Signal::default()
                },
            ],
            ..Message::default()
        });
        db
    }

    #[test]
    fn test_generate_proto() {
        let db = build_test_database();
        let proto = generate_proto(&db, "drive_net");

        assert!(proto.starts_with("syntax = \"proto3\";\npackage drive_net;\n"));

        // Enum from the choice-bearing signal.
        assert!(proto.contains("enum drive_net_cmd_mode {\n\tIDLE = 0;\n\tRUN = 1;\n}"));

        // Message block: non-32-bit floats widen to double.
        assert!(proto.contains("message cmd{\n"));
        assert!(proto.contains("\tdouble throttle = 1;\n"));
        assert!(proto.contains("\tdrive_net_cmd_mode mode = 2;\n"));
        assert!(proto.contains("\tuint64 _inner_timestamp = 3;\n"));
    }
}
