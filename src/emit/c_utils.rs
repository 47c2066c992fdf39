//! C introspection tables emitter.
//!
//! Emits a header/implementation pair with the auxiliary lookup tables the
//! generated network library ships next to its pack/unpack code:
//! - name-string defines for every message and signal;
//! - the per-signal type tag enum (`{db}_types_id`);
//! - `fields_string_from_id`: signal name strings by frame ID;
//! - `enum_fields`: choice name strings by enum ID;
//! - `serialize_from_id`: sscanf-based text-to-frame conversion by frame ID.

use crate::emit::c_type_name;
use crate::types::database::Database;
use crate::types::message::Message;

/// sscanf format chunk for one C storage type. The chunks concatenate into
/// one multi-line C string literal.
fn specifier(c_type: &str) -> &'static str {
    match c_type {
        "uint8_t" => "%\" PRIu8  \n\t\t\t\"",
        "uint16_t" => "%\" PRIu16 \n\t\t\t\"",
        "uint32_t" => "%\" PRIu32 \n\t\t\t\"",
        "uint64_t" => "%\" PRIu64 \n\t\t\t\"",
        "int8_t" => "%\" PRIi8  \n\t\t\t\"",
        "int16_t" => "%\" PRIi16 \n\t\t\t\"",
        "int32_t" => "%\" PRIi32 \n\t\t\t\"",
        "int64_t" => "%\" PRIi64 \n\t\t\t\"",
        _ => "\"\"%f\"\n\t\t\t\"",
    }
}

fn generate_defines(database_name: &str, messages: &[Message]) -> String {
    let mut out = String::new();
    for msg in messages {
        out.push_str("/* START */\n");
        out.push_str(&format!(
            "#define {}_{}_string \"{}_{}\"\n\n",
            database_name.to_lowercase(),
            msg.name.to_lowercase(),
            database_name.to_uppercase(),
            msg.name.to_uppercase()
        ));
        for signal in &msg.signals {
            out.push_str(&format!(
                "#define {}_{}_{}_string \"{}_{}_{}\"\n",
                database_name.to_lowercase(),
                msg.name.to_lowercase(),
                signal.name.to_lowercase(),
                database_name.to_uppercase(),
                msg.name.to_uppercase(),
                signal.name.to_uppercase()
            ));
        }
        out.push_str("/* END */\n\n");
    }
    out
}

/// Enum names of every choice-bearing signal, in first-seen message/signal
/// order. The same order assigns the numeric enum IDs used by
/// `enum_fields`.
fn choice_enum_names(database_name: &str, messages: &[Message]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for msg in messages {
        for signal in &msg.signals {
            if signal.choices.is_some() {
                names.push(
                    format!("e_{database_name}_{}_{}", msg.name, signal.name).to_lowercase(),
                );
            }
        }
    }
    names
}

/// The `{db}_types_id` enum: primitive storage types first (starting at a
/// negative offset so choice enums keep their 0-based IDs), then one entry
/// per choice-bearing signal.
fn generate_types_enum(database_name: &str, messages: &[Message]) -> String {
    let mut primitives: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    for msg in messages {
        for signal in &msg.signals {
            if signal.choices.is_none() {
                primitives.insert(format!("e_{}", c_type_name(signal)));
            }
        }
    }
    let enums = choice_enum_names(database_name, messages);

    let size = primitives.len();
    let types_body = primitives
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if index == 0 {
                format!("\t{name} = -{size}")
            } else {
                format!("\t{name}")
            }
        })
        .collect::<Vec<String>>()
        .join(",\n");
    let enums_body = enums
        .iter()
        .map(|name| format!("\t{name}"))
        .collect::<Vec<String>>()
        .join(",\n");

    format!("enum {database_name}_types_id{{\n{types_body},\n\n{enums_body}\n}};\n")
}

/// One switch case filling `v` with name strings and bounds-checking
/// `fields_size` first.
fn fields_case(case_id: u32, count: usize, body: &str) -> String {
    format!("\tcase {case_id}:\n\t\tif({count} > fields_size) return 1;\n{body}\t\treturn 0;\n")
}

fn generate_string_fields_from_id(database_name: &str, messages: &[Message]) -> String {
    let mut cases = String::new();
    for msg in messages {
        if msg.signals.is_empty() {
            continue;
        }
        let mut body = String::new();
        for (index, signal) in msg.signals.iter().enumerate() {
            body.push_str(&format!(
                "\t\tsnprintf(v[{index}], string_size, {});\n",
                format!("{database_name}_{}_{}_string", msg.name, signal.name).to_lowercase()
            ));
        }
        cases.push_str(&fields_case(msg.frame_id, msg.signals.len(), &body));
    }
    format!(
        "int {database_name}_fields_string_from_id(int id, char **v, size_t fields_size, size_t string_size)\n\
         {{\n\tswitch(id)\n    {{\n{cases}    }}\n    return 0;\n}}\n"
    )
}

fn generate_enum_fields(database_name: &str, messages: &[Message]) -> String {
    let mut cases = String::new();
    let mut enum_id: u32 = 0;
    for msg in messages {
        for signal in &msg.signals {
            let Some(choices) = &signal.choices else {
                continue;
            };
            let mut body = String::new();
            for (index, choice) in choices.values().enumerate() {
                body.push_str(&format!(
                    "\t\tsnprintf(v[{index}], string_size, \"{database_name}_{}_{}_{choice}\");\n",
                    msg.name.to_lowercase(),
                    signal.name.to_lowercase()
                ));
            }
            cases.push_str(&fields_case(enum_id, choices.len(), &body));
            enum_id += 1;
        }
    }
    format!(
        "int {database_name}_enum_fields(int enum_id, char **v, size_t fields_size, size_t string_size)\n\
         {{\n    switch(enum_id)\n    {{\n{cases}    }}\n    return 0;\n}}\n"
    )
}

fn generate_serialize_from_id(database_name: &str, messages: &[Message]) -> String {
    let mut cases = String::new();
    for msg in messages {
        if msg.signals.is_empty() {
            continue;
        }
        let msg_name = format!("{database_name}_{}", msg.name.to_lowercase());
        let mut form = String::new();
        let mut args: Vec<String> = Vec::new();
        for signal in &msg.signals {
            form.push_str(specifier(&c_type_name(signal)));
            args.push(format!("\t\t\t&tmp.{}", signal.name.to_lowercase()));
        }
        cases.push_str(&format!(
            "\tcase {id}:\n\t{{\n\t\t{msg_name}_t tmp;\n\t\t{msg_name}_converted_t tmp_converted;\n\
             \t\tsscanf(s, \"{form}\",\n{args});\n\
             \t\t{msg_name}_conversion_to_raw_struct(&tmp, &tmp_converted);\n\
             \t\treturn {msg_name}_pack(data, &tmp, size);\n\t}}\n",
            id = msg.frame_id,
            args = args.join(",\n"),
        ));
    }
    format!(
        "int {database_name}_serialize_from_id(int id, char *s, uint8_t *data, size_t size)\n\
         {{\n    switch(id)\n    {{\n{cases}    }}\n    return 0;\n}}"
    )
}

/// Generates the introspection header and implementation pair.
pub fn generate_c_utils(database: &Database, database_name: &str) -> (String, String) {
    let messages = &database.messages;

    let mut header = format!(
        "#ifndef {0}_UTILS_C_H\n\n#define {0}_UTILS_C_H\n\n",
        database_name.to_uppercase()
    );
    header.push_str(&format!(
        "#include <cstddef>\n#include \"{database_name}_network.h\"\n\n"
    ));
    header.push_str(&generate_defines(database_name, messages));
    header.push_str(&generate_types_enum(database_name, messages));
    header.push_str(&format!(
        "int {database_name}_fields_string_from_id(int id, char **v, size_t fields_size, size_t string_size);\n"
    ));
    header.push_str(&format!(
        "int {database_name}_enum_fields(int enum_id, char **v, size_t fields_size, size_t string_size);\n"
    ));
    header.push_str(&format!(
        "int {database_name}_serialize_from_id(int id, char *s, uint8_t *data, size_t size);\n"
    ));
    header.push_str("\n\n#endif");

    let mut implementation = format!("#include \"{database_name}_utils_c.h\"\n\n\n");
    implementation.push_str(&generate_string_fields_from_id(database_name, messages));
    implementation.push_str(&generate_enum_fields(database_name, messages));
    implementation.push_str(&generate_serialize_from_id(database_name, messages));

    (header, implementation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::signal::Signal;
    use std::collections::BTreeMap;

    fn build_test_database() -> Database {
        let mut db = Database::default();
        let mut choices: BTreeMap<u64, String> = BTreeMap::new();
        choices.insert(0, "IDLE".into());
        choices.insert(1, "RUN".into());

        db.add_message(Message {
            frame_id: 1536,
            name: "cmd".into(),
            signals: vec![
                Signal {
                    name: "throttle".into(),
                    length: 16,
                    scale: 1.0,
                    maximum: 65535.0,
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
    fn test_header_defines_and_types() {
        let db = build_test_database();
        let (header, _) = generate_c_utils(&db, "drive_net");

        assert!(header.starts_with("#ifndef DRIVE_NET_UTILS_C_H"));
        assert!(header.contains("#define drive_net_cmd_string \"DRIVE_NET_CMD\"\n"));
        assert!(header.contains("#define drive_net_cmd_throttle_string \"DRIVE_NET_CMD_THROTTLE\"\n"));

        // One primitive type at a negative offset, then the choice enum.
        assert!(header.contains("enum drive_net_types_id{\n\te_uint16_t = -1,\n\n\te_drive_net_cmd_mode\n};"));
        assert!(header.contains("int drive_net_enum_fields("));
    }

    #[test]
    fn test_implementation_tables() {
        let db = build_test_database();
        let (_, implementation) = generate_c_utils(&db, "drive_net");

        // Field strings by frame id.
        assert!(implementation.contains("\tcase 1536:\n\t\tif(2 > fields_size) return 1;\n"));
        assert!(implementation
            .contains("snprintf(v[0], string_size, drive_net_cmd_throttle_string);"));

        // Choice names by enum id, 0-based in declaration order.
        assert!(implementation.contains("\tcase 0:\n\t\tif(2 > fields_size) return 1;\n\t\tsnprintf(v[0], string_size, \"drive_net_cmd_mode_IDLE\");"));

        // Serialize switch scans into the raw struct, then packs.
        assert!(implementation.contains("drive_net_cmd_t tmp;"));
        assert!(implementation.contains("return drive_net_cmd_pack(data, &tmp, size);"));
    }
}
