//! Watchdog interval header emitter.
//!
//! Emits one `#define {DB}_INTERVAL_{MSG}` per cyclic message plus a
//! `watchdog_interval_from_id` switch so the runtime can look the period up
//! by frame ID. One-shot messages (no `cycle_time`) are left out entirely.

use crate::types::database::Database;
use crate::types::message::Message;

fn interval_name(database_name: &str, message_name: &str) -> String {
    format!(
        "{}_INTERVAL_{}",
        database_name.to_uppercase(),
        message_name.to_uppercase()
    )
}

fn generate_intervals(database_name: &str, messages: &[Message]) -> String {
    let mut out = String::new();
    for msg in messages {
        if let Some(cycle_time) = msg.cycle_time {
            out.push_str(&format!(
                "#define {} {}\n",
                interval_name(database_name, &msg.name),
                cycle_time
            ));
        }
    }
    out
}

fn generate_intervals_from_id(database_name: &str, messages: &[Message]) -> String {
    let mut cases = String::new();
    for msg in messages {
        if msg.cycle_time.is_some() {
            cases.push_str(&format!(
                "       case {}: return {};\n",
                msg.frame_id,
                interval_name(database_name, &msg.name)
            ));
        }
    }
    format!(
        "\nstatic int {database_name}_watchdog_interval_from_id(uint16_t message_id) {{\n    \
         switch (message_id) {{\n{cases}    }}\n    return -1;\n}}"
    )
}

/// Generates the watchdog header for the whole database.
pub fn generate_watchdog(database: &Database, database_name: &str) -> String {
    let guard = format!("{}_WATCHDOG_H", database_name.to_uppercase());
    let body = generate_intervals(database_name, &database.messages)
        + &generate_intervals_from_id(database_name, &database.messages);
    format!(
        "#ifndef {guard}\n#define {guard}\n\n#ifdef __cplusplus\nextern \"C\" {{\n#endif\n\n\
         {body}\n\n\n#ifdef __cplusplus\n}}\n#endif\n\n#endif // {guard}\n"
    )
}
