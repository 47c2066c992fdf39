//! # can_netgen
//!
//! Rust core for generating **CAN network** artifacts from a declarative
//! JSON schema.
//!
//! ## Highlights
//! - **Schema loader**: parse a network schema into an immutable [`Database`]
//!   of [`Message`]s and [`Signal`]s.
//! - **Signal layout**: bit widths, signedness, float/fixed classification,
//!   scales and start bits resolved from range/precision, forced types,
//!   enums and bitsets.
//! - **Deterministic IDs**: collision-free frame IDs packed from
//!   priority/topic, honoring externally reserved IDs ([`IdConfig`],
//!   [`IdAllocator`]).
//! - **Emitters**: Protocol-Buffer schema, watchdog interval header and C
//!   introspection tables derived from the assembled database.
//! - **Batch mode**: `schema::parse_from_dir` composes a folder of subsystem
//!   schemas without ID collisions.
//!

pub mod emit;
pub mod schema;
#[doc(hidden)]
pub mod types;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::schema::{
    idalloc::{AllocatedIds, IdAllocator, IdConfig},
    parse_from_dir, parse_from_file, parse_from_str,
};

#[doc(inline)]
pub use crate::types::{
    database::{Database, MessageId, NodeId},
    errors::{AllocError, GenerateError, LayoutError, SchemaError},
    message::Message,
    node::Node,
    signal::{ByteOrder, Signal},
};

#[cfg(feature = "c-utils")]
pub use crate::emit::c_utils::generate_c_utils;
#[cfg(feature = "proto")]
pub use crate::emit::proto::generate_proto;
#[cfg(feature = "watchdog")]
pub use crate::emit::watchdog::generate_watchdog;
