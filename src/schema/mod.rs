//! # schema
//!
//! `schema` is the module to work with network schema documents: the JSON
//! model, the signal layout resolver, the frame ID allocator and the
//! database assembly.

pub mod idalloc;
pub mod layout;
pub mod model;
pub(crate) mod assemble;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::schema::assemble::assemble;
use crate::schema::idalloc::IdConfig;
use crate::schema::model::NetworkSchema;
use crate::types::database::Database;
use crate::types::errors::{GenerateError, SchemaError};

pub use crate::schema::assemble::fixed_ids;

/// Parses a schema document and returns the assembled [`Database`].
///
/// The whole transformation is a single synchronous pass: parse, validate,
/// allocate frame IDs (skipping everything in `reserved` and the schema's
/// own fixed IDs), resolve every signal layout, assemble.
///
/// # Parameters
/// - `text`: the JSON schema document.
/// - `config`: frame ID bit layout, e.g. [`IdConfig::WIDE`].
/// - `reserved`: frame IDs already taken by sibling databases.
///
/// # Errors
/// Any schema inconsistency, layout overflow or ID capacity exhaustion
/// aborts the run with a [`GenerateError`] naming the offending entity.
pub fn parse_from_str(
    text: &str,
    config: IdConfig,
    reserved: &HashSet<u32>,
) -> Result<Database, GenerateError> {
    let schema: NetworkSchema = serde_json::from_str(text).map_err(SchemaError::Json)?;
    assemble(&schema, config, reserved)
}

/// Reads a `.json` schema file and returns the assembled [`Database`].
///
/// When the schema declares no `name`, the file stem is used as the
/// database name.
///
/// # Example
/// ```no_run
/// use std::collections::HashSet;
/// use can_netgen::schema;
/// use can_netgen::IdConfig;
///
/// let db = schema::parse_from_file("network.json", IdConfig::WIDE, &HashSet::new())
///     .expect("Failed to load schema");
/// println!("Loaded {} messages", db.messages.len());
/// ```
pub fn parse_from_file(
    path: &str,
    config: IdConfig,
    reserved: &HashSet<u32>,
) -> Result<Database, GenerateError> {
    if !path.to_ascii_lowercase().ends_with(".json") {
        return Err(SchemaError::InvalidExtension {
            path: path.to_string(),
        }
        .into());
    }

    let file: File = File::open(path).map_err(|source| SchemaError::OpenFile {
        path: path.to_string(),
        source,
    })?;
    let mut reader: BufReader<File> = BufReader::new(file);
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| SchemaError::Read {
            path: path.to_string(),
            source,
        })?;

    let mut db = parse_from_str(&text, config, reserved)?;
    if db.name.is_empty() {
        db.name = Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(db)
}

/// Loads every `.json` schema in a folder of subsystems, in sorted file
/// order.
///
/// Each database's frame IDs are threaded into the next one's reserved set,
/// so the composed networks never collide.
pub fn parse_from_dir(dir: &str, config: IdConfig) -> Result<Vec<Database>, GenerateError> {
    let entries = fs::read_dir(dir).map_err(|source| SchemaError::OpenFile {
        path: dir.to_string(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    paths.sort();

    let mut reserved: HashSet<u32> = HashSet::new();
    let mut databases: Vec<Database> = Vec::with_capacity(paths.len());
    for path in paths {
        let db = parse_from_file(&path.to_string_lossy(), config, &reserved)?;
        reserved.extend(db.frame_ids());
        databases.push(db);
    }
    Ok(databases)
}
