//! Delete commands for records, projects, and folders.

use std::io::Write;

use anyhow::{Result, bail};

use tempo_api::RecordQuery;
use tempo_core::NodeKind;

use crate::output::{self, OutputOptions};
use crate::session::Session;

/// Deletes a record. `required_type` makes the command fetch the record
/// first and verify its type; `None` deletes blind by id.
pub fn record<W: Write>(
    writer: &mut W,
    session: &Session,
    id: i64,
    required_type: Option<&'static str>,
    options: &OutputOptions,
) -> Result<()> {
    if let Some(required) = required_type {
        let query = RecordQuery {
            ids: Some(id.to_string()),
            ..RecordQuery::default()
        };
        let records = session.run(session.client().records(&query))?;
        if records.len() != 1 {
            bail!("invalid record id: {id}");
        }
        if records[0].type_name() != required {
            bail!(
                "record is of type '{}', not of requested type '{required}'",
                records[0].type_name()
            );
        }
    }

    session.run(session.client().delete_record(id))?;
    output::print_ok(writer, options)?;
    Ok(())
}

/// Deletes a project or folder, resolving a name to its id first.
pub fn node<W: Write>(
    writer: &mut W,
    session: &mut Session,
    kind: NodeKind,
    id: &str,
    options: &OutputOptions,
) -> Result<()> {
    let id = match kind {
        NodeKind::Project => session.catalog.resolve_project(Some(id))?,
        NodeKind::Folder => session.catalog.resolve_folder(Some(id))?,
    };
    session.run(session.client().delete_node(kind, id))?;
    output::print_ok(writer, options)?;
    Ok(())
}
