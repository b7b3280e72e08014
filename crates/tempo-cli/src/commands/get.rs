//! Get commands: fetch and print raw collections.

use std::io::Write;

use anyhow::Result;

use tempo_core::NodeKind;

use crate::cli::QueryArgs;
use crate::output::{self, OutputOptions};
use crate::session::Session;

pub fn records<W: Write>(
    writer: &mut W,
    session: &mut Session,
    query_args: &QueryArgs,
    ids: Option<&str>,
    json: bool,
    options: &OutputOptions,
) -> Result<()> {
    let mut query = session.record_query(query_args)?;
    query.ids = ids.map(str::to_string);

    let records = session.run(session.client().records(&query))?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&records)?)?;
        return Ok(());
    }
    let names = session.project_names(options)?;
    output::print_records(writer, &records, options, &names)?;
    Ok(())
}

pub fn nodes<W: Write>(
    writer: &mut W,
    session: &mut Session,
    kind: NodeKind,
    json: bool,
    options: &OutputOptions,
) -> Result<()> {
    let nodes = match kind {
        NodeKind::Project => session.catalog.projects()?.to_vec(),
        NodeKind::Folder => session.catalog.folders()?.to_vec(),
    };
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&nodes)?)?;
        return Ok(());
    }
    let names = session.folder_names(options)?;
    output::print_nodes(writer, &nodes, options, &names)?;
    Ok(())
}
