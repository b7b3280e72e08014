//! Add commands for records, projects, and folders.

use std::io::Write;

use anyhow::Result;

use tempo_api::{NodeDraft, RecordDraft};
use tempo_core::{NodeKind, RecordKind};

use crate::cli::{NodeDataArgs, PhonecallArgs, RecordDataArgs};
use crate::output::{self, OutputOptions};
use crate::session::Session;

/// Adds a work or phonecall record. Absent start/end times mean "now".
pub fn record<W: Write>(
    writer: &mut W,
    session: &mut Session,
    data: &RecordDataArgs,
    call: Option<&PhonecallArgs>,
    options: &OutputOptions,
) -> Result<()> {
    let project = session.catalog.resolve_project(data.project.as_deref())?;
    let start_time = session.record_time(data.from.as_deref())?;
    let end_time = session.record_time(data.to.as_deref())?;

    let kind = match call {
        None => RecordKind::Work,
        Some(call) => RecordKind::Phonecall {
            phone_number: call.phone_number.clone().unwrap_or_default(),
            outgoing: call.outgoing_state().unwrap_or(false),
        },
    };
    let draft = RecordDraft {
        project,
        start_time,
        end_time,
        comment: data.comment.clone().unwrap_or_default(),
        is_running: data.running_state().unwrap_or(false),
        kind,
    };

    let record = session.run(session.client().add_record(&draft))?;
    tracing::debug!(id = record.id, "record added");

    let names = session.project_names(options)?;
    output::print_records(writer, std::slice::from_ref(&record), options, &names)?;
    Ok(())
}

/// Adds a project or folder.
pub fn node<W: Write>(
    writer: &mut W,
    session: &mut Session,
    kind: NodeKind,
    data: &NodeDataArgs,
    options: &OutputOptions,
) -> Result<()> {
    let parent_id = session.catalog.resolve_folder(data.parent.as_deref())?;
    let draft = NodeDraft {
        name: data.name.clone().unwrap_or_default(),
        description: data.description.clone().unwrap_or_default(),
        color: data.color.clone().unwrap_or_else(|| "blue".to_string()),
        parent_id,
    };

    let node = session.run(session.client().add_node(kind, &draft))?;
    tracing::debug!(id = node.id, %kind, "node added");

    let names = session.folder_names(options)?;
    output::print_nodes(writer, std::slice::from_ref(&node), options, &names)?;
    Ok(())
}
