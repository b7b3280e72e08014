//! Change commands for records, projects, and folders.
//!
//! Change is fetch-modify-write: the current object is read back, the
//! supplied flags overwrite individual fields, and the whole object is sent
//! again. Absent flags leave fields untouched.

use std::io::Write;

use anyhow::{Result, bail};

use tempo_api::{NodeDraft, RecordDraft, RecordQuery};
use tempo_core::{NodeKind, RecordKind, timeexpr};

use crate::cli::{ChangeNodeArgs, ChangeRecordArgs};
use crate::output::{self, OutputOptions};
use crate::session::Session;

/// Changes a record. `required_type` restricts which record type the id may
/// name ("work"/"phonecall"); `None` accepts any.
pub fn record<W: Write>(
    writer: &mut W,
    session: &mut Session,
    args: &ChangeRecordArgs,
    required_type: Option<&'static str>,
    options: &OutputOptions,
) -> Result<()> {
    let query = RecordQuery {
        ids: Some(args.id.to_string()),
        ..RecordQuery::default()
    };
    let records = session.run(session.client().records(&query))?;
    if records.len() != 1 {
        bail!("invalid record id: {}", args.id);
    }
    let existing = &records[0];
    if let Some(required) = required_type {
        if existing.type_name() != required {
            bail!(
                "record is of type '{}', not of requested type '{required}'",
                existing.type_name()
            );
        }
    }

    let mut draft = RecordDraft::from(existing);
    if let Some(project) = args.data.project.as_deref() {
        draft.project = session.catalog.resolve_project(Some(project))?;
    }
    if let Some(from) = &args.data.from {
        draft.start_time = timeexpr::resolve_local(from)?;
    }
    if let Some(to) = &args.data.to {
        draft.end_time = timeexpr::resolve_local(to)?;
    }
    if let Some(comment) = &args.data.comment {
        draft.comment = comment.clone();
    }
    if let Some(running) = args.data.running_state() {
        draft.is_running = running;
    }
    if let RecordKind::Phonecall {
        phone_number,
        outgoing,
    } = &mut draft.kind
    {
        if let Some(number) = &args.call.phone_number {
            *phone_number = number.clone();
        }
        if let Some(direction) = args.call.outgoing_state() {
            *outgoing = direction;
        }
    }

    let changed = session.run(session.client().change_record(args.id, &draft))?;
    let names = session.project_names(options)?;
    output::print_records(writer, std::slice::from_ref(&changed), options, &names)?;
    Ok(())
}

/// Changes a project or folder.
pub fn node<W: Write>(
    writer: &mut W,
    session: &mut Session,
    kind: NodeKind,
    args: &ChangeNodeArgs,
    options: &OutputOptions,
) -> Result<()> {
    let id = match kind {
        NodeKind::Project => session.catalog.resolve_project(Some(args.id.as_str()))?,
        NodeKind::Folder => session.catalog.resolve_folder(Some(args.id.as_str()))?,
    };
    let existing = match kind {
        NodeKind::Project => session.catalog.projects()?.iter().find(|n| n.id == id),
        NodeKind::Folder => session.catalog.folders()?.iter().find(|n| n.id == id),
    };
    let Some(existing) = existing else {
        let noun = match kind {
            NodeKind::Project => "project",
            NodeKind::Folder => "folder",
        };
        bail!("invalid {noun} id: {id}");
    };

    let mut draft = NodeDraft::from(existing);
    if let Some(name) = &args.data.name {
        draft.name = name.clone();
    }
    if let Some(description) = &args.data.description {
        draft.description = description.clone();
    }
    if let Some(color) = &args.data.color {
        draft.color = color.clone();
    }
    if let Some(parent) = args.data.parent.as_deref() {
        draft.parent_id = session.catalog.resolve_folder(Some(parent))?;
    }

    let changed = session.run(session.client().change_node(kind, id, &draft))?;
    let names = session.folder_names(options)?;
    output::print_nodes(writer, std::slice::from_ref(&changed), options, &names)?;
    Ok(())
}
