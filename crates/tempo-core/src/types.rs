//! Domain model shared by the resolver, the aggregator, and the wire client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a project or folder. Positive for real nodes.
pub type NodeId = i64;

/// Parent id of nodes sitting at the top of the forest.
pub const ROOT: NodeId = 0;

/// Sentinel parent id for nodes whose declared parent is not visible,
/// e.g. because the account has no access to it.
pub const DISCONNECTED: NodeId = -1;

/// Whether a node is a project (holds records) or a folder (holds nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Project,
    Folder,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Folder => "Folder",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project or folder in the two-level containment forest.
///
/// Names are not unique; only ids are. `parent_id` is [`ROOT`] for top-level
/// nodes and otherwise points at a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub parent_id: NodeId,
    pub kind: NodeKind,
    pub privileges: i64,
    pub time_created: i64,
    pub creator: i64,
}

impl Node {
    /// Builds a node with only the fields that matter for resolution and
    /// aggregation filled in.
    #[must_use]
    pub fn bare(id: NodeId, name: &str, parent_id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: String::new(),
            color: String::new(),
            parent_id,
            kind,
            privileges: 0,
            time_created: 0,
            creator: 0,
        }
    }
}

/// Type-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordKind {
    Work,
    Phonecall { phone_number: String, outgoing: bool },
}

/// A time-stamped activity record attached to a project.
///
/// Timestamps are seconds since the Unix epoch, second precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub project: NodeId,
    pub start_time: i64,
    pub end_time: i64,
    pub comment: String,
    pub is_running: bool,
    #[serde(flatten)]
    pub kind: RecordKind,
    pub time_created: i64,
    pub time_updated: i64,
    pub creator: i64,
    pub flags: i64,
}

impl Record {
    /// Wire type id of work records.
    pub const WORK_TYPE_ID: i64 = 1;
    /// Wire type id of phonecall records.
    pub const PHONECALL_TYPE_ID: i64 = 3;

    #[must_use]
    pub const fn type_id(&self) -> i64 {
        match self.kind {
            RecordKind::Work => Self::WORK_TYPE_ID,
            RecordKind::Phonecall { .. } => Self::PHONECALL_TYPE_ID,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind {
            RecordKind::Work => "work",
            RecordKind::Phonecall { .. } => "phonecall",
        }
    }

    /// Recorded duration in seconds. Negative when the record ends before it
    /// starts; callers decide whether that is meaningful.
    #[must_use]
    pub const fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// A record variable as described by the service metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableType {
    pub id: i64,
    pub name: String,
    pub val_type: i64,
}

/// A record type known to the service, e.g. "work" or "phonecall".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    pub id: i64,
    pub name: String,
    pub variables: Vec<VariableType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_record() -> Record {
        Record {
            id: 7,
            project: 42,
            start_time: 1_000,
            end_time: 1_600,
            comment: "standup".to_string(),
            is_running: false,
            kind: RecordKind::Work,
            time_created: 0,
            time_updated: 0,
            creator: 1,
            flags: 0,
        }
    }

    #[test]
    fn record_type_ids_match_wire_values() {
        let mut record = work_record();
        assert_eq!(record.type_id(), 1);
        assert_eq!(record.type_name(), "work");

        record.kind = RecordKind::Phonecall {
            phone_number: "555-0100".to_string(),
            outgoing: true,
        };
        assert_eq!(record.type_id(), 3);
        assert_eq!(record.type_name(), "phonecall");
    }

    #[test]
    fn record_duration_is_signed() {
        let mut record = work_record();
        assert_eq!(record.duration(), 600);

        record.end_time = 500;
        assert_eq!(record.duration(), -500);
    }

    #[test]
    fn node_kind_display() {
        assert_eq!(NodeKind::Project.to_string(), "Project");
        assert_eq!(NodeKind::Folder.to_string(), "Folder");
    }

    #[test]
    fn record_serde_tags_the_kind() {
        let record = work_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "work");
        assert_eq!(json["project"], 42);

        let parsed: Record = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn phonecall_serde_flattens_call_fields() {
        let mut record = work_record();
        record.kind = RecordKind::Phonecall {
            phone_number: "555-0100".to_string(),
            outgoing: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "phonecall");
        assert_eq!(json["phone_number"], "555-0100");
        assert_eq!(json["outgoing"], false);
    }
}
