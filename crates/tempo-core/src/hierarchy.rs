//! Name-path resolution over the project/folder forest.
//!
//! Paths look like `[/]name0/name1/...`. Every segment except the last must
//! name a folder; the last matches whatever kinds the caller allows. A
//! leading slash anchors the first segment at the forest root. Resolution
//! succeeds only when exactly one live node matches a segment under the
//! current parent constraint.

use std::fmt;

use thiserror::Error;

use crate::types::{Node, NodeId, NodeKind, RecordType, ROOT};

/// Which node kinds a path segment may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Project,
    Folder,
    Either,
}

impl KindFilter {
    const fn allows(self, kind: NodeKind) -> bool {
        match self {
            Self::Project => matches!(kind, NodeKind::Project),
            Self::Folder => matches!(kind, NodeKind::Folder),
            Self::Either => true,
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Folder => "folder",
            Self::Either => "project/folder",
        }
    }
}

/// Opaque failure from the backing node repository.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SourceError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl SourceError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(err.into())
    }
}

/// Errors from path and record-type resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A path segment matched two or more nodes.
    #[error("name \"{name}\"{} does not uniquely identify a {wanted}", parent_suffix(.parent))]
    Ambiguous {
        name: String,
        parent: Option<String>,
        wanted: &'static str,
    },

    /// A path segment matched nothing.
    #[error("name \"{name}\"{} does not identify a {wanted}", parent_suffix(.parent))]
    NotFound {
        name: String,
        parent: Option<String>,
        wanted: &'static str,
    },

    /// A record-type name matched nothing.
    #[error("no record type named \"{0}\"")]
    UnknownRecordType(String),

    /// A project argument was required but absent.
    #[error("no project specified")]
    MissingProject,

    /// The node repository itself failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

fn parent_suffix(parent: &Option<String>) -> String {
    parent
        .as_ref()
        .map_or_else(String::new, |p| format!(" with parent folder \"{p}\""))
}

/// Repository collaborator the catalog pulls from, at most once per kind.
///
/// Implementations return nodes in the order the repository yields them;
/// that order is preserved for callers that present unsorted output.
pub trait NodeSource {
    fn load_projects(&mut self) -> Result<Vec<Node>, SourceError>;
    fn load_folders(&mut self) -> Result<Vec<Node>, SourceError>;
    fn load_record_types(&mut self) -> Result<Vec<RecordType>, SourceError>;
}

/// Command-scoped, fill-once cache over a [`NodeSource`].
///
/// The first access to each collection fetches it; later accesses within the
/// same command reuse the stored value. There is no invalidation.
pub struct Catalog<S> {
    source: S,
    projects: Option<Vec<Node>>,
    folders: Option<Vec<Node>>,
    record_types: Option<Vec<RecordType>>,
}

impl<S> fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("projects", &self.projects.as_ref().map(Vec::len))
            .field("folders", &self.folders.as_ref().map(Vec::len))
            .field("record_types", &self.record_types.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl<S: NodeSource> Catalog<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            projects: None,
            folders: None,
            record_types: None,
        }
    }

    /// All projects visible to the account.
    pub fn projects(&mut self) -> Result<&[Node], SourceError> {
        if self.projects.is_none() {
            let loaded = self.source.load_projects()?;
            tracing::debug!(count = loaded.len(), "fetched projects");
            self.projects = Some(loaded);
        }
        Ok(self.projects.as_deref().unwrap_or_default())
    }

    /// All folders visible to the account.
    pub fn folders(&mut self) -> Result<&[Node], SourceError> {
        if self.folders.is_none() {
            let loaded = self.source.load_folders()?;
            tracing::debug!(count = loaded.len(), "fetched folders");
            self.folders = Some(loaded);
        }
        Ok(self.folders.as_deref().unwrap_or_default())
    }

    /// Record types known to the service.
    pub fn record_types(&mut self) -> Result<&[RecordType], SourceError> {
        if self.record_types.is_none() {
            let loaded = self.source.load_record_types()?;
            tracing::debug!(count = loaded.len(), "fetched record types");
            self.record_types = Some(loaded);
        }
        Ok(self.record_types.as_deref().unwrap_or_default())
    }

    /// Display name for a folder id. Root renders as the empty string.
    pub fn folder_name(&mut self, id: NodeId) -> Result<String, SourceError> {
        if id == ROOT {
            return Ok(String::new());
        }
        Ok(self
            .folders()?
            .iter()
            .find(|n| n.id == id)
            .map_or_else(|| format!("unknown: {id}"), |n| n.name.clone()))
    }

    /// Resolves a slash-delimited name path to a single node id.
    ///
    /// `parent` of `None` means "any parent". Every segment followed by more
    /// path is forced to match folders regardless of `filter`.
    pub fn resolve_path(
        &mut self,
        path: &str,
        filter: KindFilter,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ResolveError> {
        let mut parent = parent;
        let mut rest = path;
        loop {
            if let Some(stripped) = rest.strip_prefix('/') {
                parent = Some(ROOT);
                rest = stripped;
            }
            let (segment, tail) = match rest.split_once('/') {
                Some((segment, tail)) => (segment, Some(tail)),
                None => (rest, None),
            };
            // Anything with children below it has to be a folder.
            let segment_filter = if tail.is_some() {
                KindFilter::Folder
            } else {
                filter
            };

            let id = self.resolve_segment(segment, segment_filter, parent)?;
            match tail {
                Some(tail) => {
                    parent = Some(id);
                    rest = tail;
                }
                None => return Ok(id),
            }
        }
    }

    fn resolve_segment(
        &mut self,
        name: &str,
        filter: KindFilter,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ResolveError> {
        let mut matches: Vec<NodeId> = Vec::new();
        if filter.allows(NodeKind::Project) {
            collect_matches(self.projects()?, name, parent, &mut matches);
        }
        if filter.allows(NodeKind::Folder) {
            collect_matches(self.folders()?, name, parent, &mut matches);
        }

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(ResolveError::NotFound {
                name: name.to_string(),
                parent: self.error_scope(parent)?,
                wanted: filter.noun(),
            }),
            _ => Err(ResolveError::Ambiguous {
                name: name.to_string(),
                parent: self.error_scope(parent)?,
                wanted: filter.noun(),
            }),
        }
    }

    /// Parent folder name for error messages; omitted for root or unknown.
    fn error_scope(&mut self, parent: Option<NodeId>) -> Result<Option<String>, SourceError> {
        match parent {
            Some(id) if id != ROOT => Ok(Some(self.folder_name(id)?)),
            _ => Ok(None),
        }
    }

    /// Resolves a project argument: a numeric id passes through, anything
    /// else is looked up as a project name path.
    pub fn resolve_project(&mut self, text: Option<&str>) -> Result<NodeId, ResolveError> {
        let Some(text) = text else {
            return Err(ResolveError::MissingProject);
        };
        match numeric_id(text) {
            Some(id) => Ok(id),
            None => self.resolve_path(text, KindFilter::Project, None),
        }
    }

    /// Resolves a folder argument; `"0"` and absence both mean the root.
    pub fn resolve_folder(&mut self, text: Option<&str>) -> Result<NodeId, ResolveError> {
        let Some(text) = text else { return Ok(ROOT) };
        if text == "0" {
            return Ok(ROOT);
        }
        match numeric_id(text) {
            Some(id) => Ok(id),
            None => self.resolve_path(text, KindFilter::Folder, None),
        }
    }

    /// Resolves a comma-separated list of parent ids or names into a
    /// comma-joined id list. Names match projects and folders alike.
    pub fn resolve_parent_list(&mut self, text: &str) -> Result<String, ResolveError> {
        let mut ids = Vec::new();
        for entry in text.split(',') {
            match numeric_id(entry) {
                Some(id) => ids.push(id.to_string()),
                None => ids.push(
                    self.resolve_path(entry, KindFilter::Either, None)?
                        .to_string(),
                ),
            }
        }
        Ok(ids.join(","))
    }

    /// Resolves a comma-separated list of record-type ids or names into a
    /// comma-joined id list. Names are matched case-insensitively.
    pub fn resolve_type_list(&mut self, text: &str) -> Result<String, ResolveError> {
        let mut ids = Vec::new();
        for entry in text.split(',') {
            if let Some(id) = numeric_id(entry) {
                ids.push(id.to_string());
                continue;
            }
            let found = self
                .record_types()?
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(entry))
                .map(|t| t.id);
            match found {
                Some(id) => ids.push(id.to_string()),
                None => return Err(ResolveError::UnknownRecordType(entry.to_string())),
            }
        }
        Ok(ids.join(","))
    }
}

fn collect_matches(nodes: &[Node], name: &str, parent: Option<NodeId>, out: &mut Vec<NodeId>) {
    for node in nodes {
        if node.name == name && parent.is_none_or(|pid| node.parent_id == pid) {
            out.push(node.id);
        }
    }
}

fn numeric_id(text: &str) -> Option<NodeId> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
