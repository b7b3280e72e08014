//! XML-over-HTTP client for the remote time-tracking service.
//!
//! One request per operation, no retries. Requests are form-encoded POSTs
//! carrying an XML payload; responses are XML with a numeric status
//! attribute. Report downloads are a second, plain GET.

pub mod wire;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use tempo_core::{Node, NodeId, NodeKind, Record, RecordKind, RecordType};
use wire::{RequestBuilder, WireError};

const API_PATH: &str = "/1.0/";
const DOWNLOAD_PATH: &str = "/file.php";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Result status reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Unknown,
    AccessDenied,
    NotLoggedIn,
    LoginFailure,
    InvalidInput,
    SubscriptionRequired,
    DataFormatError,
    NoRequest,
    InvalidRequest,
    MissingFields,
    RequestTooLarge,
    ServerMaintenance,
    DuplicateItem,
    InsufficientPrivileges,
    UnknownRecordType,
    UnknownProject,
    UnknownFolder,
    UnknownRecord,
    ParentIsSelf,
    VariableTypeMismatch,
    UnknownSetting,
    InvalidSettingValue,
    PasswordFormatInvalid,
    UnknownReportFormat,
    UnknownGroupBy,
    /// A code this client does not know about.
    Other(i64),
}

impl Status {
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::Unknown,
            3 => Self::AccessDenied,
            4 => Self::NotLoggedIn,
            5 => Self::LoginFailure,
            6 => Self::InvalidInput,
            7 => Self::SubscriptionRequired,
            8 => Self::DataFormatError,
            9 => Self::NoRequest,
            10 => Self::InvalidRequest,
            11 => Self::MissingFields,
            12 => Self::RequestTooLarge,
            13 => Self::ServerMaintenance,
            100 => Self::DuplicateItem,
            101 => Self::InsufficientPrivileges,
            200 => Self::UnknownRecordType,
            201 => Self::UnknownProject,
            202 => Self::UnknownFolder,
            203 => Self::UnknownRecord,
            204 => Self::ParentIsSelf,
            205 => Self::VariableTypeMismatch,
            300 => Self::UnknownSetting,
            301 => Self::InvalidSettingValue,
            800 => Self::PasswordFormatInvalid,
            801 => Self::UnknownReportFormat,
            802 => Self::UnknownGroupBy,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::Unknown => 1,
            Self::AccessDenied => 3,
            Self::NotLoggedIn => 4,
            Self::LoginFailure => 5,
            Self::InvalidInput => 6,
            Self::SubscriptionRequired => 7,
            Self::DataFormatError => 8,
            Self::NoRequest => 9,
            Self::InvalidRequest => 10,
            Self::MissingFields => 11,
            Self::RequestTooLarge => 12,
            Self::ServerMaintenance => 13,
            Self::DuplicateItem => 100,
            Self::InsufficientPrivileges => 101,
            Self::UnknownRecordType => 200,
            Self::UnknownProject => 201,
            Self::UnknownFolder => 202,
            Self::UnknownRecord => 203,
            Self::ParentIsSelf => 204,
            Self::VariableTypeMismatch => 205,
            Self::UnknownSetting => 300,
            Self::InvalidSettingValue => 301,
            Self::PasswordFormatInvalid => 800,
            Self::UnknownReportFormat => 801,
            Self::UnknownGroupBy => 802,
            Self::Other(code) => code,
        }
    }

    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unknown => "unknown error",
            Self::AccessDenied => "access denied",
            Self::NotLoggedIn => "not logged in",
            Self::LoginFailure => "login failure",
            Self::InvalidInput => "invalid input",
            Self::SubscriptionRequired => "subscription required",
            Self::DataFormatError => "data format error",
            Self::NoRequest => "no request",
            Self::InvalidRequest => "invalid request",
            Self::MissingFields => "missing fields",
            Self::RequestTooLarge => "request too large",
            Self::ServerMaintenance => "server maintenance",
            Self::DuplicateItem => "duplicate item",
            Self::InsufficientPrivileges => "insufficient privileges",
            Self::UnknownRecordType => "unknown record type",
            Self::UnknownProject => "unknown project",
            Self::UnknownFolder => "unknown folder",
            Self::UnknownRecord => "unknown record",
            Self::ParentIsSelf => "parent is self",
            Self::VariableTypeMismatch => "variable type mismatch",
            Self::UnknownSetting => "unknown setting",
            Self::InvalidSettingValue => "invalid setting value",
            Self::PasswordFormatInvalid => "password format invalid",
            Self::UnknownReportFormat => "unknown report format",
            Self::UnknownGroupBy => "unknown group-by value",
            Self::Other(_) => "unrecognized status",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.describe(), self.code())
    }
}

/// Client errors. None of these are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The HTTP exchange itself failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {0}")]
    Status(Status),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Wire(#[from] WireError),

    /// An operation requiring credentials was called before login.
    #[error("not logged in; log in or supply a hash first")]
    NotLoggedIn,

    /// The service acknowledged the request but returned no objects.
    #[error("service returned no objects")]
    EmptyResponse,
}

/// A logged-in identity: username plus the hash from `auth.login`.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub hash: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

/// Filters for record queries. Id lists are comma-joined strings, already
/// resolved from names by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub time_from: Option<i64>,
    pub time_to: Option<i64>,
    pub type_ids: Option<String>,
    pub parent_ids: Option<String>,
    pub ids: Option<String>,
}

/// Report generation options on top of a record query.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub records: RecordQuery,
    pub group_by: Option<String>,
    pub constraints: Option<String>,
}

/// Output format of a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Html,
    Xls,
    Csv,
}

impl ReportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Xls => "xls",
            Self::Csv => "csv",
        }
    }
}

/// Client-side fields of a record, for add and change calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub project: NodeId,
    pub start_time: i64,
    pub end_time: i64,
    pub comment: String,
    pub is_running: bool,
    pub kind: RecordKind,
}

impl RecordDraft {
    #[must_use]
    pub const fn type_id(&self) -> i64 {
        match self.kind {
            RecordKind::Work => Record::WORK_TYPE_ID,
            RecordKind::Phonecall { .. } => Record::PHONECALL_TYPE_ID,
        }
    }
}

impl From<&Record> for RecordDraft {
    fn from(record: &Record) -> Self {
        Self {
            project: record.project,
            start_time: record.start_time,
            end_time: record.end_time,
            comment: record.comment.clone(),
            is_running: record.is_running,
            kind: record.kind.clone(),
        }
    }
}

/// Client-side fields of a project or folder, for add and change calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub parent_id: NodeId,
}

impl From<&Node> for NodeDraft {
    fn from(node: &Node) -> Self {
        Self {
            name: node.name.clone(),
            description: node.description.clone(),
            color: node.color.clone(),
            parent_id: node.parent_id,
        }
    }
}

/// Service client. Cloning shares the HTTP connection pool and the
/// credentials captured at clone time.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    host: String,
    https: bool,
    credentials: Option<Credentials>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("https", &self.https)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the given host.
    pub fn new(host: impl Into<String>, https: bool) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            http,
            host: host.into(),
            https,
            credentials: None,
        })
    }

    /// Installs credentials from an earlier login.
    pub fn set_credentials(&mut self, user: impl Into<String>, hash: impl Into<String>) {
        self.credentials = Some(Credentials {
            user: user.into(),
            hash: hash.into(),
        });
    }

    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{scheme}://{}", self.host)
    }

    fn auth(&self) -> Result<&Credentials, ApiError> {
        self.credentials.as_ref().ok_or(ApiError::NotLoggedIn)
    }

    async fn send(&self, op: &str, request: String) -> Result<wire::Element, ApiError> {
        let url = format!("{}{API_PATH}", self.base_url());
        tracing::debug!(op, %url, "sending request");
        let response = self
            .http
            .post(url)
            .form(&[("request", request.as_str())])
            .send()
            .await?;
        let body = response.text().await?;
        let doc = wire::parse_document(&body)?;
        let status = Status::from_code(wire::status_code(&doc)?);
        if status == Status::Success {
            Ok(doc)
        } else {
            tracing::debug!(op, %status, "request rejected");
            Err(ApiError::Status(status))
        }
    }

    /// Logs in and stores the returned hash for subsequent calls.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<String, ApiError> {
        let request = RequestBuilder::new("auth.login")
            .field_cdata("user", user)
            .field_cdata("password", password)
            .finish();
        let doc = self.send("auth.login", request).await?;
        let hash = doc.text_of("hash")?.to_string();
        self.set_credentials(user, hash.clone());
        Ok(hash)
    }

    /// Account information as name/value pairs, in response order.
    pub async fn user_info(&self) -> Result<Vec<(String, String)>, ApiError> {
        let doc = self
            .send("user.getInfo", self.authed("user.getInfo")?.finish())
            .await?;
        Ok(wire::fields_of(&doc))
    }

    /// User settings as name/value pairs, in response order.
    pub async fn user_settings(&self) -> Result<Vec<(String, String)>, ApiError> {
        let doc = self
            .send("user.getSettings", self.authed("user.getSettings")?.finish())
            .await?;
        let keys = doc.child("keys").ok_or(WireError::MissingField("keys"))?;
        let values = doc
            .child("values")
            .ok_or(WireError::MissingField("values"))?;
        Ok(keys
            .children_named("v")
            .zip(values.children_named("v"))
            .map(|(k, v)| (k.text.clone(), v.text.clone()))
            .collect())
    }

    /// Sets one user setting.
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let request = self
            .authed("user.setSetting")?
            .field_cdata("key", key)
            .field_cdata("value", value)
            .finish();
        self.send("user.setSetting", request).await?;
        Ok(())
    }

    /// All projects visible to the account, in service order.
    pub async fn projects(&self) -> Result<Vec<Node>, ApiError> {
        let doc = self
            .send("data.getProjects", self.authed("data.getProjects")?.finish())
            .await?;
        Ok(wire::decode_objects(&doc)?.projects)
    }

    /// All folders visible to the account, in service order.
    pub async fn folders(&self) -> Result<Vec<Node>, ApiError> {
        let doc = self
            .send("data.getFolders", self.authed("data.getFolders")?.finish())
            .await?;
        Ok(wire::decode_objects(&doc)?.folders)
    }

    /// Record types known to the service.
    pub async fn record_types(&self) -> Result<Vec<RecordType>, ApiError> {
        let doc = self
            .send(
                "meta.getRecordTypes",
                self.authed("meta.getRecordTypes")?.finish(),
            )
            .await?;
        Ok(wire::decode_objects(&doc)?.record_types)
    }

    /// Records matching the query, in service order.
    pub async fn records(&self, query: &RecordQuery) -> Result<Vec<Record>, ApiError> {
        let request = with_query(self.authed("data.getRecords")?, query).finish();
        let doc = self.send("data.getRecords", request).await?;
        Ok(wire::decode_objects(&doc)?.records)
    }

    /// Adds a record; returns it as stored, with its assigned id.
    pub async fn add_record(&self, draft: &RecordDraft) -> Result<Record, ApiError> {
        let request = self
            .authed("data.add")?
            .field_raw("objects", &wire::record_xml(None, Some(draft)))
            .finish();
        let doc = self.send("data.add", request).await?;
        first_record(wire::decode_objects(&doc)?)
    }

    /// Overwrites a record's data; returns the stored result.
    pub async fn change_record(&self, id: i64, draft: &RecordDraft) -> Result<Record, ApiError> {
        let request = self
            .authed("data.change")?
            .field_raw("objects", &wire::record_xml(Some(id), Some(draft)))
            .finish();
        let doc = self.send("data.change", request).await?;
        first_record(wire::decode_objects(&doc)?)
    }

    /// Deletes a record by id.
    pub async fn delete_record(&self, id: i64) -> Result<(), ApiError> {
        let request = self
            .authed("data.delete")?
            .field_raw("objects", &wire::record_xml(Some(id), None))
            .finish();
        self.send("data.delete", request).await?;
        Ok(())
    }

    /// Adds a project or folder; returns it as stored.
    pub async fn add_node(&self, kind: NodeKind, draft: &NodeDraft) -> Result<Node, ApiError> {
        let request = self
            .authed("data.add")?
            .field_raw("objects", &wire::node_xml(kind, None, Some(draft)))
            .finish();
        let doc = self.send("data.add", request).await?;
        first_node(wire::decode_objects(&doc)?, kind)
    }

    /// Overwrites a project or folder; returns the stored result.
    pub async fn change_node(
        &self,
        kind: NodeKind,
        id: NodeId,
        draft: &NodeDraft,
    ) -> Result<Node, ApiError> {
        let request = self
            .authed("data.change")?
            .field_raw("objects", &wire::node_xml(kind, Some(id), Some(draft)))
            .finish();
        let doc = self.send("data.change", request).await?;
        first_node(wire::decode_objects(&doc)?, kind)
    }

    /// Deletes a project or folder by id.
    pub async fn delete_node(&self, kind: NodeKind, id: NodeId) -> Result<(), ApiError> {
        let request = self
            .authed("data.delete")?
            .field_raw("objects", &wire::node_xml(kind, Some(id), None))
            .finish();
        self.send("data.delete", request).await?;
        Ok(())
    }

    /// Generates a report server-side and downloads the rendered file.
    pub async fn report(
        &self,
        format: ReportFormat,
        query: &ReportQuery,
    ) -> Result<Vec<u8>, ApiError> {
        let creds = self.auth()?;
        let mut request = with_query(
            self.authed("report.getReport")?
                .field_raw("reportFormat", format.as_str()),
            &query.records,
        );
        if let Some(group_by) = &query.group_by {
            request = request.field_cdata("groupBy", group_by);
        }
        if let Some(constraints) = &query.constraints {
            request = request.field_cdata("constraints", constraints);
        }
        let doc = self.send("report.getReport", request.finish()).await?;
        let report_id = doc.text_of("reportId")?.to_string();
        let report_hash = doc.text_of("reportHash")?.to_string();

        let url = format!("{}{DOWNLOAD_PATH}", self.base_url());
        tracing::debug!(%url, report_id, "downloading report");
        let bytes = self
            .http
            .get(url)
            .query(&[
                ("type", "report"),
                ("id", report_id.as_str()),
                ("hash", report_hash.as_str()),
                ("user", creds.user.as_str()),
                ("userhash", creds.hash.as_str()),
            ])
            .send()
            .await?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    fn authed(&self, op: &str) -> Result<RequestBuilder, ApiError> {
        let creds = self.auth()?;
        Ok(RequestBuilder::new(op)
            .field_cdata("user", &creds.user)
            .field_cdata("hash", &creds.hash))
    }
}

fn with_query(mut builder: RequestBuilder, query: &RecordQuery) -> RequestBuilder {
    if let Some(from) = query.time_from {
        builder = builder.field_int("timeFrom", from);
    }
    if let Some(to) = query.time_to {
        builder = builder.field_int("timeTo", to);
    }
    if let Some(type_ids) = &query.type_ids {
        builder = builder.field_raw("typeId", type_ids);
    }
    if let Some(parent_ids) = &query.parent_ids {
        builder = builder.field_raw("parentId", parent_ids);
    }
    if let Some(ids) = &query.ids {
        builder = builder.field_raw("id", ids);
    }
    builder
}

fn first_record(objects: wire::Objects) -> Result<Record, ApiError> {
    objects
        .records
        .into_iter()
        .next()
        .ok_or(ApiError::EmptyResponse)
}

fn first_node(objects: wire::Objects, kind: NodeKind) -> Result<Node, ApiError> {
    let list = match kind {
        NodeKind::Project => objects.projects,
        NodeKind::Folder => objects.folders,
    };
    list.into_iter().next().ok_or(ApiError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for code in [0, 1, 3, 5, 13, 100, 200, 204, 301, 802] {
            assert_eq!(Status::from_code(code).code(), code);
        }
        assert_eq!(Status::from_code(999), Status::Other(999));
        assert_eq!(Status::Other(999).code(), 999);
    }

    #[test]
    fn status_display_names_the_failure() {
        assert_eq!(Status::LoginFailure.to_string(), "login failure (status 5)");
        assert_eq!(
            Status::UnknownProject.to_string(),
            "unknown project (status 201)"
        );
    }

    #[test]
    fn client_debug_redacts_the_hash() {
        let mut client = Client::new("example.test", false).unwrap();
        client.set_credentials("alice", "super-secret-hash");
        let debug = format!("{client:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("super-secret-hash"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn base_url_follows_the_scheme() {
        let plain = Client::new("example.test", false).unwrap();
        assert_eq!(plain.base_url(), "http://example.test");
        let tls = Client::new("example.test", true).unwrap();
        assert_eq!(tls.base_url(), "https://example.test");
    }

    #[tokio::test]
    async fn calls_without_credentials_fail_fast() {
        let client = Client::new("example.test", false).unwrap();
        assert!(matches!(
            client.projects().await,
            Err(ApiError::NotLoggedIn)
        ));
        assert!(matches!(
            client.delete_record(1).await,
            Err(ApiError::NotLoggedIn)
        ));
    }

    #[test]
    fn record_draft_mirrors_a_record() {
        let record = Record {
            id: 4,
            project: 9,
            start_time: 100,
            end_time: 200,
            comment: "call".to_string(),
            is_running: true,
            kind: RecordKind::Phonecall {
                phone_number: "555".to_string(),
                outgoing: false,
            },
            time_created: 0,
            time_updated: 0,
            creator: 1,
            flags: 0,
        };
        let draft = RecordDraft::from(&record);
        assert_eq!(draft.project, 9);
        assert_eq!(draft.type_id(), Record::PHONECALL_TYPE_ID);
        assert_eq!(draft.kind, record.kind);
    }
}
