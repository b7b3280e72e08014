//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

const TIME_HELP: &str = "\
Supported formatting:
  <date>_<time>+/-<offset>
  <offset>: +/-IhJmKs with every field optional; bare digits are hours
  <time>:   [empty]                       start of the day
            now/n                         the current instant
            integer >= 1000000            seconds since the Unix epoch
            HH/HHMM/HHMMSS/HH:MM/HH:MM:SS time of day, 24h format
            [all of the above]am/pm       time of day, 12h format
  <date>:   [empty]/today/t               today
            yesterday/y                   yesterday
            monday/tuesday/..             previous such day, two letters min
            january/february/..           previous such month start, three letters min
            DD/MM, DD/MM/YYYY, YYYY/MM/DD explicit date (separators: / . -)";

const PARENT_ID_HELP: &str = "\
Supported formatting:
  [/]<name0>/<name1>/...

Examples:
  <name>                searches all folders and projects
  <folder-name>/<name>  child of the folder named <folder-name>
  /<name>               top-level folder/project named <name>
  /<folder>/<name>      child of the top-level folder named <folder>";

/// Command-line client for the tempo time-tracking service.
///
/// Talks to the hosted service over its XML API: manage records, projects,
/// and folders, and run local time/hierarchy computations.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about, long_about = None)]
pub struct Cli {
    /// Username for login.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Password for login. Supply this or a hash along with the username.
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Hash from a previous login.
    #[arg(short = 'x', long, global = true)]
    pub hash: Option<String>,

    /// Host to connect to.
    #[arg(short = 'd', long, global = true)]
    pub host: Option<String>,

    /// Connect using HTTPS.
    #[arg(long, global = true)]
    pub https: bool,

    /// Disable pretty-printing of output.
    #[arg(short = 'n', long, global = true)]
    pub no_pretty: bool,

    /// Disable sorting of output.
    #[arg(short = 'f', long, global = true)]
    pub no_sort: bool,

    /// Remove unnecessary output.
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Show all info about printed objects.
    #[arg(short, long, global = true)]
    pub all_info: bool,

    /// Print times and durations as raw seconds.
    #[arg(long, global = true)]
    pub seconds: bool,

    /// Separate printed values with commas.
    #[arg(long, global = true)]
    pub csv: bool,

    /// Prefer ids over names when printing parents.
    #[arg(long, global = true)]
    pub ids: bool,

    /// Only print object ids.
    #[arg(long, global = true)]
    pub only_id: bool,

    /// Limit the number of printed elements.
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and print a hash that later commands can reuse.
    Login,

    /// Inspect or change user settings.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Add records, projects, and folders.
    Add {
        #[command(subcommand)]
        item: AddItem,
    },

    /// Change existing records, projects, and folders.
    Change {
        #[command(subcommand)]
        item: ChangeItem,
    },

    /// Delete records, projects, and folders.
    Delete {
        #[command(subcommand)]
        item: DeleteItem,
    },

    /// Fetch and print collections.
    Get {
        #[command(subcommand)]
        what: GetItem,
    },

    /// Generate a report server-side and write it to stdout.
    Report(ReportArgs),

    /// Local computations: times, ids, hierarchies, sums.
    Print {
        #[command(subcommand)]
        what: PrintItem,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Show account information.
    GetInfo,

    /// Show all user settings.
    GetSettings,

    /// Set one user setting.
    SetSetting {
        /// Setting name.
        key: String,
        /// New setting value.
        value: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddItem {
    /// Add a record.
    Record {
        #[command(subcommand)]
        record: AddRecord,
    },

    /// Add a project.
    Project(NodeDataArgs),

    /// Add a folder.
    Folder(NodeDataArgs),
}

#[derive(Debug, Subcommand)]
pub enum AddRecord {
    /// Add a work record.
    Work(RecordDataArgs),

    /// Add a phonecall record.
    Phonecall {
        #[command(flatten)]
        data: RecordDataArgs,
        #[command(flatten)]
        call: PhonecallArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum ChangeItem {
    /// Change a record.
    Record {
        #[command(subcommand)]
        record: ChangeRecord,
    },

    /// Change a project.
    Project(ChangeNodeArgs),

    /// Change a folder.
    Folder(ChangeNodeArgs),
}

#[derive(Debug, Subcommand)]
pub enum ChangeRecord {
    /// Change a record of any type.
    Any(ChangeRecordArgs),

    /// Change a work record.
    Work(ChangeRecordArgs),

    /// Change a phonecall record.
    Phonecall(ChangeRecordArgs),
}

#[derive(Debug, Subcommand)]
pub enum DeleteItem {
    /// Delete a record.
    Record {
        #[command(subcommand)]
        record: DeleteRecord,
    },

    /// Delete a project.
    Project {
        /// Id or name of the project.
        id: String,
    },

    /// Delete a folder.
    Folder {
        /// Id or name of the folder.
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeleteRecord {
    /// Delete a record of any type.
    Any {
        /// Id of the record.
        id: i64,
    },

    /// Delete a work record.
    Work {
        /// Id of the record.
        id: i64,
    },

    /// Delete a phonecall record.
    Phonecall {
        /// Id of the record.
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum GetItem {
    /// Get records.
    Records {
        #[command(flatten)]
        query: QueryArgs,

        /// Comma-separated list of record ids.
        #[arg(long)]
        id: Option<String>,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Get projects.
    Projects {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Get folders.
    Folders {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrintItem {
    /// Resolve a time description and print the resulting time.
    #[command(after_help = TIME_HELP)]
    Time {
        /// Time description, e.g. "yesterday_14:30+1h".
        time: String,
    },

    /// Resolve a project/folder name path and print its id.
    #[command(after_help = PARENT_ID_HELP)]
    ParentId {
        /// Name or path of the project/folder.
        name: String,

        /// Limit the lookup to projects.
        #[arg(long)]
        project: bool,

        /// Limit the lookup to folders.
        #[arg(long, conflicts_with = "project")]
        folder: bool,
    },

    /// Display the folder/project hierarchy matching a record query.
    Hier {
        #[command(flatten)]
        query: QueryArgs,

        /// Summarize record time per folder/project.
        #[arg(long)]
        sum_time: bool,

        /// Only show folders/projects with recorded time.
        #[arg(long)]
        no_empty: bool,
    },

    /// Display summed record time.
    Sum {
        #[command(flatten)]
        query: QueryArgs,

        /// One grand total instead of per-type sums.
        #[arg(long)]
        sum_total: bool,
    },
}

/// Record query options shared by get, report, and print commands.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Include records starting at or after this time.
    #[arg(long)]
    pub from: Option<String>,

    /// Include records up to this time.
    #[arg(long)]
    pub to: Option<String>,

    /// Record type ids or names, comma separated.
    #[arg(long = "type")]
    pub type_filter: Option<String>,

    /// Parent project/folder ids or names, comma separated.
    #[arg(long)]
    pub parent: Option<String>,
}

/// Record fields shared by add and change.
#[derive(Debug, Args)]
pub struct RecordDataArgs {
    /// Id or name of the parent project.
    #[arg(long)]
    pub project: Option<String>,

    /// Start time of the record (see `tempo print time --help`).
    #[arg(long)]
    pub from: Option<String>,

    /// End time of the record.
    #[arg(long)]
    pub to: Option<String>,

    /// Comment associated with the record.
    #[arg(long)]
    pub comment: Option<String>,

    /// Mark the record as running.
    #[arg(short = 'r', long)]
    pub running: bool,

    /// Mark the record as stopped.
    #[arg(long, conflicts_with = "running")]
    pub stopped: bool,
}

impl RecordDataArgs {
    /// Tri-state running flag: set, cleared, or left alone.
    #[must_use]
    pub const fn running_state(&self) -> Option<bool> {
        if self.running {
            Some(true)
        } else if self.stopped {
            Some(false)
        } else {
            None
        }
    }
}

/// Phonecall-specific record fields.
#[derive(Debug, Args)]
pub struct PhonecallArgs {
    /// Phone number for the call.
    #[arg(long)]
    pub phone_number: Option<String>,

    /// The call was outgoing.
    #[arg(short = 'o', long)]
    pub outgoing: bool,

    /// The call was incoming.
    #[arg(long, conflicts_with = "outgoing")]
    pub incoming: bool,
}

impl PhonecallArgs {
    /// Tri-state direction flag: outgoing, incoming, or left alone.
    #[must_use]
    pub const fn outgoing_state(&self) -> Option<bool> {
        if self.outgoing {
            Some(true)
        } else if self.incoming {
            Some(false)
        } else {
            None
        }
    }
}

/// Project/folder fields shared by add and change.
#[derive(Debug, Args)]
pub struct NodeDataArgs {
    /// Name of the item.
    pub name: Option<String>,

    /// Free-text description.
    #[arg(long)]
    pub description: Option<String>,

    /// Color as shown in the web interface.
    #[arg(long)]
    pub color: Option<String>,

    /// Folder to put it in, as an id or name path. Default is no folder.
    #[arg(long)]
    pub parent: Option<String>,
}

/// Target of a change to an existing record.
#[derive(Debug, Args)]
pub struct ChangeRecordArgs {
    /// Id of the record.
    pub id: i64,

    #[command(flatten)]
    pub data: RecordDataArgs,

    #[command(flatten)]
    pub call: PhonecallArgs,
}

/// Target of a change to an existing project or folder.
#[derive(Debug, Args)]
pub struct ChangeNodeArgs {
    /// Id or name of the item.
    pub id: String,

    #[command(flatten)]
    pub data: NodeDataArgs,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report format.
    #[arg(value_enum)]
    pub format: ReportFormatArg,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Values to group the report by.
    #[arg(long)]
    pub group_by: Option<String>,

    /// Additional report constraints.
    #[arg(long)]
    pub constraints: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    Pdf,
    Html,
    Xls,
    Csv,
}

impl From<ReportFormatArg> for tempo_api::ReportFormat {
    fn from(format: ReportFormatArg) -> Self {
        match format {
            ReportFormatArg::Pdf => Self::Pdf,
            ReportFormatArg::Html => Self::Html,
            ReportFormatArg::Xls => Self::Xls,
            ReportFormatArg::Csv => Self::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_record_query() {
        let cli = Cli::try_parse_from([
            "tempo",
            "-u",
            "alice",
            "get",
            "records",
            "--from",
            "yesterday",
            "--to",
            "now",
            "--type",
            "work",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        let Commands::Get {
            what: GetItem::Records { query, .. },
        } = cli.command
        else {
            panic!("expected get records");
        };
        assert_eq!(query.from.as_deref(), Some("yesterday"));
        assert_eq!(query.type_filter.as_deref(), Some("work"));
    }

    #[test]
    fn running_and_stopped_conflict() {
        let result = Cli::try_parse_from([
            "tempo", "add", "record", "work", "--running", "--stopped",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn tri_state_flags() {
        let cli =
            Cli::try_parse_from(["tempo", "add", "record", "work", "--running"]).unwrap();
        let Commands::Add {
            item:
                AddItem::Record {
                    record: AddRecord::Work(data),
                },
        } = cli.command
        else {
            panic!("expected add record work");
        };
        assert_eq!(data.running_state(), Some(true));

        let cli = Cli::try_parse_from(["tempo", "add", "record", "work"]).unwrap();
        let Commands::Add {
            item:
                AddItem::Record {
                    record: AddRecord::Work(data),
                },
        } = cli.command
        else {
            panic!("expected add record work");
        };
        assert_eq!(data.running_state(), None);
    }
}
