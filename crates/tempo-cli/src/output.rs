//! Table and value formatting for command output.

use std::collections::HashMap;
use std::io::{self, Write};

use chrono::{Local, TimeZone};

use tempo_core::{Node, NodeId, Record, RecordKind, ROOT};

use crate::cli::Cli;

/// Presentation switches lifted from the global command-line flags.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub pretty: bool,
    pub sort: bool,
    pub silent: bool,
    pub csv: bool,
    pub seconds: bool,
    pub ids: bool,
    pub only_id: bool,
    pub all_info: bool,
    pub limit: Option<usize>,
}

impl OutputOptions {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            pretty: !cli.no_pretty,
            sort: !cli.no_sort,
            silent: cli.silent,
            csv: cli.csv,
            seconds: cli.seconds,
            ids: cli.ids,
            only_id: cli.only_id,
            all_info: cli.all_info,
            limit: cli.limit,
        }
    }
}

#[cfg(test)]
impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            sort: true,
            silent: false,
            csv: false,
            seconds: false,
            ids: false,
            only_id: false,
            all_info: false,
            limit: None,
        }
    }
}

/// A column-aligned table. Rows go out in insertion order; sorting is the
/// caller's concern.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Writes the table: header unless silent, column width of longest cell
    /// plus two when pretty, comma separators when csv, row cap from limit.
    pub fn write<W: Write>(&self, writer: &mut W, options: &OutputOptions) -> io::Result<()> {
        if self.rows.is_empty() && options.silent {
            return Ok(());
        }

        let limit = options.limit.unwrap_or(self.rows.len());
        let rows: Vec<&Vec<String>> = self.rows.iter().take(limit).collect();

        let mut widths = vec![0usize; self.headers.len()];
        if options.pretty {
            for (i, header) in self.headers.iter().enumerate() {
                if !options.silent {
                    widths[i] = header.len();
                }
            }
            for row in &rows {
                for (i, cell) in row.iter().enumerate() {
                    if i < widths.len() {
                        widths[i] = widths[i].max(cell.len());
                    }
                }
            }
            for width in &mut widths {
                *width += 2;
            }
        }

        let separator = if options.csv { "," } else { "" };
        if !options.silent {
            write_row(writer, &self.headers, &widths, separator)?;
        }
        for row in rows {
            write_row(writer, row, &widths, separator)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(
    writer: &mut W,
    cells: &[String],
    widths: &[usize],
    separator: &str,
) -> io::Result<()> {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(0);
        let piece = format!("{cell}{separator}");
        line.push_str(&piece);
        for _ in piece.len()..width {
            line.push(' ');
        }
    }
    writeln!(writer, "{}", line.trim_end())
}

/// Renders a timestamp: local ISO datetime, or raw seconds with --seconds.
#[must_use]
pub fn format_time(options: &OutputOptions, t: i64) -> String {
    if options.seconds {
        return t.to_string();
    }
    Local
        .timestamp_opt(t, 0)
        .single()
        .map_or_else(|| t.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Renders a duration as `H:MM:SS`, or raw seconds with --seconds.
#[must_use]
pub fn format_duration(options: &OutputOptions, t: i64) -> String {
    if options.seconds {
        return t.to_string();
    }
    format!("{}:{:02}:{:02}", t / 3600, (t / 60) % 60, t % 60)
}

/// Prints records the way `get records` does.
///
/// `project_names` maps project ids to display names; it may be empty when
/// ids are preferred.
pub fn print_records<W: Write>(
    writer: &mut W,
    records: &[Record],
    options: &OutputOptions,
    project_names: &HashMap<NodeId, String>,
) -> io::Result<()> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    if options.sort {
        ordered.sort_by_key(|r| r.id);
    }

    if options.only_id {
        let mut table = Table::new(["id"]);
        for record in ordered {
            table.push(vec![record.id.to_string()]);
        }
        return table.write(writer, options);
    }

    let calls = ordered
        .iter()
        .any(|r| matches!(r.kind, RecordKind::Phonecall { .. }));

    let mut headers = vec![
        "id",
        "type",
        "project",
        "startTime",
        "endTime",
        "comment",
        "isRunning",
    ];
    if calls {
        headers.push("phoneNumber");
        headers.push("outgoing");
    }
    let mut table = Table::new(headers);

    for record in ordered {
        let project = if options.ids {
            record.project.to_string()
        } else {
            project_names
                .get(&record.project)
                .cloned()
                .unwrap_or_else(|| format!("unknown: {}", record.project))
        };
        let mut row = vec![
            record.id.to_string(),
            record.type_name().to_string(),
            project,
            format_time(options, record.start_time),
            format_time(options, record.end_time),
            record.comment.clone(),
            record.is_running.to_string(),
        ];
        if calls {
            match &record.kind {
                RecordKind::Phonecall {
                    phone_number,
                    outgoing,
                } => {
                    row.push(phone_number.clone());
                    row.push(outgoing.to_string());
                }
                RecordKind::Work => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        table.push(row);
    }
    table.write(writer, options)
}

/// Prints projects or folders the way `get projects` does.
///
/// `folder_names` maps folder ids to display names for the parent column.
pub fn print_nodes<W: Write>(
    writer: &mut W,
    nodes: &[Node],
    options: &OutputOptions,
    folder_names: &HashMap<NodeId, String>,
) -> io::Result<()> {
    let mut ordered: Vec<&Node> = nodes.iter().collect();
    if options.sort {
        ordered.sort_by_key(|n| n.id);
    }

    if options.only_id {
        let mut table = Table::new(["id"]);
        for node in ordered {
            table.push(vec![node.id.to_string()]);
        }
        return table.write(writer, options);
    }

    let mut headers = vec!["id", "name", "description", "primaryColor", "parent"];
    if options.all_info {
        headers.push("privileges");
        headers.push("timeCreated");
        headers.push("creator");
    }
    let mut table = Table::new(headers);

    for node in ordered {
        let parent = if options.ids {
            node.parent_id.to_string()
        } else if node.parent_id == ROOT {
            String::new()
        } else {
            folder_names
                .get(&node.parent_id)
                .cloned()
                .unwrap_or_else(|| format!("unknown: {}", node.parent_id))
        };
        let mut row = vec![
            node.id.to_string(),
            node.name.clone(),
            node.description.clone(),
            node.color.clone(),
            parent,
        ];
        if options.all_info {
            row.push(node.privileges.to_string());
            row.push(format_time(options, node.time_created));
            row.push(node.creator.to_string());
        }
        table.push(row);
    }
    table.write(writer, options)
}

/// Prints name/value pairs, keys left-aligned when pretty.
pub fn print_pairs<W: Write>(
    writer: &mut W,
    pairs: &[(String, String)],
    options: &OutputOptions,
) -> io::Result<()> {
    let width = if options.pretty {
        pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0)
    } else {
        0
    };
    for (key, value) in pairs {
        writeln!(writer, "{key:<width$}: '{value}'")?;
    }
    Ok(())
}

/// Prints the standard acknowledgement unless silenced.
pub fn print_ok<W: Write>(writer: &mut W, options: &OutputOptions) -> io::Result<()> {
    if !options.silent {
        writeln!(writer, "OK")?;
    }
    Ok(())
}
