//! Print commands: local computations over fetched data.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;

use tempo_core::aggregate::{self, RecordTally};
use tempo_core::{KindFilter, Node, timeexpr};

use crate::cli::QueryArgs;
use crate::output::{self, OutputOptions, Table};
use crate::session::Session;

/// Resolves a time description and prints the result.
pub fn time<W: Write>(writer: &mut W, text: &str, options: &OutputOptions) -> Result<()> {
    let t = timeexpr::resolve_local(text)?;
    writeln!(writer, "{}", output::format_time(options, t))?;
    Ok(())
}

/// Resolves a name path and prints the matching node id.
pub fn parent_id<W: Write>(
    writer: &mut W,
    session: &mut Session,
    name: &str,
    project_only: bool,
    folder_only: bool,
) -> Result<()> {
    let filter = if folder_only {
        KindFilter::Folder
    } else if project_only {
        KindFilter::Project
    } else {
        KindFilter::Either
    };
    let id = session.catalog.resolve_path(name, filter, None)?;
    writeln!(writer, "{id}")?;
    Ok(())
}

/// Displays the folder/project hierarchy, optionally with per-branch sums.
pub fn hier<W: Write>(
    writer: &mut W,
    session: &mut Session,
    query_args: &QueryArgs,
    sum_time: bool,
    no_empty: bool,
    options: &OutputOptions,
) -> Result<()> {
    let mut nodes: Vec<Node> = session.catalog.folders()?.to_vec();
    nodes.extend(session.catalog.projects()?.iter().cloned());

    // Records are only needed when time figures into the output.
    let tallies: Vec<RecordTally> = if sum_time || no_empty {
        let query = session.record_query(query_args)?;
        let records = session.run(session.client().records(&query))?;
        records
            .iter()
            .map(|r| RecordTally::from_span(r.project, r.type_name(), r.start_time, r.end_time))
            .collect()
    } else {
        Vec::new()
    };

    let hierarchy = aggregate::build(nodes, &tallies, no_empty, options.sort);

    let headers: &[&str] = if sum_time {
        &["depth/name", "type", "time"]
    } else {
        &["depth/name", "type"]
    };
    let mut table = Table::new(headers.iter().copied());
    for row in hierarchy.rows() {
        let label = if options.only_id {
            row.id
                .map_or_else(|| row.label.clone(), |id| id.to_string())
        } else {
            row.label.clone()
        };
        let name = format!("{}{label}", "-".repeat(row.depth));
        let kind = row.kind.map_or_else(String::new, |k| k.to_string());
        let mut cells = vec![name, kind];
        if sum_time {
            cells.push(render_sums(&row.sums, options));
        }
        table.push(cells);
    }
    table.write(writer, options)?;
    Ok(())
}

/// Displays summed record time, per type or as one total.
pub fn sum<W: Write>(
    writer: &mut W,
    session: &mut Session,
    query_args: &QueryArgs,
    sum_total: bool,
    options: &OutputOptions,
) -> Result<()> {
    let query = session.record_query(query_args)?;
    let records = session.run(session.client().records(&query))?;

    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for record in &records {
        *totals.entry(record.type_name().to_string()).or_insert(0) += record.duration();
    }

    if sum_total {
        let total: i64 = totals.values().sum();
        writeln!(writer, "{}", output::format_duration(options, total))?;
    } else {
        writeln!(writer, "{}", render_sums(&totals, options))?;
    }
    Ok(())
}

fn render_sums(sums: &BTreeMap<String, i64>, options: &OutputOptions) -> String {
    sums.iter()
        .map(|(type_name, seconds)| {
            format!("{type_name}: {}", output::format_duration(options, *seconds))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_command_prints_raw_seconds() {
        let options = OutputOptions {
            seconds: true,
            ..OutputOptions::default()
        };
        let mut buf = Vec::new();
        time(&mut buf, "1234567890", &options).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1234567890\n");
    }

    #[test]
    fn time_command_rejects_garbage() {
        let options = OutputOptions::default();
        let mut buf = Vec::new();
        let err = time(&mut buf, "not-a-time", &options).unwrap_err();
        assert_eq!(err.to_string(), "invalid time description \"not-a-time\"");
    }

    #[test]
    fn sums_render_per_type() {
        let options = OutputOptions {
            seconds: true,
            ..OutputOptions::default()
        };
        let sums = BTreeMap::from([
            ("phonecall".to_string(), 300),
            ("work".to_string(), 3600),
        ]);
        assert_eq!(render_sums(&sums, &options), "phonecall: 300, work: 3600");

        let pretty = OutputOptions::default();
        assert_eq!(
            render_sums(&sums, &pretty),
            "phonecall: 0:05:00, work: 1:00:00"
        );
    }
}
