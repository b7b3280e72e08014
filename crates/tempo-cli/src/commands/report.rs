//! Report command: server-side rendering, streamed to stdout.

use std::io::Write;

use anyhow::Result;

use tempo_api::ReportQuery;

use crate::cli::ReportArgs;
use crate::session::Session;

pub fn run<W: Write>(writer: &mut W, session: &mut Session, args: &ReportArgs) -> Result<()> {
    let query = ReportQuery {
        records: session.record_query(&args.query)?,
        group_by: args.group_by.clone(),
        constraints: args.constraints.clone(),
    };
    let bytes = session.run(session.client().report(args.format.into(), &query))?;
    writer.write_all(&bytes)?;
    Ok(())
}
