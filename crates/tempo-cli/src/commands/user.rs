//! User commands: account info and settings.

use std::io::Write;

use anyhow::Result;

use crate::output::{self, OutputOptions};
use crate::session::Session;

pub fn get_info<W: Write>(writer: &mut W, session: &Session, options: &OutputOptions) -> Result<()> {
    let info = session.run(session.client().user_info())?;
    output::print_pairs(writer, &info, options)?;
    Ok(())
}

pub fn get_settings<W: Write>(
    writer: &mut W,
    session: &Session,
    options: &OutputOptions,
) -> Result<()> {
    let settings = session.run(session.client().user_settings())?;
    output::print_pairs(writer, &settings, options)?;
    Ok(())
}

pub fn set_setting<W: Write>(
    writer: &mut W,
    session: &Session,
    key: &str,
    value: &str,
    options: &OutputOptions,
) -> Result<()> {
    session.run(session.client().set_setting(key, value))?;
    output::print_ok(writer, options)?;
    Ok(())
}
