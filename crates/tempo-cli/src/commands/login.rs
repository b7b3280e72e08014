//! Login command: authenticate and print the reusable hash.

use std::io::Write;

use anyhow::{Result, bail};

use crate::session::Session;

pub fn run<W: Write>(writer: &mut W, session: &Session) -> Result<()> {
    let Some(credentials) = session.client().credentials() else {
        bail!("login did not produce credentials");
    };
    writeln!(writer, "{}", credentials.hash)?;
    Ok(())
}
