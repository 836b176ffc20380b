use anyhow::Result;
use pgshape_core::configuration::Configuration;
use std::env::consts::{ARCH, OS};
use std::io;

/// Get the full version of the program (e.g. "pgshape/0.1.0 linux/x86_64").
pub(crate) fn full_version(configuration: &Configuration) -> String {
    let program_name = &configuration.program_name;
    let version = &configuration.version;
    format!("{program_name}/{version} {OS}/{ARCH}")
}

/// Write the version to the provided output.
pub(crate) fn execute(configuration: &Configuration, output: &mut dyn io::Write) -> Result<()> {
    let version = full_version(configuration);
    writeln!(output, "{version}")?;
    Ok(())
}
