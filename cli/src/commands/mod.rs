pub mod cli;
pub mod list;
pub mod session;
pub mod task;

use mission_core::api::CliError;
use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Command(format!("failed to encode json: {e}")))?;
    println!("{out}");
    Ok(())
}
