//! Command implementations.

pub mod config;
pub mod consolidate;
pub mod extract;
pub mod show;
pub mod validate;

pub use self::config::execute_config;
pub use self::consolidate::execute_consolidate;
pub use self::extract::execute_extract;
pub use self::show::execute_show;
pub use self::validate::execute_validate;

use crate::error::{CliError, Result};
use crate::output::Formatter;
use rulekeeper_pipeline::FileFailure;

/// Fail the run when every input file failed, after reporting why.
fn ensure_progress(total: usize, failures: &[FileFailure], formatter: &Formatter) -> Result<()> {
    if total == 0 || failures.len() < total {
        return Ok(());
    }
    for failure in failures {
        eprintln!("{}", formatter.error(&format!("{}: {}", failure.file, failure.reason)));
    }
    Err(CliError::NothingProcessed(failures.len()))
}
