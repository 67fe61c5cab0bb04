//! Show command implementation.

use crate::cli::ShowArgs;
use crate::error::Result;
use crate::output::Formatter;
use rulekeeper_pipeline::{read_document, PersistedDocument};

/// Execute the show command.
pub fn execute_show(args: ShowArgs, formatter: &Formatter) -> Result<()> {
    let output = match read_document(&args.file)? {
        PersistedDocument::Rules(doc) => formatter.format_rules(&doc.rules)?,
        PersistedDocument::Validations(doc) => formatter.format_validations(&doc.validations)?,
    };
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_show_validations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validations.json");
        std::fs::write(
            &path,
            r#"{"validations": [{"rule_id": "r1", "file": "a.md", "result": "pass", "reason": ""}]}"#,
        )
        .unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        execute_show(ShowArgs { file: path }, &formatter).unwrap();
    }

    #[test]
    fn test_show_unrecognized_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(&path, r#"{"items": []}"#).unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = execute_show(ShowArgs { file: path }, &formatter);
        assert!(matches!(result, Err(CliError::Pipeline(_))));
    }
}
