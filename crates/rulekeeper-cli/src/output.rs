//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use rulekeeper_domain::{Edit, Rule, ValidationResult, Verdict};
use rulekeeper_pipeline::{
    ConsolidationResult, ExtractionResult, FileFailure, ValidationReport, VerdictCounts,
};
use serde_json::json;
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format rules output.
    pub fn format_rules(&self, rules: &[Rule]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "rules": rules }))?),
            OutputFormat::Table => Ok(self.format_rules_table(rules)),
            OutputFormat::Quiet => Ok(join_lines(rules.iter().map(|r| r.id.to_string()))),
        }
    }

    fn format_rules_table(&self, rules: &[Rule]) -> String {
        if rules.is_empty() {
            return self.colorize("No rules found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Priority", "Title", "Sources", "Quotes"]);

        for rule in rules {
            let sources: Vec<&str> = rule.source_files.iter().map(String::as_str).collect();
            builder.push_record([
                rule.id.to_string(),
                rule.priority.to_string(),
                rule.title.clone(),
                sources.join(", "),
                rule.quotes.len().to_string(),
            ]);
        }

        build_table(builder)
    }

    /// Format proposed edits.
    pub fn format_edits(&self, edits: &[Edit]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "edits": edits }))?),
            OutputFormat::Table => Ok(self.format_edits_table(edits)),
            OutputFormat::Quiet => Ok(join_lines(edits.iter().map(|e| {
                let ids: Vec<&str> = e.ids().iter().map(|id| id.as_str()).collect();
                format!("{} {}", e.operation(), ids.join(","))
            }))),
        }
    }

    fn format_edits_table(&self, edits: &[Edit]) -> String {
        if edits.is_empty() {
            return self.colorize("No edits proposed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Operation", "Rules", "Replacement"]);

        for edit in edits {
            let ids: Vec<&str> = edit.ids().iter().map(|id| id.as_str()).collect();
            let replacement = match edit {
                Edit::Delete { .. } => String::new(),
                Edit::Merge { replacement, .. } => {
                    format!("[{}] {}", replacement.priority, replacement.title)
                }
            };
            builder.push_record([edit.operation().to_string(), ids.join("\n"), replacement]);
        }

        build_table(builder)
    }

    /// Format validation results.
    pub fn format_validations(&self, validations: &[ValidationResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &json!({ "validations": validations }),
            )?),
            OutputFormat::Table => Ok(self.format_validations_table(validations)),
            OutputFormat::Quiet => Ok(join_lines(
                validations
                    .iter()
                    .map(|v| format!("{}\t{}\t{}", v.file, v.rule_id, v.result)),
            )),
        }
    }

    fn format_validations_table(&self, validations: &[ValidationResult]) -> String {
        if validations.is_empty() {
            return self.colorize("No validations found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["File", "Rule", "Result", "Reason"]);

        for validation in validations {
            builder.push_record([
                validation.file.clone(),
                validation.rule_id.to_string(),
                self.verdict(validation.result),
                validation.reason.clone(),
            ]);
        }

        build_table(builder)
    }

    /// Summarize an extraction run.
    pub fn extraction_summary(&self, result: &ExtractionResult, output: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "output": output.display().to_string(),
                "files": result.extracted.iter().map(|f| json!({
                    "file": f.file,
                    "rules": f.rule_ids.len(),
                })).collect::<Vec<_>>(),
                "total_rules": result.total_rules(),
                "failures": failures_json(&result.failures),
                "model": result.metadata.model_name,
                "processing_time_ms": result.metadata.processing_time_ms,
            }))?),
            OutputFormat::Quiet => Ok(result.total_rules().to_string()),
            OutputFormat::Table => {
                let mut lines: Vec<String> = result
                    .extracted
                    .iter()
                    .map(|f| format!("  {}: {} rule(s)", f.file, f.rule_ids.len()))
                    .collect();
                lines.push(self.success(&format!(
                    "Extracted {} rule(s) from {} file(s) into {}",
                    result.total_rules(),
                    result.extracted.len(),
                    output.display()
                )));
                lines.extend(self.failure_lines(&result.failures));
                Ok(lines.join("\n"))
            }
        }
    }

    /// Summarize a consolidation run.
    pub fn consolidation_summary(
        &self,
        result: &ConsolidationResult,
        output: &Path,
    ) -> Result<String> {
        let report = &result.report;
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "output": output.display().to_string(),
                "rules_before": result.rules_before,
                "rules_after": result.rules_after,
                "edits_proposed": result.proposed.len(),
                "deleted": report.deleted,
                "created": report.created,
                "unknown_ids": report.unknown_ids,
                "skipped_merges": report.skipped_merges,
                "model": result.metadata.model_name,
                "processing_time_ms": result.metadata.processing_time_ms,
            }))?),
            OutputFormat::Quiet => Ok(result.rules_after.to_string()),
            OutputFormat::Table => {
                let mut lines = Vec::new();
                if report.is_noop() {
                    lines.push(self.info("No edits applied"));
                } else {
                    lines.push(self.success(&format!(
                        "Consolidated {} rule(s) into {} ({} removed, {} merged rule(s) created)",
                        result.rules_before,
                        result.rules_after,
                        report.deleted.len(),
                        report.created.len()
                    )));
                }
                if !report.unknown_ids.is_empty() {
                    let ids: Vec<&str> = report.unknown_ids.iter().map(|id| id.as_str()).collect();
                    lines.push(self.warning(&format!("Ignored unknown rule ids: {}", ids.join(", "))));
                }
                if report.skipped_merges > 0 {
                    lines.push(self.warning(&format!(
                        "Skipped {} merge(s) that named no known rule",
                        report.skipped_merges
                    )));
                }
                lines.push(format!("Wrote {}", output.display()));
                Ok(lines.join("\n"))
            }
        }
    }

    /// Summarize a validation run.
    pub fn validation_summary(&self, report: &ValidationReport, output: &Path) -> Result<String> {
        let counts = report.counts();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "output": output.display().to_string(),
                "files": report.validated.iter().map(|file| {
                    let c = report.counts_for(file);
                    json!({"file": file, "counts": counts_json(&c)})
                }).collect::<Vec<_>>(),
                "counts": counts_json(&counts),
                "skipped": report.skipped,
                "failures": failures_json(&report.failures),
                "model": report.metadata.model_name,
                "processing_time_ms": report.metadata.processing_time_ms,
            }))?),
            OutputFormat::Quiet => Ok(format!(
                "{} {} {} {}",
                counts.pass, counts.fail, counts.not_applicable, counts.unknown
            )),
            OutputFormat::Table => {
                let mut lines: Vec<String> = report
                    .validated
                    .iter()
                    .map(|file| format!("  {}: {}", file, self.counts_line(&report.counts_for(file))))
                    .collect();
                lines.push(self.success(&format!(
                    "Validated {} file(s): {}",
                    report.validated.len(),
                    self.counts_line(&counts)
                )));
                for file in &report.skipped {
                    lines.push(self.warning(&format!("Skipped {}: no rules originated from it", file)));
                }
                lines.extend(self.failure_lines(&report.failures));
                lines.push(format!("Wrote {}", output.display()));
                Ok(lines.join("\n"))
            }
        }
    }

    fn counts_line(&self, counts: &VerdictCounts) -> String {
        format!(
            "{} pass, {} fail, {} n/a, {} unknown",
            counts.pass, counts.fail, counts.not_applicable, counts.unknown
        )
    }

    fn failure_lines(&self, failures: &[FileFailure]) -> Vec<String> {
        failures
            .iter()
            .map(|f| self.error(&format!("{}: {}", f.file, f.reason)))
            .collect()
    }

    fn verdict(&self, verdict: Verdict) -> String {
        let color = match verdict {
            Verdict::Pass => "green",
            Verdict::Fail => "red",
            Verdict::NotApplicable => "blue",
            Verdict::Unknown => "yellow",
        };
        self.colorize(verdict.as_str(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn build_table(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn join_lines(lines: impl Iterator<Item = String>) -> String {
    lines.collect::<Vec<_>>().join("\n")
}

fn counts_json(counts: &VerdictCounts) -> serde_json::Value {
    json!({
        "pass": counts.pass,
        "fail": counts.fail,
        "n/a": counts.not_applicable,
        "unknown": counts.unknown,
    })
}

fn failures_json(failures: &[FileFailure]) -> serde_json::Value {
    failures
        .iter()
        .map(|f| json!({"file": f.file, "reason": f.reason}))
        .collect()
}
