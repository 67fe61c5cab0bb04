//! Prompt construction for the three stages

use crate::loader::LoadedDocument;
use rulekeeper_domain::{ContentPart, Rule, StructuredRequest};
use serde_json::{json, Value};

/// Builds model requests
///
/// Content is emitted in a fixed order: rules first, then notes, then the
/// document, so the document is always the last thing the model reads.
pub struct PromptBuilder {
    instructions: String,
    rules: Option<Value>,
    notes: Vec<String>,
    document: Option<ContentPart>,
}

impl PromptBuilder {
    /// Create a new prompt builder with the given system instructions
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            rules: None,
            notes: Vec::new(),
            document: None,
        }
    }

    /// Embed rules, including their ids and source files
    pub fn with_rules<'a>(mut self, rules: impl IntoIterator<Item = &'a Rule>) -> Self {
        let rendered: Vec<Value> = rules.into_iter().map(render_rule).collect();
        self.rules = Some(Value::Array(rendered));
        self
    }

    /// Add a plain-text note to the user content
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Attach the document under analysis
    pub fn with_document(mut self, document: &LoadedDocument) -> Self {
        self.document = Some(document.part.clone());
        self
    }

    /// Build the request
    pub fn build(self, schema_name: &str, schema: Value) -> StructuredRequest {
        let mut content = Vec::new();

        if let Some(rules) = self.rules {
            let rendered = serde_json::to_string_pretty(&rules).unwrap_or_else(|_| rules.to_string());
            content.push(ContentPart::Text(format!("Rules:\n{}", rendered)));
        }
        content.extend(self.notes.into_iter().map(ContentPart::Text));
        if let Some(document) = self.document {
            content.push(document);
        }

        StructuredRequest::new(self.instructions, content, schema_name, schema)
    }
}

fn render_rule(rule: &Rule) -> Value {
    json!({
        "id": rule.id,
        "title": rule.title,
        "body": rule.body,
        "priority": rule.priority,
        "rationale": rule.rationale,
        "source_files": rule.source_files,
    })
}

/// Default extraction instructions
pub const EXTRACTION_INSTRUCTIONS: &str = r#"You extract policy rules from documents.

A rule is an atomic, testable requirement that another document could comply
with or violate. For every rule in the document provide:
- title: a short name (at most ten words)
- body: the requirement as one self-contained sentence using "must", "must not" or "should"
- priority: "high" for mandatory requirements, "medium" for expected practice, "low" for recommendations
- rationale: why the rule exists, in one or two sentences
- quotes: verbatim excerpts from the document that support the rule

Guidelines:
- One requirement per rule; split compound statements
- Do not invent requirements the document does not state
- Skip headings, definitions and boilerplate that carry no requirement
- Return an empty list if the document contains no rules"#;

/// Default consolidation instructions
pub const CONSOLIDATION_INSTRUCTIONS: &str = r#"You maintain a collection of policy rules extracted from several documents.

Propose edits that remove redundancy:
- "merge": two or more rules state the same requirement. List every id being
  merged and write the combined rule's title, body, priority and rationale.
- "delete": a rule is empty, meaningless, or fully covered by another rule
  that stays. Leave title, body, priority and rationale null.

Guidelines:
- Only reference ids that appear in the rule list
- Never merge rules that differ in substance, even if they sound similar
- When merging, keep the strictest priority of the merged rules
- Return an empty list when the collection needs no changes"#;

/// Default validation instructions
pub const VALIDATION_INSTRUCTIONS: &str = r#"You check whether a document complies with policy rules.

For every rule in the list return exactly one verdict:
- "pass": the document satisfies the rule
- "fail": the document violates the rule or omits something the rule requires
- "n/a": the rule does not apply to this document
- "unknown": the document does not contain enough information to decide

Give a short reason for every verdict, quoting the document where possible.
Use the rule ids exactly as given."#;
