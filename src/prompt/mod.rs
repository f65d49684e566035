//! Prompt templates with named `{{placeholder}}` slots.
//!
//! Substitution is literal: bound text is inserted unmodified and never re-scanned, so a
//! binding that itself contains `{{...}}` is not expanded. Rendering requires the bindings to
//! name exactly the template's placeholders, no more and no fewer.

pub mod templates;

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use crate::error::TemplateError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

pub type Bindings<'a> = BTreeMap<&'a str, &'a str>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    id: String,
    segments: Vec<Segment>,
    required: BTreeSet<String>,
}

impl PromptTemplate {
    pub fn new(id: &str, body: &str) -> Self {
        let mut segments = Vec::new();
        let mut required = BTreeSet::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(body) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(body[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(name.as_str().to_string()));
            required.insert(name.as_str().to_string());
            last = whole.end();
        }
        if last < body.len() {
            segments.push(Segment::Literal(body[last..].to_string()));
        }

        Self {
            id: id.to_string(),
            segments,
            required,
        }
    }

    #[cfg(test)]
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn fill(&self, bindings: &Bindings<'_>) -> Result<String, TemplateError> {
        if let Some(name) = self.required.iter().find(|n| !bindings.contains_key(n.as_str())) {
            return Err(TemplateError::MissingPlaceholder {
                template: self.id.clone(),
                name: name.clone(),
            });
        }
        if let Some(name) = bindings.keys().find(|n| !self.required.contains(**n)) {
            return Err(TemplateError::UnexpectedPlaceholder {
                template: self.id.clone(),
                name: name.to_string(),
            });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(bindings[name.as_str()]),
            }
        }
        Ok(out)
    }
}

/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, PromptTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (id, body) in templates::builtin() {
            registry.register(PromptTemplate::new(id, body));
        }
        registry
    }

    pub fn register(&mut self, template: PromptTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates.get(id)
    }

    pub fn render(&self, id: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError> {
        self.get(id)
            .ok_or_else(|| TemplateError::UnknownTemplate { id: id.to_string() })?
            .fill(bindings)
    }
}
