//! Embedded JSON-LD (`<script type="application/ld+json">`) handling.

use serde::Deserialize;
use serde_json::Value;

use crate::document::PageDocument;

/// A person or organisation as it appears in JSON-LD: a bare name, an
/// object with a `name`, a list of either, or something unusable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Agent {
    Name(String),
    Entity { name: String },
    List(Vec<Agent>),
    Other(Value),
}

impl Agent {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Agent::Other(value.clone()))
    }

    /// Flatten to trimmed, non-empty names in order.
    pub fn names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Agent::Name(name) | Agent::Entity { name } => {
                let name = name.trim();
                if !name.is_empty() {
                    out.push(name.to_string());
                }
            }
            Agent::List(items) => {
                for item in items {
                    item.collect_names(out);
                }
            }
            Agent::Other(_) => {}
        }
    }
}

/// Every parseable JSON-LD block on the page, in document order.
pub fn blocks(doc: &PageDocument) -> Vec<Value> {
    doc.select(r#"script[type="application/ld+json"]"#)
        .into_iter()
        .filter_map(|script| {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unparseable JSON-LD block");
                    None
                }
            }
        })
        .collect()
}

/// The items described by one block: the `@graph` members, the elements of a
/// top-level array, or the block itself.
pub fn items(block: &Value) -> Vec<&Value> {
    if let Some(graph) = block.get("@graph").and_then(Value::as_array) {
        return graph.iter().collect();
    }
    match block {
        Value::Array(list) => list.iter().collect(),
        other => vec![other],
    }
}

fn is_set(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
        && value.as_str().is_none_or(|s| !s.is_empty())
}

/// Authors from the first item whose `author` (else `creator`) yields names.
pub fn authors(doc: &PageDocument) -> Vec<String> {
    for block in blocks(doc) {
        for item in items(&block) {
            let data = item
                .get("author")
                .filter(|v| is_set(v))
                .or_else(|| item.get("creator").filter(|v| is_set(v)));
            if let Some(data) = data {
                let names = Agent::from_value(data).names();
                if !names.is_empty() {
                    return names;
                }
            }
        }
    }
    vec![]
}

/// `publisher.name` of the first item that has one.
pub fn publisher_name(doc: &PageDocument) -> Option<String> {
    blocks(doc).iter().find_map(|block| {
        items(block).into_iter().find_map(|item| {
            let publisher = item.get("publisher")?;
            Agent::from_value(publisher).names().into_iter().next()
        })
    })
}
