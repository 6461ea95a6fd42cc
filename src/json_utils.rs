//! Locating typed JSON inside free-form model output.
//!
//! Models wrap their JSON in prose or code fences often enough that a plain
//! `serde_json::from_str` on the whole response is not sufficient.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

/// Type of a JSON node found by the structure scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType, children: Vec<ObjCoords>) -> Self {
        Self { start, end, kind, children }
    }

    /// The slice of `text` this node spans.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Find all balanced JSON object/array structures in the given text.
/// Coordinates are byte indices; brackets inside string literals are ignored.
#[instrument(target = "quizify::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                in_string = true;
                continue;
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                continue;
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                continue;
            }
            b'}' => NodeType::Object,
            b']' => NodeType::Array,
            _ => continue,
        };

        // Mismatched closers drop the open frame
        if let Some(frame) = stack.pop() {
            if frame.kind == closing {
                let node = ObjCoords::new(frame.start, i, closing, frame.children);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => results.push(node),
                }
            }
        }
    }

    debug!(target: "quizify::json", count = results.len(), "found root structures");
    results
}

/// Extract all occurrences of `T` from a response string.
///
/// Strategy (in order):
/// - If the entire string parses as `Vec<T>`, return it.
/// - Otherwise walk every JSON structure, preferring `Vec<T>` at a node, then `T`,
///   and descending into children when neither matches.
#[instrument(target = "quizify::json", skip(text))]
pub fn extract_all<T: DeserializeOwned>(text: &str) -> Vec<T> {
    if let Ok(v) = serde_json::from_str::<Vec<T>>(text) {
        return v;
    }

    fn collect_from_node<T: DeserializeOwned>(text: &str, node: &ObjCoords, out: &mut Vec<T>) {
        let s = node.slice(text);
        if let Ok(vs) = serde_json::from_str::<Vec<T>>(s) {
            out.extend(vs);
            return;
        }
        if let Ok(v) = serde_json::from_str::<T>(s) {
            out.push(v);
            return;
        }
        for child in &node.children {
            collect_from_node::<T>(text, child, out);
        }
    }

    let mut out: Vec<T> = Vec::new();
    for node in &find_json_structures(text) {
        collect_from_node::<T>(text, node, &mut out);
    }
    out
}

/// First `T` found in `text`, parent structures before their children.
#[instrument(target = "quizify::json", skip(text))]
pub fn extract_first<T: DeserializeOwned>(text: &str) -> Option<T> {
    if let Ok(v) = serde_json::from_str::<T>(text.trim()) {
        return Some(v);
    }

    fn first_in_node<T: DeserializeOwned>(text: &str, node: &ObjCoords) -> Option<T> {
        if let Ok(v) = serde_json::from_str::<T>(node.slice(text)) {
            return Some(v);
        }
        node.children.iter().find_map(|child| first_in_node(text, child))
    }

    let found = find_json_structures(text)
        .iter()
        .find_map(|node| first_in_node::<T>(text, node));
    if found.is_none() {
        trace!(target: "quizify::json", "no matching structure in response");
    }
    found
}
