use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::timestamps::parse_timestamp;
use crate::error::{Result, VaultError};
use crate::loader::RawConversation;
use crate::models::{AuthorRole, Conversation, Message, UNTITLED, Vault};

/// Normalise every raw conversation, skipping (and counting) the malformed ones.
///
/// Output order is document order; the result never holds more conversations than the input.
pub fn normalize_all(raw: &[RawConversation]) -> Vault {
    let mut conversations = Vec::with_capacity(raw.len());
    let mut skipped = 0;

    for (index, record) in raw.iter().enumerate() {
        let fallback_id = record.key.clone().unwrap_or_else(|| format!("conversation-{}", index));
        match normalize_conversation(&record.value, &fallback_id) {
            Ok(conversation) => conversations.push(conversation),
            Err(e) => {
                warn!(index, conversation = %fallback_id, "Skipping conversation: {}", e);
                skipped += 1;
            }
        }
    }

    info!(
        "Normalized {} conversations ({} skipped)",
        conversations.len(),
        skipped
    );

    Vault { conversations, raw_count: raw.len(), skipped }
}

/// Turn one raw conversation object into a [`Conversation`] with its canonical thread.
///
/// Both the flat `messages` list and the `mapping` tree are accepted. Individual malformed
/// messages are dropped silently; structural problems (wrong types, cycles) are errors.
pub fn normalize_conversation(raw: &Value, fallback_id: &str) -> Result<Conversation> {
    let obj = raw
        .as_object()
        .ok_or_else(|| VaultError::Format("conversation is not a JSON object".to_string()))?;

    let id = string_field(obj, "id")
        .or_else(|| string_field(obj, "conversation_id"))
        .unwrap_or_else(|| fallback_id.to_string());

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let create_time = obj.get("create_time").and_then(parse_timestamp);

    let messages = match (obj.get("mapping"), obj.get("messages")) {
        (Some(Value::Object(mapping)), _) => {
            let current = obj.get("current_node").and_then(Value::as_str);
            linearize_mapping(mapping, current)?
                .into_iter()
                .filter_map(|(node_id, msg)| parse_message(msg, node_id))
                .collect()
        }
        (Some(other), _) if !other.is_null() => {
            return Err(VaultError::Format(format!(
                "'mapping' must be an object, found {}",
                json_type(other)
            )));
        }
        (_, Some(Value::Array(items))) => items
            .iter()
            .enumerate()
            .filter_map(|(i, msg)| parse_message(msg, &format!("{}-{}", id, i)))
            .collect(),
        (_, Some(other)) if !other.is_null() => {
            return Err(VaultError::Format(format!(
                "'messages' must be an array, found {}",
                json_type(other)
            )));
        }
        _ => Vec::new(),
    };

    debug!(conversation = %id, messages = messages.len(), "Normalized conversation");

    Ok(Conversation { id, title, create_time, messages })
}

struct TreeNode<'a> {
    parent: Option<&'a str>,
    children: Vec<&'a str>,
    message: Option<&'a Value>,
}

/// Resolve the canonical thread of a `mapping` tree into (node id, message) pairs, root first.
///
/// Walks up from `current_node` when it names a known node; otherwise walks down from the
/// root along the last child of each node. Iterative, with a visited set so cyclic input
/// fails instead of looping.
fn linearize_mapping<'a>(
    mapping: &'a Map<String, Value>,
    current_node: Option<&str>,
) -> Result<Vec<(&'a str, &'a Value)>> {
    let mut index: HashMap<&'a str, TreeNode<'a>> = HashMap::with_capacity(mapping.len());
    let mut order: Vec<&'a str> = Vec::with_capacity(mapping.len());

    for (key, node) in mapping {
        let Some(node) = node.as_object() else {
            continue;
        };
        let children = node
            .get("children")
            .and_then(Value::as_array)
            .map(|c| c.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        index.insert(
            key.as_str(),
            TreeNode {
                parent: node.get("parent").and_then(Value::as_str),
                children,
                message: node.get("message").filter(|m| m.is_object()),
            },
        );
        order.push(key.as_str());
    }

    if index.is_empty() {
        return Ok(Vec::new());
    }

    let mut visited: HashSet<&str> = HashSet::with_capacity(index.len());
    let mut path: Vec<&'a str> = Vec::new();

    if let Some((&start, _)) = current_node.and_then(|c| index.get_key_value(c)) {
        let mut cursor = Some(start);
        while let Some(node_id) = cursor {
            if !visited.insert(node_id) {
                return Err(cycle_error(node_id));
            }
            path.push(node_id);
            cursor = index[node_id].parent.filter(|p| index.contains_key(p));
        }
        path.reverse();
    } else {
        let root = order
            .iter()
            .copied()
            .find(|id| index[id].parent.is_none_or(|p| !index.contains_key(p)))
            .ok_or_else(|| VaultError::Format("mapping has no root node".to_string()))?;

        let mut cursor = Some(root);
        while let Some(node_id) = cursor {
            if !visited.insert(node_id) {
                return Err(cycle_error(node_id));
            }
            path.push(node_id);
            cursor = index[node_id].children.iter().rev().copied().find(|c| index.contains_key(c));
        }
    }

    Ok(path.into_iter().filter_map(|id| index[id].message.map(|m| (id, m))).collect())
}

fn cycle_error(node_id: &str) -> VaultError {
    VaultError::Format(format!("cycle detected in message tree at node '{}'", node_id))
}

/// Parse one raw message object. Returns `None` for anything without a role or text.
fn parse_message(raw: &Value, fallback_id: &str) -> Option<Message> {
    let obj = raw.as_object()?;

    let role = obj
        .get("author")
        .and_then(|a| a.get("role"))
        .or_else(|| obj.get("role"))
        .and_then(Value::as_str)?;

    let text = content_text(obj.get("content")?);
    if text.is_empty() {
        return None;
    }

    let id = string_field(obj, "id").unwrap_or_else(|| fallback_id.to_string());
    let timestamp = obj
        .get("create_time")
        .and_then(parse_timestamp)
        .or_else(|| obj.get("timestamp").and_then(parse_timestamp));

    Some(Message::new(id, AuthorRole::from_raw(role), timestamp, text))
}

/// Flatten message content into one string, joining multiple parts with newlines.
fn content_text(content: &Value) -> String {
    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => join_parts(parts),
        Value::Object(obj) => match (obj.get("parts"), obj.get("text")) {
            (Some(Value::Array(parts)), _) => join_parts(parts),
            (_, Some(Value::String(text))) => text.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    };
    text.trim().to_string()
}

fn join_parts(parts: &[Value]) -> String {
    parts.iter().filter_map(part_text).collect::<Vec<_>>().join("\n")
}

fn part_text(part: &Value) -> Option<String> {
    match part {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => match obj.get("text") {
            Some(Value::String(text)) => Some(text.clone()),
            _ => serde_json::to_string(part).ok(),
        },
        other => serde_json::to_string(other).ok(),
    }
}

/// Read an identifier that may be stored as a string or a number.
fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
