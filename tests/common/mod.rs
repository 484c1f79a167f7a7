//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builder for creating test export layouts (zip, folder or bare data file)
pub struct ExportBuilder {
    temp_dir: TempDir,
    conversations: Vec<Value>,
}

impl ExportBuilder {
    /// Create a new builder with no conversations
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir, conversations: Vec::new() }
    }

    /// Get the path to the temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a conversation
    pub fn with_conversation(mut self, conversation: ConversationBuilder) -> Self {
        self.conversations.push(conversation.to_value());
        self
    }

    /// Add a raw JSON value as a conversation (for malformed input)
    pub fn with_raw(mut self, value: Value) -> Self {
        self.conversations.push(value);
        self
    }

    /// The data document as a JSON array
    pub fn document(&self) -> String {
        Value::Array(self.conversations.clone()).to_string()
    }

    /// Write `conversations.json` at the top of the temp dir and return its path
    pub fn write_data_file(&self) -> PathBuf {
        let path = self.temp_dir.path().join("conversations.json");
        fs::write(&path, self.document()).expect("Failed to write conversations.json");
        path
    }

    /// Write an extracted export folder with the data file nested under `subdir`
    pub fn write_folder(&self, subdir: &str) -> PathBuf {
        let root = self.temp_dir.path().join("export");
        let nested = root.join(subdir);
        fs::create_dir_all(&nested).expect("Failed to create export folder");
        fs::write(nested.join("conversations.json"), self.document())
            .expect("Failed to write conversations.json");
        fs::write(root.join("chat.html"), "<html></html>").expect("Failed to write chat.html");
        root
    }

    /// Write a zip archive holding the data document under `entry_name`
    pub fn write_zip(&self, file_name: &str, entry_name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(file_name);
        let file = fs::File::create(&path).expect("Failed to create zip");
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        zip.start_file("chat.html", options).expect("Failed to start zip entry");
        zip.write_all(b"<html></html>").expect("Failed to write zip entry");
        zip.start_file(entry_name, options).expect("Failed to start zip entry");
        zip.write_all(self.document().as_bytes()).expect("Failed to write zip entry");
        zip.finish().expect("Failed to finish zip");
        path
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one message in either layout
#[derive(Clone)]
pub struct MessageBuilder {
    id: String,
    role: String,
    text: String,
    create_time: Option<f64>,
}

impl MessageBuilder {
    pub fn user(id: &str, text: &str) -> Self {
        Self::new(id, "user", text)
    }

    pub fn assistant(id: &str, text: &str) -> Self {
        Self::new(id, "assistant", text)
    }

    pub fn new(id: &str, role: &str, text: &str) -> Self {
        Self { id: id.to_string(), role: role.to_string(), text: text.to_string(), create_time: None }
    }

    /// Set the creation time in epoch seconds
    pub fn at(mut self, epoch_seconds: f64) -> Self {
        self.create_time = Some(epoch_seconds);
        self
    }

    /// The tree-layout message object
    fn to_tree_message(&self) -> Value {
        json!({
            "id": self.id,
            "author": {"role": self.role},
            "create_time": self.create_time,
            "content": {"content_type": "text", "parts": [self.text]},
        })
    }

    /// The flat-layout message object
    fn to_flat_message(&self) -> Value {
        json!({
            "id": self.id,
            "role": self.role,
            "create_time": self.create_time,
            "content": self.text,
        })
    }
}

/// Builder for conversations: `mapping` tree (linear chain) or flat `messages` list
pub struct ConversationBuilder {
    id: String,
    title: Option<String>,
    create_time: Option<f64>,
    messages: Vec<MessageBuilder>,
    flat: bool,
}

impl ConversationBuilder {
    /// A conversation using the `mapping` tree layout
    pub fn tree(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: Some(title.to_string()),
            create_time: None,
            messages: Vec::new(),
            flat: false,
        }
    }

    /// A conversation using the flat `messages` layout
    pub fn flat(id: &str, title: &str) -> Self {
        Self { flat: true, ..Self::tree(id, title) }
    }

    pub fn untitled(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn created_at(mut self, epoch_seconds: f64) -> Self {
        self.create_time = Some(epoch_seconds);
        self
    }

    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".into(), json!(self.id));
        if let Some(title) = &self.title {
            obj.insert("title".into(), json!(title));
        }
        obj.insert("create_time".into(), json!(self.create_time));

        if self.flat {
            let messages: Vec<Value> = self.messages.iter().map(|m| m.to_flat_message()).collect();
            obj.insert("messages".into(), Value::Array(messages));
        } else {
            let (mapping, current) = self.chain_mapping();
            obj.insert("mapping".into(), Value::Object(mapping));
            obj.insert("current_node".into(), json!(current));
        }
        Value::Object(obj)
    }

    /// root -> node-0 -> node-1 -> ... with the message-less root first
    fn chain_mapping(&self) -> (Map<String, Value>, String) {
        let mut mapping = Map::new();
        let node_ids: Vec<String> =
            (0..self.messages.len()).map(|i| format!("{}-node-{}", self.id, i)).collect();
        let root_id = format!("{}-root", self.id);

        let root_children: Vec<&String> = node_ids.first().into_iter().collect();
        mapping.insert(
            root_id.clone(),
            json!({"id": root_id, "parent": null, "children": root_children, "message": null}),
        );
        for (i, message) in self.messages.iter().enumerate() {
            let parent = if i == 0 { root_id.clone() } else { node_ids[i - 1].clone() };
            let children: Vec<&String> = node_ids.get(i + 1).into_iter().collect();
            mapping.insert(
                node_ids[i].clone(),
                json!({
                    "id": node_ids[i],
                    "parent": parent,
                    "children": children,
                    "message": message.to_tree_message(),
                }),
            );
        }
        let current = node_ids.last().cloned().unwrap_or(root_id);
        (mapping, current)
    }
}

/// Helper to create a realistic export with both layouts, code and timestamps
pub fn realistic_export() -> ExportBuilder {
    ExportBuilder::new()
        .with_conversation(
            ConversationBuilder::tree("conv-docker", "Docker networking")
                .created_at(1_700_000_000.0)
                .message(MessageBuilder::user("m1", "How do I expose a port in docker?").at(1_700_000_000.0))
                .message(
                    MessageBuilder::assistant(
                        "m2",
                        "Use -p:\n```bash\ndocker run -p 8080:80 nginx\n```\nor compose:\n```yaml\nports:\n  - \"8080:80\"\n```",
                    )
                    .at(1_700_000_060.0),
                ),
        )
        .with_conversation(
            ConversationBuilder::flat("conv-rust", "Rust lifetimes")
                .created_at(1_710_000_000.0)
                .message(MessageBuilder::user("m3", "Explain lifetimes").at(1_710_000_000.0))
                .message(
                    MessageBuilder::assistant("m4", "```rust\nfn first<'a>(s: &'a str) -> &'a str { s }\n```")
                        .at(1_710_000_030.0),
                ),
        )
        .with_conversation(
            ConversationBuilder::tree("conv-misc", "Weekend plans")
                .created_at(1_720_000_000.0)
                .message(MessageBuilder::user("m5", "Any docker-free hobbies?").at(1_720_000_000.0))
                .message(MessageBuilder::assistant("m6", "Hiking.").at(1_720_000_010.0)),
        )
}
