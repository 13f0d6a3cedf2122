//! Tool system
//!
//! Tools are the actions the model can request. Each tool has:
//! - A name and description for the model
//! - A JSON schema for its parameters
//! - An execute method returning a [`ToolOutput`] envelope
//!
//! Executors know nothing about permissions. The dispatcher applies the
//! dangerous-command interceptor and the permission gate before calling them.

pub mod filesystem;
pub mod shell;
pub mod web;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::WebConfig;
use crate::error::ToolError;

pub const READ_FILE: &str = "read_file";
pub const LIST_FILES: &str = "list_files";
pub const WRITE_FILE: &str = "write_file";
pub const EDIT_FILE: &str = "edit_file";
pub const RUN_BASH: &str = "run_bash";
pub const WEB_SEARCH: &str = "web_search";
pub const WEB_FETCH: &str = "web_fetch";

/// Boxed future type for object-safe async trait methods
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result envelope of a tool invocation
///
/// Serializes to a single flat JSON object: `success`, the tool-specific
/// payload fields, and on failure `error` (plus `blocked`/`reason` for
/// intercepted shell commands).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ToolOutput {
    /// Successful result; `payload` should be a JSON object
    pub fn success(payload: Value) -> Self {
        Self {
            success: true,
            payload: into_map(payload),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Failure caused by a dangerous-command match
    pub fn blocked(command: &str, reason: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("command".to_string(), Value::String(command.to_string()));
        Self {
            success: false,
            error: Some("BLOCKED: This command is dangerous and cannot be executed.".to_string()),
            blocked: true,
            reason: Some(reason.into()),
            payload,
        }
    }

    /// Set the success flag, keeping the payload
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Flat text form carried by the tool-role message
    pub fn to_llm_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"Failed to serialize tool result: {}"}}"#, e)
        })
    }
}

impl From<ToolError> for ToolOutput {
    fn from(err: ToolError) -> Self {
        ToolOutput::error(err.to_string())
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    }
}

/// Tool definition for model consumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Core trait for all tools
pub trait Tool: Send + Sync {
    /// Tool name (used by the model to invoke)
    fn name(&self) -> &str;

    /// Description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>>;

    /// Convert to tool definition for the model
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Registry of available tools
///
/// Keeps registration order so the model always sees the same tool list.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions of all tools, in registration order
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.to_definition())
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Registry with the seven built-in tools
pub fn standard_registry(workspace: &Path, web: &WebConfig, api_key: Option<String>) -> crate::error::Result<ToolRegistry> {
    let workspace = workspace.to_path_buf();
    let web_client = web::WebClient::new(web, api_key)?;

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(filesystem::ReadFile::new(workspace.clone())));
    registry.register(Arc::new(filesystem::ListFiles::new(workspace.clone())));
    registry.register(Arc::new(filesystem::WriteFile::new(workspace.clone())));
    registry.register(Arc::new(filesystem::EditFile::new(workspace.clone())));
    registry.register(Arc::new(shell::RunBash::new(workspace)));
    registry.register(Arc::new(web::WebSearch::new(web_client.clone())));
    registry.register(Arc::new(web::WebFetch::new(web_client)));
    Ok(registry)
}

/// Fetch a required string parameter
pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))
}
