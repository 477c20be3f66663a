//! Operation descriptors produced by the script compiler

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Value;

/// The operation a descriptor asks for
///
/// Builtin kinds get stricter argument rules and default settings. Any other
/// name is kept verbatim as a custom kind so a host factory can claim it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    /// `target = source` copy between two paths
    DirectAssignment,
    SplitString,
    DecompressGzip,
    SendStdout,
    DecodeBase64,
    LowercaseString,
    Delete,
    /// Unrecognised function name, preserved as written
    Custom(String),
}

impl OperationKind {
    /// Map a function name (or one of its aliases) to its kind
    pub fn from_name(name: &str) -> Self {
        match name {
            "direct_assignment" => OperationKind::DirectAssignment,
            "split_string" | "split" | "string_split" => OperationKind::SplitString,
            "decompress_gzip" | "decompress" | "gunzip" | "format_from_gzip" => {
                OperationKind::DecompressGzip
            }
            "send_stdout" | "print" | "stdout" => OperationKind::SendStdout,
            "decode_base64" | "base64_decode" | "b64decode" => OperationKind::DecodeBase64,
            "lowercase_string" | "lowercase" | "lower" => OperationKind::LowercaseString,
            "delete" | "del" => OperationKind::Delete,
            other => OperationKind::Custom(other.to_string()),
        }
    }

    /// Canonical name of this kind
    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::DirectAssignment => "direct_assignment",
            OperationKind::SplitString => "split_string",
            OperationKind::DecompressGzip => "decompress_gzip",
            OperationKind::SendStdout => "send_stdout",
            OperationKind::DecodeBase64 => "decode_base64",
            OperationKind::LowercaseString => "lowercase_string",
            OperationKind::Delete => "delete",
            OperationKind::Custom(name) => name,
        }
    }

    /// Whether this is one of the fixed, callable builtin functions
    pub fn is_builtin(&self) -> bool {
        !matches!(
            self,
            OperationKind::DirectAssignment | OperationKind::Custom(_)
        )
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for OperationKind {
    fn from(name: String) -> Self {
        OperationKind::from_name(&name)
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One compiled operation: what to run, its settings, and where it reads and writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Operation kind
    #[serde(rename = "type")]
    pub kind: OperationKind,
    /// Named settings (keys are unique)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,
    /// Path the operation reads from (whole payload when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Path the operation writes to (replaces the payload when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl OperationDescriptor {
    /// Create a descriptor with no settings, source or target
    pub fn new(kind: OperationKind) -> Self {
        OperationDescriptor {
            kind,
            settings: BTreeMap::new(),
            source: None,
            target: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Look up a setting by key
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Look up a string setting by key
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }

    /// Configured identifier, falling back to the kind name
    pub fn id(&self) -> &str {
        self.setting_str("id").unwrap_or_else(|| self.kind.as_str())
    }

    /// Get a human-readable description of this descriptor
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(source) = &self.source {
            parts.push(format!("source={}", source));
        }
        for (key, value) in &self.settings {
            parts.push(format!("{}={:?}", key, value.to_string()));
        }
        let call = format!("{}({})", self.kind, parts.join(", "));
        match &self.target {
            Some(target) => format!("{} = {}", target, call),
            None => call,
        }
    }
}
