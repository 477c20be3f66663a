//! The unit of data flowing through a pipeline

use serde_json::Value as Json;

use super::value::{FieldValue, json_from_bytes};
use crate::path::{Path, PathError, Root};

/// A payload tree plus a metadata sidecar
///
/// Control records carry no data: their trees are cleared, reads return
/// nothing and writes are ignored. Every operation passes them through.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    payload: Json,
    metadata: Json,
    control: bool,
}

impl Record {
    /// Create a record with the given payload and empty metadata
    pub fn new(payload: Json) -> Self {
        Record {
            payload,
            metadata: Json::Null,
            control: false,
        }
    }

    /// Create a record from raw bytes (a string, or a byte array if not UTF-8)
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Record::new(json_from_bytes(bytes))
    }

    /// Create a control record
    pub fn control() -> Self {
        Record {
            payload: Json::Null,
            metadata: Json::Null,
            control: true,
        }
    }

    pub fn with_metadata(mut self, metadata: Json) -> Self {
        self.set_metadata(metadata);
        self
    }

    pub fn is_control(&self) -> bool {
        self.control
    }

    /// Payload tree, or None for a control record
    pub fn payload(&self) -> Option<&Json> {
        (!self.control).then_some(&self.payload)
    }

    /// Metadata tree, or None for a control record
    pub fn metadata(&self) -> Option<&Json> {
        (!self.control).then_some(&self.metadata)
    }

    pub fn set_payload(&mut self, payload: Json) {
        if !self.control {
            self.payload = payload;
        }
    }

    pub fn set_metadata(&mut self, metadata: Json) {
        if !self.control {
            self.metadata = metadata;
        }
    }

    pub fn into_payload(self) -> Json {
        self.payload
    }

    /// Read the value at a textual path
    pub fn get_value(&self, path: &str) -> Result<FieldValue, PathError> {
        Ok(self.get_path(&Path::parse(path)?))
    }

    /// Write a value at a textual path
    pub fn set_value(&mut self, path: &str, value: Json) -> Result<(), PathError> {
        self.set_path(&Path::parse(path)?, value)
    }

    /// Delete the value at a textual path
    pub fn delete_value(&mut self, path: &str) -> Result<(), PathError> {
        self.delete_path(&Path::parse(path)?)
    }

    pub fn get_path(&self, path: &Path) -> FieldValue {
        if self.control {
            return FieldValue::missing();
        }
        path.get(self.tree(path.root()))
    }

    pub fn set_path(&mut self, path: &Path, value: Json) -> Result<(), PathError> {
        if self.control {
            return Ok(());
        }
        path.set(self.tree_mut(path.root()), value)
    }

    pub fn delete_path(&mut self, path: &Path) -> Result<(), PathError> {
        if self.control {
            return Ok(());
        }
        path.delete(self.tree_mut(path.root()))
    }

    fn tree(&self, root: Root) -> &Json {
        match root {
            Root::Payload => &self.payload,
            Root::Metadata => &self.metadata,
        }
    }

    fn tree_mut(&mut self, root: Root) -> &mut Json {
        match root {
            Root::Payload => &mut self.payload,
            Root::Metadata => &mut self.metadata,
        }
    }
}

impl From<Json> for Record {
    fn from(payload: Json) -> Self {
        Record::new(payload)
    }
}
