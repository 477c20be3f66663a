use serde_json::{Map, Value as Json};

use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::types::{OperationDescriptor, Record, Value};

/// Splits a string into one record per non-empty piece
#[derive(Debug)]
pub struct SplitString {
    endpoints: Endpoints,
    separator: String,
}

impl SplitString {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        let endpoints = Endpoints::from_descriptor(descriptor)?;
        let separator = match descriptor.setting("separator") {
            None => "\n".to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(other) => {
                return Err(OperationError::config(
                    &endpoints.id,
                    format!("separator must be a non-empty string, got {}", other),
                ));
            }
        };
        Ok(SplitString {
            endpoints,
            separator,
        })
    }
}

impl Operation for SplitString {
    fn id(&self) -> &str {
        &self.endpoints.id
    }

    fn apply(&self, record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let text = self.endpoints.read(&record).as_string();
        let metadata = record.metadata().cloned().unwrap_or(Json::Null);

        text.split(self.separator.as_str())
            .filter(|piece| !piece.is_empty())
            .map(|piece| {
                let piece = Json::String(piece.to_string());
                match &self.endpoints.target {
                    Some(_) => {
                        let mut next = Record::new(Json::Object(Map::new()))
                            .with_metadata(metadata.clone());
                        self.endpoints.write(&mut next, piece)?;
                        Ok(next)
                    }
                    None => Ok(Record::new(piece).with_metadata(metadata.clone())),
                }
            })
            .collect()
    }
}
