use serde_json::Value as Json;

use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::types::{OperationDescriptor, Record};

/// Lowercases the string form of the source
#[derive(Debug)]
pub struct LowercaseString {
    endpoints: Endpoints,
}

impl LowercaseString {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        Ok(LowercaseString {
            endpoints: Endpoints::from_descriptor(descriptor)?,
        })
    }
}

impl Operation for LowercaseString {
    fn id(&self) -> &str {
        &self.endpoints.id
    }

    fn apply(&self, mut record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let lowered = self.endpoints.read(&record).as_string().to_lowercase();
        self.endpoints.write(&mut record, Json::String(lowered))?;
        Ok(vec![record])
    }
}
