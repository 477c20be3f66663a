use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::types::{OperationDescriptor, Record, json_from_bytes};

/// Decodes standard base64 text
///
/// Output is a string when the decoded bytes are UTF-8, otherwise a byte array.
#[derive(Debug)]
pub struct DecodeBase64 {
    endpoints: Endpoints,
}

impl DecodeBase64 {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        Ok(DecodeBase64 {
            endpoints: Endpoints::from_descriptor(descriptor)?,
        })
    }
}

impl Operation for DecodeBase64 {
    fn id(&self) -> &str {
        &self.endpoints.id
    }

    fn apply(&self, mut record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let encoded = self.endpoints.read(&record).as_string();
        let decoded = STANDARD.decode(encoded.trim()).map_err(|err| {
            OperationError::input(&self.endpoints.id, format!("invalid base64: {}", err))
        })?;

        self.endpoints.write(&mut record, json_from_bytes(decoded))?;
        Ok(vec![record])
    }
}
