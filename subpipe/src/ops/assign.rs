use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::path::Path;
use crate::types::{OperationDescriptor, Record};

/// Copies the value at one path to another
///
/// A missing source leaves the record unchanged.
#[derive(Debug)]
pub struct DirectAssignment {
    id: String,
    source: Path,
    target: Path,
}

impl DirectAssignment {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        let Endpoints { id, source, target } = Endpoints::from_descriptor(descriptor)?;
        match (source, target) {
            (Some(source), Some(target)) => Ok(DirectAssignment { id, source, target }),
            _ => Err(OperationError::config(
                &id,
                "assignment needs both a source and a target path",
            )),
        }
    }
}

impl Operation for DirectAssignment {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, mut record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let value = record.get_path(&self.source);
        if value.exists() {
            record
                .set_path(&self.target, value.into_value())
                .map_err(|err| OperationError::path(&self.id, err))?;
        }
        Ok(vec![record])
    }
}
