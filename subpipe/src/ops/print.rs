use std::io::Write;
use std::sync::Mutex;

use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::types::{OperationDescriptor, Record};

/// Writes the source value as one line to a shared sink (stdout by default)
///
/// Strings are written as-is, other values as compact JSON. Records pass
/// through unchanged.
pub struct SendStdout {
    endpoints: Endpoints,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl SendStdout {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        Self::with_sink(descriptor, Box::new(std::io::stdout()))
    }

    /// Write to a caller-supplied sink instead of stdout
    pub fn with_sink(
        descriptor: &OperationDescriptor,
        sink: Box<dyn Write + Send>,
    ) -> Result<Self, OperationError> {
        Ok(SendStdout {
            endpoints: Endpoints::from_descriptor(descriptor)?,
            sink: Mutex::new(sink),
        })
    }
}

impl std::fmt::Debug for SendStdout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendStdout")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl Operation for SendStdout {
    fn id(&self) -> &str {
        &self.endpoints.id
    }

    fn apply(&self, record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let mut line = self.endpoints.read(&record).as_string().into_bytes();
        line.push(b'\n');

        // A panic elsewhere while holding the lock leaves the sink usable
        let mut sink = self
            .sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sink.write_all(&line)
            .and_then(|_| sink.flush())
            .map_err(|source| OperationError::Io {
                id: self.endpoints.id.clone(),
                source,
            })?;

        Ok(vec![record])
    }
}
