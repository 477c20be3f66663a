use std::io::Read;

use flate2::read::GzDecoder;

use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::types::{OperationDescriptor, Record, json_from_bytes};

/// Gzip-decompresses the source bytes
#[derive(Debug)]
pub struct DecompressGzip {
    endpoints: Endpoints,
}

impl DecompressGzip {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        Ok(DecompressGzip {
            endpoints: Endpoints::from_descriptor(descriptor)?,
        })
    }
}

impl Operation for DecompressGzip {
    fn id(&self) -> &str {
        &self.endpoints.id
    }

    fn apply(&self, mut record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let compressed = self.endpoints.read(&record).as_bytes();
        let mut decompressed = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decompressed)
            .map_err(|err| {
                OperationError::input(&self.endpoints.id, format!("invalid gzip data: {}", err))
            })?;
        log::trace!(
            "{}: {} -> {} bytes",
            self.endpoints.id,
            compressed.len(),
            decompressed.len()
        );

        self.endpoints.write(&mut record, json_from_bytes(decompressed))?;
        Ok(vec![record])
    }
}
