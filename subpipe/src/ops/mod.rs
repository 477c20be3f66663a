//! Executable operations built from descriptors
//!
//! Each operation consumes one record and returns its successors. All of them
//! share the same addressing rules: read the configured source (falling back to
//! the whole payload when it is unset or absent), write the configured target
//! (replacing the payload when unset), and hand control records back untouched.

mod assign;
mod decode;
mod decompress;
mod delete;
mod lowercase;
mod print;
mod split;

pub use assign::DirectAssignment;
pub use decode::DecodeBase64;
pub use decompress::DecompressGzip;
pub use delete::Delete;
pub use lowercase::LowercaseString;
pub use print::SendStdout;
pub use split::SplitString;

use serde_json::Value as Json;

use crate::error::OperationError;
use crate::path::Path;
use crate::types::{FieldValue, OperationDescriptor, OperationKind, Record};

/// A compiled pipeline stage
///
/// Implementations must be shareable across threads; any external sink they
/// write to is serialized internally.
pub trait Operation: Send + Sync {
    /// Configured identifier, used in errors and logs
    fn id(&self) -> &str;

    /// Process one record into zero or more successors
    fn apply(&self, record: Record) -> Result<Vec<Record>, OperationError>;
}

/// Builds an operation from its descriptor
pub type Factory = fn(&OperationDescriptor) -> Result<Box<dyn Operation>, OperationError>;

/// Default factory covering the builtin operations
///
/// Custom kinds are rejected; hosts that define their own pass a different
/// [`Factory`] to the pipeline.
pub fn build(descriptor: &OperationDescriptor) -> Result<Box<dyn Operation>, OperationError> {
    let operation: Box<dyn Operation> = match &descriptor.kind {
        OperationKind::DirectAssignment => Box::new(DirectAssignment::new(descriptor)?),
        OperationKind::SplitString => Box::new(SplitString::new(descriptor)?),
        OperationKind::DecompressGzip => Box::new(DecompressGzip::new(descriptor)?),
        OperationKind::SendStdout => Box::new(SendStdout::new(descriptor)?),
        OperationKind::DecodeBase64 => Box::new(DecodeBase64::new(descriptor)?),
        OperationKind::LowercaseString => Box::new(LowercaseString::new(descriptor)?),
        OperationKind::Delete => Box::new(Delete::new(descriptor)?),
        OperationKind::Custom(name) => {
            return Err(OperationError::Unsupported {
                id: descriptor.id().to_string(),
                kind: name.clone(),
            });
        }
    };
    log::debug!("built {}", descriptor.describe());
    Ok(operation)
}

/// Identifier plus parsed source and target paths of one operation
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub id: String,
    pub source: Option<Path>,
    pub target: Option<Path>,
}

impl Endpoints {
    pub fn from_descriptor(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        let id = descriptor.id().to_string();
        let parse = |text: &Option<String>| -> Result<Option<Path>, OperationError> {
            text.as_deref()
                .map(Path::parse)
                .transpose()
                .map_err(|err| OperationError::path(&id, err))
        };
        let source = parse(&descriptor.source)?;
        let target = parse(&descriptor.target)?;
        Ok(Endpoints { id, source, target })
    }

    /// Read the source, or the whole payload when the source is unset or absent
    pub fn read(&self, record: &Record) -> FieldValue {
        if let Some(source) = &self.source {
            let value = record.get_path(source);
            if value.exists() {
                return value;
            }
            log::trace!("{}: source {} absent, reading whole payload", self.id, source);
        }
        record.get_path(&Path::payload_root())
    }

    /// Write to the target, or replace the payload when no target is set
    pub fn write(&self, record: &mut Record, value: Json) -> Result<(), OperationError> {
        match &self.target {
            Some(target) => record
                .set_path(target, value)
                .map_err(|err| OperationError::path(&self.id, err)),
            None => {
                record.set_payload(value);
                Ok(())
            }
        }
    }
}
