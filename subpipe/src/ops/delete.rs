use super::{Endpoints, Operation};
use crate::error::OperationError;
use crate::path::Path;
use crate::types::{OperationDescriptor, Record};

/// Field that receives the removed value when no target is configured
pub const DELETED_VALUE_FIELD: &str = "$.deleted_value";

/// Removes the source path, keeping the removed value at the target
///
/// `$.moved = delete($.field)` therefore moves a field. Without a target the
/// removed value lands in [`DELETED_VALUE_FIELD`]. Deleting an absent field
/// leaves the record unchanged.
#[derive(Debug)]
pub struct Delete {
    endpoints: Endpoints,
    source: Path,
    target: Path,
}

impl Delete {
    pub fn new(descriptor: &OperationDescriptor) -> Result<Self, OperationError> {
        let endpoints = Endpoints::from_descriptor(descriptor)?;
        let Some(source) = endpoints.source.clone() else {
            return Err(OperationError::config(
                &endpoints.id,
                "a path to delete is required",
            ));
        };
        let target = match &endpoints.target {
            Some(target) => target.clone(),
            None => Path::parse(DELETED_VALUE_FIELD)
                .map_err(|err| OperationError::path(&endpoints.id, err))?,
        };
        Ok(Delete {
            endpoints,
            source,
            target,
        })
    }
}

impl Operation for Delete {
    fn id(&self) -> &str {
        &self.endpoints.id
    }

    fn apply(&self, mut record: Record) -> Result<Vec<Record>, OperationError> {
        if record.is_control() {
            return Ok(vec![record]);
        }

        let removed = record.get_path(&self.source);
        if !removed.exists() {
            log::trace!("{}: nothing at {}", self.endpoints.id, self.source);
            return Ok(vec![record]);
        }

        let id = &self.endpoints.id;
        record
            .delete_path(&self.source)
            .map_err(|err| OperationError::path(id, err))?;
        record
            .set_path(&self.target, removed.into_value())
            .map_err(|err| OperationError::path(id, err))?;
        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;
    use serde_json::json;

    fn delete(source: &str) -> OperationDescriptor {
        OperationDescriptor::new(OperationKind::Delete).with_source(source)
    }

    #[test]
    fn test_delete_stores_removed_value() {
        let op = Delete::new(&delete("$.secret")).unwrap();
        let out = op.apply(Record::new(json!({"secret": "x", "keep": 1}))).unwrap();
        assert_eq!(out[0].payload(), Some(&json!({"keep": 1, "deleted_value": "x"})));
    }

    #[test]
    fn test_delete_with_target_moves_field() {
        let op = Delete::new(&delete("$.old").with_target("meta.$.archived")).unwrap();
        let out = op.apply(Record::new(json!({"old": [1, 2]}))).unwrap();
        assert_eq!(out[0].payload(), Some(&json!({})));
        assert_eq!(out[0].metadata(), Some(&json!({"archived": [1, 2]})));
    }

    #[test]
    fn test_delete_absent_field_is_noop() {
        let op = Delete::new(&delete("$.missing")).unwrap();
        let record = Record::new(json!({"a": 1}));
        assert_eq!(op.apply(record.clone()).unwrap(), vec![record]);
    }

    #[test]
    fn test_delete_array_element_nulls_slot() {
        let op = Delete::new(&delete("$.items.0").with_target("$.first")).unwrap();
        let out = op.apply(Record::new(json!({"items": ["a", "b"]}))).unwrap();
        assert_eq!(out[0].payload(), Some(&json!({"items": [null, "b"], "first": "a"})));
    }

    #[test]
    fn test_delete_requires_source() {
        let err = Delete::new(&OperationDescriptor::new(OperationKind::Delete)).unwrap_err();
        assert!(matches!(err, OperationError::Config { .. }));
    }
}
