//! Pipeline engine - instantiates operations and applies them to record batches

use crate::error::{Error, OperationError};
use crate::ops::{self, Factory, Operation};
use crate::script;
use crate::types::{OperationDescriptor, Record};

/// An ordered list of instantiated operations
///
/// Compile once, apply many times: `apply` borrows the pipeline immutably,
/// so one pipeline may serve concurrent callers that each own their batch.
pub struct Pipeline {
    operations: Vec<Box<dyn Operation>>,
}

impl Pipeline {
    /// Instantiate descriptors with the builtin factory
    pub fn new(descriptors: &[OperationDescriptor]) -> Result<Self, OperationError> {
        Self::with_factory(descriptors, ops::build)
    }

    /// Instantiate descriptors with a host-supplied factory
    pub fn with_factory(
        descriptors: &[OperationDescriptor],
        factory: Factory,
    ) -> Result<Self, OperationError> {
        let operations = descriptors
            .iter()
            .map(factory)
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("pipeline ready with {} operation(s)", operations.len());
        Ok(Pipeline { operations })
    }

    /// Compile a script and instantiate it with the builtin factory
    pub fn from_script(text: &str) -> Result<Self, Error> {
        let descriptors = script::compile(text)?;
        Ok(Self::new(&descriptors)?)
    }

    /// Wrap operations that were built elsewhere
    pub fn from_operations(operations: Vec<Box<dyn Operation>>) -> Self {
        Pipeline { operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Identifiers of the operations, in order
    pub fn ids(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.id()).collect()
    }

    /// Run a batch through every operation
    pub fn apply(&self, records: Vec<Record>) -> Result<Vec<Record>, OperationError> {
        apply(&self.operations, records)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("operations", &self.ids())
            .finish()
    }
}

/// Apply operations in order to a batch of records
///
/// Each operation sees every record produced by the previous one, in order;
/// its outputs are concatenated into the next batch. The first failure aborts
/// the run and no records are returned.
pub fn apply(
    operations: &[Box<dyn Operation>],
    records: Vec<Record>,
) -> Result<Vec<Record>, OperationError> {
    let mut batch = records;

    for (stage, operation) in operations.iter().enumerate() {
        if batch.is_empty() {
            log::debug!("batch empty before stage {} ({}), stopping", stage, operation.id());
            break;
        }

        let input = batch.len();
        let mut next = Vec::with_capacity(input);
        for record in batch {
            match operation.apply(record) {
                Ok(outputs) => next.extend(outputs),
                Err(err) => {
                    log::warn!(
                        "stage {} ({}) failed, aborting batch: {}",
                        stage,
                        operation.id(),
                        err
                    );
                    return Err(err);
                }
            }
        }

        log::debug!(
            "stage {} ({}): {} -> {} record(s)",
            stage,
            operation.id(),
            input,
            next.len()
        );
        batch = next;
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails on the n-th record it sees
    struct FailOn {
        n: usize,
        seen: AtomicUsize,
    }

    impl Operation for FailOn {
        fn id(&self) -> &str {
            "fail_on"
        }

        fn apply(&self, record: Record) -> Result<Vec<Record>, OperationError> {
            if self.seen.fetch_add(1, Ordering::SeqCst) == self.n {
                return Err(OperationError::input("fail_on", "boom"));
            }
            Ok(vec![record])
        }
    }

    /// Counts calls, passes records through
    struct Counter(Arc<AtomicUsize>);

    impl Operation for Counter {
        fn id(&self) -> &str {
            "counter"
        }

        fn apply(&self, record: Record) -> Result<Vec<Record>, OperationError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![record])
        }
    }

    /// Drops every record
    struct DropAll;

    impl Operation for DropAll {
        fn id(&self) -> &str {
            "drop"
        }

        fn apply(&self, _record: Record) -> Result<Vec<Record>, OperationError> {
            Ok(Vec::new())
        }
    }

    fn batch(n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new(json!({ "n": i }))).collect()
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let out = apply(&[], batch(3)).unwrap();
        assert_eq!(out, batch(3));
    }

    #[test]
    fn test_failure_discards_all_output() {
        let after = Arc::new(AtomicUsize::new(0));
        let ops: Vec<Box<dyn Operation>> = vec![
            Box::new(Counter(Arc::new(AtomicUsize::new(0)))),
            Box::new(FailOn {
                n: 3,
                seen: AtomicUsize::new(0),
            }),
            Box::new(Counter(Arc::clone(&after))),
        ];

        let err = apply(&ops, batch(5)).unwrap_err();
        assert_eq!(err.id(), "fail_on");
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_batch_stops_early() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ops: Vec<Box<dyn Operation>> =
            vec![Box::new(DropAll), Box::new(Counter(Arc::clone(&calls)))];
        assert!(apply(&ops, batch(4)).unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pipeline_from_script() {
        let pipeline = Pipeline::from_script(
            "split($.data, separator=\"|\")\n\
             $.upper = $\n\
             lowercase(source=$.upper, target=$.lower)",
        )
        .unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline.ids(),
            vec!["split_string", "direct_assignment", "lowercase_string"]
        );
    }

    #[test]
    fn test_pipeline_rejects_custom_without_factory() {
        let err = Pipeline::from_script("enrich($.x)").unwrap_err();
        assert!(matches!(err, Error::Operation(OperationError::Unsupported { .. })));
    }

    #[test]
    fn test_pipeline_with_custom_factory() {
        fn factory(descriptor: &OperationDescriptor) -> Result<Box<dyn Operation>, OperationError> {
            match &descriptor.kind {
                OperationKind::Custom(name) if name == "drop" => Ok(Box::new(DropAll)),
                _ => ops::build(descriptor),
            }
        }

        let descriptors = script::compile("drop()\nlowercase()").unwrap();
        let pipeline = Pipeline::with_factory(&descriptors, factory).unwrap();
        assert!(pipeline.apply(batch(2)).unwrap().is_empty());
    }

    #[test]
    fn test_control_records_survive_every_stage() {
        let pipeline = Pipeline::from_script("lowercase()\nsplit()\ndelete($.x)").unwrap();
        let out = pipeline.apply(vec![Record::control()]).unwrap();
        assert_eq!(out, vec![Record::control()]);
    }
}
