//! Turning calls into operation descriptors and flattening nested calls
//!
//! `outer(inner($.x))` becomes two descriptors: `inner` reads `$.x` and writes
//! an intermediate payload field, and `outer` reads that field. Nested calls
//! are compiled recursively, so any depth up to [`MAX_NESTING_DEPTH`] works.

use crate::path::Path;
use crate::types::{OperationDescriptor, OperationKind, Value};

use super::classify::{LineKind, classify_line};
use super::error::SyntaxErrorKind;
use super::tokenize::{find_top_level, looks_like_call, parse_call, split_arguments, unquote};

/// Deepest call nesting a line may contain
pub const MAX_NESTING_DEPTH: usize = 32;

/// Payload field carrying the output of the first flattened call
pub const NESTED_OUTPUT_FIELD: &str = "$.nested_output";

/// Intermediate field for the n-th flattened call of a line
fn nested_output_field(n: usize) -> String {
    if n == 0 {
        NESTED_OUTPUT_FIELD.to_string()
    } else {
        format!("{}_{}", NESTED_OUTPUT_FIELD, n)
    }
}

/// Compile one classified line into descriptors
pub fn compile_line(line: &str) -> Result<Vec<OperationDescriptor>, SyntaxErrorKind> {
    let mut flattener = Flattener::default();
    flattener.line(line, 0)
}

/// Per-line state for handing out intermediate fields
#[derive(Debug, Default)]
struct Flattener {
    next_field: usize,
}

impl Flattener {
    fn line(
        &mut self,
        line: &str,
        depth: usize,
    ) -> Result<Vec<OperationDescriptor>, SyntaxErrorKind> {
        if depth > MAX_NESTING_DEPTH {
            return Err(SyntaxErrorKind::NestingTooDeep(MAX_NESTING_DEPTH));
        }

        match classify_line(line)? {
            LineKind::DirectAssignment { target, source } => {
                let descriptor = OperationDescriptor::new(OperationKind::DirectAssignment)
                    .with_source(source)
                    .with_target(target);
                Ok(vec![with_defaults(descriptor)])
            }
            LineKind::AssignmentWithCall { target, call } => {
                let mut descriptors = self.call(call, depth)?;
                if let Some(last) = descriptors.last_mut() {
                    last.target = Some(target.to_string());
                }
                Ok(descriptors)
            }
            LineKind::Call(call) => self.call(call, depth),
        }
    }

    fn call(
        &mut self,
        text: &str,
        depth: usize,
    ) -> Result<Vec<OperationDescriptor>, SyntaxErrorKind> {
        let (name, args) = parse_call(text)?;
        let mut builder = CallBuilder::new(OperationKind::from_name(name));
        for arg in split_arguments(args)? {
            builder.push(&arg)?;
        }

        let CallBuilder {
            descriptor, pending, ..
        } = builder;
        let mut descriptor = with_defaults(descriptor);
        let mut descriptors = Vec::new();

        for Pending { slot, call } in pending {
            let field = nested_output_field(self.next_field);
            self.next_field += 1;

            let mut nested = self.line(&call, depth + 1).map_err(|err| match err {
                SyntaxErrorKind::NestingTooDeep(_) => err,
                other => SyntaxErrorKind::NestedCall {
                    call: call.clone(),
                    source: Box::new(other),
                },
            })?;
            if let Some(last) = nested.last_mut() {
                last.target = Some(field.clone());
            }
            log::debug!(
                "flattened '{}' into {} operation(s) writing {}",
                call,
                nested.len(),
                field
            );
            descriptors.extend(nested);

            match slot {
                Slot::Source => descriptor.source = Some(field),
                Slot::Setting(key) => {
                    descriptor.settings.insert(key, Value::String(field));
                }
            }
        }

        descriptors.push(descriptor);
        Ok(descriptors)
    }
}

/// Where a flattened call's output gets wired into the outer descriptor
#[derive(Debug)]
enum Slot {
    Source,
    Setting(String),
}

#[derive(Debug)]
struct Pending {
    slot: Slot,
    call: String,
}

/// Accumulates one call's arguments
struct CallBuilder {
    descriptor: OperationDescriptor,
    pending: Vec<Pending>,
    positional: usize,
}

impl CallBuilder {
    fn new(kind: OperationKind) -> Self {
        CallBuilder {
            descriptor: OperationDescriptor::new(kind),
            pending: Vec::new(),
            positional: 0,
        }
    }

    /// Classify one raw argument, in priority order:
    /// `key=value`, legacy `key:value`, nested call, plain positional
    fn push(&mut self, arg: &str) -> Result<(), SyntaxErrorKind> {
        if let Some(eq) = find_top_level(arg, '=') {
            let (key, value) = named_parts(arg, eq)?;
            if looks_like_call(value) {
                let slot = match key {
                    "source" => Slot::Source,
                    "target" => return Err(SyntaxErrorKind::NestedCallNotAllowed(key.to_string())),
                    _ => Slot::Setting(key.to_string()),
                };
                self.defer(slot, value);
            } else {
                self.set_named(key, Value::String(unquote(value)));
            }
        } else if let Some(colon) = find_top_level(arg, ':') {
            let (key, value) = named_parts(arg, colon)?;
            self.set_named(key, coerce_legacy(value));
        } else {
            self.push_positional(arg)?;
        }
        Ok(())
    }

    fn push_positional(&mut self, arg: &str) -> Result<(), SyntaxErrorKind> {
        let index = self.positional;
        self.positional += 1;

        if !self.descriptor.kind.is_builtin() {
            let key = format!("arg{}", index);
            if looks_like_call(arg) {
                self.defer(Slot::Setting(key), arg);
            } else {
                self.descriptor
                    .settings
                    .insert(key, Value::String(unquote(arg)));
            }
            return Ok(());
        }

        if index > 0 {
            return Err(SyntaxErrorKind::PositionalNotAllowed(arg.to_string()));
        }
        if looks_like_call(arg) {
            self.defer(Slot::Source, arg);
        } else if Path::is_payload_path(arg) {
            self.descriptor.source = Some(arg.to_string());
        } else {
            return Err(SyntaxErrorKind::InvalidFirstPositional(arg.to_string()));
        }
        Ok(())
    }

    fn set_named(&mut self, key: &str, value: Value) {
        match (key, value) {
            ("source", Value::String(path)) => self.descriptor.source = Some(path),
            ("target", Value::String(path)) => self.descriptor.target = Some(path),
            (key, value) => {
                self.descriptor.settings.insert(key.to_string(), value);
            }
        }
    }

    fn defer(&mut self, slot: Slot, call: &str) {
        self.pending.push(Pending {
            slot,
            call: call.to_string(),
        });
    }
}

/// Split `key<sep>value` at `at`, requiring a usable key
fn named_parts(arg: &str, at: usize) -> Result<(&str, &str), SyntaxErrorKind> {
    let key = arg[..at].trim();
    let value = arg[at + 1..].trim();
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid_key {
        return Err(SyntaxErrorKind::InvalidNamedArgument(arg.to_string()));
    }
    Ok((key, value))
}

/// `key:value` arguments carry booleans and integers as typed values
fn coerce_legacy(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match value.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::String(value.trim_matches(['"', '\'']).to_string()),
        },
    }
}

/// Fill in default settings the line did not supply
fn with_defaults(mut descriptor: OperationDescriptor) -> OperationDescriptor {
    let mut defaults: Vec<(&str, Value)> = Vec::new();
    match descriptor.kind {
        OperationKind::Custom(_) => return descriptor,
        OperationKind::SplitString => defaults.push(("separator", Value::from("\n"))),
        _ => {}
    }
    defaults.push(("id", Value::from(descriptor.kind.as_str())));

    for (key, value) in defaults {
        descriptor.settings.entry(key.to_string()).or_insert(value);
    }
    descriptor
}
