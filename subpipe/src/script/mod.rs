//! Script compiler
//!
//! Compiles the line-oriented pipeline notation into an ordered list of
//! [`OperationDescriptor`]s:
//!
//! ```text
//! # comments and blank lines are ignored
//! $.copy = $.original                    direct assignment
//! split($.data, separator="|")           builtin call
//! $.lower = lowercase($.name)            assignment with call
//! send_stdout(lowercase($.name))         nested calls are flattened
//! ```

mod classify;
mod error;
mod resolve;
mod tokenize;

pub use classify::{LineKind, classify_line};
pub use error::{SyntaxError, SyntaxErrorKind};
pub use resolve::{MAX_NESTING_DEPTH, NESTED_OUTPUT_FIELD};
pub use tokenize::{split_arguments, unquote};

use crate::types::OperationDescriptor;

/// Compile a whole script
///
/// The first failing line aborts compilation; no partial list is returned.
pub fn compile(script: &str) -> Result<Vec<OperationDescriptor>, SyntaxError> {
    let mut descriptors = Vec::new();
    let mut lines = 0;

    for (index, raw) in script.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        lines += 1;

        let compiled =
            resolve::compile_line(line).map_err(|kind| SyntaxError::new(index + 1, raw, kind))?;
        log::trace!("line {}: {} -> {} operation(s)", index + 1, line, compiled.len());
        descriptors.extend(compiled);
    }

    log::debug!(
        "compiled {} line(s) into {} operation(s)",
        lines,
        descriptors.len()
    );
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;

    #[test]
    fn test_compile_skips_comments_and_blank_lines() {
        let script = r#"
            # read lines
            split($.data, separator="|")

            # and print them
            print()
        "#;
        let ops = compile(script).unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].kind, OperationKind::SplitString);
        assert_eq!(ops[1].kind, OperationKind::SendStdout);
    }

    #[test]
    fn test_compile_empty_script() {
        assert!(compile("").unwrap().is_empty());
        assert!(compile("# nothing\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let script = "decompress()\nsplit()\n$.a = $.b\nprint(lower($.a))\ncustom(x, y, k=v)";
        assert_eq!(compile(script).unwrap(), compile(script).unwrap());
    }

    #[test]
    fn test_compile_error_reports_line() {
        let script = "print()\n\n  split($.a, $.b)\nprint()";
        let err = compile(script).unwrap_err();
        assert_eq!(err.line_number, 3);
        assert_eq!(err.line, "  split($.a, $.b)");
        assert!(matches!(err.kind, SyntaxErrorKind::PositionalNotAllowed(_)));
        assert!(err.to_string().contains("split($.a, $.b)"));
    }

    #[test]
    fn test_compile_rejects_garbage_line() {
        let err = compile("print()\nnot a statement").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidLine);
        assert_eq!(err.line_number, 2);
    }

    #[test]
    fn test_each_line_gets_fresh_intermediate_fields() {
        let ops = compile("print(lower($.a))\nprint(lower($.b))").unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].target.as_deref(), Some(NESTED_OUTPUT_FIELD));
        assert_eq!(ops[2].target.as_deref(), Some(NESTED_OUTPUT_FIELD));
    }
}
