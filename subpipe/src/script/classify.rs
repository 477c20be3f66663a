//! Deciding what kind of statement a script line is

use super::error::SyntaxErrorKind;

/// Shape of one script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `target = source`, both paths
    DirectAssignment { target: &'a str, source: &'a str },
    /// `target = call(...)`; the target overrides whatever the call sets
    AssignmentWithCall { target: &'a str, call: &'a str },
    /// `call(...)`
    Call(&'a str),
}

/// Classify a trimmed, non-blank, non-comment line
pub fn classify_line(line: &str) -> Result<LineKind<'_>, SyntaxErrorKind> {
    let equals = line.find('=');
    let open = line.find('(');

    match (equals, open) {
        (Some(eq), None) => {
            let target = line[..eq].trim();
            let source = line[eq + 1..].trim();
            if target.is_empty() || source.is_empty() {
                return Err(SyntaxErrorKind::IncompleteAssignment);
            }
            Ok(LineKind::DirectAssignment { target, source })
        }
        (Some(eq), Some(open)) if open > eq => {
            let target = line[..eq].trim();
            let call = line[eq + 1..].trim();
            if target.is_empty() {
                return Err(SyntaxErrorKind::IncompleteAssignment);
            }
            Ok(LineKind::AssignmentWithCall { target, call })
        }
        (_, Some(_)) if line.trim_end().ends_with(')') => Ok(LineKind::Call(line.trim())),
        (_, Some(_)) => Err(SyntaxErrorKind::UnbalancedParens(line.to_string())),
        (None, None) => Err(SyntaxErrorKind::InvalidLine),
    }
}
