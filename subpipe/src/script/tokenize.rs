//! Quote- and parenthesis-aware scanning of call text

use super::error::SyntaxErrorKind;

/// Classification of one scanned character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scanned {
    /// Inside a quoted string, or the quote itself
    Quoted,
    /// Inside parentheses, or a parenthesis that did not close the outer level
    Nested,
    /// A `)` with no matching `(`
    Close,
    /// Everything else
    TopLevel,
}

/// Forward scanner tracking the open quote and parenthesis depth
///
/// Quotes only open at depth zero; inside an open quote every character is
/// literal, and a backslash escapes the next one.
#[derive(Debug, Default)]
struct Scanner {
    quote: Option<char>,
    depth: usize,
    escaped: bool,
}

impl Scanner {
    fn feed(&mut self, ch: char) -> Scanned {
        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == quote {
                self.quote = None;
            }
            return Scanned::Quoted;
        }

        match ch {
            '"' | '\'' if self.depth == 0 => {
                self.quote = Some(ch);
                Scanned::Quoted
            }
            '(' => {
                self.depth += 1;
                Scanned::Nested
            }
            ')' if self.depth == 0 => Scanned::Close,
            ')' => {
                self.depth -= 1;
                Scanned::Nested
            }
            _ if self.depth > 0 => Scanned::Nested,
            _ => Scanned::TopLevel,
        }
    }

    /// Report an unfinished quote or parenthesis once the input is exhausted
    fn finish(&self, text: &str) -> Result<(), SyntaxErrorKind> {
        if let Some(quote) = self.quote {
            return Err(SyntaxErrorKind::UnterminatedQuote {
                quote,
                text: text.to_string(),
            });
        }
        if self.depth != 0 {
            return Err(SyntaxErrorKind::UnbalancedParens(text.to_string()));
        }
        Ok(())
    }
}

/// Split an argument list on top-level commas
///
/// Arguments come back trimmed and still quoted; empty ones are dropped.
pub fn split_arguments(text: &str) -> Result<Vec<String>, SyntaxErrorKind> {
    let mut scanner = Scanner::default();
    let mut args = Vec::new();
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match scanner.feed(ch) {
            Scanned::TopLevel if ch == ',' => {
                push_argument(&mut args, &text[start..i]);
                start = i + 1;
            }
            Scanned::Close => return Err(SyntaxErrorKind::UnbalancedParens(text.to_string())),
            _ => {}
        }
    }
    scanner.finish(text)?;
    push_argument(&mut args, &text[start..]);

    Ok(args)
}

fn push_argument(args: &mut Vec<String>, raw: &str) {
    let arg = raw.trim();
    if !arg.is_empty() {
        args.push(arg.to_string());
    }
}

/// Byte offset of the first `target` outside quotes and parentheses
pub fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut scanner = Scanner::default();
    text.char_indices()
        .find(|&(_, ch)| scanner.feed(ch) == Scanned::TopLevel && ch == target)
        .map(|(i, _)| i)
}

/// Split `name(args)` into the function name and the text between its parentheses
pub fn parse_call(text: &str) -> Result<(&str, &str), SyntaxErrorKind> {
    let text = text.trim();
    let open = text.find('(').ok_or(SyntaxErrorKind::InvalidLine)?;

    let name = text[..open].trim();
    if !is_identifier(name) {
        return Err(SyntaxErrorKind::InvalidFunctionName(name.to_string()));
    }

    let body = &text[open + 1..];
    let mut scanner = Scanner::default();
    let close = body
        .char_indices()
        .find(|&(_, ch)| scanner.feed(ch) == Scanned::Close)
        .map(|(i, _)| i);

    let Some(close) = close else {
        scanner.finish(text)?;
        return Err(SyntaxErrorKind::UnbalancedParens(text.to_string()));
    };

    let rest = body[close + 1..].trim();
    if !rest.is_empty() {
        return Err(SyntaxErrorKind::TrailingText(rest.to_string()));
    }

    Ok((name, &body[..close]))
}

/// Whether an argument is itself a function call
pub fn looks_like_call(arg: &str) -> bool {
    !arg.starts_with(['"', '\'']) && arg.contains('(') && arg.ends_with(')')
}

/// Letters, digits and underscores, not starting with a digit
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one layer of matching quotes and resolve escapes
///
/// Text that is not wrapped in matching quotes comes back unchanged.
pub fn unquote(text: &str) -> String {
    let inner = match text.chars().next() {
        Some(quote @ ('"' | '\'')) if text.len() >= 2 && text.ends_with(quote) => {
            &text[1..text.len() - 1]
        }
        _ => return text.to_string(),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other @ ('\\' | '"' | '\'')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_arguments() {
        let args = split_arguments(r#"$.data, separator="|""#).unwrap();
        assert_eq!(args, vec!["$.data", r#"separator="|""#]);
    }

    #[test]
    fn test_split_empty_and_blank() {
        assert!(split_arguments("").unwrap().is_empty());
        assert!(split_arguments("  ").unwrap().is_empty());
        assert_eq!(split_arguments("a,,b, ").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_split_keeps_quoted_commas_and_parens() {
        let args = split_arguments(r#"sep=",", text='a(b', x"#).unwrap();
        assert_eq!(args, vec![r#"sep=",""#, "text='a(b'", "x"]);
    }

    #[test]
    fn test_split_keeps_nested_calls_whole() {
        let args = split_arguments("lower(split($.a, separator=x)), id=outer").unwrap();
        assert_eq!(args, vec!["lower(split($.a, separator=x))", "id=outer"]);
    }

    #[test]
    fn test_split_escaped_quote_inside_string() {
        let args = split_arguments(r#"msg="say \"hi\", ok", y"#).unwrap();
        assert_eq!(args, vec![r#"msg="say \"hi\", ok""#, "y"]);
    }

    #[test]
    fn test_split_unterminated_quote() {
        let err = split_arguments(r#"a, "open"#).unwrap_err();
        assert!(matches!(err, SyntaxErrorKind::UnterminatedQuote { quote: '"', .. }));
    }

    #[test]
    fn test_split_unbalanced_parens() {
        assert!(matches!(
            split_arguments("f(a, b"),
            Err(SyntaxErrorKind::UnbalancedParens(_))
        ));
        assert!(matches!(
            split_arguments("a), b"),
            Err(SyntaxErrorKind::UnbalancedParens(_))
        ));
    }

    #[test]
    fn test_find_top_level() {
        assert_eq!(find_top_level("key=value", '='), Some(3));
        assert_eq!(find_top_level(r#""a=b""#, '='), None);
        assert_eq!(find_top_level("f(a=b)", '='), None);
        assert_eq!(find_top_level("sep=f(a:b)", ':'), None);
    }

    #[test]
    fn test_parse_call() {
        assert_eq!(parse_call("print()").unwrap(), ("print", ""));
        assert_eq!(
            parse_call(" split($.a, separator=\")\")  ").unwrap(),
            ("split", "$.a, separator=\")\"")
        );
        assert_eq!(
            parse_call("outer(inner($.x))").unwrap(),
            ("outer", "inner($.x)")
        );
    }

    #[test]
    fn test_parse_call_errors() {
        assert!(matches!(parse_call("split($.a"), Err(SyntaxErrorKind::UnbalancedParens(_))));
        assert!(matches!(
            parse_call("split($.a) extra"),
            Err(SyntaxErrorKind::TrailingText(_))
        ));
        assert!(matches!(
            parse_call("$.x(1)"),
            Err(SyntaxErrorKind::InvalidFunctionName(_))
        ));
        assert!(matches!(
            parse_call(r#"f("unterminated)"#),
            Err(SyntaxErrorKind::UnterminatedQuote { .. })
        ));
    }

    #[test]
    fn test_looks_like_call() {
        assert!(looks_like_call("lower($.x)"));
        assert!(!looks_like_call("\"lower($.x)\""));
        assert!(!looks_like_call("$.x"));
        assert!(!looks_like_call("(a) b"));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a|b""#), "a|b");
        assert_eq!(unquote("'single'"), "single");
        assert_eq!(unquote(r#""\n""#), "\n");
        assert_eq!(unquote(r#""it\'s \"x\"""#), r#"it's "x""#);
        assert_eq!(unquote(r#""\d""#), r"\d");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("\"mismatched'"), "\"mismatched'");
        assert_eq!(unquote("\""), "\"");
    }
}
