// Leading `#!` directive handling
// The grammar has no notion of interpreter lines, so the pipeline takes the
// directive off before parsing and puts it back verbatim afterwards.

use std::sync::LazyLock;

use regex::Regex;

/// `#!` at the very start of the text, through the end of that line
/// including its line terminator
static DIRECTIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#![^\r\n]*(?:\r\n|\n|\r)?").unwrap());

/// Source with its directive line split off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<'s> {
    pub directive: Option<&'s str>,
    pub body: &'s str,
}

impl Split<'_> {
    /// Lines taken up by the directive, to map body positions back onto the
    /// full text
    pub fn line_offset(&self) -> usize {
        usize::from(self.directive.is_some())
    }
}

/// Split a leading directive line from `source`
pub fn strip(source: &str) -> Split<'_> {
    match DIRECTIVE_PATTERN.find(source) {
        Some(m) => Split {
            directive: Some(m.as_str()),
            body: &source[m.end()..],
        },
        None => Split {
            directive: None,
            body: source,
        },
    }
}

/// Prefix `code` with the directive captured by [`strip`]
pub fn reattach(directive: Option<&str>, code: String) -> String {
    match directive {
        Some(directive) => {
            let mut out = String::with_capacity(directive.len() + code.len() + 1);
            out.push_str(directive);
            // A directive on the last line of its file has no terminator
            if !directive.ends_with(['\n', '\r']) && !code.is_empty() {
                out.push('\n');
            }
            out.push_str(&code);
            out
        }
        None => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_directive_with_newline() {
        let split = strip("#!/usr/bin/env node\nvar a;\n");
        assert_eq!(split.directive, Some("#!/usr/bin/env node\n"));
        assert_eq!(split.body, "var a;\n");
        assert_eq!(split.line_offset(), 1);
    }

    #[test]
    fn test_strip_crlf_directive() {
        let split = strip("#!/bin/echo\r\nvar a;");
        assert_eq!(split.directive, Some("#!/bin/echo\r\n"));
        assert_eq!(split.body, "var a;");
    }

    #[test]
    fn test_no_directive() {
        let split = strip("var a;\n#!not-first\n");
        assert_eq!(split.directive, None);
        assert_eq!(split.body, "var a;\n#!not-first\n");
        assert_eq!(split.line_offset(), 0);
    }

    #[test]
    fn test_directive_must_start_the_text() {
        assert_eq!(strip(" #!/bin/sh\n").directive, None);
    }

    #[test]
    fn test_directive_only() {
        let split = strip("#!/usr/bin/env node");
        assert_eq!(split.directive, Some("#!/usr/bin/env node"));
        assert_eq!(split.body, "");
        assert_eq!(reattach(split.directive, String::new()), "#!/usr/bin/env node");
    }

    #[test]
    fn test_reattach() {
        assert_eq!(
            reattach(Some("#!/usr/bin/env node\n"), "var a;\n".to_string()),
            "#!/usr/bin/env node\nvar a;\n"
        );
        assert_eq!(
            reattach(Some("#!/usr/bin/env node"), "var a;\n".to_string()),
            "#!/usr/bin/env node\nvar a;\n"
        );
        assert_eq!(reattach(None, "var a;\n".to_string()), "var a;\n");
    }
}
