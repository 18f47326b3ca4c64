//! Line-oriented parser for tool documentation blocks.
//!
//! ```text
//! Return the weather forecast for a location.
//! :param unit: str: Temperature unit
//!     Must be one of: "celsius", "fahrenheit"
//!     Default: celsius
//! ```

use crate::error::{DocumentationFault, ToolError};

const MARKER: &str = ":param";
const ENUM_DIRECTIVE: &str = "Must be one of:";
const DEFAULT_DIRECTIVE: &str = "Default:";

/// A documentation block split into its summary line and parameter sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocBlock {
    pub description: String,
    pub params: Vec<ParamDoc>,
}

/// Raw text collected for one `:param` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParamDoc {
    pub name: String,
    pub type_token: String,
    lines: Vec<String>,
}

/// Prose and directives of a parameter once its lines are closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParamText {
    pub description: String,
    pub enum_values: Option<Vec<String>>,
    pub default: Option<String>,
}

impl DocBlock {
    pub fn parse(function: &str, text: &str) -> Result<Self, ToolError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ToolError::malformed(function, DocumentationFault::Empty));
        }

        let mut lines = text.lines();
        let description = lines.next().unwrap_or_default().trim().to_owned();

        let mut params = Vec::new();
        let mut open: Option<ParamDoc> = None;

        for (idx, line) in lines.enumerate() {
            let line = line.trim();
            if line.starts_with(MARKER) {
                params.extend(open.take());
                // `idx` counts from the second line of the block
                open = Some(ParamDoc::from_marker(function, idx + 2, line)?);
            } else if let Some(param) = open.as_mut() {
                param.lines.push(line.to_owned());
            } else if !line.is_empty() {
                tracing::debug!(function, line, "dropping text before the first parameter");
            }
        }
        params.extend(open);

        Ok(DocBlock {
            description,
            params,
        })
    }
}

impl ParamDoc {
    fn from_marker(function: &str, line_no: usize, line: &str) -> Result<Self, ToolError> {
        // `:param lat: float: The latitude` -> ["param lat", " float", " The latitude"]
        let segments: Vec<&str> = line.split(':').skip(1).collect();
        if segments.len() < 3 {
            return Err(ToolError::malformed(
                function,
                DocumentationFault::MarkerSegments {
                    line: line_no,
                    text: line.to_owned(),
                },
            ));
        }

        let mut head = segments[0].split_whitespace();
        let _tag = head.next();
        let Some(name) = head.last() else {
            return Err(ToolError::malformed(
                function,
                DocumentationFault::MissingParameterName {
                    line: line_no,
                    text: line.to_owned(),
                },
            ));
        };

        Ok(ParamDoc {
            name: name.to_owned(),
            type_token: segments[1].trim().to_owned(),
            lines: vec![segments[2..].join(":").trim().to_owned()],
        })
    }

    /// Split the collected lines into prose and directives.
    ///
    /// Prose lines are joined with single spaces; blank lines are dropped
    /// rather than contributing an extra space.
    pub fn text(&self) -> ParamText {
        let mut prose = Vec::new();
        let mut enum_values = None;
        let mut default = None;

        for line in &self.lines {
            if let Some(list) = line.strip_prefix(ENUM_DIRECTIVE) {
                let values: Vec<String> = list
                    .trim()
                    .split("\", \"")
                    .map(|v| v.trim_matches('"').to_owned())
                    .filter(|v| !v.is_empty())
                    .collect();
                enum_values = Some(values).filter(|v| !v.is_empty());
            } else if let Some(value) = line.strip_prefix(DEFAULT_DIRECTIVE) {
                default = Some(value.trim().to_owned()).filter(|v| !v.is_empty());
            } else if !line.is_empty() {
                prose.push(line.as_str());
            }
        }

        ParamText {
            description: prose.join(" ").trim().to_owned(),
            enum_values,
            default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(doc: &str) -> DocBlock {
        DocBlock::parse("f", doc).unwrap()
    }

    fn fault(doc: &str) -> DocumentationFault {
        match DocBlock::parse("f", doc).unwrap_err() {
            ToolError::MalformedDocumentation { function, reason } => {
                assert_eq!(function, "f");
                reason
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_summary_only() {
        let block = parse("  Return the current time in the format HH:MM\n    ");
        assert_eq!(block.description, "Return the current time in the format HH:MM");
        assert!(block.params.is_empty());
    }

    #[test]
    fn test_marker_splits_name_type_and_text() {
        let block = parse("Summary\n:param lat: float: The latitude: north is positive");
        let param = &block.params[0];
        assert_eq!(param.name, "lat");
        assert_eq!(param.type_token, "float");
        assert_eq!(param.text().description, "The latitude: north is positive");
    }

    #[test]
    fn test_continuation_lines_join_with_spaces() {
        let block = parse(
            "Summary\n:param query: str: What to search for,\n    phrased as a question\n\n    in English",
        );
        assert_eq!(
            block.params[0].text().description,
            "What to search for, phrased as a question in English"
        );
    }

    #[test]
    fn test_text_before_first_marker_is_dropped() {
        let block = parse("Summary\nmore summary text\n:param a: int: first");
        assert_eq!(block.description, "Summary");
        assert_eq!(block.params.len(), 1);
        assert_eq!(block.params[0].text().description, "first");
    }

    #[test]
    fn test_directives_are_extracted() {
        let block = parse(
            "Summary\n:param unit: str: Temperature unit\n  Must be one of: \"celsius\", \"fahrenheit\"\n  Default: celsius",
        );
        let text = block.params[0].text();
        assert_eq!(text.description, "Temperature unit");
        assert_eq!(
            text.enum_values,
            Some(vec!["celsius".to_owned(), "fahrenheit".to_owned()])
        );
        assert_eq!(text.default.as_deref(), Some("celsius"));
    }

    #[test]
    fn test_directive_on_marker_line() {
        let block = parse("Summary\n:param mode: str: Must be one of: \"a\", \"b\"");
        let text = block.params[0].text();
        assert_eq!(text.description, "");
        assert_eq!(text.enum_values, Some(vec!["a".to_owned(), "b".to_owned()]));
    }

    #[test]
    fn test_empty_directives_are_ignored() {
        let block = parse("Summary\n:param n: int: Count\nDefault:\nMust be one of:");
        let text = block.params[0].text();
        assert_eq!(text.default, None);
        assert_eq!(text.enum_values, None);
    }

    #[test]
    fn test_default_keeps_text_after_first_colon() {
        let block = parse("Summary\n:param at: str: Start time\nDefault: 10:30");
        assert_eq!(block.params[0].text().default.as_deref(), Some("10:30"));
    }

    #[test]
    fn test_empty_documentation_is_rejected() {
        assert_eq!(fault(""), DocumentationFault::Empty);
        assert_eq!(fault(" \n\t \n"), DocumentationFault::Empty);
    }

    #[test]
    fn test_short_marker_is_rejected() {
        assert_eq!(
            fault("Summary\nok line\n:param lat: float"),
            DocumentationFault::MarkerSegments {
                line: 3,
                text: ":param lat: float".to_owned(),
            }
        );
    }

    #[test]
    fn test_marker_without_name_is_rejected() {
        assert!(matches!(
            fault("Summary\n:param: float: no name"),
            DocumentationFault::MissingParameterName { line: 2, .. }
        ));
    }
}
