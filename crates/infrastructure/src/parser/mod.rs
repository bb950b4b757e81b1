//! `.hit` definition-file parser.
//!
//! The format is line-oriented. A file holds blocks separated by blank
//! lines: at most one `@_global` configuration block (YAML between `~`
//! delimiters) and any number of request blocks:
//!
//! ```text
//! @createUser
//! POST /users
//! x-request-source: cli
//! ~y2j
//! name: "@1"
//! ~
//! ```
//!
//! Comment lines start with `#` and are skipped everywhere except
//! inside a `~`-delimited body, where they are content. Parsing is a
//! pure function of the input text.

pub mod loader;

use quiver_domain::{
    BodyDef, BodyEncoding, GlobalSection, HitFile, Method, RequestDef, is_valid_request_id,
};
use thiserror::Error;

/// Errors raised while parsing definition text.
///
/// Every variant carries the 1-based line number it was detected at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line starts with `@` but is not a valid request identifier.
    #[error("line {line}: invalid id: '{text}'")]
    InvalidId {
        /// The offending line.
        text: String,
        /// 1-based source line.
        line: usize,
    },

    /// The `@_global` line is not followed by an opening `~`.
    #[error("line {line}: expected '~' in the @_global section")]
    GlobalNotDelimited {
        /// 1-based source line.
        line: usize,
    },

    /// The `@_global` section is missing its closing `~`.
    #[error("line {line}: expected '~' to terminate the @_global section")]
    GlobalUnterminated {
        /// 1-based source line.
        line: usize,
    },

    /// The `@_global` YAML could not be decoded.
    #[error("line {line}: parse @_global section: {message}")]
    GlobalDecode {
        /// Decoder diagnostic.
        message: String,
        /// 1-based source line of the section's first YAML line.
        line: usize,
    },

    /// A request block is empty.
    #[error("line {line}: request '@{id}' has no request line")]
    EmptyRequest {
        /// ID of the block.
        id: String,
        /// 1-based source line.
        line: usize,
    },

    /// The first line of a request block is not `<METHOD> </path…>`.
    #[error("line {line}: invalid request line: '{text}'")]
    InvalidRequestLine {
        /// The offending line.
        text: String,
        /// 1-based source line.
        line: usize,
    },

    /// A header line is not of the form `Key: Value`.
    #[error("line {line}: invalid header line: '{text}'")]
    InvalidHeaderLine {
        /// The offending line.
        text: String,
        /// 1-based source line.
        line: usize,
    },

    /// The token after the opening `~` names no known encoding.
    #[error("line {line}: unknown body encoding '{encoding}'")]
    UnknownBodyEncoding {
        /// The encoding token as written.
        encoding: String,
        /// 1-based source line.
        line: usize,
    },

    /// A body was opened with `~` but never closed.
    #[error("line {line}: expected '~' to terminate the body")]
    UnterminatedBody {
        /// 1-based source line.
        line: usize,
    },

    /// A line that fits no construct at this position.
    #[error("line {line}: unexpected line: '{text}'")]
    UnexpectedLine {
        /// The offending line.
        text: String,
        /// 1-based source line.
        line: usize,
    },
}

impl ParseError {
    /// Returns the 1-based source line this error was detected at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::InvalidId { line, .. }
            | Self::GlobalNotDelimited { line }
            | Self::GlobalUnterminated { line }
            | Self::GlobalDecode { line, .. }
            | Self::EmptyRequest { line, .. }
            | Self::InvalidRequestLine { line, .. }
            | Self::InvalidHeaderLine { line, .. }
            | Self::UnknownBodyEncoding { line, .. }
            | Self::UnterminatedBody { line }
            | Self::UnexpectedLine { line, .. } => *line,
        }
    }
}

/// Parses definition text into a [`HitFile`].
///
/// # Errors
///
/// Returns a line-numbered [`ParseError`] on the first malformed
/// construct.
pub fn parse(text: &str) -> Result<HitFile, ParseError> {
    let mut cursor = Cursor::new(text);
    let mut file = HitFile::default();

    while let Some(line) = cursor.current() {
        if line.is_empty() || line.starts_with('#') {
            cursor.advance();
            continue;
        }
        if line == "@_global" {
            cursor.advance();
            file.global = parse_global(&mut cursor)?;
            continue;
        }
        if let Some(id) = line.strip_prefix('@') {
            if !is_valid_request_id(id) {
                return Err(ParseError::InvalidId {
                    text: line.to_string(),
                    line: cursor.line_number(),
                });
            }
            let id = id.to_string();
            cursor.advance();
            file.requests.push(parse_request(id, &mut cursor)?);
            continue;
        }
        return Err(ParseError::UnexpectedLine {
            text: line.to_string(),
            line: cursor.line_number(),
        });
    }

    Ok(file)
}

/// Parses the `~`-delimited YAML of a `@_global` block. The cursor
/// stands just past the `@_global` line.
fn parse_global(cursor: &mut Cursor<'_>) -> Result<GlobalSection, ParseError> {
    cursor.skip_comments();
    if cursor.current() != Some("~") {
        return Err(ParseError::GlobalNotDelimited {
            line: cursor.line_number(),
        });
    }
    cursor.advance();

    let yaml_start = cursor.line_number();
    let mut yaml = String::new();
    loop {
        match cursor.current() {
            None | Some("") => {
                return Err(ParseError::GlobalUnterminated {
                    line: cursor.line_number(),
                });
            }
            Some("~") => {
                cursor.advance();
                break;
            }
            Some(line) => {
                yaml.push_str(line);
                yaml.push('\n');
                cursor.advance();
            }
        }
    }

    if yaml.trim().is_empty() {
        return Ok(GlobalSection::default());
    }
    serde_yaml::from_str(&yaml).map_err(|e| ParseError::GlobalDecode {
        message: e.to_string(),
        line: yaml_start,
    })
}

/// Parses one request block. The cursor stands just past the `@<id>`
/// line.
fn parse_request(id: String, cursor: &mut Cursor<'_>) -> Result<RequestDef, ParseError> {
    cursor.skip_comments();
    let request_line = match cursor.current() {
        None | Some("") => {
            return Err(ParseError::EmptyRequest {
                id,
                line: cursor.line_number(),
            });
        }
        Some(line) => line,
    };
    let (method, path) = parse_request_line(request_line, cursor.line_number())?;
    cursor.advance();

    let mut headers: Vec<(String, Vec<String>)> = Vec::new();
    let mut body = None;

    loop {
        cursor.skip_comments();
        match cursor.current() {
            None | Some("") => break,
            Some(line) if line.starts_with('~') => {
                body = Some(parse_body(line, cursor)?);
                cursor.skip_comments();
                match cursor.current() {
                    None | Some("") => {}
                    Some(trailing) => {
                        return Err(ParseError::UnexpectedLine {
                            text: trailing.to_string(),
                            line: cursor.line_number(),
                        });
                    }
                }
                break;
            }
            Some(line) => {
                let (name, value) = parse_header_line(line, cursor.line_number())?;
                match headers.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, values)) => values.push(value),
                    None => headers.push((name, vec![value])),
                }
                cursor.advance();
            }
        }
    }

    Ok(RequestDef {
        id,
        method,
        path,
        headers,
        body,
    })
}

/// Splits `<METHOD> </path…>` into its validated parts.
fn parse_request_line(text: &str, line: usize) -> Result<(Method, String), ParseError> {
    let invalid = || ParseError::InvalidRequestLine {
        text: text.to_string(),
        line,
    };
    let (method, path) = text.split_once(' ').ok_or_else(invalid)?;
    let method = Method::new(method).map_err(|_| invalid())?;
    if !path.starts_with('/') {
        return Err(invalid());
    }
    Ok((method, path.to_string()))
}

/// Splits `Key: Value` on the first colon, trimming both sides.
fn parse_header_line(text: &str, line: usize) -> Result<(String, String), ParseError> {
    let invalid = || ParseError::InvalidHeaderLine {
        text: text.to_string(),
        line,
    };
    let (name, value) = text.split_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parses a `~`-delimited body. The cursor stands on the opening `~`
/// line, whose remainder names the encoding.
fn parse_body(open: &str, cursor: &mut Cursor<'_>) -> Result<BodyDef, ParseError> {
    let token = &open[1..];
    let encoding =
        BodyEncoding::from_token(token).ok_or_else(|| ParseError::UnknownBodyEncoding {
            encoding: token.to_string(),
            line: cursor.line_number(),
        })?;
    cursor.advance();

    let mut lines = Vec::new();
    loop {
        match cursor.current() {
            None | Some("") => {
                return Err(ParseError::UnterminatedBody {
                    line: cursor.line_number(),
                });
            }
            Some("~") => {
                cursor.advance();
                break;
            }
            Some(line) => {
                lines.push(line.to_string());
                cursor.advance();
            }
        }
    }

    Ok(BodyDef { encoding, lines })
}

/// Line cursor with 1-based position reporting.
struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// 1-based number of the current line (one past the last line at
    /// end of input).
    const fn line_number(&self) -> usize {
        self.pos + 1
    }

    /// Skips comment lines. Only valid outside `~`-delimited bodies.
    fn skip_comments(&mut self) {
        while self.current().is_some_and(|l| l.starts_with('#')) {
            self.advance();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
# example definitions
@_global
~
baseURL: https://example.com
version: 1
headers:
  x-team: alpha
~

@listUsers
GET /users?page=@1

@createUser
# request source marker
POST /users
x-request-source: cli
x-request-source: v2
~y2j
name: \"@1\"
# not a comment, part of the body
~
";

    #[test]
    fn parses_global_and_requests_in_order() {
        let file = parse(SAMPLE).unwrap();

        assert_eq!(file.global.base_url, "https://example.com");
        assert_eq!(file.global.version, 1);
        assert_eq!(
            file.global.headers.get("x-team").map(String::as_str),
            Some("alpha")
        );

        assert_eq!(file.requests.len(), 2);
        assert_eq!(file.requests[0].id, "listUsers");
        assert_eq!(file.requests[0].method.as_str(), "GET");
        assert_eq!(file.requests[0].path, "/users?page=@1");
        assert_eq!(file.requests[0].body, None);

        let create = &file.requests[1];
        assert_eq!(create.id, "createUser");
        assert_eq!(create.method.as_str(), "POST");
        assert_eq!(
            create.headers,
            vec![(
                "x-request-source".to_string(),
                vec!["cli".to_string(), "v2".to_string()]
            )]
        );
        let body = create.body.as_ref().unwrap();
        assert_eq!(body.encoding, BodyEncoding::YamlToJson);
        assert_eq!(
            body.lines,
            vec![
                "name: \"@1\"".to_string(),
                "# not a comment, part of the body".to_string()
            ]
        );
    }

    #[test]
    fn empty_input_parses_to_default() {
        let file = parse("").unwrap();
        assert_eq!(file, HitFile::default());
    }

    #[test]
    fn methods_are_normalized_uppercase() {
        let file = parse("@ping\nget /ping\n").unwrap();
        assert_eq!(file.requests[0].method.as_str(), "GET");
    }

    #[test]
    fn flow_style_global_yaml() {
        let text = "@_global\n~\n{baseURL: https://example.com, version: 1}\n~\n";
        let file = parse(text).unwrap();
        assert_eq!(file.global.base_url, "https://example.com");
        assert_eq!(file.global.version, 1);
    }

    #[test]
    fn invalid_id_is_rejected_with_line() {
        let err = parse("\n@1bad\nGET /x\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidId {
                text: "@1bad".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn invalid_request_lines() {
        for bad in ["GET users", "GET", "G3T /x", "GET  /x"] {
            let text = format!("@req\n{bad}\n");
            let err = parse(&text).unwrap_err();
            assert_eq!(
                err,
                ParseError::InvalidRequestLine {
                    text: bad.to_string(),
                    line: 2
                },
                "input: {bad}"
            );
        }
    }

    #[test]
    fn empty_request_block() {
        let err = parse("@req\n\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::EmptyRequest {
                id: "req".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn invalid_header_line() {
        let err = parse("@req\nGET /x\nno-colon-here\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidHeaderLine {
                text: "no-colon-here".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn header_values_are_trimmed() {
        let file = parse("@req\nGET /x\naccept:   application/json  \n").unwrap();
        assert_eq!(
            file.requests[0].headers,
            vec![("accept".to_string(), vec!["application/json".to_string()])]
        );
    }

    #[test]
    fn unterminated_body_at_end_of_input() {
        let err = parse("@req\nPOST /x\n~y2j\na: 1\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedBody { line: 5 });
    }

    #[test]
    fn blank_line_inside_body_is_unterminated() {
        let err = parse("@req\nPOST /x\n~y2j\na: 1\n\nb: 2\n~\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedBody { line: 5 });
    }

    #[test]
    fn lone_tilde_is_unterminated() {
        let err = parse("@req\nPOST /x\n~\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedBody { line: 4 });
    }

    #[test]
    fn unknown_body_encoding() {
        let err = parse("@req\nPOST /x\n~xml\n<a/>\n~\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownBodyEncoding {
                encoding: "xml".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn passthrough_body_keeps_raw_lines() {
        let file = parse("@req\nPOST /x\n~\nline one\nline two\n~\n").unwrap();
        let body = file.requests[0].body.as_ref().unwrap();
        assert_eq!(body.encoding, BodyEncoding::Passthrough);
        assert_eq!(body.lines, vec!["line one", "line two"]);
    }

    #[test]
    fn content_after_closing_tilde_is_rejected() {
        let err = parse("@req\nPOST /x\n~\nbody\n~\ntrailing\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedLine {
                text: "trailing".to_string(),
                line: 6
            }
        );
    }

    #[test]
    fn global_requires_opening_delimiter() {
        let err = parse("@_global\nbaseURL: x\n~\n").unwrap_err();
        assert_eq!(err, ParseError::GlobalNotDelimited { line: 2 });
    }

    #[test]
    fn global_requires_closing_delimiter() {
        let err = parse("@_global\n~\nversion: 1\n").unwrap_err();
        assert_eq!(err, ParseError::GlobalUnterminated { line: 4 });
    }

    #[test]
    fn global_decode_failure_carries_line() {
        let err = parse("@_global\n~\nversion: [not, an, int]\n~\n").unwrap_err();
        assert!(matches!(err, ParseError::GlobalDecode { line: 3, .. }));
    }

    #[test]
    fn unexpected_top_level_line() {
        let err = parse("GET /stray\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedLine {
                text: "GET /stray".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn round_trips_through_definition_text() {
        let file = parse(SAMPLE).unwrap();
        let reparsed = parse(&file.to_definition_text()).unwrap();
        assert_eq!(reparsed, file);
    }
}
