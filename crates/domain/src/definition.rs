//! Parsed definition-file model.
//!
//! A `.hit` file is a sequence of blocks: at most one `@_global`
//! configuration block plus any number of named request blocks. The
//! parser (infrastructure layer) produces these types once per file;
//! they are immutable for the rest of the invocation.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;

use crate::method::Method;

/// Returns whether `id` matches the request identifier grammar:
/// a letter followed by at least one letter, digit, underscore or hyphen.
#[must_use]
pub fn is_valid_request_id(id: &str) -> bool {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    let mut rest = 0usize;
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return false;
        }
        rest += 1;
    }
    rest >= 1
}

/// The `@_global` configuration section of a definition file.
///
/// Deserialized from the YAML between the section's `~` delimiters. Zero
/// values (`0`, empty string, empty map) mean "not set here" and are
/// resolved away when sections from multiple files are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalSection {
    /// Base URL every request path is joined onto.
    #[serde(default, rename = "baseURL")]
    pub base_url: String,

    /// Definition-format version; only `1` is understood.
    #[serde(default)]
    pub version: u32,

    /// Default headers applied to every request unless overridden.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl GlobalSection {
    /// Returns whether this section carries no configuration at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base_url.is_empty() && self.version == 0 && self.headers.is_empty()
    }
}

/// Body-block encoding declared after the opening `~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// Opaque passthrough: the raw body lines are sent as-is.
    Passthrough,
    /// `y2j`: the body is YAML, converted to JSON with reference
    /// substitution applied to string leaves.
    YamlToJson,
}

impl BodyEncoding {
    /// Parses the token following the opening `~` of a body block.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "" => Some(Self::Passthrough),
            "y2j" => Some(Self::YamlToJson),
            _ => None,
        }
    }

    /// Returns the token form used in definition text.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Passthrough => "",
            Self::YamlToJson => "y2j",
        }
    }
}

/// A request body block: its declared encoding plus the raw lines
/// between the `~` delimiters, unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDef {
    /// Declared encoding.
    pub encoding: BodyEncoding,
    /// Raw body lines, in file order.
    pub lines: Vec<String>,
}

impl BodyDef {
    /// Returns the body lines joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A named, not-yet-resolved request definition.
///
/// Header values are static text and are never scanned for `@` tokens;
/// only the URL path/query and the body participate in reference
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDef {
    /// Unique identifier (without the leading `@`).
    pub id: String,
    /// HTTP method token.
    pub method: Method,
    /// Request path starting with `/`, possibly with `@token` segments
    /// and a query string.
    pub path: String,
    /// Static headers in file order; repeated keys accumulate values.
    pub headers: Vec<(String, Vec<String>)>,
    /// Optional body block.
    pub body: Option<BodyDef>,
}

/// A parsed definition file: global section plus requests in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitFile {
    /// The file's `@_global` section, default if absent.
    pub global: GlobalSection,
    /// Request definitions in the order they appear.
    pub requests: Vec<RequestDef>,
}

impl HitFile {
    /// Renders the file back into canonical definition text.
    ///
    /// Parsing the output reproduces the same global section and request
    /// set (id, method, path, headers, body lines).
    #[must_use]
    pub fn to_definition_text(&self) -> String {
        let mut out = String::new();

        if !self.global.is_empty() {
            out.push_str("@_global\n~\n");
            if !self.global.base_url.is_empty() {
                let _ = writeln!(out, "baseURL: {}", self.global.base_url);
            }
            if self.global.version != 0 {
                let _ = writeln!(out, "version: {}", self.global.version);
            }
            if !self.global.headers.is_empty() {
                out.push_str("headers:\n");
                for (name, value) in &self.global.headers {
                    let _ = writeln!(out, "  {name}: {value}");
                }
            }
            out.push_str("~\n\n");
        }

        for request in &self.requests {
            let _ = writeln!(out, "@{}", request.id);
            let _ = writeln!(out, "{} {}", request.method, request.path);
            for (name, values) in &request.headers {
                for value in values {
                    let _ = writeln!(out, "{name}: {value}");
                }
            }
            if let Some(body) = &request.body {
                let _ = writeln!(out, "~{}", body.encoding.token());
                for line in &body.lines {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str("~\n");
            }
            out.push('\n');
        }

        out
    }
}
