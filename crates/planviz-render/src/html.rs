//! HTML label fragments.
//!
//! Plan node labels are HTML written for a browser: unclosed `<br>`, unquoted attributes,
//! named entities. The drawing needs them twice: as well-formed XHTML inside a
//! `foreignObject`, and as visible plain-text lines for measuring and for raster output.

use crate::util::escape_xml_into;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "table", "thead", "tbody", "tfoot", "tr", "ul", "ol", "li", "h1", "h2", "h3",
    "h4", "h5", "h6", "pre",
];

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
    })
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s="'<>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>`]+)))?"#).unwrap()
    })
}

fn hidden_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)display\s*:\s*none").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Open {
        name: String,
        attrs: &'a str,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0usize;
    for caps in tag_re().captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&html[last..whole.start()]));
        }
        last = whole.end();

        let name = caps[2].to_ascii_lowercase();
        if !caps[1].is_empty() {
            tokens.push(Token::Close { name });
            continue;
        }
        let raw = caps.get(3).map_or("", |m| m.as_str());
        let trimmed = raw.trim_end();
        let self_closing = trimmed.ends_with('/');
        let attrs = if self_closing {
            &trimmed[..trimmed.len() - 1]
        } else {
            raw
        };
        tokens.push(Token::Open {
            name,
            attrs,
            self_closing,
        });
    }
    if last < html.len() {
        tokens.push(Token::Text(&html[last..]));
    }
    tokens
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

fn unescape(text: &str) -> Cow<'_, str> {
    if text.contains('&') {
        Cow::Owned(htmlize::unescape(text).into_owned())
    } else {
        Cow::Borrowed(text)
    }
}

/// Attribute name/value pairs of a start tag, entities decoded, first occurrence wins.
fn parse_attrs(attrs: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for caps in attr_re().captures_iter(attrs) {
        let name = caps[1].to_ascii_lowercase();
        if out.iter().any(|(n, _)| *n == name) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        out.push((name, unescape(value).into_owned()));
    }
    out
}

/// Visible text of an HTML fragment, one entry per rendered line.
///
/// Content of elements styled `display: none` is dropped. `<br>` and block elements break
/// lines, table cells are separated by a space, and whitespace runs collapse.
pub fn visible_lines(html: &str) -> Vec<String> {
    let mut text = String::new();
    let mut open: Vec<(String, bool)> = Vec::new();
    let mut hidden_depth = 0usize;

    for token in tokenize(html) {
        match token {
            Token::Text(t) => {
                if hidden_depth == 0 {
                    text.push_str(t);
                }
            }
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                if name == "br" {
                    if hidden_depth == 0 {
                        text.push('\n');
                    }
                    continue;
                }
                if is_void(&name) || self_closing {
                    continue;
                }
                let hidden = hidden_re().is_match(attrs);
                if hidden {
                    hidden_depth += 1;
                }
                if hidden_depth == 0 {
                    separate(&mut text, &name);
                }
                open.push((name, hidden));
            }
            Token::Close { name } => {
                let Some(pos) = open.iter().rposition(|(n, _)| *n == name) else {
                    continue;
                };
                for (_, hidden) in open.drain(pos..) {
                    if hidden {
                        hidden_depth -= 1;
                    }
                }
                if hidden_depth == 0 {
                    separate(&mut text, &name);
                }
            }
        }
    }

    text.split('\n')
        .map(|line| {
            unescape(line)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn separate(text: &mut String, element: &str) {
    if is_block(element) {
        text.push('\n');
    } else if element == "td" || element == "th" {
        text.push(' ');
    }
}

/// Lines of a plain-text label; both real newlines and DOT `\n` escapes break lines.
pub fn plain_lines(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Whether `name` is an XML name without a namespace prefix.
fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Rewrites an HTML fragment as well-formed XHTML.
///
/// Void elements are self-closed, attributes are double-quoted, entities are decoded and
/// re-escaped, stray end tags are dropped and unclosed elements are closed. Prefixed tags
/// such as `<x:y>` are flattened to their content, and attributes whose names are not plain
/// XML names are dropped.
pub fn to_xhtml(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    let mut open: Vec<String> = Vec::new();

    for token in tokenize(html) {
        match token {
            Token::Text(t) => escape_xml_into(&mut out, &unescape(t)),
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                if !is_plain_name(&name) {
                    continue;
                }
                out.push('<');
                out.push_str(&name);
                for (key, value) in parse_attrs(attrs) {
                    if !is_plain_name(&key) {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(&key);
                    out.push_str("=\"");
                    escape_xml_into(&mut out, &value);
                    out.push('"');
                }
                if is_void(&name) || self_closing {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    open.push(name);
                }
            }
            Token::Close { name } => {
                let Some(pos) = open.iter().rposition(|n| *n == name) else {
                    continue;
                };
                for name in open.drain(pos..).rev() {
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                }
            }
        }
    }
    for name in open.into_iter().rev() {
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }
    out
}
