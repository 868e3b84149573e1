//! Minimal markup scanner: element and attribute spans, nothing more.
//!
//! Only what the zone queries need is recognised. Comments, processing
//! instructions, CDATA sections and declarations are skipped, entities are
//! left undecoded. Offsets are byte offsets into the scanned text.

use std::sync::LazyLock;

use regex::Regex;

use super::QueryError;

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w:.-]+)\s*=\s*("[^"]*"|'[^']*')"#).expect("attribute pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    pub name: String,
    /// Value without its quotes.
    pub value: String,
    /// Span of the whole `name="value"` text.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan {
    /// Qualified name as written, prefix included.
    pub name: String,
    /// Offset of the opening `<`.
    pub start: usize,
    /// Offset just past the closing `>` of the end tag (or of the
    /// self-closing start tag).
    pub end: usize,
    pub parent: Option<usize>,
    pub attributes: Vec<AttributeSpan>,
}

impl ElementSpan {
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Attribute by local name.
    pub fn attribute(&self, local_name: &str) -> Option<&AttributeSpan> {
        self.attributes
            .iter()
            .find(|a| local(&a.name) == local_name)
    }

    pub const fn encloses(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Name without its namespace prefix.
pub fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Scan `text` into elements listed in document order.
///
/// # Errors
///
/// Returns [`QueryError::Malformed`] for unterminated tags, comments or
/// sections, and for end tags that do not match the open element.
pub fn scan(text: &str) -> Result<Vec<ElementSpan>, QueryError> {
    let mut elements: Vec<ElementSpan> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find('<') {
        let start = pos + found;
        let rest = &text[start..];
        if rest.starts_with("<!--") {
            pos = skip_past(text, start, "-->")?;
            continue;
        }
        if rest.starts_with("<![CDATA[") {
            pos = skip_past(text, start, "]]>")?;
            continue;
        }
        if rest.starts_with("<?") {
            pos = skip_past(text, start, "?>")?;
            continue;
        }
        if rest.starts_with("<!") {
            pos = skip_declaration(text, start)?;
            continue;
        }

        let end = tag_end(text, start)?;
        let body = &text[start + 1..end - 1];

        if let Some(name) = body.strip_prefix('/') {
            let name = name.trim();
            match open.last() {
                Some(&idx) if elements[idx].name == name => {
                    elements[idx].end = end;
                    open.pop();
                }
                Some(&idx) => {
                    return Err(malformed(
                        start,
                        format!("expected </{}>, found </{name}>", elements[idx].name),
                    ));
                }
                None => return Err(malformed(start, format!("unexpected </{name}>"))),
            }
        } else {
            let self_closing = body.ends_with('/');
            let body = body.strip_suffix('/').unwrap_or(body);
            let name_len = body.find(char::is_whitespace).unwrap_or(body.len());
            let name = &body[..name_len];
            if name.is_empty() {
                return Err(malformed(start, "missing element name".to_string()));
            }
            let attrs_at = start + 1 + name_len;
            let attributes = ATTRIBUTE
                .captures_iter(&body[name_len..])
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let quoted = caps.get(2)?.as_str();
                    Some(AttributeSpan {
                        name: caps.get(1)?.as_str().to_string(),
                        value: quoted[1..quoted.len() - 1].to_string(),
                        start: attrs_at + whole.start(),
                        end: attrs_at + whole.end(),
                    })
                })
                .collect();
            elements.push(ElementSpan {
                name: name.to_string(),
                start,
                end,
                parent: open.last().copied(),
                attributes,
            });
            if !self_closing {
                open.push(elements.len() - 1);
            }
        }
        pos = end;
    }

    if let Some(&idx) = open.last() {
        let el = &elements[idx];
        return Err(malformed(el.start, format!("<{}> is never closed", el.name)));
    }
    Ok(elements)
}

fn malformed(offset: usize, reason: String) -> QueryError {
    QueryError::Malformed { offset, reason }
}

fn skip_past(text: &str, start: usize, terminator: &str) -> Result<usize, QueryError> {
    text[start..]
        .find(terminator)
        .map(|i| start + i + terminator.len())
        .ok_or_else(|| malformed(start, format!("missing {terminator:?}")))
}

/// `<!DOCTYPE ...>`, with an optional `[...]` internal subset.
fn skip_declaration(text: &str, start: usize) -> Result<usize, QueryError> {
    let rest = &text[start..];
    match rest.find(['[', '>']) {
        Some(i) if rest.as_bytes()[i] == b'[' => {
            let close = skip_past(text, start + i, "]")?;
            skip_past(text, close, ">")
        }
        Some(i) => Ok(start + i + 1),
        None => Err(malformed(start, "unterminated declaration".to_string())),
    }
}

/// Offset just past the `>` closing the tag opened at `start`.
fn tag_end(text: &str, start: usize) -> Result<usize, QueryError> {
    let mut quote: Option<char> = None;
    for (i, ch) in text[start + 1..].char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return Ok(start + 1 + i + 1),
            (None, '<') => return Err(malformed(start, "unterminated tag".to_string())),
            (None, _) => {}
        }
    }
    Err(malformed(start, "unterminated tag".to_string()))
}
