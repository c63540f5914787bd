//! Post-processing of combined pandoc output.
//!
//! The bundled template makes pandoc print two things: a single line of JSON
//! metadata, then the converted body wrapped in `<body>` (with the table of
//! contents as `<nav id="TOC">` when one was requested). This module splits
//! the two apart, extracts the TOC fragment, unwraps the body, and restores
//! the host generator's link placeholder tokens.

use serde_json::{Map, Value};

use crate::error::{ReaderError, Result};

/// Percent-encoded placeholder sequences pandoc produces inside `href`
/// attributes, mapped back to the raw tokens the host generator resolves.
pub const ENCODED_LINK_TOKENS: [(&str, &str); 3] = [
    ("%7Bstatic%7D", "{static}"),
    ("%7Battach%7D", "{attach}"),
    ("%7Bfilename%7D", "{filename}"),
];

/// Identifier the template puts on the generated TOC element.
const TOC_ID: &str = "TOC";

/// CSS class the extracted TOC is relabeled with.
const TOC_CLASS: &str = "toc";

/// Split and cleaned conversion output.
#[derive(Debug)]
pub struct ProcessedOutput {
    /// Bare HTML fragment (no body wrapper, TOC removed).
    pub html: String,
    /// Extracted TOC fragment, when requested and present.
    pub toc: Option<String>,
    /// Pandoc-native metadata decoded from the JSON preamble.
    pub metadata: Map<String, Value>,
}

/// Process combined stdout: JSON preamble on the first line, markup after.
pub fn process(stdout: &str, want_toc: bool) -> Result<ProcessedOutput> {
    let (preamble, markup) = stdout
        .split_once('\n')
        .ok_or_else(|| ReaderError::MalformedOutput("missing metadata preamble".into()))?;

    let metadata: Map<String, Value> = serde_json::from_str(preamble.trim()).map_err(|e| {
        ReaderError::MalformedOutput(format!("invalid metadata preamble: {e}"))
    })?;

    let body = unwrap_body(markup)?;
    let (body, toc) = if want_toc {
        extract_toc(&body)?
    } else {
        (body, None)
    };

    // Placeholder restoration runs after parsing so the parser sees the
    // attribute values exactly as pandoc wrote them
    Ok(ProcessedOutput {
        html: restore_link_tokens(body.trim()),
        toc: toc.map(|t| restore_link_tokens(t.trim())),
        metadata,
    })
}

/// Replace each percent-encoded placeholder with its raw token form.
pub fn restore_link_tokens(html: &str) -> String {
    let mut out = html.to_string();
    for (encoded, raw) in ENCODED_LINK_TOKENS {
        out = out.replace(encoded, raw);
    }
    out
}

/// Strip the enclosing `<body>` wrapper, returning the inner markup.
fn unwrap_body(markup: &str) -> Result<String> {
    let dom = tl::parse(markup, tl::ParserOptions::default())
        .map_err(|e| ReaderError::MalformedOutput(format!("unparseable markup: {e}")))?;
    let parser = dom.parser();

    let body_span = dom
        .query_selector("body")
        .and_then(|mut hits| hits.next())
        .and_then(|handle| handle.get(parser))
        .and_then(|node| node.as_tag())
        .map(|tag| tag.raw().as_utf8_str().into_owned());

    // A fragment without a wrapper passes through untouched
    Ok(body_span.map_or_else(|| markup.to_string(), |span| strip_wrapper(&span, "body")))
}

/// Locate the `nav#TOC` element, relabel it, and remove it from the body.
///
/// A requested but absent TOC (document without headings) is not an error.
fn extract_toc(body: &str) -> Result<(String, Option<String>)> {
    let dom = tl::parse(body, tl::ParserOptions::default())
        .map_err(|e| ReaderError::MalformedOutput(format!("unparseable body: {e}")))?;
    let parser = dom.parser();

    let nav_span = dom
        .query_selector(&format!("#{TOC_ID}"))
        .and_then(|mut hits| hits.next())
        .and_then(|handle| handle.get(parser))
        .and_then(|node| node.as_tag())
        .filter(|tag| tag.name().as_utf8_str() == "nav")
        .map(|tag| tag.raw().as_utf8_str().into_owned());

    let Some(nav_span) = nav_span else {
        return Ok((body.to_string(), None));
    };

    let remaining = body.replacen(&nav_span, "", 1);
    let toc = nav_span.replacen(&format!("id=\"{TOC_ID}\""), &format!("class=\"{TOC_CLASS}\""), 1);
    Ok((remaining, Some(toc)))
}

/// Cut the opening `<tag ...>` and closing `</tag>` off a raw element span.
fn strip_wrapper(span: &str, tag: &str) -> String {
    let inner_start = span.find('>').map_or(0, |i| i + 1);
    let inner_end = span
        .rfind(&format!("</{tag}>"))
        .unwrap_or(span.len());
    span[inner_start..inner_end.max(inner_start)].to_string()
}
