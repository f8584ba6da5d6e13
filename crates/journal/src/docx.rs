//! Paragraph text extraction from word-processor documents

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

static RSID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+w:rsid\w*="[^"]*""#).expect("valid rsid regex"));

static BETWEEN_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").expect("valid whitespace regex"));

static PARAGRAPH_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:p(?:\s[^>]*)?/?>|</w:p>").expect("valid paragraph regex"));

static RUN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>").expect("valid text run regex")
});

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|[a-z]+);").expect("valid entity regex"));

/// Extract one line per non-empty paragraph of a `.docx` file
pub fn extract_paragraphs(data: &[u8]) -> Result<Vec<String>, String> {
    let xml = read_document_part(data)?;
    Ok(paragraphs(&normalize(&xml)))
}

fn read_document_part(data: &[u8]) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| format!("not a zip archive: {}", e))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("missing {}: {}", DOCUMENT_PART, e))?;

    let mut raw = Vec::new();
    part.read_to_end(&mut raw)
        .map_err(|e| format!("cannot read {}: {}", DOCUMENT_PART, e))?;

    String::from_utf8(raw).map_err(|e| format!("{} is not UTF-8: {}", DOCUMENT_PART, e))
}

/// Strip markup that changes between saves without changing the text
fn normalize(xml: &str) -> String {
    let without_rsid = RSID_ATTR.replace_all(xml, "");
    let unix = without_rsid.replace("\r\n", "\n").replace('\r', "\n");
    BETWEEN_TAGS.replace_all(&unix, "><").into_owned()
}

/// Text of each paragraph in opening order
///
/// Paragraphs can nest, e.g. inside a text box. A nested paragraph gets its
/// own line and its runs are excluded from the enclosing one.
fn paragraphs(xml: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    // (line index, offset where the paragraph's own content resumes)
    let mut open: Vec<(usize, usize)> = Vec::new();

    for tag in PARAGRAPH_TAG.find_iter(xml) {
        if tag.as_str().ends_with("/>") {
            continue;
        }

        if tag.as_str() == "</w:p>" {
            if let Some((line, from)) = open.pop() {
                lines[line].push_str(&paragraph_text(&xml[from..tag.start()]));
                if let Some(parent) = open.last_mut() {
                    parent.1 = tag.end();
                }
            }
        } else {
            if let Some(&(parent, from)) = open.last() {
                lines[parent].push_str(&paragraph_text(&xml[from..tag.start()]));
            }
            open.push((lines.len(), tag.end()));
            lines.push(String::new());
        }
    }

    lines.retain(|line| !line.trim().is_empty());
    lines
}

fn paragraph_text(paragraph: &str) -> String {
    let mut line = String::new();
    for caps in RUN_TEXT.captures_iter(paragraph) {
        match caps.get(1) {
            Some(text) => line.push_str(&unescape(text.as_str())),
            None => line.push('\t'),
        }
    }
    line
}

fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .and_then(|code| code.ok())
                    .and_then(char::from_u32),
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
