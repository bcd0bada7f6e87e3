//! Paragraph text extraction from WordprocessingML (`.docx`) archives.
//!
//! Reads `word/document.xml` and returns the text of each top-level body
//! paragraph, one per line. Paragraphs inside tables and content controls
//! (`w:sdt`) are skipped, as are paragraphs nested inside other paragraphs
//! (text boxes). Within runs, `<w:tab/>` becomes a tab and a text-wrapping
//! `<w:br/>` or `<w:cr/>` a newline; page and column breaks add nothing.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract body paragraph text from `.docx` bytes, joined with `\n`.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    Ok(body_paragraphs(&xml).join("\n"))
}

fn body_paragraphs(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // Open `w:tbl` and `w:sdt` elements; paragraphs inside them are not body paragraphs.
    let mut container_depth = 0usize;
    let mut para_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    let mut rest = xml;
    while let Some(open) = rest.find('<') {
        let collecting = container_depth == 0 && para_depth == 1;
        if in_text && collecting {
            current.push_str(&decode_entities(&rest[..open]));
        }
        let Some(close) = tag_end(&rest[open..]) else {
            break;
        };
        let tag = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        match name {
            "w:tbl" | "w:sdt" if closing => container_depth = container_depth.saturating_sub(1),
            "w:tbl" | "w:sdt" if !self_closing => container_depth += 1,
            "w:p" if closing => {
                if container_depth == 0 && para_depth == 1 {
                    paragraphs.push(std::mem::take(&mut current));
                }
                para_depth = para_depth.saturating_sub(1);
            }
            "w:p" if self_closing => {
                if container_depth == 0 && para_depth == 0 {
                    paragraphs.push(String::new());
                }
            }
            "w:p" => {
                para_depth += 1;
                if para_depth == 1 {
                    current.clear();
                }
            }
            "w:r" if closing => run_depth = run_depth.saturating_sub(1),
            "w:r" if !self_closing => run_depth += 1,
            "w:t" => in_text = !closing && !self_closing,
            "w:tab" if run_depth > 0 && collecting && !closing => current.push('\t'),
            "w:cr" if run_depth > 0 && collecting && !closing => current.push('\n'),
            "w:br" if run_depth > 0 && collecting && !closing && is_line_break(tag) => {
                current.push('\n')
            }
            _ => {}
        }
    }

    paragraphs
}

/// Offset of the `>` closing the tag that starts at `s[0]`, skipping quoted
/// attribute values.
fn tag_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Page and column breaks carry no text; only text-wrapping breaks do.
fn is_line_break(tag: &str) -> bool {
    attribute(tag, "w:type").is_none_or(|kind| kind == "textWrapping")
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag;
    while let Some(at) = rest.find(name) {
        let after = rest[at + name.len()..].trim_start();
        let preceded_by_space = rest[..at].ends_with(char::is_whitespace);
        if preceded_by_space
            && let Some(value) = after.strip_prefix('=').map(str::trim_start)
        {
            let quote = value.chars().next()?;
            let value = &value[quote.len_utf8()..];
            return value.find(quote).map(|end| &value[..end]);
        }
        rest = &rest[at + name.len()..];
    }
    None
}

/// Decode the predefined XML entities and numeric character references.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let decoded = after.find(';').and_then(|semi| {
            let entity = &after[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Build a minimal `.docx` archive around the given `word/document.xml`.
#[cfg(test)]
pub(crate) fn docx_with(document_xml: &str) -> Vec<u8> {
    use std::io::Write;
    use zip::write::FileOptions;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        writer
            .start_file("[Content_Types].xml", FileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file(DOCUMENT_PART, FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}<w:sectPr/></w:body></w:document>"#
        )
    }

    #[test]
    fn extracts_paragraphs_in_order() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Engagement letter</w:t></w:r></w:p>
<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Client: </w:t></w:r><w:r><w:t>Acme Pty Ltd</w:t></w:r></w:p>"#,
        );
        let text = extract_docx_text(&docx_with(&xml)).unwrap();
        assert_eq!(text, "Engagement letter\nClient: Acme Pty Ltd");
    }

    #[test]
    fn empty_paragraphs_kept_as_blank_lines() {
        let xml = body("<w:p><w:r><w:t>A</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>B</w:t></w:r></w:p>");
        assert_eq!(extract_docx_text(&docx_with(&xml)).unwrap(), "A\n\n\nB");
    }

    #[test]
    fn entities_decoded() {
        let xml = body("<w:p><w:r><w:t>Tom &amp; Jerry &lt;Ltd&gt; &#8212; &#x41;</w:t></w:r></w:p>");
        assert_eq!(
            extract_docx_text(&docx_with(&xml)).unwrap(),
            "Tom & Jerry <Ltd> \u{2014} A"
        );
    }

    #[test]
    fn tabs_and_breaks_inside_runs() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_docx_text(&docx_with(&xml)).unwrap(), "a\tb\nc");
    }

    #[test]
    fn table_paragraphs_skipped() {
        let xml = body(
            "<w:p><w:r><w:t>Before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>After</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx_text(&docx_with(&xml)).unwrap(), "Before\nAfter");
    }

    #[test]
    fn missing_document_part_is_an_error() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer.start_file("other.xml", FileOptions::default()).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        let err = extract_docx_text(&buf.into_inner()).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Zip(zip::result::ZipError::FileNotFound)
        ));
    }

    #[test]
    fn non_zip_bytes_rejected() {
        let err = extract_docx_text(b"plain text, not a docx").unwrap_err();
        assert!(matches!(err, DocumentError::Zip(_)));
        assert!(!err.is_download());
    }

    #[test]
    fn unknown_entity_left_verbatim() {
        assert_eq!(decode_entities("a &nbsp; b & c"), "a &nbsp; b & c");
    }

    #[test]
    fn content_control_paragraphs_skipped() {
        let xml = body(
            "<w:p><w:r><w:t>Before</w:t></w:r></w:p>\
             <w:sdt><w:sdtPr><w:alias w:val=\"Client\"/></w:sdtPr><w:sdtContent>\
             <w:p><w:r><w:t>Controlled</w:t></w:r></w:p></w:sdtContent></w:sdt>\
             <w:p><w:r><w:t>After</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx_text(&docx_with(&xml)).unwrap(), "Before\nAfter");
    }

    #[test]
    fn page_and_column_breaks_add_no_text() {
        let xml = body(
            r#"<w:p><w:r><w:t>a</w:t><w:br w:type="page"/><w:t>b</w:t><w:br w:type="column"/><w:t>c</w:t><w:br w:type="textWrapping"/><w:t>d</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_docx_text(&docx_with(&xml)).unwrap(), "abc\nd");
    }

    #[test]
    fn angle_bracket_inside_attribute_value() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="a>b"/></w:pPr><w:r><w:t>Styled</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_docx_text(&docx_with(&xml)).unwrap(), "Styled");
    }

    #[test]
    fn break_type_attribute_read() {
        assert!(is_line_break("w:br/"));
        assert!(is_line_break(r#"w:br w:type="textWrapping" w:clear="all"/"#));
        assert!(!is_line_break(r#"w:br w:type='page'/"#));
        assert_eq!(attribute(r#"w:br w:clear="left" w:type="column"/"#, "w:type"), Some("column"));
    }
}
