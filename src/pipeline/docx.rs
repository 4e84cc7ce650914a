//! DOCX paragraph reader.
//!
//! A DOCX file is a ZIP archive; the body text lives in the
//! WordprocessingML part `word/document.xml`. Only paragraphs that are
//! direct children of `<w:body>` are returned, in document order. Table
//! cells, text boxes, headers and footers are not part of the paragraph
//! stream.
//!
//! Within a paragraph, run text (`<w:t>`) is concatenated as-is; `<w:tab/>`
//! becomes `\t` and `<w:br/>`/`<w:cr/>` become `\n`.

use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Read the body paragraphs of the DOCX at `path`.
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::from_io(path, e))?;
    let corrupt = |detail: String| ExtractError::CorruptFormat {
        path: path.to_path_buf(),
        format: "DOCX",
        detail,
    };

    let mut archive = ZipArchive::new(file).map_err(|e| corrupt(format!("not a ZIP archive: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| corrupt(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| corrupt(format!("reading {DOCUMENT_PART}: {e}")))?;

    let paragraphs = parse_document_xml(&xml).map_err(corrupt)?;
    debug!("{}: {} paragraphs", path.display(), paragraphs.len());
    Ok(paragraphs)
}

/// Collect body-level paragraph texts from a `document.xml` string.
pub fn parse_document_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    // Element local names from the root down to the current element.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    let mut paragraphs = Vec::new();
    let mut saw_body = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                saw_body |= name.as_slice() == b"body";
                if name.as_slice() == b"p" && parent_is(&stack, b"body") {
                    current = Some(String::new());
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"body" => saw_body = true,
                    b"p" if parent_is(&stack, b"body") => paragraphs.push(String::new()),
                    b"tab" | b"br" | b"cr" if parent_is(&stack, b"r") => {
                        if let Some(text) = current.as_mut().filter(|_| in_own_paragraph(&stack)) {
                            text.push(if name.as_ref() == b"tab" { '\t' } else { '\n' });
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                if parent_is(&stack, b"t") {
                    if let Some(text) = current.as_mut().filter(|_| in_own_paragraph(&stack)) {
                        let unescaped = e.unescape().map_err(|e| format!("bad text node: {e}"))?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(e) => {
                if parent_is(&stack, b"t") {
                    if let Some(text) = current.as_mut().filter(|_| in_own_paragraph(&stack)) {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
            }
            Event::End(_) => {
                let closed = stack.pop();
                if closed.as_deref() == Some(b"p".as_slice()) && parent_is(&stack, b"body") {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_body {
        return Err("no <w:body> element".to_string());
    }
    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|last| last.as_slice() == name)
}

/// True when exactly one `p` is open, i.e. we are not inside a paragraph
/// nested in a text box of the body-level paragraph.
fn in_own_paragraph(stack: &[Vec<u8>]) -> bool {
    stack.iter().filter(|name| name.as_slice() == b"p").count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
    }

    #[test]
    fn runs_are_concatenated() {
        let xml = wrap(r#"<w:p><w:r><w:t>Test </w:t></w:r><w:r><w:t>Docx content</w:t></w:r></w:p>"#);
        assert_eq!(parse_document_xml(&xml).unwrap(), vec!["Test Docx content"]);
    }

    #[test]
    fn empty_paragraphs_are_kept() {
        let xml = wrap(r#"<w:p><w:r><w:t>one</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>two</w:t></w:r></w:p>"#);
        assert_eq!(parse_document_xml(&xml).unwrap(), vec!["one", "", "", "two"]);
    }

    #[test]
    fn tabs_breaks_and_entities() {
        let xml = wrap(r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c &amp; d</w:t></w:r></w:p>"#);
        assert_eq!(parse_document_xml(&xml).unwrap(), vec!["a\tb\nc & d"]);
    }

    #[test]
    fn tables_are_skipped() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        assert_eq!(parse_document_xml(&xml).unwrap(), vec!["before", "after"]);
    }

    #[test]
    fn hyperlink_runs_are_included() {
        let xml = wrap(r#"<w:p><w:r><w:t xml:space="preserve">see </w:t></w:r><w:hyperlink><w:r><w:t>here</w:t></w:r></w:hyperlink></w:p>"#);
        assert_eq!(parse_document_xml(&xml).unwrap(), vec!["see here"]);
    }

    #[test]
    fn text_outside_runs_is_ignored() {
        let xml = wrap(r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:instrText>PAGE</w:instrText><w:t>x</w:t></w:r></w:p>"#);
        assert_eq!(parse_document_xml(&xml).unwrap(), vec!["x"]);
    }

    #[test]
    fn document_without_body_is_an_error() {
        assert!(parse_document_xml("<w:document/>").is_err());
        assert!(parse_document_xml(&wrap("")).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_document_xml("<w:document><w:body><w:p></w:body>").is_err());
    }

    #[test]
    fn not_a_zip_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"plain text, not a zip").unwrap();
        let err = read_paragraphs(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptFormat);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_paragraphs(Path::new("non_existent_file.docx")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }
}
