//! DOC/DOCX text extraction.
//!
//! A .docx file is a zip container; the body text lives in
//! `word/document.xml`. OOXML carries heavy namespacing that a generic HTML
//! parser handles poorly, so the body is walked with simple string scanning:
//! paragraphs (`<w:p>`) outside tables become one block each, and every table
//! row becomes one block of its non-empty cell texts joined by `" | "`, in
//! document order.

use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use super::ExtractError;

/// Words-per-page approximation used for the DOCX page estimate. The format
/// carries no reliable page count, so `max(1, words / 500)` stands in.
const WORDS_PER_PAGE: usize = 500;

pub fn extract_docx(bytes: &[u8]) -> Result<(String, usize), ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::CorruptDocument(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::CorruptDocument("missing word/document.xml".to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::CorruptDocument(e.to_string()))?;

    let blocks = scan_body(&xml);
    let full_text = blocks.join("\n\n");
    if full_text.trim().is_empty() {
        return Err(ExtractError::NoExtractableText);
    }

    let word_count = full_text.split_whitespace().count();
    let estimated_pages = std::cmp::max(1, word_count / WORDS_PER_PAGE);

    debug!(
        "extracted {} chars from DOCX (~{estimated_pages} pages)",
        full_text.len()
    );
    Ok((full_text, estimated_pages))
}

/// Walks the document body, emitting one block per paragraph and one block
/// per table row.
fn scan_body(xml: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < xml.len() {
        let rest = &xml[pos..];
        let next_table = find_tag_open(rest, "w:tbl");
        let next_paragraph = find_tag_open(rest, "w:p");

        match (next_table, next_paragraph) {
            (Some(t), Some(p)) if t < p => {
                let (fragment, consumed) = consume_element(&rest[t..], "w:tbl");
                collect_table_rows(fragment, &mut blocks);
                pos += t + consumed;
            }
            (Some(t), None) => {
                let (fragment, consumed) = consume_element(&rest[t..], "w:tbl");
                collect_table_rows(fragment, &mut blocks);
                pos += t + consumed;
            }
            (_, Some(p)) => {
                let (fragment, consumed) = consume_element(&rest[p..], "w:p");
                let text = collect_runs(fragment);
                if !text.trim().is_empty() {
                    blocks.push(text.trim().to_string());
                }
                pos += p + consumed;
            }
            (None, None) => break,
        }
    }

    blocks
}

/// Finds the next opening tag `<name>` or `<name ...>` in `s`, rejecting
/// longer tag names that share the prefix (e.g. `<w:pPr>` when searching for
/// `<w:p>`).
fn find_tag_open(s: &str, name: &str) -> Option<usize> {
    let needle = format!("<{name}");
    let mut offset = 0;
    while let Some(found) = s[offset..].find(&needle) {
        let at = offset + found;
        match s.as_bytes().get(at + needle.len()) {
            Some(b'>') | Some(b' ') => return Some(at),
            _ => offset = at + needle.len(),
        }
    }
    None
}

/// Given `s` starting at an opening tag, returns the inner fragment and the
/// total number of bytes consumed (tag included). Self-closing tags yield an
/// empty fragment.
fn consume_element<'a>(s: &'a str, name: &str) -> (&'a str, usize) {
    let open_end = match s.find('>') {
        Some(i) => i + 1,
        None => return ("", s.len()),
    };
    if s[..open_end].ends_with("/>") {
        return ("", open_end);
    }

    let close = format!("</{name}>");
    let mut depth = 1;
    let mut idx = open_end;
    loop {
        let rest = &s[idx..];
        let next_open = find_tag_open(rest, name);
        let next_close = rest.find(&close);
        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                idx += o + name.len() + 1;
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    return (&s[open_end..idx + c], idx + c + close.len());
                }
                idx += c + close.len();
            }
            // Unclosed element: take everything that remains.
            _ => return (&s[open_end..], s.len()),
        }
    }
}

/// Emits one block per table row: non-empty cell texts joined by `" | "`.
fn collect_table_rows(table: &str, blocks: &mut Vec<String>) {
    let mut pos = 0;
    while let Some(r) = find_tag_open(&table[pos..], "w:tr") {
        let (row, consumed) = consume_element(&table[pos + r..], "w:tr");

        let mut cells = Vec::new();
        let mut cell_pos = 0;
        while let Some(c) = find_tag_open(&row[cell_pos..], "w:tc") {
            let (cell, cell_consumed) = consume_element(&row[cell_pos + c..], "w:tc");
            let text = collect_runs(cell);
            if !text.trim().is_empty() {
                cells.push(text.trim().to_string());
            }
            cell_pos += c + cell_consumed;
        }

        if !cells.is_empty() {
            blocks.push(cells.join(" | "));
        }
        pos += r + consumed;
    }
}

/// Concatenates the text runs (`<w:t>`) inside a fragment.
fn collect_runs(fragment: &str) -> String {
    let mut text = String::new();
    let mut pos = 0;
    while let Some(t) = find_tag_open(&fragment[pos..], "w:t") {
        let start = pos + t;
        let open_end = match fragment[start..].find('>') {
            Some(i) => start + i + 1,
            None => break,
        };
        if fragment[start..open_end].ends_with("/>") {
            pos = open_end;
            continue;
        }
        match fragment[open_end..].find("</w:t>") {
            Some(len) => {
                text.push_str(&unescape(&fragment[open_end..open_end + len]));
                pos = open_end + len + "</w:t>".len();
            }
            None => break,
        }
    }
    text
}

/// Resolves the five predefined XML entities.
fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn test_paragraphs_joined_with_blank_lines() {
        let xml = wrap_body(&format!(
            "{}{}{}",
            paragraph("John Doe"),
            "<w:p/>",
            paragraph("Senior Engineer")
        ));
        let (text, pages) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "John Doe\n\nSenior Engineer");
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_split_runs_concatenated() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t xml:space="preserve">Rust </w:t></w:r><w:r><w:t>Engineer</w:t></w:r></w:p>"#,
        );
        let (text, _) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "Rust Engineer");
    }

    #[test]
    fn test_table_rows_joined_with_pipes() {
        let table = r#"<w:tbl>
            <w:tr>
                <w:tc><w:p><w:r><w:t>Skill</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>Years</w:t></w:r></w:p></w:tc>
            </w:tr>
            <w:tr>
                <w:tc><w:p><w:r><w:t>Rust</w:t></w:r></w:p></w:tc>
                <w:tc><w:p/></w:tc>
            </w:tr>
        </w:tbl>"#;
        let xml = wrap_body(&format!("{}{}", paragraph("Skills"), table));
        let (text, _) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "Skills\n\nSkill | Years\n\nRust");
    }

    #[test]
    fn test_trailing_table_with_bare_runs() {
        // Cells carrying runs without paragraph wrappers, and nothing after
        // the table.
        let table = r#"<w:tbl><w:tr><w:tc><w:t>Rust</w:t></w:tc><w:tc><w:t>7 years</w:t></w:tc></w:tr></w:tbl>"#;
        let xml = wrap_body(table);
        let (text, _) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "Rust | 7 years");
    }

    #[test]
    fn test_entities_unescaped() {
        let xml = wrap_body(&paragraph("C&amp;C++ &lt;dev&gt;"));
        let (text, _) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(text, "C&C++ <dev>");
    }

    #[test]
    fn test_page_estimate_is_words_over_five_hundred() {
        let words = vec!["word"; 1200].join(" ");
        let xml = wrap_body(&paragraph(&words));
        let (_, pages) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(pages, 2); // max(1, 1200 / 500)
    }

    #[test]
    fn test_short_document_is_one_page() {
        let xml = wrap_body(&paragraph("just a few words"));
        let (_, pages) = extract_docx(&build_docx(&xml)).unwrap();
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_whitespace_only_document_is_no_extractable_text() {
        let xml = wrap_body("<w:p><w:r><w:t> </w:t></w:r></w:p>");
        let err = extract_docx(&build_docx(&xml)).unwrap_err();
        assert!(matches!(err, ExtractError::NoExtractableText));
    }

    #[test]
    fn test_non_zip_bytes_are_corrupt() {
        let err = extract_docx(b"this is an old binary .doc file").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)));
    }

    #[test]
    fn test_zip_without_document_xml_is_corrupt() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("other.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"hello").unwrap();
            writer.finish().unwrap();
        }
        let err = extract_docx(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(msg) if msg.contains("document.xml")));
    }
}
