//! Paragraph diffs between versions of word documents

use quill_core::Splice;
use quill_journal::{DocumentType, Engine, EngineError, TextDiff};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;

/// Minimal `.docx` with one `w:p` per paragraph
fn docx(paragraphs: &[&str], rsid: &str) -> Vec<u8> {
    let mut body = String::new();
    for text in paragraphs {
        body.push_str(&format!(
            "<w:p w:rsidR=\"{}\"><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\r\n",
            rsid, text
        ));
    }
    docx_body(&body)
}

/// Minimal `.docx` around raw body XML
fn docx_body(body: &str) -> Vec<u8> {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<w:document><w:body>{}</w:body></w:document>",
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn track(doc: &Path, document_type: DocumentType, versions: &[Vec<u8>]) -> anyhow::Result<Engine<Splice>> {
    let engine = Engine::with_patch(Splice);
    std::fs::write(doc, &versions[0])?;
    engine.init(doc, document_type, 5, "Initial version")?;
    for data in &versions[1..] {
        std::fs::write(doc, data)?;
        engine.add(doc, "Update")?;
    }
    Ok(engine)
}

#[test]
fn test_changed_paragraphs() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let doc = temp_dir.path().join("essay.docx");
    let engine = track(
        &doc,
        DocumentType::WordDocument,
        &[
            docx(&["Introduction", "The cat sat.", "Conclusion"], "00AA"),
            docx(&["Introduction", "The dog sat &amp; slept.", "Conclusion"], "00BB"),
        ],
    )?;

    match engine.text_diff(&doc, 1, 2)? {
        TextDiff::Changed(diff) => {
            assert!(diff.contains("--- v1"), "diff was:\n{}", diff);
            assert!(diff.contains("+++ v2"));
            assert!(diff.contains("-The cat sat.\n"));
            assert!(diff.contains("+The dog sat & slept.\n"));
            assert!(diff.contains(" Introduction\n"));
        }
        other => panic!("expected a diff, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_resave_without_text_change_is_identical() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let doc = temp_dir.path().join("essay.docx");
    let engine = track(
        &doc,
        DocumentType::WordDocument,
        &[
            docx(&["Only paragraph"], "0001"),
            docx(&["Only paragraph"], "0002"),
        ],
    )?;

    assert_eq!(engine.text_diff(&doc, 1, 2)?, TextDiff::Identical);
    assert_eq!(engine.text_diff(&doc, 2, 2)?, TextDiff::Identical);
    Ok(())
}

#[test]
fn test_pdf_is_unsupported() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let doc = temp_dir.path().join("scan.pdf");
    let engine = track(
        &doc,
        DocumentType::Pdf,
        &[b"%PDF-1.4 a".to_vec(), b"%PDF-1.4 b".to_vec()],
    )?;

    assert_eq!(
        engine.text_diff(&doc, 1, 2)?,
        TextDiff::Unsupported(DocumentType::Pdf)
    );
    Ok(())
}

#[test]
fn test_unreadable_docx_names_version() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let doc = temp_dir.path().join("broken.docx");
    let engine = track(
        &doc,
        DocumentType::WordDocument,
        &[docx(&["Fine"], "01"), b"not a zip at all".to_vec()],
    )?;

    match engine.text_diff(&doc, 1, 2) {
        Err(EngineError::TextExtraction { version, .. }) => assert_eq!(version, 2),
        other => panic!("expected text extraction error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_diff_out_of_range() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let doc = temp_dir.path().join("essay.docx");
    let engine = track(&doc, DocumentType::WordDocument, &[docx(&["One"], "01")])?;

    let err = engine.text_diff(&doc, 1, 7).unwrap_err();
    assert!(matches!(err, EngineError::VersionOutOfRange { requested: 7, latest: 1 }));
    Ok(())
}

#[test]
fn test_text_box_edit_is_detected() -> anyhow::Result<()> {
    let with_text_box = |tail: &str| {
        docx_body(&format!(
            concat!(
                "<w:p><w:r><w:t>Before</w:t></w:r>",
                "<w:r><w:pict><w:txbxContent><w:p><w:r><w:t>Inner</w:t></w:r></w:p>",
                "</w:txbxContent></w:pict></w:r>",
                "<w:r><w:t xml:space=\"preserve\"> {}</w:t></w:r></w:p>"
            ),
            tail
        ))
    };

    let temp_dir = TempDir::new()?;
    let doc = temp_dir.path().join("flyer.docx");
    let engine = track(
        &doc,
        DocumentType::WordDocument,
        &[with_text_box("After one"), with_text_box("After two")],
    )?;

    match engine.text_diff(&doc, 1, 2)? {
        TextDiff::Changed(diff) => {
            assert!(diff.contains("-Before After one\n"), "diff was:\n{}", diff);
            assert!(diff.contains("+Before After two\n"), "diff was:\n{}", diff);
            assert!(diff.contains(" Inner\n"), "diff was:\n{}", diff);
        }
        other => panic!("expected a diff, got {:?}", other),
    }

    Ok(())
}
