use doc_engine::view::NullView;
use doc_engine::{Cursor, DocConfig, Document, DocumentRegistry, LineEnding, RcLoader};
use std::fs;

#[test]
fn round_trip_keeps_each_line_ending() {
    let dir = tempfile::tempdir().unwrap();
    for (name, content, eol) in [
        ("unix.txt", "a\nb\n", LineEnding::Unix),
        ("dos.txt", "a\r\nb\r\n", LineEnding::Dos),
        ("mac.txt", "a\rb\r", LineEnding::Mac),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        let mut doc = Document::from_file(&path).unwrap();
        assert_eq!(doc.line_ending(), eol);
        assert_eq!(doc.line_count(), 3);
        doc.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}

#[test]
fn converting_line_ending_marks_modified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.txt");
    fs::write(&path, "x\ny").unwrap();

    let mut doc = Document::from_file(&path).unwrap();
    assert!(!doc.is_modified());
    doc.set_line_ending(LineEnding::Dos);
    assert!(doc.is_modified());

    let out = dir.path().join("out.txt");
    let written = doc.save_as(&out).unwrap();
    assert_eq!(written, 4);
    assert_eq!(fs::read_to_string(&out).unwrap(), "x\r\ny");
    assert_eq!(doc.filename(), Some(out.as_path()));
    assert!(!doc.is_modified());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Document::from_file(dir.path().join("absent.txt"));
    assert!(matches!(result, Err(doc_engine::EditError::Io(_))));
}

#[test]
fn rc_file_configures_registry_documents() {
    let dir = tempfile::tempdir().unwrap();
    let rc = dir.path().join(".docenginerc");
    fs::write(&rc, "set tabstop=2\nset expandtab\nset fileformat=dos\n").unwrap();
    let config = RcLoader::load_from(&rc).unwrap();
    assert_eq!(
        config,
        DocConfig {
            tab_width: 2,
            replace_tabs: true,
            space_indent: true,
            line_ending: LineEnding::Dos,
            ..DocConfig::default()
        }
    );

    let mut registry = DocumentRegistry::with_config(config);
    let id = registry.open(dir.path().join("fresh.txt")).unwrap();
    let doc = registry.get_mut(id).unwrap();
    assert_eq!(doc.line_ending(), LineEnding::Dos);
    doc.insert_text(0, 0, "a\nb").unwrap();
    doc.select_all();
    doc.do_indent(0, 1).unwrap();
    assert_eq!(doc.text(), "  a\n  b");
    doc.save().unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("fresh.txt")).unwrap(), "  a\r\n  b");
    registry.close(id, false).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn pasted_crlf_text_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dos.txt");
    fs::write(&path, "a\r\nb").unwrap();

    let mut doc = Document::from_file(&path).unwrap();
    let view = doc.attach_view(Box::new(NullView));
    doc.set_view_cursor(view, Cursor::new(0, 1)).unwrap();
    doc.paste(view, "x\r\ny").unwrap();
    doc.save().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "ax\r\ny\r\nb");

    let reloaded = Document::from_file(&path).unwrap();
    assert_eq!(reloaded.line_count(), 3);
    assert_eq!(reloaded.text(), "ax\ny\nb");
}
