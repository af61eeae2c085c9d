use doc_engine::document_model::mark_type;
use doc_engine::view::NullView;
use doc_engine::{Cursor, Document};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    InsertText { line: usize, column: usize, text: String },
    RemoveText { line: usize, column: usize, len: usize },
    Wrap { line: usize, column: usize },
    Unwrap { line: usize, column: usize },
    InsertLine { line: usize, text: String },
    RemoveLine { line: usize },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..8, 0usize..10, "[a-z ]{1,5}")
            .prop_map(|(line, column, text)| Edit::InsertText { line, column, text }),
        (0usize..8, 0usize..10, 1usize..6)
            .prop_map(|(line, column, len)| Edit::RemoveText { line, column, len }),
        (0usize..8, 0usize..10).prop_map(|(line, column)| Edit::Wrap { line, column }),
        (0usize..8, 0usize..10).prop_map(|(line, column)| Edit::Unwrap { line, column }),
        (0usize..9, "[a-z]{0,4}").prop_map(|(line, text)| Edit::InsertLine { line, text }),
        (0usize..8).prop_map(|line| Edit::RemoveLine { line }),
    ]
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z ]{0,6}", 1..5)
}

/// Apply with the line index folded into the document; refused edits
/// such as removing the only line are skipped.
fn apply(doc: &mut Document, edit: &Edit) {
    let count = doc.line_count();
    let _ = match edit {
        Edit::InsertText { line, column, text } => doc.edit_insert_text(line % count, *column, text),
        Edit::RemoveText { line, column, len } => doc.edit_remove_text(line % count, *column, *len),
        Edit::Wrap { line, column } => doc.edit_wrap_line(line % count, *column),
        Edit::Unwrap { line, column } => doc.edit_unwrap_line(line % count, *column),
        Edit::InsertLine { line, text } => doc.edit_insert_line(line % (count + 1), text),
        Edit::RemoveLine { line } => doc.edit_remove_line(line % count),
    };
}

fn marks_of(doc: &Document) -> Vec<u32> {
    (0..doc.line_count()).map(|line| doc.mark(line)).collect()
}

proptest! {
    #[test]
    fn prop_undo_all_then_redo_all_round_trips(
        lines in lines_strategy(),
        sessions in prop::collection::vec(prop::collection::vec(edit_strategy(), 1..5), 1..8),
    ) {
        let mut doc = Document::from_text(&lines.join("\n"));
        let original = doc.text();
        for session in &sessions {
            doc.edit_start();
            for edit in session {
                apply(&mut doc, edit);
            }
            doc.edit_end();
        }
        let edited = doc.text();

        while doc.undo() {}
        prop_assert_eq!(doc.text(), original);
        while doc.redo() {}
        prop_assert_eq!(doc.text(), edited);
    }

    #[test]
    fn prop_insert_moves_cursors_after_the_point(
        text in "[a-z]{0,12}",
        at in 0usize..13,
        cursor in 0usize..13,
        inserted in "[a-z]{1,6}",
    ) {
        let len = text.chars().count();
        let (at, cursor) = (at.min(len), cursor.min(len));
        let n = inserted.chars().count();

        let mut doc = Document::from_text(&text);
        let view = doc.attach_view(Box::new(NullView));
        doc.set_view_cursor(view, Cursor::new(0, cursor)).unwrap();
        doc.edit_insert_text(0, at, &inserted).unwrap();

        let expected = if cursor > at { cursor + n } else { cursor };
        prop_assert_eq!(doc.view_cursor(view), Some(Cursor::new(0, expected)));
    }

    #[test]
    fn prop_remove_pulls_cursors_back(
        text in "[a-z]{1,12}",
        at in 0usize..12,
        cursor in 0usize..13,
        n in 1usize..6,
    ) {
        let len = text.chars().count();
        let at = at.min(len - 1);
        let n = n.min(len - at);
        let cursor = cursor.min(len);

        let mut doc = Document::from_text(&text);
        let view = doc.attach_view(Box::new(NullView));
        doc.set_view_cursor(view, Cursor::new(0, cursor)).unwrap();
        doc.edit_remove_text(0, at, n).unwrap();

        let expected = if cursor > at { at.max(cursor - n.min(cursor)) } else { cursor };
        prop_assert_eq!(doc.view_cursor(view), Some(Cursor::new(0, expected)));
    }

    #[test]
    fn prop_insert_line_then_remove_line_restores_marks_and_cursor(
        lines in lines_strategy(),
        marked in 0usize..5,
        cursor_line in 0usize..5,
        at in 0usize..6,
    ) {
        let mut doc = Document::from_text(&lines.join("\n"));
        let count = doc.line_count();
        doc.set_mark(marked % count, mark_type::BOOKMARK).unwrap();
        let view = doc.attach_view(Box::new(NullView));
        let cursor = doc.normalize_cursor(Cursor::new(cursor_line % count, 2));
        doc.set_view_cursor(view, cursor).unwrap();
        let marks = marks_of(&doc);
        let at = at % (count + 1);

        doc.edit_insert_line(at, "inserted").unwrap();
        doc.edit_remove_line(at).unwrap();

        prop_assert_eq!(marks_of(&doc), marks);
        prop_assert_eq!(doc.view_cursor(view), Some(cursor));
        prop_assert_eq!(doc.text(), lines.join("\n"));
    }

    #[test]
    fn prop_selection_ignores_endpoint_order(
        lines in lines_strategy(),
        a in (0usize..5, 0usize..7),
        b in (0usize..5, 0usize..7),
    ) {
        let text = lines.join("\n");
        let (a, b) = (Cursor::new(a.0, a.1), Cursor::new(b.0, b.1));

        let mut forward = Document::from_text(&text);
        forward.set_selection(a, b);
        let mut backward = Document::from_text(&text);
        backward.set_selection(b, a);

        prop_assert_eq!(forward.selection(), backward.selection());
        prop_assert!(forward.selection().start() <= forward.selection().end());
        prop_assert_eq!(forward.selection_text(), backward.selection_text());
    }
}
