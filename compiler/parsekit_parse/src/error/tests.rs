#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn syntax(line: usize, column: usize, message: &str) -> SyntaxError {
    SyntaxError {
        position: Position {
            filename: None,
            offset: 0,
            line,
            column,
        },
        message: message.to_owned(),
    }
}

// === Rendering ===

#[test]
fn syntax_error_renders_position_first() {
    let e = syntax(2, 1, r#"expected the option keyword, got "opton" instead"#);
    assert_eq!(
        e.to_string(),
        r#"at <input>:2:1: expected the option keyword, got "opton" instead"#
    );
    assert_eq!(Error::from(e.clone()).to_string(), e.to_string());
}

#[test]
fn source_and_custom_errors() {
    let source = Error::Source(Arc::new(io::Error::new(io::ErrorKind::NotFound, "gone")));
    assert_eq!(source.to_string(), "cannot read input: gone");
    assert!(source.as_syntax().is_none());

    let custom = Error::Custom("lease table full".into());
    assert_eq!(custom.to_string(), "lease table full");
}

#[test]
fn errors_join_with_newlines() {
    let errors = ParseErrors::from_vec(vec![
        Error::from(syntax(1, 5, "first")),
        Error::from(syntax(4, 2, "second")),
    ])
    .expect("two errors");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.to_string(), "at <input>:1:5: first\nat <input>:4:2: second");
    assert!(errors.source().is_some());
}

#[test]
fn no_errors_means_no_aggregate() {
    assert!(ParseErrors::from_vec(Vec::new()).is_none());
}

#[test]
fn into_vec_keeps_recording_order() {
    let errors = ParseErrors::from_vec(vec![
        Error::from(syntax(2, 1, "first")),
        Error::from(syntax(1, 7, "second")),
    ])
    .expect("two errors");
    let messages: Vec<String> = errors
        .into_vec()
        .iter()
        .filter_map(Error::as_syntax)
        .map(|e| e.message.clone())
        .collect();
    assert_eq!(messages, ["first", "second"]);
}
