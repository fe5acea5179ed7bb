#![forbid(unsafe_code)]

//! Reference text document originator.
//!
//! Unlike [`rewind::Subject`], this implements [`Originator`] by hand and
//! keeps a field (`edits`) outside the captured state, so tests can check
//! that restores only touch what was captured.

use rewind::{ForeignSnapshot, OriginId, Originator, Snapshot};

/// The captured part of a [`TextDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocState {
    pub text: String,
    /// Byte offset of the cursor; always on a char boundary.
    pub cursor: usize,
}

#[derive(Debug)]
pub struct TextDocument {
    state: DocState,
    origin: OriginId,
    edits: u64,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextDocument {
    /// Create a document with the cursor at the end of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            state: DocState {
                text: text.to_string(),
                cursor: text.len(),
            },
            origin: OriginId::next(),
            edits: 0,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.state.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    #[must_use]
    pub fn doc_state(&self) -> &DocState {
        &self.state
    }

    /// Number of mutations applied, including ones later undone.
    #[must_use]
    pub fn edits(&self) -> u64 {
        self.edits
    }

    /// Insert `s` at the cursor and move the cursor past it.
    pub fn insert(&mut self, s: &str) {
        self.state.text.insert_str(self.state.cursor, s);
        self.state.cursor += s.len();
        self.edits += 1;
    }

    /// Delete up to `n` chars before the cursor. Returns how many were removed.
    pub fn backspace(&mut self, n: usize) -> usize {
        let mut removed = 0;
        while removed < n {
            let Some(ch) = self.state.text[..self.state.cursor].chars().next_back() else {
                break;
            };
            self.state.cursor -= ch.len_utf8();
            self.state.text.remove(self.state.cursor);
            removed += 1;
        }
        self.edits += 1;
        removed
    }

    /// Move the cursor to `offset`, clamped to the text and snapped back to
    /// a char boundary.
    pub fn move_to(&mut self, offset: usize) {
        let mut offset = offset.min(self.state.text.len());
        while !self.state.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.state.cursor = offset;
        self.edits += 1;
    }
}

impl Originator for TextDocument {
    type State = DocState;

    fn origin(&self) -> OriginId {
        self.origin
    }

    fn capture(&self) -> Snapshot<DocState> {
        Snapshot::new(self.origin, self.state.clone())
    }

    fn restore(&mut self, snapshot: Snapshot<DocState>) -> Result<(), ForeignSnapshot<DocState>> {
        if !self.owns(&snapshot) {
            return Err(ForeignSnapshot::new(self.origin, snapshot));
        }
        self.state = snapshot.into_state();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_at_cursor() {
        let mut doc = TextDocument::new("held");
        doc.move_to(3);
        doc.insert("l");
        doc.move_to(usize::MAX);
        doc.insert(" world");
        assert_eq!(doc.text(), "helld world");
        assert_eq!(doc.cursor(), doc.text().len());
    }

    #[test]
    fn backspace_handles_multibyte() {
        let mut doc = TextDocument::new("añb");
        assert_eq!(doc.backspace(2), 2);
        assert_eq!(doc.text(), "a");
        assert_eq!(doc.backspace(5), 1);
        assert_eq!(doc.text(), "");
        assert_eq!(doc.cursor(), 0);
    }

    #[test]
    fn move_to_snaps_to_boundary() {
        let mut doc = TextDocument::new("ñ");
        doc.move_to(1);
        assert_eq!(doc.cursor(), 0);
    }

    #[test]
    fn restore_keeps_edit_counter() {
        let mut doc = TextDocument::new("x");
        let snap = doc.capture();
        doc.insert("y");
        doc.restore(snap).unwrap();
        assert_eq!(doc.text(), "x");
        assert_eq!(doc.edits(), 1);
    }

    #[test]
    fn restore_rejects_other_document() {
        let mut a = TextDocument::new("a");
        let b = TextDocument::new("b");
        assert!(a.restore(b.capture()).is_err());
        assert_eq!(a.text(), "a");
    }
}
