use ropey::Rope;
use tracing::debug;

use crate::document::scan::{ElementSpan, local, scan};
use crate::document::{
    BoundsError, DocumentAccess, DocumentNotice, Listener, ListenerRegistry, QueryError,
    Subscription,
};
use crate::markup::{COORDINATE_ATTRS, TextRange, ZONE_ELEMENT, ZoneQuery};

/// Caret position as a line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in characters.
    pub col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Insert { at: usize, text: String },
    Delete { at: usize, text: String },
}

/// Rope-backed markup buffer implementing [`DocumentAccess`].
///
/// All offsets are character offsets. Every edit is recorded for undo;
/// edits made between `begin_edit_group` and the matching
/// `end_edit_group` undo as one step.
pub struct XmlBuffer {
    rope: Rope,
    caret: usize,
    anchor: Option<usize>,
    /// Column remembered across vertical moves.
    col_memory: usize,
    dirty: bool,
    group_depth: usize,
    group: Vec<Change>,
    undo: Vec<Vec<Change>>,
    listeners: ListenerRegistry,
}

impl XmlBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            caret: 0,
            anchor: None,
            col_memory: 0,
            dirty: false,
            group_depth: 0,
            group: Vec::new(),
            undo: Vec::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Replace the whole content, e.g. after reloading from disk.
    ///
    /// Clears the undo history and the selection.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.caret = self.caret.min(self.rope.len_chars());
        self.anchor = None;
        self.undo.clear();
        self.group.clear();
        self.dirty = false;
        self.listeners.notify(&DocumentNotice::Changed);
        self.listeners.notify(&DocumentNotice::CaretMoved(self.caret));
    }

    pub fn cursor(&self) -> Cursor {
        let line = self.rope.char_to_line(self.caret);
        Cursor::at(line, self.caret - self.rope.line_to_char(line))
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its line break.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in characters, without its line break.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: usize) -> String {
        let line = self.rope.char_to_line(offset.min(self.rope.len_chars()));
        self.rope
            .line(line)
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Revert the most recent undo group. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(group) = self.undo.pop() else {
            return false;
        };
        let mut caret = self.caret;
        for change in group.iter().rev() {
            match change {
                Change::Insert { at, text } => {
                    self.rope.remove(*at..*at + text.chars().count());
                    caret = *at;
                }
                Change::Delete { at, text } => {
                    self.rope.insert(*at, text);
                    caret = *at + text.chars().count();
                }
            }
        }
        debug!(changes = group.len(), "undo");
        self.dirty = true;
        self.anchor = None;
        self.listeners.notify(&DocumentNotice::Changed);
        self.set_caret(caret.min(self.rope.len_chars()));
        true
    }

    // --- Typing helpers ---

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.type_text(ch.encode_utf8(&mut buf));
    }

    /// Split the current line at the caret (Enter key).
    pub fn split_line(&mut self) {
        self.type_text("\n");
    }

    /// Delete the selection, or the character before the caret.
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.caret == 0 {
            return false;
        }
        let at = self.caret - 1;
        self.apply_delete(at, self.caret);
        self.set_caret(at);
        true
    }

    /// Delete the selection, or the character at the caret.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.caret >= self.rope.len_chars() {
            return false;
        }
        self.apply_delete(self.caret, self.caret + 1);
        true
    }

    fn type_text(&mut self, text: &str) {
        self.delete_selection();
        let at = self.caret;
        self.apply_insert(at, text);
        self.set_caret(at + text.chars().count());
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.anchor = None;
        self.apply_delete(start, end);
        self.set_caret(start);
        true
    }

    // --- Caret movement ---

    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        match direction {
            Direction::Left => self.set_caret(self.caret.saturating_sub(1)),
            Direction::Right => self.set_caret((self.caret + 1).min(self.rope.len_chars())),
            Direction::Up => {
                let line = self.cursor().line;
                if line > 0 {
                    self.move_vertically(line - 1);
                }
            }
            Direction::Down => {
                let line = self.cursor().line;
                if line + 1 < self.line_count() {
                    self.move_vertically(line + 1);
                }
            }
        }
    }

    pub fn move_home(&mut self) {
        let line = self.cursor().line;
        self.move_to(line, 0);
    }

    pub fn move_end(&mut self) {
        let line = self.cursor().line;
        self.move_to(line, self.line_len(line));
    }

    /// Move to a line and column, clamped to the buffer.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        let line = line.min(self.line_count().saturating_sub(1));
        let col = col.min(self.line_len(line));
        self.set_caret(self.rope.line_to_char(line) + col);
    }

    pub fn move_to_start(&mut self) {
        self.move_to(0, 0);
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.move_to(last, self.line_len(last));
    }

    fn move_vertically(&mut self, line: usize) {
        let memory = self.col_memory;
        let col = memory.min(self.line_len(line));
        self.move_caret_quietly(self.rope.line_to_char(line) + col);
        self.col_memory = memory;
    }

    fn move_caret_quietly(&mut self, offset: usize) {
        if offset != self.caret {
            self.caret = offset;
            self.listeners.notify(&DocumentNotice::CaretMoved(offset));
        }
    }

    fn set_caret(&mut self, offset: usize) {
        self.move_caret_quietly(offset);
        self.col_memory = self.cursor().col;
    }

    // --- Raw edits ---

    fn check_offset(&self, offset: usize) -> Result<(), BoundsError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(BoundsError::Offset { offset, len });
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), BoundsError> {
        if start > end {
            return Err(BoundsError::Reversed { start, end });
        }
        self.check_offset(end)
    }

    fn record(&mut self, change: Change) {
        if self.group_depth > 0 {
            self.group.push(change);
        } else {
            self.undo.push(vec![change]);
        }
    }

    fn apply_insert(&mut self, at: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.rope.insert(at, text);
        self.record(Change::Insert {
            at,
            text: text.to_string(),
        });
        self.dirty = true;
        let len = text.chars().count();
        if let Some(anchor) = self.anchor.as_mut()
            && *anchor >= at
        {
            *anchor += len;
        }
        self.listeners.notify(&DocumentNotice::Changed);
        if self.caret >= at {
            self.move_caret_quietly(self.caret + len);
        }
    }

    fn apply_delete(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let text = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.record(Change::Delete { at: start, text });
        self.dirty = true;
        let shift = |offset: usize| {
            if offset >= end {
                offset - (end - start)
            } else {
                offset.min(start)
            }
        };
        self.anchor = self.anchor.map(shift);
        self.listeners.notify(&DocumentNotice::Changed);
        self.move_caret_quietly(shift(self.caret));
    }

    // --- Structural queries ---

    fn scan(&self) -> Result<(String, Vec<ElementSpan>), QueryError> {
        let text = self.rope.to_string();
        let elements = scan(&text)?;
        Ok((text, elements))
    }

    fn select_elements<'a>(
        &self,
        query: &ZoneQuery,
        elements: &'a [ElementSpan],
    ) -> Result<Vec<&'a ElementSpan>, QueryError> {
        let mut zones = elements
            .iter()
            .filter(|el| el.local_name() == ZONE_ELEMENT);
        let selected = match query {
            ZoneQuery::Zones => zones.collect(),
            ZoneQuery::ZoneAt(region) => {
                let wanted = region.to_string();
                zones.filter(|el| coordinate_tuple(el) == wanted).collect()
            }
            ZoneQuery::NthZone(n) => zones.nth(*n).into_iter().collect(),
            ZoneQuery::EnclosingZone => {
                let caret = self.rope.char_to_byte(self.caret);
                // Later starts are nested deeper.
                zones
                    .filter(|el| el.encloses(caret))
                    .max_by_key(|el| el.start)
                    .into_iter()
                    .collect()
            }
            ZoneQuery::GraphicByUrl(url) => elements
                .iter()
                .filter(|el| el.local_name() == "graphic")
                .filter(|el| el.attribute("url").is_some_and(|a| a.value == *url))
                .collect(),
            ZoneQuery::Coordinates(_) => {
                return Err(QueryError::Unsupported(query.to_string()));
            }
        };
        Ok(selected)
    }

    fn range_of(&self, start_byte: usize, end_byte: usize) -> TextRange {
        let (start_line, start_col) = self.line_col(self.rope.byte_to_char(start_byte));
        let (end_line, end_col) = self.line_col(self.rope.byte_to_char(end_byte));
        TextRange::new(start_line, start_col, end_line, end_col)
    }

    /// 1-based line and column of a character offset.
    fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.rope.char_to_line(offset);
        (line + 1, offset - self.rope.line_to_char(line) + 1)
    }
}

/// `ulx,uly,lrx,lry` as written, with missing attributes left empty.
fn coordinate_tuple(el: &ElementSpan) -> String {
    COORDINATE_ATTRS
        .iter()
        .map(|name| el.attribute(name).map_or("", |a| a.value.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

impl DocumentAccess for XmlBuffer {
    fn evaluate(&self, query: &ZoneQuery) -> Result<Vec<String>, QueryError> {
        let (_, elements) = self.scan()?;
        let result = match query {
            ZoneQuery::Coordinates(inner) => self
                .select_elements(inner, &elements)?
                .into_iter()
                .flat_map(|el| {
                    COORDINATE_ATTRS
                        .iter()
                        .filter_map(move |name| el.attribute(name).map(|a| a.value.clone()))
                })
                .collect(),
            ZoneQuery::GraphicByUrl(_) => self
                .select_elements(query, &elements)?
                .into_iter()
                .filter_map(|el| el.attribute("url").map(|a| a.value.clone()))
                .collect(),
            _ => self
                .select_elements(query, &elements)?
                .into_iter()
                .map(coordinate_tuple)
                .collect(),
        };
        debug!(%query, matches = ?result, "evaluate");
        Ok(result)
    }

    fn find_ranges(&self, query: &ZoneQuery) -> Result<Vec<TextRange>, QueryError> {
        let (_, elements) = self.scan()?;
        let mut ranges: Vec<TextRange> = match query {
            ZoneQuery::Coordinates(inner) => self
                .select_elements(inner, &elements)?
                .into_iter()
                .flat_map(|el| {
                    el.attributes.iter().filter(|a| {
                        COORDINATE_ATTRS.contains(&local(&a.name))
                    })
                })
                .map(|a| self.range_of(a.start, a.end))
                .collect(),
            _ => self
                .select_elements(query, &elements)?
                .into_iter()
                .map(|el| self.range_of(el.start, el.end))
                .collect(),
        };
        ranges.sort();
        debug!(%query, found = ranges.len(), "find_ranges");
        Ok(ranges)
    }

    fn line_start_offset(&self, line: usize) -> Result<usize, BoundsError> {
        let lines = self.rope.len_lines();
        if line == 0 || line > lines {
            return Err(BoundsError::Line { line, lines });
        }
        Ok(self.rope.line_to_char(line - 1))
    }

    fn text(&self, start: usize, end: usize) -> Result<String, BoundsError> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection()?;
        Some(self.rope.slice(start..end).to_string())
    }

    fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        (anchor != self.caret).then(|| (anchor.min(self.caret), anchor.max(self.caret)))
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn select(&mut self, start: usize, end: usize) -> Result<(), BoundsError> {
        self.check_range(start, end)?;
        self.anchor = Some(start);
        self.set_caret(end);
        Ok(())
    }

    fn begin_edit_group(&mut self) {
        self.group_depth += 1;
    }

    fn end_edit_group(&mut self) {
        match self.group_depth {
            0 => {}
            1 => {
                self.group_depth = 0;
                let group = std::mem::take(&mut self.group);
                if !group.is_empty() {
                    self.undo.push(group);
                }
            }
            _ => self.group_depth -= 1,
        }
    }

    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), BoundsError> {
        self.check_offset(offset)?;
        self.apply_insert(offset, text);
        Ok(())
    }

    fn delete_text(&mut self, start: usize, end: usize) -> Result<(), BoundsError> {
        self.check_range(start, end)?;
        self.apply_delete(start, end);
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

impl std::fmt::Debug for XmlBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("caret", &self.caret)
            .field("anchor", &self.anchor)
            .field("dirty", &self.dirty)
            .field("undo", &self.undo.len())
            .finish_non_exhaustive()
    }
}
