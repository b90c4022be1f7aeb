use crate::{ModalEffect, SubEditor};
use pipeloom_types::{Key, KeyCode, KeyModifiers};

/// `^f`-triggered overlay for inserting a `../`-relative path into the
/// content buffer at the caret.
#[derive(Debug, Default)]
pub struct FileReferencePicker {
    active: bool,
    candidates: Vec<String>,
    cursor: usize,
}

impl FileReferencePicker {
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn open(&mut self, candidates: Vec<String>) {
        self.active = true;
        self.candidates = candidates;
        self.cursor = 0;
    }

    fn close(&mut self) {
        self.active = false;
        self.candidates.clear();
        self.cursor = 0;
    }
}

/// In-TUI multiline content editor. Tracks a simple
/// line/column buffer, an unsaved flag, an exit-confirm sub-state, and an
/// optional file-reference picker overlay.
#[derive(Debug)]
pub struct ContentEditorModal {
    active: bool,
    lines: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
    original: String,
    exit_confirm_active: bool,
    picker: FileReferencePicker,
    committed: Option<String>,
    pending_disk_write: Option<String>,
}

impl ContentEditorModal {
    pub fn open(initial_content: &str) -> Self {
        let lines = split_lines(initial_content);
        Self {
            active: true,
            lines,
            cursor_line: 0,
            cursor_col: 0,
            original: initial_content.to_string(),
            exit_confirm_active: false,
            picker: FileReferencePicker::default(),
            committed: None,
            pending_disk_write: None,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    pub fn is_dirty(&self) -> bool {
        self.text() != self.original
    }

    pub fn exit_confirm_active(&self) -> bool {
        self.exit_confirm_active
    }

    pub fn picker(&self) -> &FileReferencePicker {
        &self.picker
    }

    pub fn open_picker(&mut self, candidates: Vec<String>) {
        self.picker.open(candidates);
    }

    /// Takes the saved content if `^s` committed since the last call. The
    /// caller (controller) is responsible for the actual write, the status
    /// banner, the catalog reload, and the preview refresh.
    pub fn take_save_result(&mut self) -> Option<String> {
        self.committed.take()
    }

    /// Takes pending content that must be flushed to disk before an
    /// external-editor suspension.
    pub fn take_pending_disk_write(&mut self) -> Option<String> {
        self.pending_disk_write.take()
    }

    /// Called when the user triggers `^x` from inside this modal.
    pub fn request_external_edit(&mut self) {
        self.pending_disk_write = Some(self.text());
    }

    fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        let line = &mut self.lines[self.cursor_line];
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        line.insert(byte_idx, c);
        self.cursor_col += 1;
    }

    fn insert_newline(&mut self) {
        let line = &mut self.lines[self.cursor_line];
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let rest = line.split_off(byte_idx);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let char_idx = self.cursor_col - 1;
            let byte_idx = char_to_byte_index(line, char_idx);
            line.remove(byte_idx);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            let prev_len = self.lines[self.cursor_line].chars().count();
            self.lines[self.cursor_line].push_str(&current);
            self.cursor_col = prev_len;
        }
    }

    fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.lines[self.cursor_line].chars().count();
        }
    }

    fn move_right(&mut self) {
        let len = self.lines[self.cursor_line].chars().count();
        if self.cursor_col < len {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_col();
        }
    }

    fn move_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.clamp_col();
        }
    }

    fn clamp_col(&mut self) {
        let len = self.lines[self.cursor_line].chars().count();
        self.cursor_col = self.cursor_col.min(len);
    }

    fn handle_picker_input(&mut self, key: Key) -> (bool, ModalEffect) {
        match key.code {
            KeyCode::Up => {
                if self.picker.cursor > 0 {
                    self.picker.cursor -= 1;
                }
                (true, ModalEffect::None)
            }
            KeyCode::Down => {
                if self.picker.cursor + 1 < self.picker.candidates.len() {
                    self.picker.cursor += 1;
                }
                (true, ModalEffect::None)
            }
            KeyCode::Enter => {
                if let Some(chosen) = self.picker.candidates.get(self.picker.cursor).cloned() {
                    for c in chosen.chars() {
                        self.insert_char(c);
                    }
                }
                self.picker.close();
                (true, ModalEffect::None)
            }
            KeyCode::Esc => {
                self.picker.close();
                (true, ModalEffect::None)
            }
            _ => (true, ModalEffect::None),
        }
    }
}

impl SubEditor for ContentEditorModal {
    fn is_active(&self) -> bool {
        self.active
    }

    fn handle_input(&mut self, key: Key) -> (bool, ModalEffect) {
        if !self.active {
            return (false, ModalEffect::None);
        }

        if self.picker.active {
            return self.handle_picker_input(key);
        }

        if self.exit_confirm_active {
            return match key.code {
                KeyCode::Char('y') => {
                    self.active = false;
                    self.exit_confirm_active = false;
                    (true, ModalEffect::None)
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.exit_confirm_active = false;
                    (true, ModalEffect::None)
                }
                _ => (true, ModalEffect::None),
            };
        }

        if key.modifiers.contains(KeyModifiers::CTRL) {
            return match key.code {
                KeyCode::Char('s') => {
                    self.committed = Some(self.text());
                    self.active = false;
                    (true, ModalEffect::None)
                }
                KeyCode::Char('x') => {
                    self.request_external_edit();
                    (true, ModalEffect::None)
                }
                KeyCode::Char('f') => (true, ModalEffect::OpenFilePicker),
                _ => (false, ModalEffect::None),
            };
        }

        match key.code {
            KeyCode::Esc => {
                if self.is_dirty() {
                    self.exit_confirm_active = true;
                } else {
                    self.active = false;
                }
                (true, ModalEffect::None)
            }
            KeyCode::Enter => {
                self.insert_newline();
                (true, ModalEffect::None)
            }
            KeyCode::Backspace => {
                self.backspace();
                (true, ModalEffect::None)
            }
            KeyCode::Left => {
                self.move_left();
                (true, ModalEffect::None)
            }
            KeyCode::Right => {
                self.move_right();
                (true, ModalEffect::None)
            }
            KeyCode::Up => {
                self.move_up();
                (true, ModalEffect::None)
            }
            KeyCode::Down => {
                self.move_down();
                (true, ModalEffect::None)
            }
            KeyCode::Char(c) => {
                self.insert_char(c);
                (true, ModalEffect::None)
            }
            _ => (false, ModalEffect::None),
        }
    }

    fn set_size(&mut self, _width: u16, _height: u16) {}
}

fn split_lines(s: &str) -> Vec<String> {
    if s.is_empty() {
        vec![String::new()]
    } else {
        s.lines().map(str::to_string).collect()
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}
