//! The screen-editor: cursor tracking mirrored into zero page, the
//! 80-character logical-line wrap rule, and the line-editor's backspace
//! behavior.

use crate::devices::bus::Bus;
use crate::devices::screen::COLUMNS;

/// Zero-page cursor mirror, in the usual monitor-ROM convention: $D3
/// holds the cursor column, $D6 holds the cursor row.
const ZP_CURSOR_COL: u16 = 0x00D3;
const ZP_CURSOR_ROW: u16 = 0x00D6;

const LAST_COLUMN: u8 = (COLUMNS - 1) as u8;
const LAST_ROW: u8 = 24;
const LOGICAL_LINE_LIMIT: u8 = 80;

/// Owns the logical-line counter that spans the two physical rows a
/// logical line can occupy; everything else is read back from [`Screen`]
/// each call rather than duplicated here.
pub struct ScreenEditor {
    logical_col: u8,
}

impl ScreenEditor {
    pub fn new() -> ScreenEditor {
        ScreenEditor { logical_col: 0 }
    }

    fn sync_zero_page(&self, bus: &mut Bus) {
        let (col, row) = bus.screen().get_cursor();
        bus.write(ZP_CURSOR_COL, col);
        bus.write(ZP_CURSOR_ROW, row);
    }

    /// `K_PRINT_CHAR`: print `byte` at the cursor, advance it, wrap at
    /// column 39, scroll on row-24 overflow, and enforce the 80-character
    /// logical-line cap. A bare CR is treated as `newline`.
    pub fn print_char(&mut self, bus: &mut Bus, byte: u8) {
        if byte == 0x0D {
            self.newline(bus);
            return;
        }
        if self.logical_col >= LOGICAL_LINE_LIMIT {
            return;
        }
        let (col, row) = bus.screen().get_cursor();
        bus.screen_mut().set_char_at(col, row, byte);
        self.logical_col += 1;
        if col == LAST_COLUMN {
            if row == LAST_ROW {
                bus.screen_mut().scroll_up();
                bus.screen_mut().set_cursor(0, LAST_ROW);
            } else {
                bus.screen_mut().set_cursor(0, row + 1);
            }
        } else {
            bus.screen_mut().set_cursor(col + 1, row);
        }
        self.sync_zero_page(bus);
    }

    pub fn print_str(&mut self, bus: &mut Bus, bytes: &[u8]) {
        for &b in bytes {
            self.print_char(bus, b);
        }
    }

    /// `K_NEWLINE`: advance to column 0 of the next row, scrolling if row
    /// 24 overflows, and close out the current logical line.
    pub fn newline(&mut self, bus: &mut Bus) {
        let (_, row) = bus.screen().get_cursor();
        if row == LAST_ROW {
            bus.screen_mut().scroll_up();
            bus.screen_mut().set_cursor(0, LAST_ROW);
        } else {
            bus.screen_mut().set_cursor(0, row + 1);
        }
        self.logical_col = 0;
        self.sync_zero_page(bus);
    }

    /// `K_CLEAR`: clear the screen, home the cursor, reset the logical
    /// line.
    pub fn clear(&mut self, bus: &mut Bus) {
        bus.screen_mut().clear();
        self.logical_col = 0;
        self.sync_zero_page(bus);
    }

    /// Erase the previous character, un-wrapping across the row pair a
    /// logical line spans. Not part of the jump table; the line editor
    /// calls this directly while collecting monitor input.
    pub fn backspace(&mut self, bus: &mut Bus) {
        if self.logical_col == 0 {
            return;
        }
        self.logical_col -= 1;
        let (col, row) = bus.screen().get_cursor();
        let (new_col, new_row) = if col == 0 {
            (LAST_COLUMN, row.saturating_sub(1))
        } else {
            (col - 1, row)
        };
        bus.screen_mut().set_cursor(new_col, new_row);
        bus.screen_mut().set_char_at(new_col, new_row, 0x20);
        self.sync_zero_page(bus);
    }
}

impl Default for ScreenEditor {
    fn default() -> ScreenEditor {
        ScreenEditor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_char_advances_cursor_and_mirrors_zero_page() {
        let mut bus = Bus::new();
        let mut editor = ScreenEditor::new();
        editor.print_char(&mut bus, b'A');
        assert_eq!(bus.screen().char_at(0, 0), b'A');
        assert_eq!(bus.screen().get_cursor(), (1, 0));
        assert_eq!(bus.read(ZP_CURSOR_COL), 1);
        assert_eq!(bus.read(ZP_CURSOR_ROW), 0);
    }

    #[test]
    fn wraps_to_next_row_at_column_39() {
        let mut bus = Bus::new();
        let mut editor = ScreenEditor::new();
        bus.screen_mut().set_cursor(39, 0);
        editor.print_char(&mut bus, b'Z');
        assert_eq!(bus.screen().get_cursor(), (0, 1));
    }

    #[test]
    fn logical_line_discards_the_81st_character() {
        let mut bus = Bus::new();
        let mut editor = ScreenEditor::new();
        for i in 0..80u16 {
            editor.print_char(&mut bus, b'X');
            let _ = i;
        }
        let cursor_before = bus.screen().get_cursor();
        editor.print_char(&mut bus, b'Y');
        assert_eq!(bus.screen().get_cursor(), cursor_before);
    }

    #[test]
    fn explicit_cr_resets_the_logical_line_counter() {
        let mut bus = Bus::new();
        let mut editor = ScreenEditor::new();
        for _ in 0..40 {
            editor.print_char(&mut bus, b'X');
        }
        editor.print_char(&mut bus, 0x0D);
        let (_, row_after_cr) = bus.screen().get_cursor();
        // A fresh 80 characters after the CR must all land (none
        // discarded), filling both physical rows of the new logical line.
        for _ in 0..80 {
            editor.print_char(&mut bus, b'Y');
        }
        assert_eq!(bus.screen().char_at(39, row_after_cr), b'Y');
        assert_eq!(bus.screen().char_at(39, row_after_cr + 1), b'Y');
    }

    #[test]
    fn newline_scrolls_on_row_24() {
        let mut bus = Bus::new();
        let mut editor = ScreenEditor::new();
        bus.screen_mut().set_char_at(0, 1, b'Q');
        bus.screen_mut().set_cursor(5, 24);
        editor.newline(&mut bus);
        assert_eq!(bus.screen().get_cursor(), (0, 24));
        assert_eq!(bus.screen().char_at(0, 0), b'Q');
    }

    #[test]
    fn backspace_unwraps_across_the_row_pair() {
        let mut bus = Bus::new();
        let mut editor = ScreenEditor::new();
        editor.print_char(&mut bus, b'A');
        bus.screen_mut().set_cursor(0, 1);
        editor.backspace(&mut bus);
        assert_eq!(bus.screen().get_cursor(), (39, 0));
    }
}
