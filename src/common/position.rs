use serde::Serialize;

/// Absolute scan coordinates in a source string.
///
/// `line` and `character` are 0-based (editor convention); `index` is the
/// global byte offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
    pub index: usize,
}

impl Position {
    pub fn new(line: usize, character: usize, index: usize) -> Self {
        Self { line, character, index }
    }
}

/// Cursor over a fixed-length buffer tracking (line, character, index).
///
/// Pure bookkeeping: the ticker never reads the buffer itself, callers
/// feed it one `tick` per consumed byte and tell it whether that byte was
/// a line break.
#[derive(Debug, Clone)]
pub struct PositionTicker {
    line: usize,
    character: usize,
    index: usize,
    tick_end: usize,
}

impl PositionTicker {
    pub fn new(tick_end: usize) -> Self {
        Self { line: 0, character: 0, index: 0, tick_end }
    }

    /// Advance the cursor by one position. Returns `false` without
    /// mutating any state once the end of the buffer has been reached.
    pub fn tick(&mut self, line_break: bool) -> bool {
        if self.index >= self.tick_end {
            return false;
        }
        self.index += 1;
        if line_break {
            self.line += 1;
            self.character = 0;
        } else {
            self.character += 1;
        }
        true
    }

    /// Snapshot the current state, retroactively stepped back by `offset`
    /// characters. Callers use this to recover a token's start position
    /// from the number of bytes already buffered; tokens never span lines,
    /// so only `character` and `index` participate in the subtraction.
    pub fn to_position(&self, offset: usize) -> Position {
        Position {
            line: self.line,
            character: self.character.saturating_sub(offset),
            index: self.index.saturating_sub(offset),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn character(&self) -> usize {
        self.character
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_character() {
        let mut ticker = PositionTicker::new(4);
        assert!(ticker.tick(false));
        assert!(ticker.tick(false));
        assert_eq!(ticker.to_position(0), Position::new(0, 2, 2));
    }

    #[test]
    fn test_line_break_resets_character() {
        let mut ticker = PositionTicker::new(8);
        ticker.tick(false);
        ticker.tick(true);
        assert_eq!(ticker.to_position(0), Position::new(1, 0, 2));
        ticker.tick(false);
        assert_eq!(ticker.to_position(0), Position::new(1, 1, 3));
    }

    #[test]
    fn test_stops_at_end_without_mutating() {
        let mut ticker = PositionTicker::new(1);
        assert!(ticker.tick(false));
        assert!(!ticker.tick(false));
        assert!(!ticker.tick(true));
        assert_eq!(ticker.to_position(0), Position::new(0, 1, 1));
    }

    #[test]
    fn test_retroactive_offset() {
        let mut ticker = PositionTicker::new(10);
        for _ in 0..5 {
            ticker.tick(false);
        }
        // Three characters were buffered: the token started two ticks in.
        assert_eq!(ticker.to_position(3), Position::new(0, 2, 2));
    }
}
