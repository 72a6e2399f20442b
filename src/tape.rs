//! This module defines the `Tape`, an unbounded single-head symbol store.
//!
//! The tape is a contiguous buffer plus an `origin` offset: the buffer index of logical
//! position 0. Growth happens only at the edges. Growing to the left shifts `origin` and the
//! head index by the same amount, so logical positions are stable across extensions.

use crate::types::{Symbol, DEFAULT_BLANK_SYMBOL};

/// An auto-extending tape with a read/write head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Symbol>,
    origin: usize,
    head: usize,
    blank: Symbol,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_BLANK_SYMBOL)
    }
}

impl Tape {
    /// Creates an empty tape (a single blank cell) with the head at position 0.
    pub fn new(blank: Symbol) -> Self {
        Self {
            cells: vec![blank],
            origin: 0,
            head: 0,
            blank,
        }
    }

    /// Creates a tape whose cells starting at position 0 hold `symbols`.
    /// The head is placed at position 0.
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>, blank: Symbol) -> Self {
        let mut cells: Vec<Symbol> = symbols.into_iter().collect();
        if cells.is_empty() {
            cells.push(blank);
        }

        Self {
            cells,
            origin: 0,
            head: 0,
            blank,
        }
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.cells[self.head]
    }

    /// Overwrites the cell under the head.
    pub fn write(&mut self, symbol: Symbol) {
        self.cells[self.head] = symbol;
    }

    /// Moves the head `steps` cells to the left, extending the tape when needed.
    pub fn move_left(&mut self, steps: usize) {
        if steps > self.head {
            self.grow_left(steps - self.head);
        }
        self.head -= steps;
    }

    /// Moves the head `steps` cells to the right, extending the tape when needed.
    pub fn move_right(&mut self, steps: usize) {
        let target = self.head + steps;
        if target >= self.cells.len() {
            self.grow_right(target + 1 - self.cells.len());
        }
        self.head = target;
    }

    /// Returns the logical position of the head. Position 0 is the first seeded cell.
    pub fn position(&self) -> isize {
        self.head as isize - self.origin as isize
    }

    /// Returns the symbol at a logical position without extending the tape.
    pub fn get(&self, position: isize) -> Symbol {
        let index = self.origin as isize + position;
        if index < 0 {
            return self.blank;
        }
        self.cells
            .get(index as usize)
            .copied()
            .unwrap_or(self.blank)
    }

    /// Writes a symbol at a logical position, extending the tape when needed.
    /// The head does not move.
    pub fn set(&mut self, position: isize, symbol: Symbol) {
        let index = self.cover(position);
        self.cells[index] = symbol;
    }

    /// Renders `2 * window + 1` cells centered on the head as `[a][b][c]`.
    ///
    /// The tape is extended to cover the whole window, so previously written cells
    /// are never cut off.
    pub fn render(&mut self, window: usize) -> String {
        if window > self.head {
            self.grow_left(window - self.head);
        }
        if self.head + window >= self.cells.len() {
            self.grow_right(self.head + window + 1 - self.cells.len());
        }

        self.cells[self.head - window..=self.head + window]
            .iter()
            .map(|symbol| format!("[{symbol}]"))
            .collect()
    }

    /// Returns the written region of the tape with leading and trailing blanks removed.
    pub fn contents(&self) -> String {
        let start = self.cells.iter().position(|&c| c != self.blank);
        let end = self.cells.iter().rposition(|&c| c != self.blank);

        match (start, end) {
            (Some(start), Some(end)) => self.cells[start..=end].iter().collect(),
            _ => String::new(),
        }
    }

    /// Counts the cells holding `symbol` in the backing buffer.
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|&&c| c == symbol).count()
    }

    /// Returns the backing buffer.
    pub fn symbols(&self) -> &[Symbol] {
        &self.cells
    }

    /// Returns the number of cells in the backing buffer.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A tape always holds at least one cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Extends the buffer so `position` is addressable and returns its buffer index.
    fn cover(&mut self, position: isize) -> usize {
        let index = self.origin as isize + position;
        if index < 0 {
            self.grow_left(index.unsigned_abs());
        }

        let index = (self.origin as isize + position) as usize;
        if index >= self.cells.len() {
            self.grow_right(index + 1 - self.cells.len());
        }

        index
    }

    /// Prepends at least `count` blank cells. The growth is amortized by prepending
    /// no less than the current buffer length.
    fn grow_left(&mut self, count: usize) {
        let count = count.max(self.cells.len());
        let mut cells = vec![self.blank; count];
        cells.append(&mut self.cells);
        self.cells = cells;
        self.origin += count;
        self.head += count;
    }

    fn grow_right(&mut self, count: usize) {
        self.cells.resize(self.cells.len() + count, self.blank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(content: &str) -> Tape {
        Tape::from_symbols(content.chars(), ' ')
    }

    #[test]
    fn test_read_write() {
        let mut tape = tape("abc");
        assert_eq!(tape.read(), 'a');

        tape.write('x');
        assert_eq!(tape.read(), 'x');
        assert_eq!(tape.contents(), "xbc");
    }

    #[test]
    fn test_empty_tape_reads_blank() {
        let tape = Tape::new('_');
        assert_eq!(tape.read(), '_');
        assert_eq!(tape.position(), 0);
        assert_eq!(tape.len(), 1);

        let tape = Tape::from_symbols(Vec::new(), '0');
        assert_eq!(tape.read(), '0');
    }

    #[test]
    fn test_move_right_extends_with_blanks() {
        let mut tape = tape("ab");
        tape.move_right(5);

        assert_eq!(tape.position(), 5);
        assert_eq!(tape.read(), ' ');
        assert!(tape.len() >= 6);
        assert_eq!(tape.get(0), 'a');
        assert_eq!(tape.get(1), 'b');
    }

    #[test]
    fn test_move_left_past_origin_preserves_cells() {
        let mut tape = tape("abc");
        tape.move_left(3);

        assert_eq!(tape.position(), -3);
        assert_eq!(tape.read(), ' ');
        assert_eq!(tape.get(0), 'a');
        assert_eq!(tape.get(2), 'c');

        tape.write('z');
        tape.move_right(3);
        assert_eq!(tape.read(), 'a');
        assert_eq!(tape.get(-3), 'z');
    }

    #[test]
    fn test_move_symmetry() {
        let mut tape = tape("10110");
        tape.move_right(2);
        let before = (tape.position(), tape.contents());

        for n in [1, 2, 7, 20] {
            tape.move_left(n);
            tape.move_right(n);
            assert_eq!((tape.position(), tape.contents()), before);

            tape.move_right(n);
            tape.move_left(n);
            assert_eq!((tape.position(), tape.contents()), before);
        }
    }

    #[test]
    fn test_get_and_set_at_logical_positions() {
        let mut tape = Tape::new(' ');
        tape.set(-2, 'L');
        tape.set(3, 'R');

        assert_eq!(tape.position(), 0);
        assert_eq!(tape.get(-2), 'L');
        assert_eq!(tape.get(3), 'R');
        assert_eq!(tape.get(100), ' ');
        assert_eq!(tape.get(-100), ' ');
        assert_eq!(tape.contents(), "L    R");
    }

    #[test]
    fn test_render_format() {
        let mut tape = tape("111");
        assert_eq!(tape.render(2), "[ ][ ][1][1][1]");
        assert_eq!(tape.render(0), "[1]");

        tape.move_right(1);
        assert_eq!(tape.render(1), "[1][1][1]");
    }

    #[test]
    fn test_render_width_and_no_loss() {
        let mut tape = tape("abc");
        tape.move_right(1);

        for window in [0, 1, 3, 10] {
            let rendered = tape.render(window);
            assert_eq!(rendered.matches('[').count(), 2 * window + 1);
            assert_eq!(rendered.len(), 3 * (2 * window + 1));
        }

        assert_eq!(tape.position(), 1);
        assert_eq!(tape.read(), 'b');
        assert_eq!(tape.contents(), "abc");
    }

    #[test]
    fn test_count() {
        let tape = tape("11 1");
        assert_eq!(tape.count('1'), 3);
        assert_eq!(tape.count('0'), 0);
    }

    #[test]
    fn test_contents_of_blank_tape() {
        let mut tape = Tape::new(' ');
        tape.move_left(4);
        assert_eq!(tape.contents(), "");
    }
}
