//! Screen geometry shared by rendering and pointer hit testing.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const HEADER_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 3;

/// Grid slot per card; the drawn card leaves a one-column gutter.
pub const CARD_WIDTH: u16 = 20;
/// Border, four thumbnail rows, name, type badges.
pub const CARD_HEIGHT: u16 = 8;
pub const CARD_THUMB_ROWS: u16 = 4;

pub const POPOVER_WIDTH: u16 = 42;
pub const POPOVER_GAP: u16 = 1;
/// The popover never rises into the header.
pub const POPOVER_MIN_TOP: u16 = HEADER_HEIGHT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub grid: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    ScreenLayout {
        header: chunks[0],
        grid: chunks[1],
        footer: chunks[2],
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub area: Rect,
    pub columns: u16,
    pub visible_rows: u16,
    left: u16,
}

impl GridGeometry {
    pub fn new(area: Rect) -> Self {
        let columns = (area.width / CARD_WIDTH).max(1);
        let used = columns.saturating_mul(CARD_WIDTH).min(area.width);
        Self {
            area,
            columns,
            visible_rows: area.height / CARD_HEIGHT,
            left: area.x + (area.width - used) / 2,
        }
    }

    pub fn total_rows(&self, count: usize) -> usize {
        count.div_ceil(usize::from(self.columns))
    }

    pub fn max_scroll(&self, count: usize) -> usize {
        self.total_rows(count)
            .saturating_sub(usize::from(self.visible_rows))
    }

    /// Drawn rect of card `index`, if its row is on screen.
    pub fn card_rect(&self, index: usize, scroll_row: usize) -> Option<Rect> {
        let columns = usize::from(self.columns);
        let row = index / columns;
        let col = index % columns;
        if row < scroll_row || row >= scroll_row + usize::from(self.visible_rows) {
            return None;
        }
        let x = self.left + col as u16 * CARD_WIDTH;
        let y = self.area.y + (row - scroll_row) as u16 * CARD_HEIGHT;
        let width = (CARD_WIDTH - 1).min(self.area.right().saturating_sub(x));
        Some(Rect::new(x, y, width, CARD_HEIGHT))
    }

    /// Index of the card drawn under `(column, row)`; gutters hit nothing.
    pub fn card_at(&self, column: u16, row: u16, scroll_row: usize, count: usize) -> Option<usize> {
        if !self.area.contains((column, row).into()) || column < self.left {
            return None;
        }
        let col = (column - self.left) / CARD_WIDTH;
        if col >= self.columns || (column - self.left) % CARD_WIDTH == CARD_WIDTH - 1 {
            return None;
        }
        let line = usize::from((row - self.area.y) / CARD_HEIGHT);
        if line >= usize::from(self.visible_rows) {
            return None;
        }
        let index = (scroll_row + line) * usize::from(self.columns) + usize::from(col);
        (index < count).then_some(index)
    }

    /// Indices of cards whose rows are on screen.
    pub fn visible_range(&self, scroll_row: usize, count: usize) -> std::ops::Range<usize> {
        let columns = usize::from(self.columns);
        let start = (scroll_row * columns).min(count);
        let end = ((scroll_row + usize::from(self.visible_rows)) * columns).min(count);
        start..end
    }
}

/// Horizontal placement of a popover `width` columns wide beside `card`:
/// to the right with a gap, or to the left when the right side would
/// overflow `viewport`. When neither side has room the wider side is used
/// and the popover is narrowed to it, so it never covers its card. Returns
/// `(x, width)`.
pub fn popover_span(card: Rect, width: u16, viewport: Rect) -> (u16, u16) {
    let right_start = card.right().saturating_add(POPOVER_GAP);
    let right_room = viewport.right().saturating_sub(right_start);
    let left_end = card.x.saturating_sub(POPOVER_GAP).max(viewport.x);
    let left_room = left_end - viewport.x;

    if right_room >= width {
        (right_start, width)
    } else if left_room >= width {
        (left_end - width, width)
    } else if right_room >= left_room {
        (right_start, right_room)
    } else {
        (viewport.x, left_room)
    }
}

/// Top row of a popover `height` rows tall: vertically centred on `card`,
/// never above the minimum top margin of `viewport`. The bottom may extend
/// past the viewport; callers clip it.
pub fn popover_top(card: Rect, height: u16, viewport: Rect) -> u16 {
    let centred = i32::from(card.y) + i32::from(card.height) / 2 - i32::from(height) / 2;
    let min_top = i32::from(viewport.y) + i32::from(POPOVER_MIN_TOP);
    centred.max(min_top) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        // 3 columns of 20 with 5 spare columns, 4 rows of cards.
        GridGeometry::new(Rect::new(0, 3, 65, 20))
    }

    #[test]
    fn grid_is_centred() {
        let grid = geometry();
        assert_eq!(grid.columns, 3);
        assert_eq!(grid.visible_rows, 2);
        assert_eq!(grid.card_rect(0, 0), Some(Rect::new(2, 3, 19, 8)));
        assert_eq!(grid.card_rect(4, 0), Some(Rect::new(22, 11, 19, 8)));
    }

    #[test]
    fn scrolled_out_cards_have_no_rect() {
        let grid = geometry();
        assert_eq!(grid.card_rect(0, 1), None);
        assert_eq!(grid.card_rect(3, 1), Some(Rect::new(2, 3, 19, 8)));
        assert_eq!(grid.card_rect(9, 0), None);
        assert_eq!(grid.visible_range(1, 10), 3..9);
    }

    #[test]
    fn hit_testing_skips_gutters_and_gaps() {
        let grid = geometry();
        assert_eq!(grid.card_at(2, 3, 0, 10), Some(0));
        assert_eq!(grid.card_at(20, 4, 0, 10), Some(0));
        assert_eq!(grid.card_at(21, 4, 0, 10), None);
        assert_eq!(grid.card_at(22, 4, 0, 10), Some(1));
        assert_eq!(grid.card_at(1, 4, 0, 10), None);
        assert_eq!(grid.card_at(30, 12, 1, 10), Some(7));
        assert_eq!(grid.card_at(50, 12, 0, 5), None);
    }

    #[test]
    fn scroll_bounds() {
        let grid = geometry();
        assert_eq!(grid.total_rows(10), 4);
        assert_eq!(grid.max_scroll(10), 2);
        assert_eq!(grid.max_scroll(30), 8);
    }

    #[test]
    fn popover_goes_right_with_gap() {
        let viewport = Rect::new(0, 0, 120, 40);
        let card = Rect::new(10, 20, 19, 8);
        assert_eq!(popover_span(card, 42, viewport), (30, 42));
        assert_eq!(popover_top(card, 11, viewport), 19);
    }

    #[test]
    fn popover_flips_left_on_overflow() {
        let viewport = Rect::new(0, 0, 120, 40);
        let card = Rect::new(90, 20, 19, 8);
        assert_eq!(popover_span(card, 42, viewport), (90 - 42 - POPOVER_GAP, 42));
    }

    #[test]
    fn cramped_popover_takes_wider_side_without_covering_card() {
        let viewport = Rect::new(0, 0, 80, 24);
        for x in [0, 20, 40, 60] {
            let card = Rect::new(x, 3, 19, 8);
            let (left, width) = popover_span(card, 42, viewport);
            let popover = Rect::new(left, 3, width, 10);
            assert!(!popover.intersects(card), "card at {x} covered by {popover:?}");
            assert!(popover.right() <= viewport.right());
        }

        let card = Rect::new(20, 3, 19, 8);
        assert_eq!(popover_span(card, 42, viewport), (40, 40));
        let card = Rect::new(40, 3, 19, 8);
        assert_eq!(popover_span(card, 42, viewport), (0, 39));
    }

    #[test]
    fn popover_stays_below_header() {
        let viewport = Rect::new(0, 0, 120, 40);
        let card = Rect::new(10, 3, 19, 8);
        assert_eq!(popover_top(card, 20, viewport), POPOVER_MIN_TOP);
        assert_eq!(POPOVER_MIN_TOP, screen_layout(viewport).grid.y);
    }
}
