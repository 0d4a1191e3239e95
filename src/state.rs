use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::catalog::{self, Catalog, CreatureDetail, UiMode};
use crate::grid::Card;
use crate::hover::HoverIntent;
use crate::layout::{popover_span, popover_top, screen_layout, GridGeometry, POPOVER_WIDTH};
use crate::popover::PopoverContent;
use crate::sprite::SpriteCache;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// What the pointer is currently over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    #[default]
    None,
    Card(u16),
    Popover,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),

    pub catalog: Catalog,
    pub mode: UiMode,
    pub search: SearchState,
    pub cards: Vec<Card>,
    pub scroll_row: usize,

    pub hover: HoverIntent,
    pub pointer: Option<(u16, u16)>,
    pub pointer_target: PointerTarget,

    pub sprites: SpriteCache,
    pub thumbnails: SpriteCache,

    pub loading_segment: Option<usize>,
    pub failed_segments: Vec<usize>,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            catalog: Catalog::new(),
            mode: UiMode::Browse,
            search: SearchState::default(),
            cards: Vec::new(),
            scroll_row: 0,
            hover: HoverIntent::new(),
            pointer: None,
            pointer_target: PointerTarget::None,
            sprites: SpriteCache::default(),
            thumbnails: SpriteCache::default(),
            loading_segment: None,
            failed_segments: Vec::new(),
            message: None,
            tick: 0,
        }
    }
}

impl AppState {
    pub fn screen(&self) -> Rect {
        Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1)
    }

    pub fn grid_geometry(&self) -> GridGeometry {
        GridGeometry::new(screen_layout(self.screen()).grid)
    }

    pub fn max_scroll(&self) -> usize {
        self.grid_geometry().max_scroll(self.cards.len())
    }

    pub fn clamp_scroll(&mut self) {
        self.scroll_row = self.scroll_row.min(self.max_scroll());
    }

    pub fn card_rect(&self, id: u16) -> Option<Rect> {
        let index = self.cards.iter().position(|card| card.id == id)?;
        self.grid_geometry().card_rect(index, self.scroll_row)
    }

    pub fn loading_label(&self) -> Option<&'static str> {
        self.loading_segment
            .and_then(catalog::segment)
            .map(|segment| segment.label)
    }

    /// The record the popover is bound to, while it is drawn.
    pub fn popover_detail(&self) -> Option<&CreatureDetail> {
        self.hover
            .shown_card()
            .and_then(|id| self.catalog.get(id))
    }

    /// Where the popover is drawn, clipped to the screen. `None` when hidden
    /// or when its card is not on screen. Never overlaps its card.
    pub fn popover_area(&self) -> Option<Rect> {
        let detail = self.popover_detail()?;
        let card = self.card_rect(detail.id)?;
        let screen = self.screen();
        let (x, width) = popover_span(card, POPOVER_WIDTH, screen);
        let height = PopoverContent::from_detail(detail).height(width.saturating_sub(2));
        let y = popover_top(card, height, screen);
        let area = Rect::new(x, y, width, height).intersection(screen);
        (!area.is_empty()).then_some(area)
    }

    /// `(id, url)` of each on-screen card that has an image bound.
    pub fn visible_card_images(&self) -> impl Iterator<Item = (u16, &str)> + '_ {
        let range = self
            .grid_geometry()
            .visible_range(self.scroll_row, self.cards.len());
        self.cards[range]
            .iter()
            .filter_map(|card| card.image_url.as_deref().map(|url| (card.id, url)))
    }

    /// The visible popover is on top of the grid and wins ties.
    pub fn hit_test(&self, column: u16, row: u16) -> PointerTarget {
        if self.hover.is_interactive() {
            if let Some(area) = self.popover_area() {
                if area.contains((column, row).into()) {
                    return PointerTarget::Popover;
                }
            }
        }
        self.grid_geometry()
            .card_at(column, row, self.scroll_row, self.cards.len())
            .and_then(|index| self.cards.get(index))
            .map(|card| PointerTarget::Card(card.id))
            .unwrap_or(PointerTarget::None)
    }

    pub fn hovered_card(&self) -> Option<u16> {
        match self.pointer_target {
            PointerTarget::Card(id) => Some(id),
            PointerTarget::None | PointerTarget::Popover => None,
        }
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Catalog")
                .entry("entries", ron_string(&self.catalog.len()))
                .entry("cards", ron_string(&self.cards.len()))
                .entry("mode", ron_string(&self.mode))
                .entry("query", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active))
                .entry("scroll_row", ron_string(&self.scroll_row)),
            DebugSection::new("Hover")
                .entry("phase", ron_string(&self.hover.phase()))
                .entry("popover", ron_string(&self.hover.visibility()))
                .entry("shown", ron_string(&self.hover.shown_card()))
                .entry("pointer", ron_string(&self.pointer))
                .entry("target", ron_string(&self.pointer_target)),
            DebugSection::new("Status")
                .entry("loading_segment", ron_string(&self.loading_label()))
                .entry("failed_segments", ron_string(&self.failed_segments))
                .entry("sprite_loading", ron_string(&self.sprites.loading_count()))
                .entry("sprites_cached", ron_string(&self.sprites.len()))
                .entry("thumbs_loading", ron_string(&self.thumbnails.loading_count()))
                .entry("thumbs_cached", ron_string(&self.thumbnails.len()))
                .entry("message", ron_string(&self.message)),
        ]
    }
}
