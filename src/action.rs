use serde::{Deserialize, Serialize};

use crate::catalog::CreatureDetail;
use crate::hover::HoverTimer;
use crate::sprite::SpriteData;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    SegmentDidLoad { index: usize, batch: Vec<CreatureDetail> },
    SegmentDidError { index: usize, error: String },

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,
    /// Replace the whole term, as a paste or replayed input would.
    SearchQueryChange(String),

    GridScroll(i16),
    GridPage(i16),
    GridScrollTop,
    GridScrollBottom,

    PointerMoved { column: u16, row: u16 },

    HoverTimerDidFire { timer: HoverTimer, token: u64 },

    SpriteDidLoad { id: u16, sprite: SpriteData },
    SpriteDidError { id: u16, error: String },

    ThumbnailDidLoad { id: u16, sprite: SpriteData },
    ThumbnailDidError { id: u16, error: String },

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
