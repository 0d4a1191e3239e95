use std::time::Duration;

use crate::hover::HoverTimer;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadSegment { index: usize },
    ScheduleHoverTimer { timer: HoverTimer, token: u64, delay: Duration },
    CancelHoverTimer { timer: HoverTimer },
    /// Popover sprite.
    LoadSprite { id: u16, url: String },
    /// Card image, shrunk to thumbnail size.
    LoadThumbnail { id: u16, url: String },
}
