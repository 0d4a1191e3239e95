use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::catalog::{self, CreatureDetail, UiMode};
use crate::effect::Effect;
use crate::grid::render_cards;
use crate::hover::HoverCommand;
use crate::state::{AppState, PointerTarget};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.failed_segments.clear();
            state.message = None;
            start_segment(state, 0)
        }

        Action::SegmentDidLoad { index, batch } => {
            if state.loading_segment != Some(index) {
                return DispatchResult::unchanged();
            }
            let mut effects = accept_batch(state, batch);
            effects.extend(advance(state, index));
            changed_with(effects)
        }

        Action::SegmentDidError { index, error } => {
            if state.loading_segment != Some(index) {
                return DispatchResult::unchanged();
            }
            let label = catalog::segment(index).map_or("?", |segment| segment.label);
            tracing::warn!(segment = label, %error, "segment failed to load");
            state.failed_segments.push(index);
            changed_with(advance(state, index))
        }

        Action::SearchStart => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            if state.search.query.is_empty() {
                return DispatchResult::changed();
            }
            state.search.query.clear();
            changed_with(search(state, true))
        }

        Action::SearchSubmit => {
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            changed_with(search(state, true))
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            changed_with(search(state, true))
        }

        Action::SearchQueryChange(query) => {
            state.search.query = query;
            changed_with(search(state, true))
        }

        Action::GridScroll(delta) => {
            let target = state.scroll_row as i64 + i64::from(delta);
            scroll_to(state, target)
        }
        Action::GridPage(direction) => {
            let page = i64::from(state.grid_geometry().visible_rows.max(1));
            let target = state.scroll_row as i64 + page * i64::from(direction);
            scroll_to(state, target)
        }
        Action::GridScrollTop => scroll_to(state, 0),
        Action::GridScrollBottom => {
            let target = state.max_scroll() as i64;
            scroll_to(state, target)
        }

        Action::PointerMoved { column, row } => {
            if state.pointer == Some((column, row)) {
                return DispatchResult::unchanged();
            }
            state.pointer = Some((column, row));
            changed_with(refresh_pointer(state))
        }

        Action::HoverTimerDidFire { timer, token } => {
            let before = state.hover.clone();
            let commands = state.hover.timer_fired(timer, token);
            if state.hover == before {
                return DispatchResult::unchanged();
            }
            let mut effects = hover_effects(state, commands);
            effects.extend(refresh_pointer(state));
            changed_with(effects)
        }

        Action::SpriteDidLoad { id, sprite } => {
            state.sprites.finish(id, sprite);
            DispatchResult::changed()
        }

        Action::SpriteDidError { id, error } => {
            tracing::debug!(id, %error, "sprite unavailable");
            state.sprites.fail(id);
            DispatchResult::changed()
        }

        Action::ThumbnailDidLoad { id, sprite } => {
            state.thumbnails.finish(id, sprite);
            DispatchResult::changed()
        }

        Action::ThumbnailDidError { id, error } => {
            tracing::debug!(id, %error, "card image unavailable");
            state.thumbnails.fail(id);
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            state.clamp_scroll();
            changed_with(grid_changed(state))
        }

        Action::Tick => {
            if state.loading_segment.is_none()
                && state.sprites.loading_count() == 0
                && state.thumbnails.loading_count() == 0
            {
                return DispatchResult::unchanged();
            }
            state.tick = state.tick.wrapping_add(1);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Filter the catalog by the current query and redraw the grid from scratch.
/// An empty query shows everything and leaves search mode. `from_input`
/// resets the scroll position; loader-driven refreshes only clamp it.
pub fn search(state: &mut AppState, from_input: bool) -> Vec<Effect> {
    let term = state.search.query.to_lowercase();
    if term.is_empty() {
        state.mode = UiMode::Browse;
        render_cards(&mut state.cards, state.catalog.entries(), true);
    } else {
        state.mode = UiMode::Search;
        render_cards(&mut state.cards, state.catalog.filter(&term), true);
    }
    if from_input {
        state.scroll_row = 0;
    } else {
        state.clamp_scroll();
    }
    grid_changed(state)
}

/// Browse mode appends the batch as-is; search mode re-filters so late
/// segments stay subject to the active query.
fn accept_batch(state: &mut AppState, batch: Vec<CreatureDetail>) -> Vec<Effect> {
    match state.mode {
        UiMode::Browse => {
            render_cards(&mut state.cards, &batch, false);
            state.catalog.append(batch);
            grid_changed(state)
        }
        UiMode::Search => {
            state.catalog.append(batch);
            search(state, false)
        }
    }
}

fn start_segment(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if catalog::segment(index).is_none() {
        state.loading_segment = None;
        return DispatchResult::changed();
    }
    state.loading_segment = Some(index);
    DispatchResult::changed_with(Effect::LoadSegment { index })
}

fn advance(state: &mut AppState, finished: usize) -> Vec<Effect> {
    let next = finished + 1;
    if catalog::segment(next).is_some() {
        state.loading_segment = Some(next);
        return vec![Effect::LoadSegment { index: next }];
    }

    state.loading_segment = None;
    if state.failed_segments.is_empty() {
        state.message = None;
        tracing::info!(entries = state.catalog.len(), "catalog loaded");
    } else {
        let labels: Vec<&str> = state
            .failed_segments
            .iter()
            .filter_map(|index| catalog::segment(*index))
            .map(|segment| segment.label)
            .collect();
        state.message = Some(format!("Failed to load: {}", labels.join(", ")));
        tracing::info!(
            entries = state.catalog.len(),
            failed = labels.len(),
            "catalog loaded with gaps"
        );
    }
    Vec::new()
}

fn scroll_to(state: &mut AppState, target: i64) -> DispatchResult<Effect> {
    let max = state.max_scroll() as i64;
    let next = target.clamp(0, max) as usize;
    if next == state.scroll_row {
        return DispatchResult::unchanged();
    }
    state.scroll_row = next;
    changed_with(grid_changed(state))
}

/// The set of on-screen cards may have changed: fetch their missing images
/// and re-run pointer hit testing.
fn grid_changed(state: &mut AppState) -> Vec<Effect> {
    let mut effects = thumbnail_requests(state);
    effects.extend(refresh_pointer(state));
    effects
}

fn thumbnail_requests(state: &mut AppState) -> Vec<Effect> {
    let wanted: Vec<(u16, String)> = state
        .visible_card_images()
        .map(|(id, url)| (id, url.to_string()))
        .collect();
    wanted
        .into_iter()
        .filter(|(id, _)| state.thumbnails.begin(*id))
        .map(|(id, url)| Effect::LoadThumbnail { id, url })
        .collect()
}

/// Re-run hit testing at the last pointer position and feed any change of
/// target to the hover machine as a leave followed by an enter.
pub fn refresh_pointer(state: &mut AppState) -> Vec<Effect> {
    let target = match state.pointer {
        Some((column, row)) => state.hit_test(column, row),
        None => PointerTarget::None,
    };
    if target == state.pointer_target {
        return Vec::new();
    }

    let previous = std::mem::replace(&mut state.pointer_target, target);
    let mut commands = match previous {
        PointerTarget::Card(id) => state.hover.card_left(id),
        PointerTarget::Popover => state.hover.popover_left(),
        PointerTarget::None => Vec::new(),
    };
    commands.extend(match target {
        PointerTarget::Card(id) => state.hover.card_entered(id),
        PointerTarget::Popover => state.hover.popover_entered(),
        PointerTarget::None => Vec::new(),
    });
    hover_effects(state, commands)
}

fn hover_effects(state: &mut AppState, commands: Vec<HoverCommand>) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(commands.len());
    for command in commands {
        match command {
            HoverCommand::Schedule {
                timer,
                token,
                delay,
            } => effects.push(Effect::ScheduleHoverTimer {
                timer,
                token,
                delay,
            }),
            HoverCommand::Cancel(timer) => effects.push(Effect::CancelHoverTimer { timer }),
            HoverCommand::Opened { card } => effects.extend(sprite_request(state, card)),
        }
    }
    effects
}

fn sprite_request(state: &mut AppState, id: u16) -> Option<Effect> {
    let url = state.catalog.get(id)?.sprite_url.clone()?;
    state.sprites.begin(id).then_some(Effect::LoadSprite { id, url })
}

fn changed_with(effects: Vec<Effect>) -> DispatchResult<Effect> {
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SEGMENTS;
    use crate::hover::{HoverPhase, HoverTimer, PopoverVisibility};

    fn detail(id: u16, name: &str) -> CreatureDetail {
        CreatureDetail {
            id,
            name: name.to_string(),
            sprite_url: Some(format!("https://img.test/{id}.png")),
            artwork_url: None,
            types: vec!["normal".to_string()],
            abilities: vec![],
            stats: vec![],
        }
    }

    fn loaded_state(batch: Vec<CreatureDetail>) -> AppState {
        let mut state = AppState {
            terminal_size: (120, 40),
            ..Default::default()
        };
        reducer(&mut state, Action::Init);
        reducer(&mut state, Action::SegmentDidLoad { index: 0, batch });
        state
    }

    fn schedule_token(effects: &[Effect], wanted: HoverTimer) -> Option<u64> {
        effects.iter().find_map(|effect| match effect {
            Effect::ScheduleHoverTimer { timer, token, .. } if *timer == wanted => Some(*token),
            _ => None,
        })
    }

    #[test]
    fn init_requests_first_segment() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::Init);
        assert!(result.changed);
        assert_eq!(result.effects, vec![Effect::LoadSegment { index: 0 }]);
        assert_eq!(state.loading_label(), Some("Gen 1 (Kanto)"));
    }

    #[test]
    fn segments_load_in_order_and_failures_are_skipped() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);

        let result = reducer(
            &mut state,
            Action::SegmentDidLoad {
                index: 0,
                batch: vec![detail(1, "bulbasaur")],
            },
        );
        assert_eq!(
            result.effects,
            vec![
                Effect::LoadThumbnail {
                    id: 1,
                    url: "https://img.test/1.png".into()
                },
                Effect::LoadSegment { index: 1 },
            ]
        );

        let result = reducer(
            &mut state,
            Action::SegmentDidError {
                index: 1,
                error: "timeout".into(),
            },
        );
        assert_eq!(result.effects, vec![Effect::LoadSegment { index: 2 }]);
        assert_eq!(state.failed_segments, vec![1]);
        assert_eq!(state.catalog.len(), 1);
    }

    #[test]
    fn stale_segment_results_are_ignored() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        let result = reducer(
            &mut state,
            Action::SegmentDidLoad {
                index: 3,
                batch: vec![detail(400, "bibarel")],
            },
        );
        assert!(!result.changed);
        assert!(state.catalog.is_empty());
    }

    #[test]
    fn last_segment_reports_failures() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        for index in 0..SEGMENTS.len() {
            let action = if index == 2 {
                Action::SegmentDidError {
                    index,
                    error: "boom".into(),
                }
            } else {
                Action::SegmentDidLoad {
                    index,
                    batch: Vec::new(),
                }
            };
            reducer(&mut state, action);
        }
        assert_eq!(state.loading_segment, None);
        assert_eq!(state.message.as_deref(), Some("Failed to load: Gen 3 (Hoenn)"));
    }

    #[test]
    fn clean_load_clears_status() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        for index in 0..SEGMENTS.len() {
            reducer(
                &mut state,
                Action::SegmentDidLoad {
                    index,
                    batch: Vec::new(),
                },
            );
        }
        assert_eq!(state.loading_segment, None);
        assert_eq!(state.message, None);
    }

    #[test]
    fn batches_append_in_browse_mode() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur"), detail(4, "charmander")]);
        reducer(
            &mut state,
            Action::SegmentDidLoad {
                index: 1,
                batch: vec![detail(152, "chikorita")],
            },
        );
        let labels: Vec<&str> = state.cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["#001", "#004", "#152"]);
    }

    #[test]
    fn batches_are_filtered_in_search_mode() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur"), detail(4, "charmander")]);
        reducer(&mut state, Action::SearchQueryChange("CHAR".into()));
        assert_eq!(state.mode, UiMode::Search);
        assert_eq!(state.cards.len(), 1);

        reducer(
            &mut state,
            Action::SegmentDidLoad {
                index: 1,
                batch: vec![detail(152, "chikorita"), detail(5, "charmeleon")],
            },
        );
        let ids: Vec<u16> = state.cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 5]);
        assert_eq!(state.catalog.len(), 4);
    }

    #[test]
    fn clearing_query_returns_to_browse() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur"), detail(4, "charmander")]);
        reducer(&mut state, Action::SearchStart);
        reducer(&mut state, Action::SearchInput('4'));
        assert_eq!(state.cards.len(), 1);

        reducer(&mut state, Action::SearchBackspace);
        assert_eq!(state.mode, UiMode::Browse);
        assert_eq!(state.cards.len(), 2);

        reducer(&mut state, Action::SearchInput('z'));
        assert!(state.cards.is_empty());
        reducer(&mut state, Action::SearchCancel);
        assert!(!state.search.active);
        assert_eq!(state.cards.len(), 2);
    }

    #[test]
    fn resting_on_a_card_opens_popover_and_requests_sprite() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur"), detail(4, "charmander")]);
        let card = state.card_rect(1).expect("card on screen");

        let result = reducer(
            &mut state,
            Action::PointerMoved {
                column: card.x + 1,
                row: card.y + 1,
            },
        );
        assert_eq!(state.pointer_target, PointerTarget::Card(1));
        let token = schedule_token(&result.effects, HoverTimer::Open).expect("open timer");

        let result = reducer(
            &mut state,
            Action::HoverTimerDidFire {
                timer: HoverTimer::Open,
                token,
            },
        );
        assert_eq!(state.hover.visibility(), PopoverVisibility::Visible);
        assert!(result.effects.contains(&Effect::LoadSprite {
            id: 1,
            url: "https://img.test/1.png".into()
        }));
        assert!(state.popover_area().is_some());
    }

    #[test]
    fn search_redraw_under_pointer_leaves_card() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur"), detail(4, "charmander")]);
        let card = state.card_rect(1).expect("card on screen");
        reducer(
            &mut state,
            Action::PointerMoved {
                column: card.x + 1,
                row: card.y + 1,
            },
        );
        assert_eq!(state.hover.phase(), HoverPhase::PendingOpen { card: 1 });

        // Card 4 moves into the first slot, under the pointer.
        reducer(&mut state, Action::SearchQueryChange("char".into()));
        assert_eq!(state.pointer_target, PointerTarget::Card(4));
        assert_eq!(state.hover.phase(), HoverPhase::PendingOpen { card: 4 });
    }

    #[test]
    fn stale_timer_does_not_change_state() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur")]);
        let result = reducer(
            &mut state,
            Action::HoverTimerDidFire {
                timer: HoverTimer::Open,
                token: 99,
            },
        );
        assert!(!result.changed);
        assert_eq!(state.hover.visibility(), PopoverVisibility::Hidden);
    }

    #[test]
    fn scroll_is_clamped() {
        let batch = (1..=60).map(|id| detail(id, "x")).collect();
        let mut state = loaded_state(batch);
        // 6 columns, 4 visible rows, 10 rows total.
        assert_eq!(state.max_scroll(), 6);
        reducer(&mut state, Action::GridScroll(10));
        assert_eq!(state.scroll_row, 6);
        let result = reducer(&mut state, Action::GridScroll(1));
        assert!(!result.changed);
        reducer(&mut state, Action::GridScrollTop);
        assert_eq!(state.scroll_row, 0);
    }

    fn thumbnail_ids(effects: &[Effect]) -> Vec<u16> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::LoadThumbnail { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn thumbnails_are_requested_for_visible_cards_once() {
        let mut state = AppState {
            terminal_size: (120, 40),
            ..Default::default()
        };
        reducer(&mut state, Action::Init);
        let batch = (1..=60).map(|id| detail(id, "x")).collect();
        let result = reducer(&mut state, Action::SegmentDidLoad { index: 0, batch });
        // 6 columns by 4 rows on screen.
        assert_eq!(thumbnail_ids(&result.effects), (1..=24).collect::<Vec<_>>());

        let result = reducer(&mut state, Action::GridScroll(1));
        assert_eq!(thumbnail_ids(&result.effects), (25..=30).collect::<Vec<_>>());

        let result = reducer(&mut state, Action::GridScrollTop);
        assert!(thumbnail_ids(&result.effects).is_empty());
    }

    #[test]
    fn failed_thumbnail_is_not_retried() {
        let mut state = loaded_state(vec![detail(1, "bulbasaur")]);
        assert!(state.thumbnails.is_loading(1));
        reducer(
            &mut state,
            Action::ThumbnailDidError {
                id: 1,
                error: "404".into(),
            },
        );
        let result = reducer(&mut state, Action::SearchQueryChange("bulb".into()));
        assert!(thumbnail_ids(&result.effects).is_empty());
        assert!(!state.thumbnails.is_loading(1));
    }

    #[test]
    fn cards_without_images_request_nothing() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        let mut bare = detail(9, "blastoise");
        bare.sprite_url = None;
        let result = reducer(
            &mut state,
            Action::SegmentDidLoad {
                index: 0,
                batch: vec![bare],
            },
        );
        assert_eq!(result.effects, vec![Effect::LoadSegment { index: 1 }]);
    }
}
