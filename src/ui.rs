use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, HandlerResponse};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::catalog::UiMode;
use crate::grid::Card;
use crate::hover::PopoverVisibility;
use crate::layout::{screen_layout, ScreenLayout, CARD_THUMB_ROWS};
use crate::popover::{PopoverContent, StatRow, HEADER_ROWS};
use crate::sprite::{SpriteData, SpriteWidget, SPRITE_MAX_WIDTH};
use crate::state::AppState;
use crate::theme::*;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
const STAT_LABEL_WIDTH: usize = 7;

pub struct DexUi {
    status_bar: StatusBar,
}

impl Default for DexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl DexUi {
    pub fn new() -> Self {
        Self {
            status_bar: StatusBar::new(),
        }
    }

    /// Draw the whole screen and return the areas used for event routing.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) -> ScreenLayout {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);

        let layout = screen_layout(area);
        render_header(frame, layout.header, state);
        render_grid(frame, layout.grid, state);
        render_footer(frame, layout.footer, state, &mut self.status_bar);
        render_popover(frame, state);
        layout
    }
}

pub fn handle_grid_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) if key.kind != KeyEventKind::Release => match key.code {
            KeyCode::Char('j') | KeyCode::Down => vec![Action::GridScroll(1)],
            KeyCode::Char('k') | KeyCode::Up => vec![Action::GridScroll(-1)],
            KeyCode::PageDown => vec![Action::GridPage(1)],
            KeyCode::PageUp => vec![Action::GridPage(-1)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::GridScrollTop],
            KeyCode::End | KeyCode::Char('G') => vec![Action::GridScrollBottom],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) if key.kind != KeyEventKind::Release => match key.code {
            KeyCode::Esc => vec![Action::SearchCancel],
            KeyCode::Enter => vec![Action::SearchSubmit],
            KeyCode::Backspace => vec![Action::SearchBackspace],
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                vec![Action::SearchInput(ch)]
            }
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

/// Pointer motion and wheel scrolling, wherever the pointer is.
pub fn handle_pointer_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => vec![Action::PointerMoved {
                column: mouse.column,
                row: mouse.row,
            }],
            _ => vec![],
        },
        EventKind::Scroll { delta, .. } if *delta != 0 => {
            vec![Action::GridScroll((*delta).signum() as i16)]
        }
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let search_style = if state.search.active {
        Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT_TEAL)
    };

    let mut spans = vec![
        Span::raw("Search: "),
        Span::styled(search, search_style),
        Span::raw("  |  "),
        Span::styled(
            format!("showing {} of {}", state.cards.len(), state.catalog.len()),
            Style::default().fg(TEXT_DIM),
        ),
    ];
    if let Some(label) = state.loading_label() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("{} Loading {label}...", spinner(state.tick)),
            Style::default().fg(ACCENT_GOLD),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(if state.search.active {
            ACCENT_GOLD
        } else {
            TEXT_DIM
        }))
        .title(Span::styled(
            " DEXGRID ",
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.cards.is_empty() {
        let text = match state.mode {
            UiMode::Search => format!("No matches for \"{}\"", state.search.query),
            UiMode::Browse if state.loading_segment.is_some() => {
                format!("{} Fetching catalog...", spinner(state.tick))
            }
            UiMode::Browse => "Nothing loaded".to_string(),
        };
        let empty = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_DIM));
        frame.render_widget(empty, centre_line(area));
        return;
    }

    let geometry = state.grid_geometry();
    let hovered = state.hovered_card();
    for index in geometry.visible_range(state.scroll_row, state.cards.len()) {
        let Some(rect) = geometry.card_rect(index, state.scroll_row) else {
            continue;
        };
        if let Some(card) = state.cards.get(index) {
            let thumb = match state.thumbnails.get(card.id) {
                Some(sprite) => Thumb::Ready(sprite),
                None if state.thumbnails.is_loading(card.id) => Thumb::Loading(state.tick),
                None => Thumb::Missing,
            };
            render_card(frame, rect, card, thumb, hovered == Some(card.id));
        }
    }
}

enum Thumb<'a> {
    Ready(&'a SpriteData),
    Loading(u64),
    Missing,
}

fn render_card(frame: &mut Frame, area: Rect, card: &Card, thumb: Thumb, hovered: bool) {
    let border = if hovered { ACCENT_GOLD } else { TEXT_DIM };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(BG_PANEL))
        .title(Span::styled(card.label.as_str(), Style::default().fg(TEXT_DIM)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(CARD_THUMB_ROWS),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    match thumb {
        Thumb::Ready(sprite) => frame.render_widget(SpriteWidget::new(sprite), rows[0]),
        Thumb::Loading(tick) => frame.render_widget(
            Paragraph::new(spinner(tick))
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM)),
            centre_line(rows[0]),
        ),
        Thumb::Missing => {}
    }

    let name_style = if hovered {
        Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(card.name.as_str(), name_style)).alignment(Alignment::Center),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Line::from(type_badges(&card.types))).alignment(Alignment::Center),
        rows[2],
    );
}

fn centre_line(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height))
}

fn type_badges(types: &[String]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(types.len() * 2);
    for (i, name) in types.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            name.clone(),
            Style::default().fg(BG_BASE).bg(type_color(name)),
        ));
    }
    spans
}

fn render_popover(frame: &mut Frame, state: &AppState) {
    let (Some(area), Some(detail)) = (state.popover_area(), state.popover_detail()) else {
        return;
    };
    let content = PopoverContent::from_detail(detail);
    let fading = state.hover.visibility() == PopoverVisibility::Fading;

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_TEAL))
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .title(Span::styled(
            format!(" #{:03} ", content.id),
            Style::default().fg(TEXT_DIM),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Length(content.ability_rows(inner.width)),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SPRITE_MAX_WIDTH as u16),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(rows[0]);

    match state.sprites.get(content.id) {
        Some(sprite) => frame.render_widget(SpriteWidget::new(sprite).dim(fading), header[0]),
        None => {
            let placeholder = if state.sprites.is_loading(content.id) {
                spinner(state.tick)
            } else {
                "?"
            };
            frame.render_widget(
                Paragraph::new(placeholder)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(TEXT_DIM)),
                centre_line(header[0]),
            );
        }
    }

    let title = Text::from(vec![
        Line::from(Span::styled(
            content.name.clone(),
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(type_badges(&content.types)),
    ]);
    frame.render_widget(Paragraph::new(title), header[2]);

    let mut abilities = Vec::with_capacity(content.abilities.len() * 2);
    for (i, ability) in content.abilities.iter().enumerate() {
        if i > 0 {
            abilities.push(Span::raw(" "));
        }
        abilities.push(Span::styled(
            ability.clone(),
            Style::default().fg(ACCENT_GOLD).bg(BG_PANEL),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(abilities)).wrap(Wrap { trim: true }),
        rows[1],
    );

    let bar_width = usize::from(rows[3].width).saturating_sub(STAT_LABEL_WIDTH + 4);
    let stats: Vec<Line> = content
        .stats
        .iter()
        .map(|row| stat_line(row, bar_width))
        .collect();
    frame.render_widget(Paragraph::new(stats), rows[3]);

    if fading {
        frame
            .buffer_mut()
            .set_style(area, Style::default().add_modifier(Modifier::DIM));
    }
}

fn stat_line(row: &StatRow, bar_width: usize) -> Line<'static> {
    let filled = ((row.percent / 100.0) * bar_width as f32).round() as usize;
    let filled = filled.min(bar_width);
    Line::from(vec![
        Span::styled(
            format!("{:<width$}", row.label, width = STAT_LABEL_WIDTH),
            Style::default().fg(TEXT_DIM),
        ),
        Span::styled("█".repeat(filled), Style::default().fg(tier_color(row.tier))),
        Span::styled(
            "░".repeat(bar_width - filled),
            Style::default().fg(BAR_EMPTY),
        ),
        Span::styled(format!(" {:>3}", row.value), Style::default().fg(TEXT_MAIN)),
    ])
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let (status, status_color) = match (&state.message, state.loading_label()) {
        (Some(message), _) => (message.clone(), ACCENT_RED),
        (None, Some(label)) => (format!("Loading {label}..."), ACCENT_GOLD),
        (None, None) => (String::new(), TEXT_DIM),
    };
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(status_color));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: state.search.active,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Keep"),
            StatusBarHint::new("Esc", "Clear"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        let center = vec![StatusBarHint::new("Ctrl+C", "Quit")];
        return (left, center);
    }
    let left = vec![
        StatusBarHint::new("j/k", "Scroll"),
        StatusBarHint::new("PgUp/PgDn", "Page"),
        StatusBarHint::new("g/G", "Top/Bottom"),
    ];
    let center = vec![
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("hover", "Details"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}
