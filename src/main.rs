use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use dexgrid::action::Action;
use dexgrid::api::{self, PokeApi, DEFAULT_API_BASE};
use dexgrid::catalog;
use dexgrid::effect::Effect;
use dexgrid::loader::{load_segment, CatalogSource, DEFAULT_DETAIL_CONCURRENCY};
use dexgrid::logging;
use dexgrid::reducer::reducer;
use dexgrid::sprite::{self, SpriteData};
use dexgrid::state::AppState;
use dexgrid::ui;

const TICK_MS: u64 = 90;

#[derive(Parser, Debug)]
#[command(name = "dexgrid")]
#[command(about = "Browse the PokeAPI catalog as a card grid")]
struct Args {
    /// Base URL of the catalog API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Maximum detail requests in flight while a generation loads
    #[arg(
        long,
        default_value_t = DEFAULT_DETAIL_CONCURRENCY as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    detail_concurrency: u64,

    /// Log file (defaults to the platform data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Tracing filter directive, overridden by RUST_LOG
    #[arg(long, default_value = logging::DEFAULT_LOG_FILTER)]
    log_filter: String,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum DexComponentId {
    Grid,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum DexContext {
    Grid,
    Search,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        if self.search.active {
            Some(DexComponentId::Search)
        } else {
            Some(DexComponentId::Grid)
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.search.active {
            Some(DexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::Grid => DexContext::Grid,
            DexComponentId::Search => DexContext::Search,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::Grid
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        api_base,
        detail_concurrency,
        log_file,
        log_filter,
        debug: debug_args,
    } = Args::parse();

    let log_path = log_file.unwrap_or_else(logging::default_log_path);
    if let Err(err) = logging::init(&log_path, &log_filter) {
        eprintln!("Logging disabled ({}): {err}", log_path.display());
    }

    let debug = DebugSession::new(debug_args);
    let state = debug
        .load_state_or_else_async(|| async {
            let terminal_size = crossterm::terminal::size().unwrap_or((80, 24));
            Ok::<AppState, io::Error>(AppState {
                terminal_size,
                ..AppState::default()
            })
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let detail_concurrency = usize::try_from(detail_concurrency).unwrap_or(usize::MAX);
    let source: Arc<dyn CatalogSource> = Arc::new(PokeApi::new(api_base));
    tracing::info!(concurrency = detail_concurrency, "starting");

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        replay_actions,
        source,
        detail_concurrency,
    )
    .await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    source: Arc<dyn CatalogSource>,
    concurrency: usize,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(ui::DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    bus.register(DexComponentId::Grid, |event, state| {
        ui::handle_grid_event(&event.kind, state)
    });
    bus.register(DexComponentId::Search, |event, state| {
        ui::handle_search_event(&event.kind, state)
    });

    bus.register_global(|event, state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                HandlerResponse::action(Action::Quit)
            }
            KeyCode::Char('q') if !state.search.active => HandlerResponse::action(Action::Quit),
            KeyCode::Char('/') if !state.search.active => {
                HandlerResponse::action(Action::SearchStart)
            }
            _ => HandlerResponse::ignored(),
        },
        _ => ui::handle_pointer_event(&event.kind, state),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, _render_ctx, event_ctx| {
                let layout = ui.borrow_mut().render(frame, area, state);
                event_ctx.set_component_area(DexComponentId::Grid, layout.grid);
                if state.search.active {
                    event_ctx.set_component_area(DexComponentId::Search, layout.header);
                } else {
                    event_ctx.component_areas.remove(&DexComponentId::Search);
                }
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, &source, concurrency),
        )
        .await
}

fn handle_effect(
    effect: Effect,
    ctx: &mut EffectContext<Action>,
    source: &Arc<dyn CatalogSource>,
    concurrency: usize,
) {
    match effect {
        Effect::LoadSegment { index } => {
            let Some(segment) = catalog::segment(index) else {
                return;
            };
            tracing::info!(segment = segment.label, "loading segment");
            let source = Arc::clone(source);
            ctx.tasks()
                .spawn(TaskKey::new(format!("segment_{index}")), async move {
                    match load_segment(source, segment, concurrency).await {
                        Ok(batch) => {
                            tracing::info!(
                                segment = segment.label,
                                count = batch.len(),
                                "segment loaded"
                            );
                            Action::SegmentDidLoad { index, batch }
                        }
                        Err(error) => Action::SegmentDidError {
                            index,
                            error: error.to_string(),
                        },
                    }
                });
        }
        Effect::ScheduleHoverTimer {
            timer,
            token,
            delay,
        } => {
            ctx.tasks()
                .spawn(TaskKey::new(timer.task_key()), async move {
                    tokio::time::sleep(delay).await;
                    Action::HoverTimerDidFire { timer, token }
                });
        }
        Effect::CancelHoverTimer { timer } => {
            ctx.tasks().cancel(&TaskKey::new(timer.task_key()));
        }
        Effect::LoadSprite { id, url } => {
            let bounds = (sprite::SPRITE_MAX_WIDTH, sprite::SPRITE_MAX_HEIGHT);
            ctx.tasks()
                .spawn(TaskKey::new(format!("sprite_{id}")), async move {
                    match fetch_sprite(&url, bounds).await {
                        Ok(sprite) => Action::SpriteDidLoad { id, sprite },
                        Err(error) => Action::SpriteDidError { id, error },
                    }
                });
        }
        Effect::LoadThumbnail { id, url } => {
            let bounds = (sprite::THUMB_MAX_WIDTH, sprite::THUMB_MAX_HEIGHT);
            ctx.tasks()
                .spawn(TaskKey::new(format!("thumb_{id}")), async move {
                    match fetch_sprite(&url, bounds).await {
                        Ok(sprite) => Action::ThumbnailDidLoad { id, sprite },
                        Err(error) => Action::ThumbnailDidError { id, error },
                    }
                });
        }
    }
}

async fn fetch_sprite(url: &str, bounds: (u32, u32)) -> Result<SpriteData, String> {
    let bytes = api::fetch_bytes(url).await.map_err(|err| err.to_string())?;
    sprite::decode_sprite(&bytes, bounds)
}
