//! Hover-intent state machine for the shared popover.
//!
//! The machine never touches timers itself. Every transition returns the
//! [`HoverCommand`]s the caller must carry out: scheduling or cancelling one
//! of the three timers. Each scheduled timer carries a token; a firing whose
//! token is not the one currently armed for that timer is ignored, so a
//! callback that outlives its session can never act on a later one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const OPEN_DELAY: Duration = Duration::from_millis(800);
pub const CLOSE_DELAY: Duration = Duration::from_millis(300);
pub const HIDE_DELAY: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoverTimer {
    Open,
    Close,
    Hide,
}

impl HoverTimer {
    pub fn delay(self) -> Duration {
        match self {
            HoverTimer::Open => OPEN_DELAY,
            HoverTimer::Close => CLOSE_DELAY,
            HoverTimer::Hide => HIDE_DELAY,
        }
    }

    pub fn task_key(self) -> &'static str {
        match self {
            HoverTimer::Open => "hover_open",
            HoverTimer::Close => "hover_close",
            HoverTimer::Hide => "hover_hide",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverPhase {
    #[default]
    Idle,
    PendingOpen {
        card: u16,
    },
    Open {
        card: u16,
    },
    PendingClose {
        card: u16,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopoverVisibility {
    #[default]
    Hidden,
    Visible,
    /// Faded out, waiting for the hide timer.
    Fading,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverCommand {
    Schedule {
        timer: HoverTimer,
        token: u64,
        delay: Duration,
    },
    Cancel(HoverTimer),
    /// The popover was just populated for `card`.
    Opened { card: u16 },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverIntent {
    phase: HoverPhase,
    visibility: PopoverVisibility,
    shown: Option<u16>,
    next_token: u64,
    open_token: Option<u64>,
    close_token: Option<u64>,
    hide_token: Option<u64>,
}

impl HoverIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    pub fn visibility(&self) -> PopoverVisibility {
        self.visibility
    }

    /// Card whose content the popover currently holds, if it is drawn at all.
    pub fn shown_card(&self) -> Option<u16> {
        match self.visibility {
            PopoverVisibility::Hidden => None,
            PopoverVisibility::Visible | PopoverVisibility::Fading => self.shown,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.visibility == PopoverVisibility::Visible
    }

    pub fn card_entered(&mut self, card: u16) -> Vec<HoverCommand> {
        let mut commands = vec![self.cancel(HoverTimer::Close), self.cancel(HoverTimer::Open)];
        let returning = matches!(self.phase, HoverPhase::PendingClose { card: pending } if pending == card)
            && self.visibility == PopoverVisibility::Visible
            && self.shown == Some(card);
        if returning {
            self.phase = HoverPhase::Open { card };
        } else {
            self.phase = HoverPhase::PendingOpen { card };
            commands.push(self.schedule(HoverTimer::Open));
        }
        commands
    }

    pub fn card_left(&mut self, card: u16) -> Vec<HoverCommand> {
        let mut commands = vec![self.cancel(HoverTimer::Open)];
        match self.phase {
            HoverPhase::PendingOpen { card: pending } if pending == card => {
                if self.visibility == PopoverVisibility::Visible {
                    self.phase = HoverPhase::PendingClose { card };
                    commands.push(self.cancel(HoverTimer::Close));
                    commands.push(self.schedule(HoverTimer::Close));
                } else {
                    self.phase = HoverPhase::Idle;
                }
            }
            HoverPhase::Open { card: open } if open == card => {
                self.phase = HoverPhase::PendingClose { card };
                commands.push(self.cancel(HoverTimer::Close));
                commands.push(self.schedule(HoverTimer::Close));
            }
            _ => {}
        }
        commands
    }

    /// Entering the popover bridges the gap from its card: a pending close
    /// is cancelled and the session counts as open again.
    pub fn popover_entered(&mut self) -> Vec<HoverCommand> {
        if self.visibility != PopoverVisibility::Visible {
            return Vec::new();
        }
        let commands = vec![self.cancel(HoverTimer::Close)];
        if let Some(card) = self.shown {
            self.phase = HoverPhase::Open { card };
        }
        commands
    }

    /// Leaving the popover closes it immediately, from any state.
    pub fn popover_left(&mut self) -> Vec<HoverCommand> {
        let mut commands = vec![self.cancel(HoverTimer::Close), self.cancel(HoverTimer::Open)];
        self.phase = HoverPhase::Idle;
        commands.extend(self.begin_fade());
        commands
    }

    pub fn timer_fired(&mut self, timer: HoverTimer, token: u64) -> Vec<HoverCommand> {
        let armed = match timer {
            HoverTimer::Open => &mut self.open_token,
            HoverTimer::Close => &mut self.close_token,
            HoverTimer::Hide => &mut self.hide_token,
        };
        if *armed != Some(token) {
            return Vec::new();
        }
        *armed = None;

        match timer {
            HoverTimer::Open => {
                let HoverPhase::PendingOpen { card } = self.phase else {
                    return Vec::new();
                };
                self.phase = HoverPhase::Open { card };
                self.visibility = PopoverVisibility::Visible;
                self.shown = Some(card);
                vec![self.cancel(HoverTimer::Hide), HoverCommand::Opened { card }]
            }
            HoverTimer::Close => {
                if !matches!(self.phase, HoverPhase::PendingClose { .. }) {
                    return Vec::new();
                }
                self.phase = HoverPhase::Idle;
                self.begin_fade()
            }
            HoverTimer::Hide => {
                if self.visibility == PopoverVisibility::Fading {
                    self.visibility = PopoverVisibility::Hidden;
                    self.shown = None;
                }
                Vec::new()
            }
        }
    }

    fn begin_fade(&mut self) -> Vec<HoverCommand> {
        if self.visibility == PopoverVisibility::Hidden {
            return Vec::new();
        }
        self.visibility = PopoverVisibility::Fading;
        vec![self.cancel(HoverTimer::Hide), self.schedule(HoverTimer::Hide)]
    }

    fn schedule(&mut self, timer: HoverTimer) -> HoverCommand {
        self.next_token = self.next_token.wrapping_add(1);
        let token = self.next_token;
        match timer {
            HoverTimer::Open => self.open_token = Some(token),
            HoverTimer::Close => self.close_token = Some(token),
            HoverTimer::Hide => self.hide_token = Some(token),
        }
        HoverCommand::Schedule {
            timer,
            token,
            delay: timer.delay(),
        }
    }

    fn cancel(&mut self, timer: HoverTimer) -> HoverCommand {
        match timer {
            HoverTimer::Open => self.open_token = None,
            HoverTimer::Close => self.close_token = None,
            HoverTimer::Hide => self.hide_token = None,
        }
        HoverCommand::Cancel(timer)
    }
}
