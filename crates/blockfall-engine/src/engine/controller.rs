use std::{
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use crate::ActionError;

use super::{
    game_session::{GameSession, TickOutcome},
    piece_source::{PieceSource, RandomPieces},
};

/// Gravity interval used when nothing else is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// How long the falling piece waits between gravity steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSchedule {
    /// Same interval at every level.
    Fixed(Duration),
    /// `base` at level 0, shortened by `step` per level, never below `min`.
    Leveled {
        base: Duration,
        step: Duration,
        min: Duration,
    },
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::Fixed(DEFAULT_TICK_INTERVAL)
    }
}

impl TickSchedule {
    /// Returns the gravity interval at `level`.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use blockfall_engine::TickSchedule;
    ///
    /// let schedule = TickSchedule::Leveled {
    ///     base: Duration::from_millis(1000),
    ///     step: Duration::from_millis(100),
    ///     min: Duration::from_millis(200),
    /// };
    /// assert_eq!(schedule.interval(0), Duration::from_millis(1000));
    /// assert_eq!(schedule.interval(3), Duration::from_millis(700));
    /// assert_eq!(schedule.interval(20), Duration::from_millis(200));
    /// ```
    #[must_use]
    pub fn interval(self, level: usize) -> Duration {
        match self {
            Self::Fixed(interval) => interval,
            Self::Leveled { base, step, min } => {
                let level = u32::try_from(level).unwrap_or(u32::MAX);
                base.saturating_sub(step.saturating_mul(level)).max(min)
            }
        }
    }
}

/// Cancellable, restartable one-shot deadline for the next gravity step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTimer {
    started_at: Option<Instant>,
    interval: Duration,
}

impl TickTimer {
    /// Starts a fresh interval at `now`, discarding any pending deadline.
    pub fn restart(&mut self, now: Instant, interval: Duration) {
        self.started_at = Some(now);
        self.interval = interval;
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at.map(|started_at| started_at + self.interval)
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }
}

/// Input accepted by a [`SessionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Stash,
    TogglePause,
    Quit,
}

/// Single owner of a [`GameSession`] and its gravity timer.
///
/// Every command and every tick is applied one at a time through `&mut self`.
/// The timer restarts after each successful command and after each tick, is
/// suspended while paused, and stops for good once the game is over.
///
/// Time is passed in explicitly, so the controller can be driven by a real
/// clock ([`Self::run`]) or a synthetic one.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use blockfall_engine::{Command, GameSession, SessionController, TickOutcome, TickSchedule};
///
/// let start = Instant::now();
/// let mut controller = SessionController::new(GameSession::new(), TickSchedule::default(), start);
///
/// assert_eq!(controller.poll(start + Duration::from_millis(100)), None);
/// assert_eq!(
///     controller.poll(start + Duration::from_millis(500)),
///     Some(TickOutcome::Fell)
/// );
///
/// _ = controller.apply(Command::HardDrop, start + Duration::from_millis(600));
/// assert_eq!(controller.next_deadline(), Some(start + Duration::from_millis(1100)));
/// ```
#[derive(Debug)]
pub struct SessionController<S = RandomPieces> {
    session: GameSession<S>,
    schedule: TickSchedule,
    timer: TickTimer,
}

impl<S> SessionController<S>
where
    S: PieceSource,
{
    /// Takes ownership of `session` and starts the timer at `now` if it is playing.
    #[must_use]
    pub fn new(session: GameSession<S>, schedule: TickSchedule, now: Instant) -> Self {
        let mut controller = Self {
            session,
            schedule,
            timer: TickTimer::default(),
        };
        controller.sync_timer(now);
        controller
    }

    #[must_use]
    pub fn session(&self) -> &GameSession<S> {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> GameSession<S> {
        self.session
    }

    #[must_use]
    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Cancels the timer; no tick fires until the next successful command.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    fn sync_timer(&mut self, now: Instant) {
        if self.session.session_state().is_playing() {
            let interval = self.schedule.interval(self.session.level());
            self.timer.restart(now, interval);
        } else {
            self.timer.stop();
        }
    }

    /// Applies one command at `now`.
    ///
    /// The timer restarts only when the command changed the session. `Quit`
    /// stops the timer and leaves the session as is.
    pub fn apply(&mut self, command: Command, now: Instant) -> Result<(), ActionError> {
        let result = match command {
            Command::MoveLeft => self.session.try_move_left(),
            Command::MoveRight => self.session.try_move_right(),
            Command::SoftDrop => self.session.try_soft_drop(),
            Command::Rotate => self.session.try_rotate(),
            Command::Stash => self.session.try_stash(),
            Command::HardDrop => match self.session.hard_drop() {
                // Already resting: not a state change, keep the deadline
                Ok(0) => return Ok(()),
                result => result.map(|_rows| ()),
            },
            Command::TogglePause => {
                if self.session.session_state().is_game_over() {
                    return Err(ActionError::GameOver);
                }
                self.session.toggle_pause();
                Ok(())
            }
            Command::Quit => {
                self.stop();
                return Ok(());
            }
        };
        if result.is_ok() {
            self.sync_timer(now);
        }
        result
    }

    /// Fires a tick if the timer is due at `now`.
    ///
    /// Returns `None` when nothing was due. After a tick the timer restarts
    /// with the interval of the (possibly new) level, or stops if the game
    /// ended.
    pub fn poll(&mut self, now: Instant) -> Option<TickOutcome> {
        if !self.timer.is_due(now) {
            return None;
        }
        let outcome = self.session.tick();
        self.sync_timer(now);
        Some(outcome)
    }

    /// Runs the session against a real clock until it ends.
    ///
    /// Commands are received from `commands`, waiting at most until the next
    /// tick deadline, and applied in arrival order. Returns the session when
    /// the channel closes, a [`Command::Quit`] arrives or the game is over.
    pub fn run(mut self, commands: &Receiver<Command>) -> GameSession<S> {
        loop {
            let now = Instant::now();
            self.poll(now);
            if self.session.session_state().is_game_over() {
                break;
            }

            let received = match self.next_deadline() {
                Some(deadline) => commands.recv_timeout(deadline.saturating_duration_since(now)),
                None => commands.recv().map_err(RecvTimeoutError::from),
            };
            match received {
                Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(command) => {
                    _ = self.apply(command, Instant::now());
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        self.stop();
        self.session
    }
}
