use std::{fmt, time::Instant};

use blockfall_engine::{Command, PieceSource, SessionController, TickOutcome};

use super::{
    report::{ReportArg, SessionReport},
    script::{self, Step},
    session::SessionArg,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    session: SessionArg,
    #[clap(flatten)]
    report: ReportArg,
    /// Print every lock and the game over to stderr
    #[arg(long, default_value_t = false)]
    trace: bool,
    /// Command script: `<` `>` move, `v` soft drop, `V` hard drop, `^` rotate,
    /// `s` stash, `p` pause, `q` quit, `.` wait one tick
    pub(super) script: String,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let steps = script::parse_script(&arg.script)?;
    let start = Instant::now();
    let (mut controller, seed) = arg.session.build_controller(start)?;

    let events = play_script(&mut controller, start, &steps);
    if arg.trace {
        for event in &events {
            eprintln!("{event}");
        }
    }

    let report = SessionReport::new(controller.session(), seed);
    arg.report.write(&report, SessionReport::render_text)
}

/// A tick that did more than move the piece down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickEvent {
    tick: usize,
    outcome: TickOutcome,
}

impl fmt::Display for TickEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tick = self.tick;
        match self.outcome {
            TickOutcome::Locked {
                cleared_lines,
                score_delta,
            } => write!(
                f,
                "tick {tick}: locked, {cleared_lines} line(s) cleared, +{score_delta}"
            ),
            TickOutcome::GameOver {
                cleared_lines,
                score_delta,
            } => write!(
                f,
                "tick {tick}: game over, {cleared_lines} line(s) cleared, +{score_delta}"
            ),
            TickOutcome::Fell => write!(f, "tick {tick}: fell"),
            TickOutcome::Ignored => write!(f, "tick {tick}: ignored"),
        }
    }
}

/// Drives `controller` through `steps` on a synthetic clock starting at `start`.
///
/// Each [`Step::Wait`] jumps the clock to the pending tick deadline and fires
/// the tick; while no tick is scheduled (paused) it does nothing. Playback
/// stops at `q` or when the game ends.
fn play_script<S>(
    controller: &mut SessionController<S>,
    start: Instant,
    steps: &[Step],
) -> Vec<TickEvent>
where
    S: PieceSource,
{
    let mut now = start;
    let mut tick = 0;
    let mut events = vec![];

    for &step in steps {
        match step {
            Step::Command(Command::Quit) => {
                _ = controller.apply(Command::Quit, now);
                break;
            }
            Step::Command(command) => {
                _ = controller.apply(command, now);
            }
            Step::Wait => {
                let Some(deadline) = controller.next_deadline() else {
                    continue;
                };
                now = deadline;
                let Some(outcome) = controller.poll(now) else {
                    continue;
                };
                tick += 1;
                if !outcome.is_fell() {
                    events.push(TickEvent { tick, outcome });
                }
                if outcome.is_game_over() {
                    break;
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{
        GameSession, Grid, PieceKind, ScriptedPieces, SessionBuilder, TickSchedule,
    };

    use super::*;

    fn controller(session: GameSession<ScriptedPieces>) -> (SessionController<ScriptedPieces>, Instant) {
        let start = Instant::now();
        (
            SessionController::new(session, TickSchedule::default(), start),
            start,
        )
    }

    fn play(
        controller: &mut SessionController<ScriptedPieces>,
        start: Instant,
        script: &str,
    ) -> Vec<TickEvent> {
        play_script(controller, start, &script::parse_script(script).unwrap())
    }

    #[test]
    fn test_hard_drop_then_wait_locks() {
        let session = SessionBuilder::new().build(ScriptedPieces::cycle([PieceKind::T]).unwrap());
        let (mut controller, start) = controller(session);

        let events = play(&mut controller, start, "<< V .");

        assert_eq!(
            events,
            [TickEvent {
                tick: 1,
                outcome: TickOutcome::Locked {
                    cleared_lines: 0,
                    score_delta: 0
                }
            }]
        );
        let session = controller.session();
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.grid().occupied_count(), 4);
    }

    #[test]
    fn test_line_clear_is_traced() {
        let mut rows = vec!["..........".to_owned(); 19];
        rows.push("IIII....II".to_owned());
        let session = SessionBuilder::new()
            .grid(Grid::from_ascii(&rows.join("\n")))
            .build(ScriptedPieces::cycle([PieceKind::I]).unwrap());
        let (mut controller, start) = controller(session);

        let events = play(&mut controller, start, "V.");

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].to_string(),
            "tick 1: locked, 1 line(s) cleared, +40"
        );
        assert_eq!(controller.session().score(), 40);
    }

    #[test]
    fn test_waits_while_paused_do_nothing() {
        let session = SessionBuilder::new().build(ScriptedPieces::cycle([PieceKind::S]).unwrap());
        let (mut controller, start) = controller(session);

        let events = play(&mut controller, start, "p...p.");

        assert!(events.is_empty());
        assert_eq!(controller.session().falling_piece().position().y(), 1);
    }

    #[test]
    fn test_quit_stops_playback() {
        let session = SessionBuilder::new().build(ScriptedPieces::cycle([PieceKind::L]).unwrap());
        let (mut controller, start) = controller(session);

        play(&mut controller, start, "<q<<<");

        assert_eq!(controller.session().falling_piece().position().x(), 3);
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_game_over_stops_playback() {
        let session = SessionBuilder::new()
            .dimensions(10, 2)
            .build(ScriptedPieces::cycle([PieceKind::Z]).unwrap());
        let (mut controller, start) = controller(session);

        let events = play(&mut controller, start, ".<<.");

        assert_eq!(events.len(), 1);
        assert!(events[0].outcome.is_game_over());
        assert_eq!(controller.session().falling_piece().position().x(), 4);
    }
}
