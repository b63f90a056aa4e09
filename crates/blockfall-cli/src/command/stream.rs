use std::{
    io::{self, BufRead},
    sync::mpsc::{self, Sender},
    thread,
    time::Instant,
};

use blockfall_engine::Command;

use super::{
    report::{ReportArg, SessionReport},
    script::{self, Step},
    session::SessionArg,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StreamArg {
    #[clap(flatten)]
    session: SessionArg,
    #[clap(flatten)]
    report: ReportArg,
}

/// Plays a session in real time, fed by script characters read from stdin.
///
/// Gravity follows the wall clock; `.` has no meaning here and is skipped.
/// The session ends on `q`, at end of input, or when the game is over.
pub(crate) fn run(arg: &StreamArg) -> anyhow::Result<()> {
    let (controller, seed) = arg.session.build_controller(Instant::now())?;

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || forward_commands(io::stdin().lock(), &tx));
    let session = controller.run(&rx);

    let report = SessionReport::new(&session, seed);
    arg.report.write(&report, SessionReport::render_text)
}

/// Sends every command found in `reader` until input ends or the receiver
/// hangs up.
fn forward_commands<R>(reader: R, tx: &Sender<Command>)
where
    R: BufRead,
{
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        for c in line.chars() {
            match script::step_from_char(c) {
                Some(Step::Command(command)) => {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
                Some(Step::Wait) => {}
                None if c.is_whitespace() => {}
                None => eprintln!("ignoring unknown command {c:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_forward_commands() {
        let (tx, rx) = mpsc::channel();
        forward_commands(Cursor::new("<<\nV. x\n^q\n"), &tx);
        drop(tx);

        let received: Vec<_> = rx.iter().collect();
        assert_eq!(
            received,
            [
                Command::MoveLeft,
                Command::MoveLeft,
                Command::HardDrop,
                Command::Rotate,
                Command::Quit,
            ]
        );
    }

    #[test]
    fn test_forward_commands_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        // Must return instead of looping over the rest of the input
        forward_commands(Cursor::new(">".repeat(1000)), &tx);
    }
}
