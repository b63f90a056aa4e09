use blockfall_engine::Command;

/// One step of a command script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Command(Command),
    /// Let one tick interval elapse.
    Wait,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown script command {character:?} at offset {offset}")]
pub(crate) struct ScriptParseError {
    offset: usize,
    character: char,
}

/// Maps a script character to its step.
///
/// | char | step         |
/// |------|--------------|
/// | `<`  | move left    |
/// | `>`  | move right   |
/// | `v`  | soft drop    |
/// | `V`  | hard drop    |
/// | `^`  | rotate       |
/// | `s`  | stash        |
/// | `p`  | toggle pause |
/// | `q`  | quit         |
/// | `.`  | wait a tick  |
pub(crate) fn step_from_char(c: char) -> Option<Step> {
    let command = match c {
        '<' => Command::MoveLeft,
        '>' => Command::MoveRight,
        'v' => Command::SoftDrop,
        'V' => Command::HardDrop,
        '^' => Command::Rotate,
        's' => Command::Stash,
        'p' => Command::TogglePause,
        'q' => Command::Quit,
        '.' => return Some(Step::Wait),
        _ => return None,
    };
    Some(Step::Command(command))
}

/// Parses a whole script. Whitespace is ignored.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Step>, ScriptParseError> {
    script
        .char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(offset, character)| {
            step_from_char(character).ok_or(ScriptParseError { offset, character })
        })
        .collect()
}
