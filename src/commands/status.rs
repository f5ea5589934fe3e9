//! `status`: one line per managed dotfile that needs attention.
use std::io::Write;

use anyhow::Result;

use crate::dotfile::State;
use crate::repository::Repository;

/// Options for the `status` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusOptions {
    /// Include dotfiles that are correctly linked.
    pub all: bool,
    /// Colour each line by state.
    pub color: bool,
}

const fn color_of(state: State) -> &'static str {
    match state {
        State::Ok => "\x1b[32m",
        State::Copy => "\x1b[36m",
        State::External => "\x1b[35m",
        State::Missing => "\x1b[33m",
        State::Conflict => "\x1b[31m",
        State::Error => "\x1b[1;31m",
    }
}

/// Write `<marker> <name>` for each dotfile, names relative to the home
/// directory.
///
/// # Errors
///
/// Returns an error if the repository cannot be listed or `out` fails.
pub fn run(repo: &Repository, opts: StatusOptions, out: &mut impl Write) -> Result<()> {
    for dotfile in repo.contents()? {
        let state = dotfile.state();
        if state == State::Ok && !opts.all {
            continue;
        }
        let short = repo.short_name(dotfile.name());
        if opts.color {
            writeln!(out, "{}{} {short}\x1b[0m", color_of(state), state.marker())?;
        } else {
            writeln!(out, "{} {short}", state.marker())?;
        }
    }
    Ok(())
}
