//! Textual clone progress rendering.

use std::io::Write;

use console::Term;

use crate::infrastructure::git::{ClonePhase, ProgressEvent};

/// Width of the progress bar in characters.
pub const BAR_WIDTH: usize = 40;

/// Renders progress events as a single overwritten terminal line.
///
/// Re-renders only when the integer percentage changes, and skips events
/// whose total is unknown. A newline is emitted once a phase reaches
/// 100% so the completed bar stays on screen.
pub struct ProgressReporter<W: Write> {
    out: W,
    last: Option<(ClonePhase, usize)>,
    line_open: bool,
}

impl ProgressReporter<Term> {
    /// Reporter writing to the terminal on standard output.
    pub fn stdout() -> Self {
        Self::new(Term::stdout())
    }
}

impl<W: Write> ProgressReporter<W> {
    /// Reporter writing to an arbitrary sink.
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            line_open: false,
        }
    }

    /// Consume one progress event.
    ///
    /// Rendering is cosmetic; write failures are swallowed so a broken
    /// pipe on the progress line never fails the clone itself.
    pub fn handle(&mut self, event: ProgressEvent) {
        if event.total == 0 {
            return;
        }

        let percent = (event.current * 100 / event.total).min(100);
        if self.last == Some((event.phase, percent)) {
            return;
        }

        // A new phase gets its own line instead of overwriting the
        // previous phase's bar.
        if self.line_open {
            if let Some((last_phase, last_percent)) = self.last {
                if last_phase != event.phase && last_percent < 100 {
                    let _ = writeln!(self.out);
                }
            }
        }

        let filled = percent * BAR_WIDTH / 100;
        let bar: String = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);
        let _ = write!(
            self.out,
            "\r{}: |{}| {}% ({}/{})",
            event.phase.label(),
            bar,
            percent,
            event.current,
            event.total
        );
        self.line_open = true;

        if percent >= 100 {
            let _ = writeln!(self.out);
            self.line_open = false;
        }
        let _ = self.out.flush();

        self.last = Some((event.phase, percent));
    }
}
