use console::Term;
use log::debug;

use super::styling::{heading, verdict as verdict_style};
use super::tables::build_table;
use crate::build::{BuildRecord, PhaseReporter, PhaseVerdict};

/// Redraws the build table of the running phase in place.
///
/// When stdout is not a terminal only the final table of each phase is printed.
pub struct LiveTable {
    term: Term,
    lines_drawn: usize,
    last_rendered: String,
}

impl LiveTable {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
            lines_drawn: 0,
            last_rendered: String::new(),
        }
    }

    fn redraw(&mut self, rendered: String) -> std::io::Result<()> {
        if self.lines_drawn > 0 {
            self.term.clear_last_lines(self.lines_drawn)?;
        }
        self.term.write_line(&rendered)?;
        self.lines_drawn = rendered.lines().count();
        Ok(())
    }
}

impl PhaseReporter for LiveTable {
    fn phase_started(&mut self, number: usize, _jobs: &[String]) {
        self.lines_drawn = 0;
        self.last_rendered.clear();
        println!("{}", heading(format!("Build phase #{number}:")));
    }

    fn update(&mut self, records: &[BuildRecord]) {
        let rendered = build_table(records).to_string();

        if self.term.is_term() {
            if let Err(e) = self.redraw(rendered.clone()) {
                debug!("Failed to redraw build table: {e}");
            }
        }
        self.last_rendered = rendered;
    }

    fn phase_finished(&mut self, verdict: PhaseVerdict) {
        if !self.term.is_term() {
            println!("{}", self.last_rendered);
        }

        let text = match verdict {
            PhaseVerdict::Success => "Phase succeeded ✓",
            PhaseVerdict::Failed => "Phase failed ✗",
            PhaseVerdict::InProgress => "Phase done, failures ignored",
        };
        println!("{}\n", verdict_style(verdict, text));
    }
}
