use colored::Colorize;
use crossterm::tty::IsTty;
use crossterm::{cursor, queue, terminal};
use domain::ask_state::AskState;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

pub const TITLE: &str = "Ask a Question of the Documents";
pub const PLACEHOLDER: &str = "Type your question here...";
pub const ANSWER_HEADING: &str = "Generated Content";

/// The trigger control as shown on screen.
pub fn trigger_label(state: &AskState) -> String {
    format!("[ {} ]", state.status.label())
}

/// Plain-text lines of the ask form.
pub fn form_lines(state: &AskState) -> Vec<String> {
    let mut lines = vec![
        TITLE.to_string(),
        String::new(),
        query_line(state),
        trigger_label(state),
        String::new(),
        ANSWER_HEADING.to_string(),
    ];
    lines.extend(state.answer.lines().map(str::to_string));
    lines
}

fn query_line(state: &AskState) -> String {
    if state.query.is_empty() {
        format!("> {}", PLACEHOLDER)
    } else {
        format!("> {}", state.query)
    }
}

fn styled_lines(state: &AskState) -> Vec<String> {
    let trigger = trigger_label(state);
    let trigger = if state.trigger_enabled() {
        trigger.blue().bold().to_string()
    } else {
        trigger.dimmed().to_string()
    };
    let query = if state.query.is_empty() {
        query_line(state).dimmed().to_string()
    } else {
        query_line(state)
    };

    let mut lines = vec![
        TITLE.bold().to_string(),
        String::new(),
        query,
        trigger,
        String::new(),
        ANSWER_HEADING.bold().to_string(),
    ];
    lines.extend(state.answer.lines().map(str::to_string));
    lines
}

/// Lines above the answer: title, blank, query, trigger, blank, heading.
const HEADER_LINES: usize = 6;
const ELIDED: &str = "...";

/// Rows a line occupies once the terminal wraps it, counting wide
/// characters as two columns.
fn rows_for(line: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let columns = UnicodeWidthStr::width(line);
    columns.div_ceil(width).max(1).min(usize::from(u16::MAX)) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Form(usize),
    Elided,
}

/// Which form lines to print. While an ask is running the form must stay
/// shorter than the terminal, otherwise `MoveUp` is clamped at the top row
/// and every redraw leaks a copy into scrollback; only the tail of the
/// answer is kept. The final idle form is printed in full.
fn visible_rows(line_rows: &[u16], busy: bool, height: u16) -> Vec<Row> {
    let all = || (0..line_rows.len()).map(Row::Form).collect::<Vec<_>>();
    let budget = u32::from(height.saturating_sub(1));
    let total: u32 = line_rows.iter().map(|r| u32::from(*r)).sum();
    if !busy || total <= budget || line_rows.len() <= HEADER_LINES {
        return all();
    }

    let mut used: u32 = line_rows[..HEADER_LINES]
        .iter()
        .map(|r| u32::from(*r))
        .sum::<u32>()
        + 1;
    let mut first = line_rows.len();
    while first > HEADER_LINES && used + u32::from(line_rows[first - 1]) <= budget {
        first -= 1;
        used += u32::from(line_rows[first]);
    }

    let mut rows: Vec<Row> = (0..HEADER_LINES).map(Row::Form).collect();
    rows.push(Row::Elided);
    rows.extend((first..line_rows.len()).map(Row::Form));
    rows
}

/// Draws the form and redraws it in place on every update.
pub struct TerminalView<W: Write> {
    out: W,
    live: bool,
    drawn_rows: u16,
}

impl TerminalView<io::Stdout> {
    /// In-place redraws on a terminal; a single final render when piped.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let live = out.is_tty();
        Self::new(out, live)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, live: bool) -> Self {
        Self {
            out,
            live,
            drawn_rows: 0,
        }
    }

    pub fn draw(&mut self, state: &AskState) -> io::Result<()> {
        if !self.live {
            if state.trigger_enabled() {
                for line in form_lines(state) {
                    writeln!(self.out, "{}", line)?;
                }
                self.out.flush()?;
            }
            return Ok(());
        }
        let (width, height) = terminal::size().unwrap_or((80, 24));
        self.draw_sized(state, width, height)
    }

    fn draw_sized(&mut self, state: &AskState, width: u16, height: u16) -> io::Result<()> {
        if self.drawn_rows > 0 {
            queue!(
                self.out,
                cursor::MoveUp(self.drawn_rows),
                cursor::MoveToColumn(0),
                terminal::Clear(terminal::ClearType::FromCursorDown)
            )?;
        }

        let plain = form_lines(state);
        let styled = styled_lines(state);
        let line_rows: Vec<u16> = plain.iter().map(|l| rows_for(l, width)).collect();

        let mut rows: u16 = 0;
        for row in visible_rows(&line_rows, state.status.is_busy(), height) {
            match row {
                Row::Form(i) => {
                    writeln!(self.out, "{}", styled[i])?;
                    rows = rows.saturating_add(line_rows[i]);
                }
                Row::Elided => {
                    writeln!(self.out, "{}", ELIDED.dimmed())?;
                    rows = rows.saturating_add(1);
                }
            }
        }
        self.drawn_rows = rows;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
