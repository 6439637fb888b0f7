//! Terminal prompts
//!
//! A minimal single-choice list drawn inline on stderr, so stdout stays clean
//! for `--choice-only` and `--list` output.

use crate::ui::Prompter;
use colored::Colorize;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};
use std::io::{self, BufRead, IsTerminal, Write};

/// Result of a key press in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Move(usize),
    Accept,
    Cancel,
    Ignore,
}

/// Map a key press to a menu action; movement wraps around
pub fn menu_action(key: KeyEvent, selected: usize, len: usize) -> MenuAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return MenuAction::Cancel;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => MenuAction::Cancel,
        KeyCode::Enter => MenuAction::Accept,
        KeyCode::Up | KeyCode::Char('k') => MenuAction::Move(if selected == 0 {
            len - 1
        } else {
            selected - 1
        }),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => MenuAction::Move((selected + 1) % len),
        KeyCode::Home | KeyCode::Char('g') => MenuAction::Move(0),
        KeyCode::End | KeyCode::Char('G') => MenuAction::Move(len - 1),
        _ => MenuAction::Ignore,
    }
}

/// First item shown when `height` rows are available
pub fn scroll_offset(selected: usize, offset: usize, height: usize) -> usize {
    if selected < offset {
        selected
    } else if selected >= offset + height {
        selected + 1 - height
    } else {
        offset
    }
}

/// Prompter reading from the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter
    }
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stderr(), cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, message: &str) -> io::Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", message)?;
        stderr.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }

    fn select(&mut self, title: &str, items: &[String], cursor: usize) -> io::Result<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            tracing::warn!("interactive selection requires a terminal");
            return Ok(None);
        }

        if !title.is_empty() {
            eprintln!("{}", title);
        }

        let rows = terminal::size().map(|(_, rows)| rows as usize).unwrap_or(24);
        let height = items.len().min(rows.saturating_sub(1).max(1));

        let mut out = io::stderr();
        terminal::enable_raw_mode()?;
        let _guard = RawModeGuard;
        queue!(out, cursor::Hide)?;

        let mut selected = cursor.min(items.len() - 1);
        let mut offset = scroll_offset(selected, 0, height);
        let mut drawn = false;

        loop {
            if drawn {
                queue!(out, cursor::MoveUp(height as u16))?;
            }
            draw(&mut out, items, selected, offset, height)?;
            drawn = true;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match menu_action(key, selected, items.len()) {
                MenuAction::Move(next) => {
                    selected = next;
                    offset = scroll_offset(selected, offset, height);
                }
                MenuAction::Accept => {
                    erase(&mut out, height)?;
                    return Ok(Some(selected));
                }
                MenuAction::Cancel => {
                    erase(&mut out, height)?;
                    return Ok(None);
                }
                MenuAction::Ignore => {}
            }
        }
    }
}

fn draw(
    out: &mut impl Write,
    items: &[String],
    selected: usize,
    offset: usize,
    height: usize,
) -> io::Result<()> {
    for (index, item) in items.iter().enumerate().skip(offset).take(height) {
        let line = if index == selected {
            format!("{} {}", ">".green().bold(), item.bold())
        } else {
            format!("  {}", item)
        };
        queue!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(line),
            Print("\r\n")
        )?;
    }
    out.flush()
}

fn erase(out: &mut impl Write, height: usize) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveUp(height as u16),
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown)
    )?;
    out.flush()
}
