use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{error, warn};

use crate::db::Store;
use crate::error::ActionError;
use crate::models::ContactEntry;

use super::controller::ContactController;
use super::forms::ContactField;
use super::helpers::{centered_rect, describe_error};

/// Width of the contact list pane on the left.
const LIST_WIDTH: u16 = 32;
/// Height of the button bar.
const BUTTON_BAR_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// The six buttons along the bottom of the window.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Add,
    Delete,
    Update,
    Find,
    Previous,
    Next,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Add,
        Action::Delete,
        Action::Update,
        Action::Find,
        Action::Previous,
        Action::Next,
    ];

    fn label(self) -> &'static str {
        match self {
            Action::Add => "Add",
            Action::Delete => "Delete",
            Action::Update => "Update",
            Action::Find => "Find",
            Action::Previous => "Previous",
            Action::Next => "Next",
        }
    }

    fn shortcut(self) -> char {
        match self {
            Action::Add => 'a',
            Action::Delete => 'd',
            Action::Update => 'u',
            Action::Find => 'f',
            Action::Previous => 'p',
            Action::Next => 'n',
        }
    }

    fn from_shortcut(ch: char) -> Option<Action> {
        Self::ALL.into_iter().find(|action| action.shortcut() == ch)
    }

    fn offset(self, step: isize) -> Action {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|a| *a == self).unwrap_or(0) as isize;
        Self::ALL[(idx + step).rem_euclid(len) as usize]
    }
}

/// Which pane receives plain key presses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Focus {
    List,
    Form,
    Buttons,
}

/// Modal overlays on top of the main window.
enum Mode {
    Normal,
    ConfirmDelete(ContactEntry),
    Notice(Notice),
}

/// A dismissable message box.
struct Notice {
    title: &'static str,
    message: String,
    kind: StatusKind,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer and notices.
#[derive(Copy, Clone)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front-end state. Owns the store for the lifetime of the window;
/// `shutdown` releases it.
pub struct App {
    store: Store,
    controller: ContactController,
    focus: Focus,
    button: Action,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            controller: ContactController::new(),
            focus: Focus::List,
            button: Action::Add,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Fill the list with every stored contact.
    pub fn reload(&mut self) {
        let result = self.controller.load(&self.store);
        match result {
            Ok(()) => {
                let count = self.controller.entries().len();
                self.set_status(format!("{count} contact(s) loaded."), StatusKind::Info);
            }
            Err(err) => self.report_failure("Error loading contacts.", err),
        }
    }

    /// Close the store. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        self.store.close().context("failed to close contact store")
    }

    /// Close the store after the event loop ended with `outcome`. A loop
    /// failure wins over a close failure; the latter is only logged then.
    pub fn finish(&mut self, outcome: Result<()>) -> Result<()> {
        let closed = self.shutdown();
        match (outcome, closed) {
            (Err(err), Err(close_err)) => {
                error!(error = ?close_err, "store close failed after loop error");
                Err(err)
            }
            (Err(err), Ok(())) => Err(err),
            (Ok(()), closed) => closed,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::ConfirmDelete(entry) => self.handle_confirm_delete(code, entry),
            Mode::Notice(notice) => match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Normal,
                _ => Mode::Notice(notice),
            },
        };

        Ok(exit)
    }

    /// Ctrl-modified keys. Returns whether the app should exit.
    pub(crate) fn handle_ctrl(&mut self, ch: char) -> Result<bool> {
        if !matches!(self.mode, Mode::Normal) {
            return Ok(false);
        }
        match ch {
            'q' => return Ok(true),
            'r' => self.reload(),
            'k' => {
                self.controller.clear_form();
                self.set_status("Form cleared.", StatusKind::Info);
            }
            other => {
                if let Some(action) = Action::from_shortcut(other) {
                    self.button = action;
                    self.trigger(action);
                }
            }
        }
        Ok(false)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Tab => {
                self.cycle_focus(true);
                return Mode::Normal;
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                return Mode::Normal;
            }
            _ => {}
        }

        match self.focus {
            Focus::List => match code {
                KeyCode::Esc | KeyCode::Char('q') => *exit = true,
                KeyCode::Up => self.move_in_list(-1),
                KeyCode::Down => self.move_in_list(1),
                KeyCode::PageUp => self.move_in_list(-10),
                KeyCode::PageDown => self.move_in_list(10),
                KeyCode::Home => self.move_in_list(isize::MIN / 2),
                KeyCode::End => self.move_in_list(isize::MAX / 2),
                KeyCode::Enter => self.focus = Focus::Form,
                _ => {}
            },
            Focus::Form => {
                let form = self.controller.form_mut();
                match code {
                    KeyCode::Esc => self.focus = Focus::List,
                    KeyCode::Up => {
                        if let Some(field) = form.active.previous() {
                            form.focus(field);
                        }
                    }
                    KeyCode::Down | KeyCode::Enter => {
                        if let Some(field) = form.active.next() {
                            form.focus(field);
                        } else if code == KeyCode::Enter {
                            self.focus = Focus::Buttons;
                        }
                    }
                    KeyCode::Backspace => form.backspace(),
                    KeyCode::Char(ch) => {
                        form.push_char(ch);
                    }
                    _ => {}
                }
            }
            Focus::Buttons => match code {
                KeyCode::Esc => self.focus = Focus::List,
                KeyCode::Left => self.button = self.button.offset(-1),
                KeyCode::Right => self.button = self.button.offset(1),
                KeyCode::Enter | KeyCode::Char(' ') => self.trigger(self.button),
                KeyCode::Char(ch) => {
                    if let Some(action) = Action::from_shortcut(ch) {
                        self.button = action;
                        self.trigger(action);
                    }
                }
                _ => {}
            },
        }

        // Actions may have opened a modal while we held the previous mode.
        mem::replace(&mut self.mode, Mode::Normal)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, entry: ContactEntry) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self.controller.delete(&self.store);
                match result {
                    Ok(removed) => self.notify_success(
                        format!("Deleted {removed}."),
                        "Contact deleted successfully.",
                    ),
                    Err(err) => self.report_failure("Error deleting contact.", err),
                }
                mem::replace(&mut self.mode, Mode::Normal)
            }
            _ => Mode::ConfirmDelete(entry),
        }
    }

    /// Run one button action against the store, reporting the outcome.
    fn trigger(&mut self, action: Action) {
        match action {
            Action::Add => match self.controller.add(&self.store) {
                Ok(entry) => {
                    self.notify_success(format!("Added {entry}."), "Contact added successfully.")
                }
                Err(err) => self.report_failure("Error adding contact.", err),
            },
            Action::Update => match self.controller.update(&self.store) {
                Ok(entry) => self.notify_success(
                    format!("Updated {entry}."),
                    "Contact updated successfully.",
                ),
                Err(err) => self.report_failure("Error updating contact.", err),
            },
            Action::Delete => match self.controller.selected_entry().cloned() {
                Some(entry) => self.mode = Mode::ConfirmDelete(entry),
                None => self.report_failure("Error deleting contact.", ActionError::NoSelection),
            },
            Action::Find => match self.controller.find(&self.store) {
                Ok(count) => {
                    let filter = self.controller.filter().unwrap_or_default().to_string();
                    self.set_status(
                        format!("{count} contact(s) with last name \"{filter}\"."),
                        StatusKind::Info,
                    );
                }
                Err(err) => self.report_failure("Error finding contacts.", err),
            },
            Action::Previous => {
                if let Err(err) = self.controller.previous(&self.store) {
                    self.report_failure("Error displaying contact details.", err);
                }
            }
            Action::Next => {
                if let Err(err) = self.controller.next(&self.store) {
                    self.report_failure("Error displaying contact details.", err);
                }
            }
        }
    }

    fn move_in_list(&mut self, offset: isize) {
        if let Err(err) = self.controller.move_selection(&self.store, offset) {
            self.report_failure("Error displaying contact details.", err);
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let form = self.controller.form_mut();
        self.focus = match (self.focus, forward) {
            (Focus::List, true) => {
                form.focus(ContactField::LastName);
                Focus::Form
            }
            (Focus::Form, true) => match form.active.next() {
                Some(field) => {
                    form.focus(field);
                    Focus::Form
                }
                None => Focus::Buttons,
            },
            (Focus::Buttons, true) => Focus::List,
            (Focus::List, false) => Focus::Buttons,
            (Focus::Form, false) => match form.active.previous() {
                Some(field) => {
                    form.focus(field);
                    Focus::Form
                }
                None => Focus::List,
            },
            (Focus::Buttons, false) => {
                form.focus(ContactField::Email);
                Focus::Form
            }
        };
    }

    fn notify_success(&mut self, status: String, message: &str) {
        self.set_status(status, StatusKind::Info);
        self.mode = Mode::Notice(Notice {
            title: "Success",
            message: message.to_string(),
            kind: StatusKind::Info,
        });
    }

    /// Log the failure and raise an error notice. Validation and lookup
    /// misses show their own message; storage errors get the action's
    /// headline plus the underlying cause.
    fn report_failure(&mut self, headline: &str, err: ActionError) {
        let is_storage = err.is_storage();
        let detail = describe_error(&anyhow::Error::from(err));
        let message = if is_storage {
            error!(error = %detail, "{headline}");
            format!("{headline}\n\n{detail}")
        } else {
            warn!(error = %detail, "{headline}");
            detail.clone()
        };
        self.set_status(detail, StatusKind::Error);
        self.mode = Mode::Notice(Notice {
            title: "Error",
            message,
            kind: StatusKind::Error,
        });
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(BUTTON_BAR_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(0)])
            .split(chunks[0]);

        self.draw_list(frame, columns[0]);
        self.draw_form(frame, columns[1]);
        self.draw_buttons(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::ConfirmDelete(entry) => self.draw_confirm_delete(frame, area, entry),
            Mode::Notice(notice) => self.draw_notice(frame, area, notice),
            Mode::Normal => {}
        }
    }

    fn pane_block(&self, title: String, focus: Focus) -> Block<'static> {
        let style = if self.focus == focus {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(style)
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let title = match self.controller.filter() {
            Some(filter) => format!("Find: {filter}"),
            None => "Contacts".to_string(),
        };
        let block = self.pane_block(title, Focus::List);

        if self.controller.entries().is_empty() {
            let text = if self.controller.filter().is_some() {
                "No matches. Ctrl+R shows all."
            } else {
                "No contacts yet."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .controller
            .entries()
            .iter()
            .map(|entry| ListItem::new(entry.to_string()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(self.controller.selected());
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let block = self.pane_block("Details".to_string(), Focus::Form);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let form = self.controller.form();
        let focused = self.focus == Focus::Form;
        let mut lines = Vec::with_capacity(ContactField::ALL.len() * 2);
        for field in ContactField::ALL {
            lines.push(form.build_line(field, focused));
            lines.push(Line::from(""));
        }
        frame.render_widget(Paragraph::new(lines), inner);

        if focused && self.mode_is_normal() {
            let row = ContactField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16
                * 2;
            let x = (inner.x + form.cursor_offset()).min(inner.right().saturating_sub(1));
            if row < inner.height {
                frame.set_cursor_position((x, inner.y + row));
            }
        }
    }

    fn draw_buttons(&self, frame: &mut Frame, area: Rect) {
        let block = self.pane_block("Actions".to_string(), Focus::Buttons);
        let mut spans = Vec::with_capacity(Action::ALL.len() * 2);
        for action in Action::ALL {
            let style = if self.focus == Focus::Buttons && action == self.button {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!("[ {} ]", action.label()), style));
            spans.push(Span::raw(" "));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key = |text: &'static str| {
            Span::styled(
                text,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let mut spans = vec![key("Tab"), Span::raw(" focus  ")];
        match self.focus {
            Focus::List => spans.extend([key("↑/↓"), Span::raw(" select  ")]),
            Focus::Form => spans.extend([key("↑/↓"), Span::raw(" field  ")]),
            Focus::Buttons => spans.extend([key("←/→ Enter"), Span::raw(" press  ")]),
        }
        spans.extend([
            key("^A"),
            Span::raw(" add  "),
            key("^U"),
            Span::raw(" update  "),
            key("^D"),
            Span::raw(" delete  "),
            key("^F"),
            Span::raw(" find  "),
            key("^P/^N"),
            Span::raw(" prev/next  "),
            key("^R"),
            Span::raw(" all  "),
            key("^K"),
            Span::raw(" clear  "),
            key("^Q"),
            Span::raw(" quit"),
        ]);
        Line::from(spans)
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, entry: &ContactEntry) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let lines = vec![
            Line::from(format!("Delete {entry}?")),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect, notice: &Notice) {
        let popup_area = centered_rect(60, 35, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(notice.title)
            .borders(Borders::ALL)
            .border_style(notice.kind.style());
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut lines: Vec<Line> = notice
            .message
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Enter to dismiss.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn mode_is_normal(&self) -> bool {
        matches!(self.mode, Mode::Normal)
    }
}
