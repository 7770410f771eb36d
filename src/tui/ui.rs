//! Common UI widgets and styles for the billed TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListState, Paragraph},
    Frame,
};

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default()
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn info() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn inactive() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn active_border() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn inactive_border() -> Style {
        Style::default().fg(Color::Gray)
    }
}

/// Single-line text input with cursor handling
#[derive(Clone)]
pub struct InputField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub is_focused: bool,
    pub cursor_position: usize,
}

impl InputField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            is_focused: false,
            cursor_position: 0,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let prev = prev_char_boundary(&self.value, self.cursor_position);
            self.value.remove(prev);
            self.cursor_position = prev;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.value.len() {
            self.value.remove(self.cursor_position);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position = prev_char_boundary(&self.value, self.cursor_position);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.value.len() {
            self.cursor_position = next_char_boundary(&self.value, self.cursor_position);
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Render the input field as a bordered paragraph
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let display_text = if self.value.is_empty() && !self.placeholder.is_empty() {
            &self.placeholder
        } else {
            &self.value
        };

        let border_style = if self.is_focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let text_style = if self.value.is_empty() && !self.placeholder.is_empty() {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let paragraph = Paragraph::new(display_text.to_string()).style(text_style).block(
            Block::default()
                .title(self.label.as_str())
                .borders(Borders::ALL)
                .border_style(border_style),
        );

        f.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.value[..self.cursor_position].chars().count() as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width - 1 {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

fn prev_char_boundary(s: &str, from: usize) -> usize {
    let mut i = from - 1;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn next_char_boundary(s: &str, from: usize) -> usize {
    let mut i = from + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Selectable list widget with state
pub struct SelectableList<T> {
    pub items: Vec<T>,
    pub state: ListState,
}

impl<T> SelectableList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            state: ListState::default(),
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.state.select(index);
    }
}

/// Center a rectangle within another rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_field_edits_respect_utf8_boundaries() {
        let mut field = InputField::new("Name");
        for c in "Hôtel".chars() {
            field.insert_char(c);
        }
        assert_eq!(field.value, "Hôtel");

        field.delete_char();
        field.delete_char();
        assert_eq!(field.value, "Hôt");

        field.move_cursor_to_start();
        field.delete_char_forward();
        assert_eq!(field.value, "ôt");
    }

    #[test]
    fn selectable_list_wraps_around() {
        let mut list = SelectableList::new(vec!["a", "b", "c"]);
        assert_eq!(list.selected(), None);
        list.next();
        assert_eq!(list.selected(), Some(&"a"));
        list.previous();
        list.previous();
        assert_eq!(list.selected(), Some(&"b"));
    }
}
