//! New bill form screen
//!
//! Collects the draft fields, stages the attachment on file selection and
//! hands the assembled draft to the submission handler on confirmation.

use std::path::Path;
use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::errors::{NewBillError, ValidationError};
use crate::models::{parse_amount, parse_date, parse_pct, Bill, ExpenseType, SessionIdentity};
use crate::newbill::NewBillHandler;
use crate::store::BillStore;
use crate::tui::ui::{centered_rect, InputField, SelectableList, Styles};

/// Form fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewBillField {
    ExpenseType,
    Name,
    Date,
    Amount,
    Vat,
    Pct,
    File,
    Commentary,
}

const FIELDS: &[NewBillField] = &[
    NewBillField::ExpenseType,
    NewBillField::Name,
    NewBillField::Date,
    NewBillField::Amount,
    NewBillField::Vat,
    NewBillField::Pct,
    NewBillField::File,
    NewBillField::Commentary,
];

pub struct NewBillScreen {
    pub handler: NewBillHandler,
    pub current_field: usize,

    pub name_input: InputField,
    pub date_input: InputField,
    pub amount_input: InputField,
    pub vat_input: InputField,
    pub pct_input: InputField,
    pub file_input: InputField,
    pub commentary_input: InputField,

    pub expense_type_list: SelectableList<ExpenseType>,
    pub show_type_dropdown: bool,
}

impl NewBillScreen {
    pub fn new(store: Arc<dyn BillStore>, identity: SessionIdentity) -> Self {
        let mut screen = Self {
            handler: NewBillHandler::new(store, identity),
            current_field: 0,

            name_input: InputField::new("Nom de la dépense").with_placeholder("Vol Paris Londres"),
            date_input: InputField::new("Date").with_placeholder("YYYY-MM-DD ou DD/MM/YYYY"),
            amount_input: InputField::new("Montant TTC").with_placeholder("348"),
            vat_input: InputField::new("TVA").with_placeholder("70"),
            pct_input: InputField::new("%").with_placeholder("20"),
            file_input: InputField::new("Justificatif").with_placeholder("chemin/vers/image.png"),
            commentary_input: InputField::new("Commentaire").with_placeholder("optionnel"),

            expense_type_list: SelectableList::new(ExpenseType::all()),
            show_type_dropdown: false,
        };
        screen.update_field_focus();
        screen
    }

    pub fn current_field(&self) -> NewBillField {
        FIELDS[self.current_field]
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELDS.len();
        self.update_field_focus();
    }

    pub fn previous_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELDS.len() - 1
        } else {
            self.current_field - 1
        };
        self.update_field_focus();
    }

    pub fn update_field_focus(&mut self) {
        let current = self.current_field();
        self.name_input.set_focus(current == NewBillField::Name);
        self.date_input.set_focus(current == NewBillField::Date);
        self.amount_input.set_focus(current == NewBillField::Amount);
        self.vat_input.set_focus(current == NewBillField::Vat);
        self.pct_input.set_focus(current == NewBillField::Pct);
        self.file_input.set_focus(current == NewBillField::File);
        self.commentary_input
            .set_focus(current == NewBillField::Commentary);
    }

    fn current_input_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field() {
            NewBillField::Name => Some(&mut self.name_input),
            NewBillField::Date => Some(&mut self.date_input),
            NewBillField::Amount => Some(&mut self.amount_input),
            NewBillField::Vat => Some(&mut self.vat_input),
            NewBillField::Pct => Some(&mut self.pct_input),
            NewBillField::File => Some(&mut self.file_input),
            NewBillField::Commentary => Some(&mut self.commentary_input),
            NewBillField::ExpenseType => None,
        }
    }

    pub fn handle_char_input(&mut self, c: char) {
        if let Some(input) = self.current_input_mut() {
            input.insert_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.delete_char();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.delete_char_forward();
        }
    }

    pub fn handle_cursor_left(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_left();
        }
    }

    pub fn handle_cursor_right(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_right();
        }
    }

    pub fn handle_cursor_home(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_to_start();
        }
    }

    pub fn handle_cursor_end(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.move_cursor_to_end();
        }
    }

    /// Parse the form values into the handler's draft. Presence of required
    /// fields is checked at submit time; this only rejects unparseable input.
    pub fn collect_draft(&mut self) -> Result<(), ValidationError> {
        let expense_type = self.expense_type_list.selected().cloned();
        let name = non_empty(&self.name_input);
        let date = match non_empty(&self.date_input) {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };
        let amount = match non_empty(&self.amount_input) {
            Some(raw) => Some(parse_amount(&raw)?),
            None => None,
        };
        let vat = match non_empty(&self.vat_input) {
            Some(raw) => Some(parse_amount(&raw)?),
            None => None,
        };
        let pct = match non_empty(&self.pct_input) {
            Some(raw) => Some(parse_pct(&raw)?),
            None => None,
        };

        let draft = &mut self.handler.draft;
        draft.expense_type = expense_type;
        draft.name = name;
        draft.date = date;
        draft.amount = amount;
        draft.vat = vat;
        draft.pct = pct;
        draft.commentary = non_empty(&self.commentary_input);
        Ok(())
    }

    /// Stage the file named in the `Justificatif` field. Unsupported types
    /// clear the control immediately, same as the web form.
    pub async fn stage_file(&mut self) -> Result<String, NewBillError> {
        let raw = self.file_input.value.clone();
        let result = self
            .handler
            .handle_file_selected(Path::new(&raw))
            .await;
        match result {
            Ok(()) => Ok(self
                .handler
                .draft
                .file_name
                .clone()
                .unwrap_or_default()),
            Err(err) => {
                if err.is_validation() {
                    self.file_input.clear();
                }
                Err(err)
            }
        }
    }

    /// Collect the form and submit. Returns the created bill on success.
    pub async fn submit(&mut self) -> Result<Bill, NewBillError> {
        self.collect_draft()?;
        let created = self.handler.submit().await?;
        self.reset_form();
        Ok(created)
    }

    /// Clear the form for the next session.
    pub fn reset_form(&mut self) {
        self.name_input.clear();
        self.date_input.clear();
        self.amount_input.clear();
        self.vat_input.clear();
        self.pct_input.clear();
        self.file_input.clear();
        self.commentary_input.clear();
        self.expense_type_list.select(None);
        self.current_field = 0;
        self.update_field_focus();
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Form
                Constraint::Length(4), // Instructions
            ])
            .split(area);

        let title = Paragraph::new(format!(
            "Envoyer une note de frais ({})",
            self.handler.identity().email
        ))
        .style(Styles::title())
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        self.draw_form(f, chunks[1]);
        self.draw_instructions(f, chunks[2]);

        if self.show_type_dropdown {
            self.draw_type_dropdown(f, area);
        }
    }

    fn draw_form(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Expense type
                Constraint::Length(3), // Name
                Constraint::Length(3), // Date
                Constraint::Length(3), // Amount
                Constraint::Length(3), // Vat
                Constraint::Length(3), // Pct
                Constraint::Length(3), // File
                Constraint::Length(3), // Commentary
            ])
            .split(area);

        self.draw_expense_type_field(f, chunks[0]);
        self.name_input.render(f, chunks[1]);
        self.date_input.render(f, chunks[2]);
        self.amount_input.render(f, chunks[3]);
        self.vat_input.render(f, chunks[4]);
        self.pct_input.render(f, chunks[5]);
        self.draw_file_field(f, chunks[6]);
        self.commentary_input.render(f, chunks[7]);
    }

    fn draw_expense_type_field(&self, f: &mut Frame, area: Rect) {
        let selected = self
            .expense_type_list
            .selected()
            .map(|t| t.as_str())
            .unwrap_or("(Entrée pour choisir)");

        let style = if self.current_field() == NewBillField::ExpenseType {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let field = Paragraph::new(selected).block(
            Block::default()
                .title("Type de dépense")
                .borders(Borders::ALL)
                .border_style(style),
        );
        f.render_widget(field, area);
    }

    fn draw_file_field(&self, f: &mut Frame, area: Rect) {
        if self.handler.draft.has_attachment() {
            let file_name = self.handler.draft.file_name.as_deref().unwrap_or_default();
            let style = if self.current_field() == NewBillField::File {
                Styles::active_border()
            } else {
                Styles::inactive_border()
            };
            let staged = Paragraph::new(format!("{} (téléversé)", file_name))
                .style(Styles::success())
                .block(
                    Block::default()
                        .title("Justificatif")
                        .borders(Borders::ALL)
                        .border_style(style),
                );
            f.render_widget(staged, area);
        } else {
            self.file_input.render(f, area);
        }
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect) {
        let instructions = vec![
            Line::from("Tab/Shift+Tab: Champ suivant/précédent | Entrée: Envoyer"),
            Line::from("Entrée sur Type: Choisir | Entrée sur Justificatif: Téléverser | Esc: Mes notes de frais"),
        ];

        let widget = Paragraph::new(instructions).style(Styles::info()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(widget, area);
    }

    fn draw_type_dropdown(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 50, area);

        let items: Vec<ListItem> = self
            .expense_type_list
            .items
            .iter()
            .enumerate()
            .map(|(i, expense_type)| {
                let style = if Some(i) == self.expense_type_list.selected_index() {
                    Styles::selected()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(expense_type.as_str(), style)))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Type de dépense")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_widget(Clear, popup_area);
        f.render_stateful_widget(list, popup_area, &mut self.expense_type_list.state);
    }
}

fn non_empty(input: &InputField) -> Option<String> {
    let trimmed = input.value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
