//! Main TUI application state and navigation

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::config::Config;
use crate::models::SessionIdentity;
use crate::store::BillStore;
use crate::tui::screens::{BillsScreen, HelpScreen, NewBillScreen};
use crate::tui::ui::Styles;

/// Application screens. Navigating re-renders the body with the target view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Bills,
    NewBill,
    Help,
}

/// Main TUI application state
pub struct App {
    pub current_screen: Screen,
    pub previous_screen: Option<Screen>,
    pub config: Config,

    pub bills: BillsScreen,
    pub new_bill: NewBillScreen,
    pub help: HelpScreen,

    pub should_quit: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn BillStore>, identity: SessionIdentity) -> Self {
        Self {
            current_screen: Screen::Bills,
            previous_screen: None,
            config,

            bills: BillsScreen::new(store.clone()),
            new_bill: NewBillScreen::new(store, identity),
            help: HelpScreen::new(),

            should_quit: false,
            status_message: None,
            error_message: None,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        // The session opens on the bill list, the landing page after login.
        self.bills.refresh().await;

        loop {
            terminal.draw(|f| self.draw(f))?;

            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key).await?;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Global shortcuts. F1/? open help except while typing in the form.
        if matches!(key.code, KeyCode::F(1)) && self.current_screen != Screen::Help {
            self.navigate_to_screen(Screen::Help);
            return Ok(());
        }

        match self.current_screen {
            Screen::Bills => self.handle_bills_event(key).await?,
            Screen::NewBill => self.handle_new_bill_event(key).await?,
            Screen::Help => self.handle_help_event(key),
        }

        Ok(())
    }

    /// Navigate to a screen, clearing transient messages.
    pub fn navigate_to_screen(&mut self, screen: Screen) {
        self.previous_screen = Some(self.current_screen);
        self.current_screen = screen;
        self.clear_messages();
    }

    /// Navigate to the bill list and fetch the collection.
    pub async fn open_bills(&mut self) {
        self.navigate_to_screen(Screen::Bills);
        self.bills.refresh().await;
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }

    async fn handle_bills_event(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Up => self.bills.navigate_up(),
            KeyCode::Down => self.bills.navigate_down(),
            KeyCode::Char('n') => self.navigate_to_screen(Screen::NewBill),
            KeyCode::Char('r') => {
                self.clear_messages();
                self.bills.refresh().await;
            }
            KeyCode::Char('?') => self.navigate_to_screen(Screen::Help),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    async fn handle_new_bill_event(&mut self, key: KeyEvent) -> Result<()> {
        use crate::tui::screens::new_bill::NewBillField;

        if self.new_bill.show_type_dropdown {
            match key.code {
                KeyCode::Up => self.new_bill.expense_type_list.previous(),
                KeyCode::Down => self.new_bill.expense_type_list.next(),
                KeyCode::Enter | KeyCode::Esc => self.new_bill.show_type_dropdown = false,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => self.new_bill.next_field(),
            KeyCode::BackTab => self.new_bill.previous_field(),
            KeyCode::Enter => match self.new_bill.current_field() {
                NewBillField::ExpenseType => self.new_bill.show_type_dropdown = true,
                NewBillField::File => self.stage_attachment().await,
                _ => self.submit_form().await,
            },
            KeyCode::Char(c) => self.new_bill.handle_char_input(c),
            KeyCode::Backspace => self.new_bill.handle_backspace(),
            KeyCode::Delete => self.new_bill.handle_delete(),
            KeyCode::Left => self.new_bill.handle_cursor_left(),
            KeyCode::Right => self.new_bill.handle_cursor_right(),
            KeyCode::Home => self.new_bill.handle_cursor_home(),
            KeyCode::End => self.new_bill.handle_cursor_end(),
            KeyCode::Esc => self.open_bills().await,
            _ => {}
        }
        Ok(())
    }

    fn handle_help_event(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            self.current_screen = self.previous_screen.unwrap_or(Screen::Bills);
            self.previous_screen = None;
        }
    }

    async fn stage_attachment(&mut self) {
        if self.new_bill.file_input.is_empty() {
            self.set_error("Choisissez d'abord un fichier".to_string());
            return;
        }
        match self.new_bill.stage_file().await {
            Ok(file_name) => self.set_status(format!("Justificatif {} accepté", file_name)),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    async fn submit_form(&mut self) {
        match self.new_bill.submit().await {
            Ok(bill) => {
                self.open_bills().await;
                self.set_status(format!("Note de frais {} envoyée", bill.id));
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match self.current_screen {
            Screen::Bills => self.bills.draw(f, chunks[0]),
            Screen::NewBill => self.new_bill.draw(f, chunks[0]),
            Screen::Help => self.help.draw(f, chunks[0]),
        }

        self.draw_status_bar(f, chunks[1]);
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref err) = self.error_message {
            err.clone()
        } else if let Some(ref msg) = self.status_message {
            msg.clone()
        } else {
            match self.current_screen {
                Screen::Bills => "Mes notes de frais | n: Nouvelle | r: Recharger | q: Quitter",
                Screen::NewBill => "Nouvelle note de frais | Entrée: Envoyer | Esc: Retour",
                Screen::Help => "Aide | Esc: Retour",
            }
            .to_string()
        };

        let style = if self.error_message.is_some() {
            Styles::error()
        } else if self.status_message.is_some() {
            Styles::success()
        } else {
            Styles::inactive()
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;
    use crate::store::MemoryStore;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn app_with_store(store: Arc<MemoryStore>) -> App {
        let config = Config {
            api_url: "http://localhost:5678".to_string(),
            session_path: "./billed-session.json".into(),
            http: crate::config::HttpConfig::default(),
        };
        let identity = SessionIdentity {
            user_type: UserType::Employee,
            email: "jane@doe".to_string(),
        };
        App::new(config, store, identity)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn list_failure_surfaces_in_the_bills_body() {
        let store = Arc::new(MemoryStore::new());
        store.fail_lists_with(500);
        let mut app = app_with_store(store);

        app.open_bills().await;

        assert!(app
            .bills
            .body_lines()
            .iter()
            .any(|l| l.contains("Erreur 500")));
    }

    #[tokio::test]
    async fn submitting_an_empty_form_stays_on_the_form_with_an_error() {
        let store = Arc::new(MemoryStore::new());
        let mut app = app_with_store(store.clone());
        app.navigate_to_screen(Screen::NewBill);

        // Tab off the type field first; Enter there opens the dropdown.
        app.handle_key_event(press(KeyCode::Tab)).await.unwrap();
        app.handle_key_event(press(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.current_screen, Screen::NewBill);
        assert!(app.error_message.is_some());
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn enter_on_the_type_field_opens_the_dropdown_without_submitting() {
        let store = Arc::new(MemoryStore::new());
        let mut app = app_with_store(store.clone());
        app.navigate_to_screen(Screen::NewBill);

        app.handle_key_event(press(KeyCode::Enter)).await.unwrap();

        assert!(app.new_bill.show_type_dropdown);
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn successful_submission_navigates_to_the_bill_list() {
        let store = Arc::new(MemoryStore::new());
        let mut app = app_with_store(store.clone());
        app.navigate_to_screen(Screen::NewBill);

        app.new_bill.expense_type_list.select(Some(0));
        for (input, text) in [
            ("name", "Vol Marseille"),
            ("date", "03/01/2022"),
            ("amount", "300"),
            ("vat", "70"),
            ("pct", "20"),
        ] {
            let field = match input {
                "name" => &mut app.new_bill.name_input,
                "date" => &mut app.new_bill.date_input,
                "amount" => &mut app.new_bill.amount_input,
                "vat" => &mut app.new_bill.vat_input,
                _ => &mut app.new_bill.pct_input,
            };
            for c in text.chars() {
                field.insert_char(c);
            }
        }

        app.submit_form().await;

        assert_eq!(app.current_screen, Screen::Bills);
        assert_eq!(store.create_calls(), 1);
        assert!(app
            .status_message
            .as_deref()
            .unwrap_or_default()
            .contains("envoyée"));
        // The submitted bill shows up in the refreshed list.
        assert!(app
            .bills
            .body_lines()
            .iter()
            .any(|l| l.contains("Vol Marseille")));
    }

    #[tokio::test]
    async fn escape_from_the_form_returns_to_the_list() {
        let store = Arc::new(MemoryStore::new());
        let mut app = app_with_store(store);
        app.navigate_to_screen(Screen::NewBill);

        app.handle_key_event(press(KeyCode::Esc)).await.unwrap();

        assert_eq!(app.current_screen, Screen::Bills);
    }
}
