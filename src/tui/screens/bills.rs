//! Bills list screen
//!
//! Fetches the bill collection on entry and renders it, or renders the
//! store failure's message text verbatim in the page body. The state
//! machine is Loading → Loaded | Errored; Errored is terminal until the
//! screen is entered again.

use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tracing::warn;

use crate::models::Bill;
use crate::store::BillStore;
use crate::tui::ui::Styles;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(Vec<Bill>),
    Errored(String),
}

pub struct BillsScreen {
    store: Arc<dyn BillStore>,
    pub state: LoadState,
    pub list_state: ListState,
}

impl BillsScreen {
    pub fn new(store: Arc<dyn BillStore>) -> Self {
        Self {
            store,
            state: LoadState::Loading,
            list_state: ListState::default(),
        }
    }

    /// Entering the view requests the collection. A previous error does not
    /// stick: every entry re-starts from Loading.
    pub async fn refresh(&mut self) {
        self.state = LoadState::Loading;
        match self.store.list_bills().await {
            Ok(bills) => {
                self.list_state
                    .select(if bills.is_empty() { None } else { Some(0) });
                self.state = LoadState::Loaded(bills);
            }
            Err(err) => {
                warn!("Failed to fetch bills: {}", err);
                self.state = LoadState::Errored(err.to_string());
            }
        }
    }

    pub fn navigate_up(&mut self) {
        if let LoadState::Loaded(bills) = &self.state {
            if bills.is_empty() {
                return;
            }
            let i = match self.list_state.selected() {
                Some(0) | None => bills.len() - 1,
                Some(i) => i - 1,
            };
            self.list_state.select(Some(i));
        }
    }

    pub fn navigate_down(&mut self) {
        if let LoadState::Loaded(bills) = &self.state {
            if bills.is_empty() {
                return;
            }
            let i = match self.list_state.selected() {
                Some(i) => (i + 1) % bills.len(),
                None => 0,
            };
            self.list_state.select(Some(i));
        }
    }

    /// The text content of the page body. Error messages appear verbatim so
    /// they stay discoverable by substring.
    pub fn body_lines(&self) -> Vec<String> {
        match &self.state {
            LoadState::Loading => vec!["Chargement...".to_string()],
            LoadState::Errored(message) => vec![message.clone()],
            LoadState::Loaded(bills) if bills.is_empty() => {
                vec!["Aucune note de frais".to_string()]
            }
            LoadState::Loaded(bills) => bills.iter().map(bill_row).collect(),
        }
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let title = Paragraph::new("Mes notes de frais")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        match &self.state {
            LoadState::Loading => {
                let loading = Paragraph::new("Chargement...")
                    .style(Styles::info())
                    .block(Block::default().borders(Borders::ALL));
                f.render_widget(loading, chunks[1]);
            }
            LoadState::Errored(message) => {
                let error = Paragraph::new(message.as_str())
                    .style(Styles::error())
                    .block(
                        Block::default()
                            .title("Erreur")
                            .borders(Borders::ALL)
                            .border_style(Styles::error()),
                    );
                f.render_widget(error, chunks[1]);
            }
            LoadState::Loaded(bills) => {
                let header = Line::from(vec![
                    Span::styled("Date       ", Styles::title()),
                    Span::styled("| Type                  ", Styles::title()),
                    Span::styled("| Nom                  ", Styles::title()),
                    Span::styled("| Montant  ", Styles::title()),
                    Span::styled("| Statut", Styles::title()),
                ]);

                let mut items = vec![ListItem::new(header)];
                items.extend(bills.iter().map(|bill| ListItem::new(bill_row(bill))));

                let list = List::new(items)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Styles::inactive_border()),
                    )
                    .highlight_style(Styles::selected());

                f.render_stateful_widget(list, chunks[1], &mut self.list_state);
            }
        }
    }
}

fn bill_row(bill: &Bill) -> String {
    format!(
        "{} | {:<21} | {:<20} | {:>7.2} € | {}",
        bill.date,
        bill.expense_type.as_str(),
        bill.name,
        bill.amount,
        bill.status.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_date, BillDraft, ExpenseType};
    use crate::store::MemoryStore;

    fn sample_bill() -> Bill {
        BillDraft {
            expense_type: Some(ExpenseType::Transports),
            name: Some("Vol Marseille".to_string()),
            date: parse_date("2022-01-03").ok(),
            amount: Some(300.0),
            pct: Some(20),
            ..Default::default()
        }
        .into_bill("jane@doe")
        .unwrap()
    }

    #[tokio::test]
    async fn refresh_loads_the_collection() {
        let store = Arc::new(MemoryStore::with_bills(vec![sample_bill()]));
        let mut screen = BillsScreen::new(store);
        screen.refresh().await;

        match &screen.state {
            LoadState::Loaded(bills) => assert_eq!(bills.len(), 1),
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert!(screen.body_lines()[0].contains("Vol Marseille"));
    }

    #[tokio::test]
    async fn list_404_renders_the_message_verbatim() {
        let store = Arc::new(MemoryStore::new());
        store.fail_lists_with(404);
        let mut screen = BillsScreen::new(store);
        screen.refresh().await;

        assert_eq!(screen.state, LoadState::Errored("Erreur 404".to_string()));
        assert!(screen.body_lines().iter().any(|l| l.contains("Erreur 404")));
    }

    #[tokio::test]
    async fn list_500_renders_the_message_verbatim() {
        let store = Arc::new(MemoryStore::new());
        store.fail_lists_with(500);
        let mut screen = BillsScreen::new(store);
        screen.refresh().await;

        assert!(screen.body_lines().iter().any(|l| l.contains("Erreur 500")));
    }

    #[tokio::test]
    async fn error_state_clears_on_the_next_navigation() {
        let store = Arc::new(MemoryStore::with_bills(vec![sample_bill()]));
        store.fail_lists_with(500);
        let mut screen = BillsScreen::new(store.clone());
        screen.refresh().await;
        assert!(matches!(screen.state, LoadState::Errored(_)));

        // The failure was transient; re-entering the view retries the fetch.
        store.restore_lists();
        screen.refresh().await;
        assert!(matches!(screen.state, LoadState::Loaded(_)));
        assert_eq!(store.list_calls(), 2);
    }
}
