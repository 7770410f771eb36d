//! Terminal user interface for billed
//!
//! Screens: the bill list (with its loading/error states), the new-bill
//! form, and a help page. Navigation between them plays the role the
//! web client's router had.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

pub mod app;
pub mod screens;
pub mod ui;

pub use app::{App, Screen};

use crate::config::Config;
use crate::models::SessionIdentity;
use crate::store::BillStore;

/// Run the TUI until the user quits.
pub async fn run_tui(
    config: Config,
    store: Arc<dyn BillStore>,
    identity: SessionIdentity,
) -> Result<()> {
    info!("Starting TUI for {}", identity.email);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store, identity);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
