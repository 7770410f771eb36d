//! Help screen with key bindings

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::ui::Styles;

pub struct HelpScreen;

impl HelpScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from("Global"),
            Line::from("  Esc        Retour"),
            Line::from("  F1 / ?     Aide"),
            Line::from(""),
            Line::from("Mes notes de frais"),
            Line::from("  ↑/↓        Naviguer"),
            Line::from("  n          Nouvelle note de frais"),
            Line::from("  r          Recharger"),
            Line::from("  q          Quitter"),
            Line::from(""),
            Line::from("Nouvelle note de frais"),
            Line::from("  Tab        Champ suivant"),
            Line::from("  Entrée     Envoyer (ou choisir le type / téléverser le justificatif)"),
            Line::from("  Esc        Annuler et revenir à la liste"),
        ];

        let help = Paragraph::new(lines).style(Styles::default()).block(
            Block::default()
                .title("Aide")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(help, area);
    }
}
