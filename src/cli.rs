use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::ExpenseType;

#[derive(Parser)]
#[command(name = "billed")]
#[command(about = "Terminal client for the Billed employee expense-reporting service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record the logged-in identity in the session store
    Login {
        /// Account email
        email: String,

        /// Log in as an administrator
        #[arg(long)]
        admin: bool,

        /// API token attached to subsequent requests
        #[arg(long)]
        jwt: Option<String>,
    },

    /// Submit a new expense bill
    Submit {
        /// Expense category (e.g. "Transports")
        #[arg(short = 't', long = "type")]
        expense_type: String,

        /// Expense name
        #[arg(short, long)]
        name: String,

        /// Date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(short, long)]
        date: String,

        /// Amount including tax
        #[arg(short, long)]
        amount: String,

        /// VAT amount
        #[arg(long)]
        vat: Option<String>,

        /// Percentage applied for downstream calculations
        #[arg(short, long)]
        pct: String,

        /// Optional free-text commentary
        #[arg(long)]
        commentary: Option<String>,

        /// Receipt image to attach (png, jpg, jpeg)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Clear the recorded identity and API token
    Logout,

    /// List the bill collection
    Bills,

    /// Launch the terminal UI
    Tui,
}

impl Commands {
    pub fn parse_expense_type(raw: &str) -> ExpenseType {
        ExpenseType::from(raw.to_string())
    }
}
