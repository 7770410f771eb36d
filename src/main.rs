use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

mod attachment;
mod cli;
mod config;
mod errors;
mod models;
mod newbill;
mod session;
mod store;
mod tui;

use cli::{Cli, Commands};
use config::Config;
use errors::StoreError;
use models::{SessionIdentity, UserType};
use newbill::NewBillHandler;
use session::SessionStore;
use store::{BillStore, HttpStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "billed=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "billed.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;
    debug!("Session store: {}", config.session_path_str());
    let session = SessionStore::new(&config.session_path);

    match &cli.command {
        Commands::Login { email, admin, jwt } => {
            let identity = SessionIdentity {
                user_type: if *admin { UserType::Admin } else { UserType::Employee },
                email: email.clone(),
            };
            session.set_identity(&identity)?;
            if let Some(jwt) = jwt {
                session.set_jwt(jwt)?;
            }
            info!("Logged in as {} ({:?})", email, identity.user_type);
        }

        Commands::Logout => {
            session.remove_item("user")?;
            session.remove_item("jwt")?;
            info!("Logged out");
        }

        Commands::Submit {
            expense_type,
            name,
            date,
            amount,
            vat,
            pct,
            commentary,
            file,
        } => {
            let identity = require_identity(&session)?;
            let store = connect_store(&config, &session)?;
            let mut handler = NewBillHandler::new(store, identity);

            handler.draft.expense_type = Some(Commands::parse_expense_type(expense_type));
            handler.draft.name = Some(name.clone());
            handler.draft.date = Some(models::parse_date(date)?);
            handler.draft.amount = Some(models::parse_amount(amount)?);
            handler.draft.vat = vat.as_deref().map(models::parse_amount).transpose()?;
            handler.draft.pct = Some(models::parse_pct(pct)?);
            handler.draft.commentary = commentary.clone();

            handler.handle_file_selected(file).await?;

            match handler.submit().await {
                Ok(bill) => info!("Submitted bill {} for {}", bill.id, bill.email),
                Err(e) => error!("Submission failed: {}", e),
            }
        }

        Commands::Bills => {
            require_identity(&session)?;
            let store = connect_store(&config, &session)?;

            match store.list_bills().await {
                Ok(bills) => {
                    println!("Found {} bills:", bills.len());
                    for bill in bills {
                        println!(
                            "{} - {} ({}) - {:.2} € - {}",
                            bill.date,
                            bill.name,
                            bill.expense_type.as_str(),
                            bill.amount,
                            bill.status.as_str()
                        );
                    }
                }
                Err(e) => error!("Failed to fetch bills: {}", e),
            }
        }

        Commands::Tui => {
            let identity = require_identity(&session)?;
            let store = connect_store(&config, &session)?;

            match tui::run_tui(config.clone(), store, identity).await {
                Ok(_) => info!("TUI exited successfully"),
                Err(e) => error!("TUI failed: {}", e),
            }
        }
    }

    Ok(())
}

fn require_identity(session: &SessionStore) -> Result<SessionIdentity> {
    session
        .current_identity()?
        .ok_or_else(|| StoreError::MissingSession.into())
}

fn connect_store(config: &Config, session: &SessionStore) -> Result<Arc<dyn BillStore>> {
    let store = HttpStore::new(config, session.jwt()?)?;
    Ok(Arc::new(store))
}
