//! Interactive terminal search widget

pub mod app;
pub mod colors;
pub mod search;
pub mod ui;
pub mod virtual_list;

use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::fetcher::Fetcher;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use std::io::{self, Stdout};
use tracing::{error, info};

pub use app::App;

/// Take over the terminal and run the search widget until the user quits
pub fn run(config: &AppConfig) -> crate::Result<()> {
    let client = CatalogClient::new(&config.catalog)?;
    let fetcher = Fetcher::new(client)?;
    let mut app = App::new(config, fetcher);

    let mut terminal = setup_terminal(config.ui.mouse)?;
    info!("Terminal UI started");

    let result = app.run(&mut terminal);

    if let Err(e) = restore_terminal(&mut terminal, config.ui.mouse) {
        error!("Failed to restore terminal: {}", e);
    }
    info!("Terminal UI stopped");
    result
}

fn setup_terminal(mouse: bool) -> crate::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mouse: bool,
) -> crate::Result<()> {
    disable_raw_mode()?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
