//! TUI module - interactive terminal viewer
//!
//! Terminal lifecycle and event loop; state lives in [`app`], rendering in
//! [`panels`].

mod app;
mod panels;
mod theme;

pub use app::{App, LoadResult, Tab};

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::data::DatasetLayout;

const TICK: Duration = Duration::from_millis(100);

/// Run the viewer until the operator quits.
///
/// Returns an error when the dataset cannot be loaded, after the terminal
/// has been restored; the binary maps that onto a non-zero exit.
pub fn run(layout: DatasetLayout) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, App::new(layout));
    restore_terminal(&mut terminal)?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    loop {
        app.check_load_results();
        terminal.draw(|frame| panels::draw(frame, &mut app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return match app.fatal.take() {
                Some(err) => Err(err.into()),
                None => Ok(()),
            };
        }
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Restore the terminal even when rendering panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
