pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::error;
use app::{App, InputField, InputMode};
use ui::ui;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;

/// Runs the interactive UI until the user quits. Takes ownership of the store.
pub fn run_tui<S: KeyValueStore>(store: TaskStore<S>) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "TUI loop failed");
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend, S: KeyValueStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') => app.toggle_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Char('a') => app.start_add(),
                KeyCode::Char('e') => app.start_edit(InputField::Text),
                KeyCode::Char('n') => app.start_edit(InputField::Notes),
                KeyCode::Char('t') => app.start_edit(InputField::Deadline),
                KeyCode::Char('p') => app.cycle_priority(),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('/') => app.start_search(),
                KeyCode::Char('x') => app.clear_completed(),
                KeyCode::Char('J') => app.move_selected(true),
                KeyCode::Char('K') => app.move_selected(false),
                KeyCode::Char('T') => app.toggle_theme(),
                _ => {}
            },
            InputMode::Editing | InputMode::Adding => match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => app.push_char(c),
                KeyCode::Backspace => app.pop_char(),
                _ => {}
            },
        }
    }
}
