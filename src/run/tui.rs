use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::db::Database;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::screens::transactions::table_rows;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_up};

pub(crate) fn as_tui(db: &mut Database, config: &Config) -> Result<()> {
    let mut app = App::new(config.recent_limit, config.labels.clone());
    app.refresh_all(db)?;
    tracing::info!(period = %app.period, "starting dashboard");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "dashboard exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3);
            app.visible_rows = table_rows(content_height).max(1);
            crate::ui::render::render(f, app);
        })?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.show_help {
            app.show_help = false;
            continue;
        }

        let handled = match app.input_mode {
            InputMode::Normal => handle_normal_input(key, app, db),
            InputMode::Command => handle_command_input(key, app, db),
            InputMode::Search => handle_search_input(key, app, db),
            InputMode::Confirm => handle_confirm_input(key, app, db),
        };
        // A failed action is reported in the command bar; the session keeps going.
        if let Err(e) = handled {
            tracing::warn!(error = %format!("{e:#}"), "action failed");
            app.input_mode = InputMode::Normal;
            app.set_status(format!("Error: {e:#}"));
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => app.running = false,
        KeyCode::Char('d') if ctrl => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if ctrl => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => {
            app.transaction_index = 0;
            app.transaction_scroll = 0;
        }
        KeyCode::Char('G') => {
            let page = app.visible_rows;
            scroll_to_bottom(
                &mut app.transaction_index,
                &mut app.transaction_scroll,
                app.transactions.len(),
                page,
            );
        }
        KeyCode::Char('1') => switch_screen(app, db, Screen::Dashboard)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Transactions)?,
        KeyCode::Tab | KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let step = if key.code == KeyCode::Tab { 1 } else { screens.len() - 1 };
            switch_screen(app, db, screens[(idx + step) % screens.len()])?;
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app, db)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, db)?,
        KeyCode::Char('c') if app.screen == Screen::Transactions => {
            commands::handle_command("clear", app, db)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Transactions => {
            commands::handle_command("delete-txn", app, db)?;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            if app.command_input.pop().is_none() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let keep = app
                .command_input
                .trim_end()
                .rfind(' ')
                .map_or(0, |pos| pos + 1);
            app.command_input.truncate(keep);
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

/// Search is live: every keystroke re-queries and jumps to the transactions screen.
fn handle_search_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            return Ok(());
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => app.search_input.push(c),
        _ => return Ok(()),
    }
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.transaction_scroll = 0;
    app.refresh_transactions(db)
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();
    let action = app.pending_action.take();

    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        app.set_status("Cancelled");
        return Ok(());
    }

    if let Some(PendingAction::DeleteTransaction { id, description }) = action {
        db.delete_transaction(id)?;
        tracing::info!(id, "transaction deleted");
        app.refresh_transactions(db)?;
        app.refresh_dashboard(db)?;
        app.set_status(format!("Deleted: {description}"));
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Dashboard => app.refresh_dashboard(db)?,
        Screen::Transactions => app.refresh_transactions(db)?,
    }
    app.set_status(screen.to_string());
    Ok(())
}

fn handle_move_down(app: &mut App) {
    if app.screen == Screen::Transactions {
        let page = app.visible_rows;
        scroll_down(
            &mut app.transaction_index,
            &mut app.transaction_scroll,
            app.transactions.len(),
            page,
        );
    }
}

fn handle_move_up(app: &mut App) {
    if app.screen == Screen::Transactions {
        scroll_up(&mut app.transaction_index, &mut app.transaction_scroll);
    }
}
