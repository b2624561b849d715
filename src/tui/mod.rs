mod app;
mod input;
mod message;
pub mod search;
mod ui;

use crate::config::Config;
use crate::integrations::BdClient;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

pub use app::{ActionResult, App, ModalState, PrefetchProgress, RefreshResult};
pub use input::InputMode;
pub use message::Message;

pub async fn run(config: Config, client: BdClient) -> Result<()> {
    if !std::io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("beadscope requires an interactive terminal (use --dump for plain output)");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, client);

    // UI shows immediately; the tree arrives through poll_refresh
    app.start_background_refresh();

    let result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = std::time::Instant::now();
    let mut input_state = input::InputState::new();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Short poll so background results show up promptly
        let timeout = tick_rate
            .saturating_sub(last_tick.elapsed())
            .min(Duration::from_millis(50));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let msg = input::dispatch(app, &mut input_state, key);
                if app.update(msg).await? {
                    return Ok(());
                }
            }
        }

        if input_state.has_timed_out() {
            input_state.clear();
        }

        app.poll_refresh();
        app.poll_comments();
        app.poll_actions();

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = std::time::Instant::now();
        }
    }
}
