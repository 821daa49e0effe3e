use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{env, io, time::Duration};

use nexus::{app::App, ui};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger with debug fallback for development
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("nexus", LevelFilter::Debug);
    }
    logger.init();

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let gist_id = parse_gist_arg(env::args().skip(1).collect());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = match App::new().await {
        Ok(app) => {
            log::info!("Application initialized successfully");
            app
        }
        Err(e) => {
            restore_terminal()?;
            eprintln!("Failed to initialize application: {}", e);
            return Err(e);
        }
    };

    app.initialize(gist_id.as_deref()).await;

    let res = run_app(&mut terminal, app).await;

    restore_terminal()?;

    if let Err(err) = res {
        eprintln!("Application error: {}", err);
        log::error!("Application error: {}", err);
    }

    Ok(())
}

fn parse_gist_arg(args: Vec<String>) -> Option<String> {
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--gist" || arg == "-g" {
            return iter.next();
        }
    }
    None
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
            // Continue running despite draw errors
        }

        app.tick().await;

        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = app.handle_key_event(key).await {
                        log::error!("Key event handling error: {}", e);
                        app.ui_state.set_error(format!("Input error: {}", e));
                    }
                }
                Event::Resize(_, _) => {
                    // Handled implicitly by the next draw
                }
                _ => {}
            }
        }
    }

    log::info!("Application loop ended successfully");
    Ok(())
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
