// ============================================================================
// QuoteWatch - Watchlist de cotations en terminal
// ============================================================================
// Programme TUI : watchlist + vue détaillée avec auto-update
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui draine les résultats, dessine, lit le clavier
// 3. Async dans sync : runtime tokio multi-thread pour le réseau,
//    l'UI reste sur le thread principal
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use quotewatch::api::{CsvQuoteSource, QuoteSource, RandomQuoteSource};
use quotewatch::app::App;
use quotewatch::config::Config;
use quotewatch::registry::TickerRegistry;
use quotewatch::ui::{events::EventHandler, render, Event};
use quotewatch::worker::{Dispatcher, FetchOutcome};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier, avec rotation quotidienne.
//
//   Linux : ~/.local/share/quotewatch/logs/quotewatch.log.YYYY-MM-DD
//   RUST_LOG=quotewatch=trace cargo run
// ============================================================================

/// Répertoire des logs, ./logs si le data dir n'existe pas sur la plateforme
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("quotewatch").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "quotewatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotewatch=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

/// Choisit la source de cotations selon la configuration
fn build_source(config: &Config) -> Result<Arc<dyn QuoteSource>> {
    if config.offline {
        info!("Offline mode, quotes are randomly generated");
        return Ok(Arc::new(RandomQuoteSource::default()));
    }

    let source = CsvQuoteSource::new(config.base_url.clone(), config.http_timeout)?;
    info!(base_url = %config.base_url, "Using CSV quote endpoint");
    Ok(Arc::new(source))
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("QuoteWatch starting up");

    let config = Config::from_env();
    debug!(?config, "Configuration loaded");

    // CONCEPT : Runtime tokio possédé par main
    // - les fetchs tournent sur ses threads
    // - l'UI ne fait jamais d'I/O réseau
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("quotewatch-worker")
        .build()
        .context("Échec de la création du runtime tokio")?;

    let source = build_source(&config)?;
    info!(source = source.name(), "Quote source ready");
    let (dispatcher, results) = Dispatcher::new(source, runtime.handle().clone());

    let mut app = App::new(TickerRegistry::with_symbols(config.tickers.iter()), config.poll_interval);

    // Remplit la watchlist dès le démarrage
    app.refresh_list(&dispatcher);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &dispatcher, &results);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Le timer d'auto-update meurt avec la vue détail, avant le runtime
    drop(app);
    runtime.shutdown_background();

    result
}

// ============================================================================
// Event loop
// ============================================================================
// 1. RÉSULTATS : draine le channel, applique chaque résultat (seul endroit
//    où l'état change suite à un fetch)
// 2. RENDER : dessine
// 3. INPUT : lit une touche (ou Tick après le timeout)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    dispatcher: &Dispatcher,
    results: &mpsc::Receiver<FetchOutcome>,
) -> Result<()> {
    while app.is_running() {
        drain_results(app, results);

        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        handle_event(app, event, dispatcher);
    }

    Ok(())
}

/// Applique tous les résultats disponibles sans bloquer
fn drain_results(app: &mut App, results: &mpsc::Receiver<FetchOutcome>) {
    loop {
        match results.try_recv() {
            Ok(outcome) => app.apply_outcome(outcome),
            Err(mpsc::TryRecvError::Empty) => break,
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Result channel disconnected");
                break;
            }
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT RUST : Pattern matching avec guards
// - l'ordre des bras compte : le mode input capture toutes les lettres
// ============================================================================

fn handle_event(app: &mut App, event: Event, dispatcher: &Dispatcher) {
    use quotewatch::ui::events::{
        get_char_from_event, is_add_event, is_auto_update_event, is_backspace_event, is_delete_event,
        is_down_event, is_enter_event, is_escape_event, is_move_down_event, is_move_up_event,
        is_pause_event, is_quit_event, is_refresh_event, is_ticker_char_event, is_up_event,
        is_update_event,
    };

    if let Event::Tick = event {
        return;
    }

    // ========================================
    // Input Mode : saisie du ticker
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            app.submit_add(dispatcher);
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_ticker_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c.to_ascii_uppercase());
            }
        }
        return;
    }

    // Two-step quit, sur tous les autres écrans
    if is_quit_event(&event) {
        app.cancel_delete();
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la demande de quit
    app.cancel_quit();

    // 'd' : two-step delete
    if app.is_on_list() && is_delete_event(&event) {
        if app.is_awaiting_delete_confirmation() {
            app.delete_selected();
        } else if !app.registry.is_empty() {
            info!("User requested delete (awaiting confirmation)");
            app.request_delete();
        }
        return;
    }

    app.cancel_delete();

    if app.is_on_list() {
        if is_move_up_event(&event) {
            app.move_selected_up();
        } else if is_move_down_event(&event) {
            app.move_selected_down();
        } else if is_up_event(&event) {
            app.navigate_up();
        } else if is_down_event(&event) {
            app.navigate_down();
        } else if is_enter_event(&event) {
            app.open_detail(dispatcher);
        } else if is_refresh_event(&event) {
            info!("User requested list refresh");
            app.refresh_list(dispatcher);
        } else if is_add_event(&event) {
            info!("User requested add ticker");
            app.start_input("Add ticker: ".to_string());
        }
    } else if app.is_on_detail() {
        if is_escape_event(&event) {
            app.close_detail();
        } else if is_update_event(&event) {
            app.manual_update();
        } else if is_auto_update_event(&event) {
            app.start_auto_update();
        } else if is_pause_event(&event) {
            app.pause_auto_update();
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
