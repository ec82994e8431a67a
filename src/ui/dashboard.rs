// ============================================================================
// Dashboard - Rendu de la watchlist
// ============================================================================
// Dessine l'écran principal et route vers la vue détail
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. List + ListState : liste scrollable avec sélection
// 4. Color::Rgb : couleurs exactes (vert / rouge des variations)
// ============================================================================

use std::rc::Rc;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::format::{self, ChangeDirection};
use crate::models::TrackedTicker;
use crate::ui::detail;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur force à gérer tous les écrans
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::List => render_list_screen(frame, app),
        Screen::Detail => detail::render_detail(frame, app),
        Screen::InputMode => render_input_mode(frame, app),
    }
}

/// Couleur ratatui d'une variation
pub fn direction_color(direction: ChangeDirection) -> Color {
    let (r, g, b) = direction.rgb();
    Color::Rgb(r, g, b)
}

/// Layout principal : header, contenu, footer
pub fn create_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(4), // Footer
        ])
        .split(area)
}

fn render_list_screen(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_watchlist(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" QuoteWatch ")
        .title_alignment(Alignment::Center);

    let status = if app.list_interaction_enabled {
        Span::styled(
            format!("{} tickers", app.registry.len()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "Refreshing quotes...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    };

    let paragraph = Paragraph::new(Line::from(status))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Lignes de la watchlist
// ============================================================================
// Chaque ticker prend deux lignes :
//   AAPL  Apple Inc.            114.75    -0.29
//         Ask: 114.77 x 300  Bid: 114.75 x 200   -0.25%
// ============================================================================

/// Construit les deux lignes d'un ticker
fn ticker_row(ticker: &TrackedTicker) -> Text<'static> {
    let Some(record) = ticker.record.as_ref() else {
        return Text::from(vec![
            Line::from(format!(" {:<8} {:<24} {:>10}", ticker.symbol, "", "Loading...")),
            Line::from(""),
        ]);
    };

    let badge_style = ticker
        .direction()
        .map(|d| Style::default().fg(direction_color(d)).add_modifier(Modifier::BOLD))
        .unwrap_or_default();

    let (points, percent) = match format::format_change_badge(&record.points_change, &record.percent_change) {
        Some(badge) => match badge.split_once('\n') {
            Some((p, pc)) => (p.to_string(), pc.to_string()),
            None => (badge, String::new()),
        },
        None => (String::new(), String::new()),
    };

    let mut quotes = Vec::new();
    if format::parse_number(&record.ask_price).is_some() {
        quotes.push(format::format_quoted_field("Ask", &record.ask_price, &record.ask_size));
    }
    if format::parse_number(&record.bid_price).is_some() {
        quotes.push(format::format_quoted_field("Bid", &record.bid_price, &record.bid_size));
    }

    Text::from(vec![
        Line::from(vec![
            Span::styled(format!(" {:<8} ", ticker.symbol), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{:<24} ", record.company_name)),
            Span::raw(format!("{:>10}  ", format::format_price(&record.last_traded_price))),
            Span::styled(format!("{:>8}", points), badge_style),
        ]),
        Line::from(vec![
            Span::styled(format!(" {:<8} {:<35}", "", quotes.join("  ")), Style::default().fg(Color::Gray)),
            Span::styled(format!("{:>8}", percent), badge_style),
        ]),
    ])
}

fn render_watchlist(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Watchlist ");

    if app.registry.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Watchlist vide, [a] pour ajouter", Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app.registry.all().iter().map(|t| ListItem::new(ticker_row(t))).collect();

    let highlight = if app.list_interaction_enabled {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let list = List::new(items).block(block).highlight_style(highlight);

    // CONCEPT RATATUI : StatefulWidget
    // - ListState garde la sélection et gère le scroll
    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut state);
}

// ============================================================================
// Footer : raccourcis, confirmations, messages
// ============================================================================

fn key_span(key: &str, color: Color) -> Span<'_> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Ligne de confirmation "appuyez à nouveau sur [x]"
pub fn confirmation_line(key: &'static str, action: String) -> Line<'static> {
    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("⚠  Appuyez sur ", warning),
        Span::styled(
            key,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(format!(" à nouveau pour {}, autre touche pour annuler ⚠", action), warning),
    ])
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let first = if app.is_awaiting_delete_confirmation() {
        let symbol = app.selected_ticker().map(|t| t.symbol.clone()).unwrap_or_else(|| "?".to_string());
        confirmation_line("[d]", format!("supprimer {}", symbol))
    } else if app.is_awaiting_quit_confirmation() {
        confirmation_line("[q]", "quitter".to_string())
    } else {
        Line::from(vec![
            key_span("[q]", Color::Yellow),
            Span::raw(" Quit  "),
            key_span("[↑↓ / j k]", Color::Yellow),
            Span::raw(" Navigate  "),
            key_span("[Enter]", Color::Yellow),
            Span::raw(" Detail  "),
            key_span("[r]", Color::Cyan),
            Span::raw(" Refresh  "),
            key_span("[a]", Color::Green),
            Span::raw(" Add  "),
            key_span("[d]", Color::Red),
            Span::raw(" Delete  "),
            key_span("[Shift+↑↓ / K J]", Color::Yellow),
            Span::raw(" Move"),
        ])
    };

    let second = Line::from(Span::styled(
        app.status_message.clone().unwrap_or_default(),
        Style::default().fg(Color::Gray),
    ));

    let paragraph = Paragraph::new(vec![first, second])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Input Mode : Saisie de ticker
// ============================================================================

fn render_input_mode(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_watchlist(frame, app, chunks[1]);
    render_input_footer(frame, app, chunks[2]);
}

fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(&app.input_prompt, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(&app.input_buffer, Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let help_line = Line::from(vec![
        key_span("[Enter]", Color::Green),
        Span::raw(" Confirm  "),
        key_span("[ESC]", Color::Red),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
