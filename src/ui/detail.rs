// ============================================================================
// Vue détaillée d'un ticker
// ============================================================================
//   ┌ AAPL ───────────────────────────────┐
//   │ Apple Inc.            114.75   -0.29 │
//   │ Last trade 4:00pm              -0.25%│
//   │ Ask: 114.77 x 300   Bid: 114.75 x 200│
//   ├ Session ────────────────────────────┤
//   │ Open        High        52w high     │
//   │ Pre-Close   Low         52w low      │
//   └ [u] Update [s] Auto [p] Pause       ┘
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, DetailView};
use crate::scheduler::{Controls, RefreshState};
use crate::ui::dashboard::{self, direction_color};

pub fn render_detail(frame: &mut Frame, app: &App) {
    let chunks = dashboard::create_layout(frame.size());
    dashboard::render_header(frame, app, chunks[0]);

    let Some(view) = app.detail.as_ref() else {
        return;
    };

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(chunks[1]);

    render_quote(frame, view, body[0]);
    render_session(frame, view, body[1]);
    render_controls(frame, app, view, chunks[2]);
}

/// Prix, variation, ask/bid
fn render_quote(frame: &mut Frame, view: &DetailView, area: Rect) {
    let labels = &view.labels;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", view.symbol));

    if view.record.is_none() {
        let paragraph = Paragraph::new(Line::from(Span::styled("Loading...", Style::default().fg(Color::Gray))))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let change_style = labels
        .direction
        .map(|d| Style::default().fg(Color::White).bg(direction_color(d)).add_modifier(Modifier::BOLD))
        .unwrap_or_default();

    let mut name_lines = labels.company_name.lines();
    let first_name = name_lines.next().unwrap_or_default().to_string();
    let second_name = name_lines.next().unwrap_or_default().to_string();

    let updated = view
        .updated_at
        .map(|t| format!("Updated {}", t.with_timezone(&chrono::Local).format("%H:%M:%S")))
        .unwrap_or_default();

    let text = vec![
        Line::from(vec![
            Span::styled(format!("{:<30}", first_name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("{:>12}  ", labels.price), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {:>8} ", labels.points_change), change_style),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<30}", second_name)),
            Span::raw(format!("{:>12}  ", "")),
            Span::styled(format!(" {:>8} ", labels.percent_change), change_style),
        ]),
        Line::from(""),
        Line::from(Span::raw(format!("{:<24}{}", labels.ask, labels.bid))),
        Line::from(Span::styled(
            format!("Last trade {:<14}{}", labels.last_trade_time, updated),
            Style::default().fg(Color::Gray),
        )),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Open / High / Low / 52 semaines / clôture précédente
fn render_session(frame: &mut Frame, view: &DetailView, area: Rect) {
    let labels = &view.labels;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Session ");

    let text = vec![
        Line::from(format!("{:<22}{:<22}{}", labels.open, labels.high, labels.week52_high)),
        Line::from(format!("{:<22}{:<22}{}", labels.previous_close, labels.low, labels.week52_low)),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Style d'un bouton : grisé quand il est désactivé
fn control_style(enabled: bool, color: Color) -> Style {
    if enabled {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn control_spans(controls: Controls) -> Vec<Span<'static>> {
    vec![
        Span::styled("[u]", control_style(controls.manual_update, Color::Yellow)),
        Span::styled(" Update  ", control_style(controls.manual_update, Color::White)),
        Span::styled("[s]", control_style(controls.auto_update, Color::Green)),
        Span::styled(" Auto-update  ", control_style(controls.auto_update, Color::White)),
        Span::styled("[p]", control_style(controls.pause, Color::Red)),
        Span::styled(" Pause  ", control_style(controls.pause, Color::White)),
        Span::styled("[Esc]", control_style(true, Color::Yellow)),
        Span::raw(" Back"),
    ]
}

fn render_controls(frame: &mut Frame, app: &App, view: &DetailView, area: Rect) {
    let state = view.refresh_state();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", state.label()));

    let first = if app.is_awaiting_quit_confirmation() {
        dashboard::confirmation_line("[q]", "quitter".to_string())
    } else {
        Line::from(control_spans(view.controls()))
    };

    let second = match state {
        RefreshState::AutoUpdating => Line::from(Span::styled(
            "Auto-updating...",
            Style::default().fg(Color::Green).add_modifier(Modifier::SLOW_BLINK),
        )),
        _ => Line::from(""),
    };

    let paragraph = Paragraph::new(vec![first, second])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_controls_are_dimmed() {
        let spans = control_spans(RefreshState::AutoUpdating.controls());

        assert_eq!(spans[0].style.fg, Some(Color::DarkGray));
        assert_eq!(spans[2].style.fg, Some(Color::DarkGray));
        assert_eq!(spans[4].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_idle_controls() {
        let spans = control_spans(RefreshState::Idle.controls());

        assert_eq!(spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(spans[2].style.fg, Some(Color::Green));
        assert_eq!(spans[4].style.fg, Some(Color::DarkGray));
    }
}
