//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Nothing in this module changes
//! what is shown; it only renders [`App::visible_articles`] and friends.
//!
//! ## For contributors
//!
//! * The layout is three rows: a query bar, the main area, and a one-line
//!   status bar.
//! * The main area is the offline notice, the article list, or the article
//!   detail, in that order of precedence.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, View};
use crate::article::Article;
use crate::connectivity::ConnectivityStatus;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [query_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_query_bar(app, frame, query_area);

    match (app.connectivity.status(), app.view) {
        (ConnectivityStatus::Disconnected, _) => draw_offline(frame, main_area),
        (ConnectivityStatus::Connected, View::Detail) => draw_detail(app, frame, main_area),
        (ConnectivityStatus::Connected, View::List) => draw_article_list(app, frame, main_area),
    }

    draw_status_bar(app, frame, status_area);
}

/// Search text, date window and sort key, or the active prompt.
fn draw_query_bar(app: &App, frame: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let line = match app.input_mode {
        InputMode::Normal => {
            let dates = match app.query.date_range {
                Some(r) => format!("{} – {}", r.start.format("%Y-%m-%d"), r.end.format("%Y-%m-%d")),
                None => "any".into(),
            };
            let search = if app.query.search_text.is_empty() {
                "—".to_string()
            } else {
                app.query.search_text.clone()
            };
            Line::from(vec![
                Span::styled("Search: ", label),
                Span::styled(search, value),
                Span::raw("   "),
                Span::styled("Dates: ", label),
                Span::styled(dates, value),
                Span::raw("   "),
                Span::styled("Sort: ", label),
                Span::styled(app.query.sort_key.label(), value),
            ])
        }
        mode => {
            let prompt = match mode {
                InputMode::Search => "Search: ",
                InputMode::DateStart => "Start date (YYYY-MM-DD): ",
                _ => "End date (YYYY-MM-DD): ",
            };
            Line::from(vec![
                Span::styled(prompt, Style::default().fg(Color::Yellow)),
                Span::styled(&app.input, value),
                Span::styled("█", Style::default().fg(Color::Yellow)),
            ])
        }
    };

    let bar = Paragraph::new(line).block(Block::default().title(" Query ").borders(Borders::ALL));
    frame.render_widget(bar, area);
}

/// Shown instead of the list while the connectivity monitor is offline.
fn draw_offline(frame: &mut Frame, area: Rect) {
    let notice = Paragraph::new(vec![
        Line::from(Span::styled(
            "No network connection",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from("Articles will load when the connection comes back."),
    ])
    .block(Block::default().title(" Offline ").borders(Borders::ALL));
    frame.render_widget(notice, area);
}

/// Render the scrollable article list.
fn draw_article_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let articles = app.store.articles();
    let list_items: Vec<ListItem> = app
        .visible
        .iter()
        .filter_map(|&i| articles.get(i))
        .map(article_item)
        .collect();

    let title = if app.store.is_loaded() {
        format!(" Articles ({}) ", app.visible.len())
    } else {
        " Articles (loading) ".to_string()
    };
    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Two lines per article; articles missing a title or description collapse
/// to a placeholder.
fn article_item(article: &Article) -> ListItem<'_> {
    match (&article.title, &article.description) {
        (Some(title), Some(description)) => ListItem::new(vec![
            Line::from(vec![
                Span::styled("Title: ", Style::default().fg(Color::DarkGray)),
                Span::styled(title.as_str(), Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                Span::styled("Description: ", Style::default().fg(Color::DarkGray)),
                Span::styled(description.as_str(), Style::default().fg(Color::Gray)),
            ]),
        ]),
        _ => ListItem::new(Line::from(Span::styled(
            "No title",
            Style::default().fg(Color::DarkGray),
        ))),
    }
}

fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let Some(article) = app.selected_article() else {
        return;
    };

    let field = |name: &'static str, value: Option<&str>| {
        Line::from(vec![
            Span::styled(format!("{name}: "), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(value.unwrap_or("").to_string()),
        ])
    };

    let lines = vec![
        field("Title", article.title.as_deref()),
        field("Description", article.description.as_deref()),
        field("Author", article.author.as_deref()),
        field("Source", article.source.name.as_deref()),
        field("Published At", article.published_at.as_deref()),
        field("URL", article.url.as_deref()),
        field("Image", article.url_to_image.as_deref()),
        Line::raw(""),
        Line::raw(article.content.clone().unwrap_or_default()),
    ];

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Article ").borders(Borders::ALL));
    frame.render_widget(detail, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let help = match (app.input_mode, app.view) {
        (InputMode::Normal, View::List) => {
            "  q: quit  ↑/↓: scroll  Enter: open  /: search  d/D: dates  s: sort  r: refresh"
        }
        (InputMode::Normal, View::Detail) => "  Esc: back  q: quit",
        _ => "  Enter: apply  Esc: cancel",
    };

    let activity = if app.fetch_in_flight() { " ⟳ " } else { " " };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(activity, Style::default().fg(Color::Cyan)),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} of {} articles", app.visible.len(), app.store.articles().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(help),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests (rendering smoke tests)
// ---------------------------------------------------------------------------
