//! Application state: the composition root's observable objects.
//!
//! [`App`] owns the fetched articles ([`ArticleStore`]), the connectivity
//! status, the query parameters, and the derived list on screen.  All
//! mutation happens on the UI thread, either from key handling or from
//! [`AppEvent`]s drained off the worker channel.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use ratatui::widgets::ListState;
use tracing::{debug, info};

use crate::article::{Article, ArticleKey};
use crate::connectivity::{ConnectivityMonitor, ConnectivityStatus};
use crate::query::{self, DateRange, QueryParameters, SortKey};
use crate::worker::AppEvent;

/// The last successfully fetched article list.
///
/// Replaced wholesale on every successful fetch; never merged.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
    /// Bumped on every replacement; pairs with indices in [`ArticleKey::Slot`].
    version: u64,
    loaded: bool,
}

impl ArticleStore {
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether any fetch has succeeded yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn replace(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.version += 1;
        self.loaded = true;
    }

    fn key_at(&self, index: usize) -> Option<ArticleKey> {
        Some(self.articles.get(index)?.key(self.version, index))
    }
}

/// The selected record, remembered while the visible list is rebuilt.
struct Anchor {
    version: u64,
    index: usize,
    key: ArticleKey,
}

/// Which screen is showing (when online).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

/// What typed characters go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    DateStart,
    DateEnd,
}

pub struct App {
    pub store: ArticleStore,
    pub connectivity: ConnectivityMonitor,
    pub query: QueryParameters,
    /// `query::apply(store, query)`: positions in the store, in display
    /// order.  Re-derived on every change to either.
    pub visible: Vec<usize>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    pub view: View,
    pub input_mode: InputMode,
    /// Edit buffer for the active input mode.
    pub input: String,
    /// Parsed start date while the end date is being typed.
    pending_start: Option<NaiveDate>,
    fetch_requested: bool,
    fetch_in_flight: bool,
    /// A reconnect arrived while a fetch was running; fetch again once it
    /// settles.
    fetch_after_flight: bool,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
}

impl App {
    /// A fresh app.  One fetch is requested up front, as on first display.
    pub fn new(initial: ConnectivityStatus, sort_key: SortKey) -> Self {
        Self {
            store: ArticleStore::default(),
            connectivity: ConnectivityMonitor::new(initial),
            query: QueryParameters {
                sort_key,
                ..Default::default()
            },
            visible: Vec::new(),
            list_state: ListState::default(),
            view: View::List,
            input_mode: InputMode::Normal,
            input: String::new(),
            pending_start: None,
            fetch_requested: true,
            fetch_in_flight: false,
            fetch_after_flight: false,
            quit: false,
            status: "Starting…".into(),
        }
    }

    // -- fetching ------------------------------------------------------------

    pub fn request_fetch(&mut self) {
        self.fetch_requested = true;
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Consume a pending fetch request.  Returns `true` if the caller should
    /// start a fetch now.
    ///
    /// Requests are dropped while offline or while another fetch is still
    /// in flight.  The one exception is a reconnect, which is held until the
    /// running fetch settles.
    pub fn next_fetch(&mut self) -> bool {
        if !std::mem::take(&mut self.fetch_requested) {
            return false;
        }
        if !self.connectivity.is_connected() {
            debug!("fetch skipped: offline");
            self.status = "Offline: fetch skipped".into();
            return false;
        }
        if self.fetch_in_flight {
            debug!("fetch skipped: already in flight");
            return false;
        }
        self.fetch_in_flight = true;
        self.status = "Fetching…".into();
        true
    }

    /// Apply one message from the worker channel.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Fetched(Ok(articles)) => {
                self.settle_fetch();
                let count = articles.len();
                let anchor = self.anchor();
                self.store.replace(articles);
                self.rebuild_view(anchor);
                self.status = format!("Fetched {count} articles");
            }
            AppEvent::Fetched(Err(e)) => {
                self.settle_fetch();
                self.status = format!("Error: {e}");
            }
            AppEvent::Path(update) => {
                let Some(transition) = self.connectivity.apply(update) else {
                    return;
                };
                if transition.is_reconnect() {
                    self.status = "Back online".into();
                    if self.fetch_in_flight {
                        debug!("reconnected during a fetch; fetching again when it settles");
                        self.fetch_after_flight = true;
                    } else {
                        self.request_fetch();
                    }
                } else {
                    self.status = "No network connection".into();
                }
            }
        }
    }

    fn settle_fetch(&mut self) {
        self.fetch_in_flight = false;
        if std::mem::take(&mut self.fetch_after_flight) {
            self.fetch_requested = true;
        }
    }

    // -- query ---------------------------------------------------------------

    /// Re-derive [`App::visible`], keeping the selected article selected if it
    /// is still shown.
    pub fn refresh_view(&mut self) {
        let anchor = self.anchor();
        self.rebuild_view(anchor);
    }

    fn anchor(&self) -> Option<Anchor> {
        let index = self.selected_index()?;
        Some(Anchor {
            version: self.store.version(),
            index,
            key: self.store.key_at(index)?,
        })
    }

    /// Within one snapshot the store position is the identity.  Across a
    /// replacement only an article's url carries over.
    fn rebuild_view(&mut self, anchor: Option<Anchor>) {
        self.visible = query::apply(self.store.articles(), &self.query);

        let reselect = anchor.and_then(|anchor| {
            if anchor.version == self.store.version() {
                self.visible.iter().position(|&i| i == anchor.index)
            } else {
                self.visible
                    .iter()
                    .position(|&i| self.store.key_at(i).as_ref() == Some(&anchor.key))
            }
        });
        match reselect {
            Some(i) => self.list_state.select(Some(i)),
            None if self.visible.is_empty() => self.list_state.select(None),
            None => self.list_state.select(Some(0)),
        }
        if self.list_state.selected().is_none() {
            self.view = View::List;
        }
    }

    pub fn cycle_sort(&mut self) {
        self.query.sort_key = self.query.sort_key.next();
        self.refresh_view();
        self.status = format!("Sorted by {}", self.query.sort_key.label());
    }

    pub fn clear_date_range(&mut self) {
        self.query.date_range = None;
        self.refresh_view();
        self.status = "Date filter cleared".into();
    }

    // -- text input ----------------------------------------------------------

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.input = self.query.search_text.clone();
    }

    pub fn start_date_entry(&mut self) {
        self.input_mode = InputMode::DateStart;
        self.input.clear();
        self.pending_start = None;
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.sync_search();
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
        self.sync_search();
    }

    /// Search updates live; dates apply on submit.
    fn sync_search(&mut self) {
        if self.input_mode == InputMode::Search {
            self.query.search_text = self.input.clone();
            self.refresh_view();
        }
    }

    /// Enter pressed while editing.
    pub fn submit_input(&mut self) {
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::Search => self.input_mode = InputMode::Normal,
            InputMode::DateStart => {
                let Some(date) = self.parse_input_date() else { return };
                self.pending_start = Some(date);
                self.input.clear();
                self.input_mode = InputMode::DateEnd;
            }
            InputMode::DateEnd => {
                let Some(end) = self.parse_input_date() else { return };
                let Some(start) = self.pending_start.take() else {
                    self.input_mode = InputMode::DateStart;
                    return;
                };
                self.set_date_range(start, end);
                self.input.clear();
                self.input_mode = InputMode::Normal;
            }
        }
    }

    /// Esc pressed while editing.  Leaves the query as it currently is.
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.pending_start = None;
    }

    fn parse_input_date(&mut self) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(self.input.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.status = format!("Invalid date {:?} (expected YYYY-MM-DD)", self.input);
                None
            }
        }
    }

    /// Whole days: the start day from midnight, the end day through 23:59:59.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let start = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&end.and_hms_opt(23, 59, 59).unwrap_or(end.and_time(NaiveTime::MIN)));

        self.query.date_range = Some(DateRange { start, end });
        self.refresh_view();

        info!(%start, %end, "date filter set");
        self.status = if start > end {
            "Start date is after end date: nothing matches".into()
        } else {
            format!("Showing {} – {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
        };
    }

    // -- navigation ----------------------------------------------------------

    /// The displayed articles, in display order.
    pub fn visible_articles(&self) -> impl Iterator<Item = &Article> + '_ {
        self.visible.iter().filter_map(|&i| self.store.articles().get(i))
    }

    /// Store position of the selected row.
    fn selected_index(&self) -> Option<usize> {
        self.list_state
            .selected()
            .and_then(|row| self.visible.get(row).copied())
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.store.articles().get(self.selected_index()?)
    }

    pub fn select_next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.visible.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(self.visible.len() - 1));
        }
    }

    pub fn open_detail(&mut self) {
        if self.selected_article().is_some() {
            self.view = View::Detail;
        }
    }

    /// Esc in normal mode: leave the detail view, or quit from the list.
    pub fn back(&mut self) {
        match self.view {
            View::Detail => self.view = View::List,
            View::List => self.quit = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::make_article;
    use crate::error::{DecodeError, FetchError};

    fn article(title: &str, url: Option<&str>, published_at: &str) -> Article {
        let mut a = make_article(Some(title), Some(published_at));
        a.url = url.map(String::from);
        a
    }

    fn sample_articles() -> Vec<Article> {
        vec![
            article("Charlie", Some("https://example.com/c"), "2024-01-03T00:00:00Z"),
            article("Alpha", Some("https://example.com/a"), "2024-01-01T00:00:00Z"),
            article("Bravo", None, "2024-01-02T00:00:00Z"),
        ]
    }

    fn loaded_app() -> App {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        app.handle_event(AppEvent::Fetched(Ok(sample_articles())));
        app
    }

    fn visible_titles(app: &App) -> Vec<&str> {
        app.visible_articles()
            .map(|a| a.title.as_deref().unwrap())
            .collect()
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty_with_a_pending_fetch() {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        assert!(app.visible.is_empty());
        assert!(!app.store.is_loaded());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
        assert!(app.next_fetch());
        assert!(app.fetch_in_flight());
    }

    // -- fetch gating --------------------------------------------------------

    #[test]
    fn no_fetch_while_offline() {
        let mut app = App::new(ConnectivityStatus::Disconnected, SortKey::Title);
        assert!(!app.next_fetch());
        assert!(!app.fetch_in_flight());
        // The request was dropped, not deferred.
        app.connectivity.apply(ConnectivityStatus::Connected);
        assert!(!app.next_fetch());
    }

    #[test]
    fn second_request_is_rejected_while_in_flight() {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        assert!(app.next_fetch());

        app.request_fetch();
        assert!(!app.next_fetch(), "rejected while the first is running");

        app.handle_event(AppEvent::Fetched(Ok(vec![])));
        app.request_fetch();
        assert!(app.next_fetch());
    }

    #[test]
    fn reconnect_requests_one_fetch() {
        let mut app = App::new(ConnectivityStatus::Disconnected, SortKey::Title);
        assert!(!app.next_fetch());

        app.handle_event(AppEvent::Path(ConnectivityStatus::Connected));
        assert!(app.connectivity.is_connected());
        assert!(app.next_fetch());
        assert!(!app.next_fetch());
    }

    #[test]
    fn reconnect_during_fetch_fetches_again_once_it_settles() {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        assert!(app.next_fetch());

        app.handle_event(AppEvent::Path(ConnectivityStatus::Disconnected));
        app.handle_event(AppEvent::Path(ConnectivityStatus::Connected));
        assert!(!app.next_fetch(), "still one fetch at a time");

        app.handle_event(AppEvent::Fetched(Err(FetchError::Transport(
            "connection reset".into(),
        ))));
        assert!(app.next_fetch(), "reconnect fetch runs after the failed one");
        assert!(app.fetch_in_flight());

        app.handle_event(AppEvent::Fetched(Ok(sample_articles())));
        assert!(!app.next_fetch(), "exactly one extra fetch");
        assert!(app.store.is_loaded());
    }

    #[test]
    fn plain_request_during_fetch_is_still_dropped() {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        assert!(app.next_fetch());
        app.request_fetch();
        assert!(!app.next_fetch());
        app.handle_event(AppEvent::Fetched(Ok(vec![])));
        assert!(!app.next_fetch());
    }

    #[test]
    fn going_offline_sets_status_without_fetch() {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        assert!(app.next_fetch());
        app.handle_event(AppEvent::Fetched(Ok(vec![])));

        app.handle_event(AppEvent::Path(ConnectivityStatus::Disconnected));
        assert!(!app.connectivity.is_connected());
        assert_eq!(app.status, "No network connection");
        assert!(!app.next_fetch());
    }

    // -- fetch results -------------------------------------------------------

    #[test]
    fn successful_fetch_replaces_store_and_sorts() {
        let app = loaded_app();
        assert!(app.store.is_loaded());
        assert_eq!(app.store.version(), 1);
        assert_eq!(visible_titles(&app), ["Alpha", "Bravo", "Charlie"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn later_fetch_replaces_instead_of_merging() {
        let mut app = loaded_app();
        app.handle_event(AppEvent::Fetched(Ok(vec![article("Delta", None, "2024-01-04T00:00:00Z")])));
        assert_eq!(app.store.articles().len(), 1);
        assert_eq!(app.store.version(), 2);
        assert_eq!(visible_titles(&app), ["Delta"]);
    }

    #[test]
    fn failed_fetch_leaves_list_unchanged() {
        let mut app = loaded_app();
        app.request_fetch();
        assert!(app.next_fetch());

        app.handle_event(AppEvent::Fetched(Err(FetchError::Decode(DecodeError::MissingField {
            key: "status".into(),
            detail: "missing field `status`".into(),
        }))));

        assert!(!app.fetch_in_flight());
        assert_eq!(app.store.articles(), sample_articles().as_slice());
        assert_eq!(visible_titles(&app), ["Alpha", "Bravo", "Charlie"]);
        assert!(app.status.starts_with("Error:"));
        assert!(app.status.contains("status"));
    }

    // -- query ---------------------------------------------------------------

    #[test]
    fn typing_a_search_filters_live() {
        let mut app = loaded_app();
        app.start_search();
        for c in "BRA".chars() {
            app.push_char(c);
        }
        assert_eq!(app.query.search_text, "BRA");
        assert_eq!(visible_titles(&app), ["Bravo"]);

        app.pop_char();
        app.pop_char();
        app.pop_char();
        assert!(app.query.search_text.is_empty());
        assert_eq!(visible_titles(&app), ["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn cycling_sort_reorders() {
        let mut app = loaded_app();
        app.cycle_sort();
        assert_eq!(app.query.sort_key, SortKey::Author);
        app.cycle_sort();
        assert_eq!(app.query.sort_key, SortKey::PublishedAt);
        assert_eq!(visible_titles(&app), ["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn date_entry_applies_whole_day_range() {
        let mut app = loaded_app();
        app.start_date_entry();
        app.input = "2024-01-02".into();
        app.submit_input();
        assert_eq!(app.input_mode, InputMode::DateEnd);
        app.input = "2024-01-03".into();
        app.submit_input();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.query.date_range.is_some());
        assert_eq!(visible_titles(&app), ["Bravo", "Charlie"]);
    }

    #[test]
    fn inverted_date_range_empties_list() {
        let mut app = loaded_app();
        let later = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        app.set_date_range(later, earlier);
        assert!(app.visible.is_empty());
        assert!(app.list_state.selected().is_none());
        assert!(app.status.contains("nothing matches"));

        app.clear_date_range();
        assert_eq!(app.visible.len(), 3);
    }

    #[test]
    fn bad_date_keeps_editing() {
        let mut app = loaded_app();
        app.start_date_entry();
        app.input = "January 2nd".into();
        app.submit_input();
        assert_eq!(app.input_mode, InputMode::DateStart);
        assert!(app.status.starts_with("Invalid date"));
        assert!(app.query.date_range.is_none());
    }

    #[test]
    fn cancel_input_returns_to_normal() {
        let mut app = loaded_app();
        app.start_date_entry();
        app.input = "2024".into();
        app.cancel_input();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.input.is_empty());
    }

    // -- selection -----------------------------------------------------------

    #[test]
    fn selection_follows_article_across_resort() {
        let mut app = loaded_app();
        app.select_last(); // Charlie
        app.query.sort_key = SortKey::PublishedAt;
        app.query.search_text = "a".into();
        app.refresh_view();
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("Charlie"));
    }

    #[test]
    fn selection_follows_url_less_article_within_snapshot() {
        let mut app = loaded_app();
        app.select_next(); // Bravo, no url
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("Bravo"));
        app.cycle_sort();
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("Bravo"));
    }

    #[test]
    fn selection_tells_apart_articles_sharing_a_url() {
        let shared = Some("https://example.com/same");
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        app.handle_event(AppEvent::Fetched(Ok(vec![
            article("A", shared, "2024-01-01T00:00:00Z"),
            article("B", shared, "2024-01-02T00:00:00Z"),
        ])));
        app.select_last();
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("B"));

        app.refresh_view();
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("B"));

        app.cycle_sort();
        app.cycle_sort(); // PublishedAt: B stays last
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("B"));
    }

    #[test]
    fn selection_follows_url_into_the_next_fetch() {
        let mut app = loaded_app();
        app.select_last(); // Charlie
        let mut next = sample_articles();
        next.reverse();
        next.push(article("Aardvark", None, "2024-01-05T00:00:00Z"));
        app.handle_event(AppEvent::Fetched(Ok(next)));
        assert_eq!(app.selected_article().unwrap().title.as_deref(), Some("Charlie"));
    }

    #[test]
    fn url_less_selection_resets_on_the_next_fetch() {
        let mut app = loaded_app();
        app.select_next(); // Bravo, no url
        app.handle_event(AppEvent::Fetched(Ok(sample_articles())));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new(ConnectivityStatus::Connected, SortKey::Title);
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
        app.open_detail();
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut app = loaded_app();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn detail_opens_and_back_closes_then_quits() {
        let mut app = loaded_app();
        app.open_detail();
        assert_eq!(app.view, View::Detail);
        app.back();
        assert_eq!(app.view, View::List);
        assert!(!app.quit);
        app.back();
        assert!(app.quit);
    }

    #[test]
    fn detail_closes_when_selection_filters_away() {
        let mut app = loaded_app();
        app.open_detail();
        app.query.search_text = "no such article".into();
        app.refresh_view();
        assert_eq!(app.view, View::List);
    }
}
