use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::info;

use crate::concept::ConceptNode;
use crate::config::Config;
use crate::locale::{strings, Language, Strings};
use crate::navigation::NavigationState;
use crate::render::{render_tree, TreeLine};
use crate::service::{ConceptClient, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// A resolved concept fetch, delivered back to the event loop.
pub type FetchOutcome = (u64, Result<ConceptNode, ServiceError>);

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Search input
    pub input: String,
    pub input_cursor: usize,

    // Navigation core
    pub navigation: NavigationState,
    pub client: ConceptClient,
    pub language: Language,

    // Rendered tree cache (rebuilt whenever `current` changes)
    pub lines: Vec<TreeLine>,
    pub selected_line: Option<usize>,
    pub scroll: u16,
    pub view_height: u16,

    // Tree panel area for mouse hit-testing (updated during render)
    pub tree_area: Option<Rect>,

    // Transient status notice shown in the footer
    pub notice: Option<String>,

    // Spinner state while a fetch is outstanding
    pub animation_frame: u8,

    // Guards the startup navigation so it can only ever fire once
    started: bool,

    // Completed fetches are funneled back through this channel so several
    // overlapping requests can stay in flight at once.
    results_tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl App {
    pub fn new(config: &Config) -> (Self, mpsc::UnboundedReceiver<FetchOutcome>) {
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let language = config
            .language
            .as_deref()
            .and_then(Language::from_str)
            .unwrap_or_default();

        let app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,

            input: String::new(),
            input_cursor: 0,

            navigation: NavigationState::new(),
            client: ConceptClient::new(&config.base_url, config.timeout_secs),
            language,

            lines: Vec::new(),
            selected_line: None,
            scroll: 0,
            view_height: 0,

            tree_area: None,
            notice: None,
            animation_frame: 0,

            started: false,

            results_tx,
        };

        (app, results_rx)
    }

    pub fn strings(&self) -> &'static Strings {
        strings(self.language)
    }

    /// Fires the configured startup navigation. Only the first call does
    /// anything; redraws and repeated calls never re-trigger it.
    pub fn start(&mut self, initial_keyword: Option<&str>) {
        if self.started {
            return;
        }
        self.started = true;

        if let Some(keyword) = initial_keyword {
            self.navigate_to(keyword);
        }
    }

    /// Kicks off a concept fetch. The history mutations happen immediately;
    /// the response lands via the results channel and `apply_fetch`.
    pub fn navigate_to(&mut self, keyword: &str) {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.notice = Some(self.strings().enter_concept.to_string());
            return;
        }

        let seq = self.navigation.begin_navigation(keyword);
        self.input = keyword.to_string();
        self.input_cursor = self.input.chars().count();
        self.notice = None;

        info!(seq, keyword, "fetching concept");

        let client = self.client.clone();
        let keyword = keyword.to_string();
        let language = self.service_language();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_concept(&keyword, language.as_deref()).await;
            // Receiver gone means the app is shutting down.
            let _ = tx.send((seq, result));
        });
    }

    /// Applies a resolved fetch to the navigation state and refreshes the
    /// rendered tree. Failures keep the previous tree on screen.
    pub fn apply_fetch(&mut self, seq: u64, result: Result<ConceptNode, ServiceError>) {
        let failed = result.is_err();
        if let Err(err) = &result {
            self.notice = Some(err.to_string());
        }

        self.navigation.finish_navigation(seq, result);

        if !failed {
            self.refresh_tree();
            self.scroll = 0;
            self.selected_line = if self.lines.is_empty() { None } else { Some(0) };
        }
    }

    fn refresh_tree(&mut self) {
        self.lines = self
            .navigation
            .current()
            .map(render_tree)
            .unwrap_or_default();
    }

    /// Steps back through history and redraws, snapshot only.
    pub fn go_back(&mut self) {
        if self.navigation.back_len() == 0 {
            return;
        }
        self.navigation.go_back();
        self.after_history_move();
    }

    pub fn go_forward(&mut self) {
        if self.navigation.forward_len() == 0 {
            return;
        }
        self.navigation.go_forward();
        self.after_history_move();
    }

    fn after_history_move(&mut self) {
        self.refresh_tree();
        self.scroll = 0;
        self.selected_line = if self.lines.is_empty() { None } else { Some(0) };
        if let Some(node) = self.navigation.current() {
            self.input = node.title.clone();
            self.input_cursor = self.input.chars().count();
        }
    }

    /// Drills into the selected line, when it is navigable.
    pub fn expand_selected(&mut self) {
        let target = self
            .selected_line
            .and_then(|i| self.lines.get(i))
            .and_then(|line| line.target.clone());

        if let Some(keyword) = target {
            self.navigate_to(&keyword);
        }
    }

    /// Uses the selected line's text as the next query, mirroring the
    /// "query selected text" host capability. With nothing selected the
    /// navigation state is left untouched.
    pub fn query_selected_text(&mut self) {
        let selection = self
            .selected_line
            .and_then(|i| self.lines.get(i))
            .map(|line| line.text.trim().to_string())
            .unwrap_or_default();

        if selection.is_empty() {
            self.notice = Some(self.strings().no_selection.to_string());
            return;
        }

        self.navigate_to(&selection);
    }

    /// URL for the external web search. Uses the text box contents, which
    /// the user may have edited since the last navigation.
    pub fn external_search_url(&self) -> Option<String> {
        let query = self.input.trim();
        if query.is_empty() {
            return None;
        }

        reqwest::Url::parse_with_params("https://duckduckgo.com/", &[("q", query)])
            .ok()
            .map(String::from)
    }

    /// Opens the external search in the system browser.
    pub fn search_online(&mut self) {
        if let Some(url) = self.external_search_url() {
            if let Err(err) = open::that(&url) {
                self.notice = Some(format!("Could not open browser: {err}"));
            }
        } else {
            self.notice = Some(self.strings().enter_concept.to_string());
        }
    }

    pub fn toggle_language(&mut self) {
        self.language = self.language.toggle();
    }

    /// Language tag forwarded to the service, when not the default.
    fn service_language(&self) -> Option<String> {
        match self.language {
            Language::En => None,
            other => Some(other.as_str().to_string()),
        }
    }

    // Tree selection and scrolling

    pub fn select_next(&mut self) {
        let len = self.lines.len();
        if len > 0 {
            let i = self.selected_line.unwrap_or(0);
            self.selected_line = Some((i + 1).min(len - 1));
            self.scroll_to_selected();
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(i) = self.selected_line {
            self.selected_line = Some(i.saturating_sub(1));
            self.scroll_to_selected();
        } else if !self.lines.is_empty() {
            self.selected_line = Some(0);
        }
    }

    pub fn select_first(&mut self) {
        if !self.lines.is_empty() {
            self.selected_line = Some(0);
            self.scroll = 0;
        }
    }

    pub fn select_last(&mut self) {
        if !self.lines.is_empty() {
            self.selected_line = Some(self.lines.len() - 1);
            self.scroll_to_selected();
        }
    }

    pub fn scroll_down(&mut self) {
        let max = (self.lines.len() as u16).saturating_sub(self.view_height);
        if self.scroll < max {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_line else {
            return;
        };
        let idx = idx as u16;

        if idx < self.scroll {
            self.scroll = idx;
        } else if self.view_height > 0 && idx >= self.scroll + self.view_height {
            self.scroll = idx.saturating_sub(self.view_height - 1);
        }
    }

    /// Resolves a mouse click inside the tree panel: selects the clicked
    /// line and drills down when it is navigable.
    pub fn click_tree(&mut self, row: u16) {
        let Some(area) = self.tree_area else {
            return;
        };
        if row < area.y || row >= area.y + area.height {
            return;
        }

        let idx = (row - area.y + self.scroll) as usize;
        if idx >= self.lines.len() {
            return;
        }

        self.selected_line = Some(idx);
        if self.lines[idx].is_navigable() {
            self.expand_selected();
        }
    }

    /// Advances the loading spinner, driven by the Tick event.
    pub fn tick_animation(&mut self) {
        if self.navigation.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(&Config::default()).0
    }

    fn node(title: &str) -> ConceptNode {
        ConceptNode {
            title: title.to_string(),
            kind: "entity".to_string(),
            value: None,
            media: None,
            preview: None,
            action: None,
            children: None,
        }
    }

    #[tokio::test]
    async fn test_navigate_to_blank_is_a_notice_only() {
        let mut app = app();
        app.navigate_to("   ");
        assert!(app.notice.is_some());
        assert!(!app.navigation.is_loading());
        assert!(app.navigation.current().is_none());
    }

    #[tokio::test]
    async fn test_navigate_and_apply_refreshes_tree() {
        let mut app = app();
        app.navigate_to("jazz");
        assert!(app.navigation.is_loading());

        let mut tree = node("jazz");
        tree.children = Some(vec![node("bebop"), node("swing")]);
        app.apply_fetch(1, Ok(tree));

        assert!(!app.navigation.is_loading());
        assert_eq!(app.lines.len(), 3);
        assert_eq!(app.selected_line, Some(0));
        assert_eq!(app.input, "jazz");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_tree_on_screen() {
        let mut app = app();
        app.navigate_to("jazz");
        app.apply_fetch(1, Ok(node("jazz")));

        app.navigate_to("broken");
        app.apply_fetch(2, Err(ServiceError::MalformedPayload("x".to_string())));

        assert!(app.notice.is_some());
        assert_eq!(app.navigation.current().unwrap().title, "jazz");
        assert_eq!(app.lines.len(), 1);
        assert!(!app.navigation.is_loading());
    }

    #[tokio::test]
    async fn test_query_selected_text_without_selection() {
        let mut app = app();
        app.query_selected_text();
        assert_eq!(
            app.notice.as_deref(),
            Some(strings(Language::En).no_selection)
        );
        assert!(!app.navigation.is_loading());
        assert_eq!(app.navigation.back_len(), 0);
    }

    #[tokio::test]
    async fn test_history_moves_update_input_and_tree() {
        let mut app = app();
        app.navigate_to("a");
        app.apply_fetch(1, Ok(node("a")));
        app.navigate_to("b");
        app.apply_fetch(2, Ok(node("b")));

        app.go_back();
        assert_eq!(app.input, "a");
        assert_eq!(app.lines[0].text, "a");

        app.go_forward();
        assert_eq!(app.input, "b");
        assert_eq!(app.lines[0].text, "b");
    }

    #[tokio::test]
    async fn test_external_search_url_encodes_query() {
        let mut app = app();
        app.navigate_to("rock & roll");
        let url = app.external_search_url().unwrap();
        assert!(url.starts_with("https://duckduckgo.com/?q=rock"));
        assert!(!url.contains(' '));

        let fresh = self::app();
        assert!(fresh.external_search_url().is_none());
    }

    #[tokio::test]
    async fn test_external_search_follows_edited_text_box() {
        let mut app = app();
        app.navigate_to("jazz");

        // The user retypes the box without searching; the shortcut follows it.
        app.input = "blues".to_string();
        assert_eq!(
            app.external_search_url().as_deref(),
            Some("https://duckduckgo.com/?q=blues")
        );

        app.input = "   ".to_string();
        assert!(app.external_search_url().is_none());
    }

    #[tokio::test]
    async fn test_startup_navigation_fires_exactly_once() {
        let mut app = app();
        app.start(Some("jazz"));
        assert!(app.navigation.is_loading());
        assert_eq!(app.navigation.query(), "jazz");
        app.apply_fetch(1, Ok(node("jazz")));

        // Redraw-time re-entry must not issue a second fetch.
        app.start(Some("jazz"));
        app.start(Some("other"));
        assert!(!app.navigation.is_loading());
        assert_eq!(app.navigation.query(), "jazz");
        assert_eq!(app.navigation.back_len(), 0);
    }

    #[tokio::test]
    async fn test_start_without_keyword_stays_idle() {
        let mut app = app();
        app.start(None);
        assert!(!app.navigation.is_loading());
        assert!(app.navigation.current().is_none());
    }

    #[tokio::test]
    async fn test_click_maps_row_to_line() {
        let mut app = app();
        app.navigate_to("jazz");
        let mut tree = node("jazz");
        tree.value = Some("a genre".to_string());
        tree.children = Some(vec![node("bebop")]);
        app.apply_fetch(1, Ok(tree));

        app.tree_area = Some(Rect::new(0, 5, 40, 10));
        app.click_tree(6); // value line: selected but not navigated
        assert_eq!(app.selected_line, Some(1));
        assert!(!app.navigation.is_loading());

        app.click_tree(7); // child title: drills down
        assert_eq!(app.selected_line, Some(2));
        assert!(app.navigation.is_loading());
        assert_eq!(app.navigation.query(), "bebop");
    }
}
