use crate::cache::{CacheLookup, QueryCache};
use crate::catalog::Product;
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::fetcher::{FetchMessage, QueryDispatcher};
use crate::tui::search::SearchState;
use crate::tui::ui;
use crate::tui::virtual_list::VirtualList;
use chrono::{DateTime, Local};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// State of the query for the current debounced input
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus {
    /// Nothing to fetch (empty query)
    Idle,
    /// No data yet, request in flight
    Loading,
    Ready,
    Error(String),
}

/// What the dropdown body shows, in priority order
#[derive(Debug, Clone, PartialEq)]
pub enum DropdownContent {
    Loading,
    Error,
    NoResults(String),
    List,
}

/// A row of the dropdown
#[derive(Debug, Clone, Copy)]
pub enum DropdownItem<'a> {
    Product(&'a Product),
    Popular(&'a str),
}

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Details,
}

/// Screen areas recorded by the last draw, used for mouse hit-testing
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutState {
    pub input: Rect,
    pub clear_button: Rect,
    pub list: Rect,
}

pub struct App<D: QueryDispatcher> {
    // Input
    pub search: SearchState,
    pub focus: Focus,
    debouncer: Debouncer,

    // Query
    cache: QueryCache,
    dispatcher: D,
    pub products: Option<Arc<Vec<Product>>>,
    pub status: QueryStatus,
    pub refreshing: bool,
    pub last_updated: Option<DateTime<Local>>,

    // Dropdown
    pub is_open: bool,
    pub highlighted: Option<usize>,
    pub list: VirtualList,
    pub dropdown_cap: usize,
    pub popular: Vec<String>,

    pub selected: Option<Product>,
    pub layout: LayoutState,
    pub tick_count: u64,
    tick_rate: Duration,

    pub should_quit: bool,
}

impl<D: QueryDispatcher> App<D> {
    pub fn new(config: &AppConfig, dispatcher: D) -> Self {
        Self {
            search: SearchState::default(),
            focus: Focus::Input,
            debouncer: Debouncer::new(config.search.debounce()),
            cache: QueryCache::new(
                config.cache.stale_time(),
                config.cache.gc_time(),
                config.cache.capacity,
            ),
            dispatcher,
            products: None,
            status: QueryStatus::Idle,
            refreshing: false,
            last_updated: None,
            // the input starts focused, and focusing the input opens the dropdown
            is_open: true,
            highlighted: None,
            list: {
                let mut list = VirtualList::new(
                    config.ui.item_height as usize,
                    config.ui.overscan,
                    config.ui.max_dropdown_height as usize,
                );
                list.set_count(config.search.popular_searches.len());
                list
            },
            dropdown_cap: config.ui.max_dropdown_height as usize,
            popular: config.search.popular_searches.clone(),
            selected: None,
            layout: LayoutState::default(),
            tick_count: 0,
            tick_rate: Duration::from_millis(config.ui.tick_ms.max(1)),
            should_quit: false,
        }
    }

    pub fn run<W: std::io::Write>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<W>>,
    ) -> crate::Result<()> {
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = self.tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key, Instant::now());
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.tick(Instant::now());
                last_tick = Instant::now();
            }

            if self.should_quit {
                self.dispatcher.cancel();
                return Ok(());
            }
        }
    }

    /// Drain finished fetches, settle the debounced query, expire old cache entries
    pub fn tick(&mut self, now: Instant) {
        self.tick_count = self.tick_count.wrapping_add(1);

        while let Some(msg) = self.dispatcher.try_recv() {
            self.apply_message(msg, now);
        }

        if let Some(query) = self.debouncer.poll(now) {
            self.apply_debounced(query, now);
        }

        let collected = self.cache.collect_garbage(now);
        if collected > 0 {
            debug!("Collected {} idle cache entries", collected);
        }
    }

    pub fn debounced_query(&self) -> &str {
        self.debouncer.settled()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // --- Query lifecycle ---

    fn apply_debounced(&mut self, query: String, now: Instant) {
        debug!("Debounced query is now '{}'", query);
        self.refreshing = false;

        if query.is_empty() {
            self.dispatcher.cancel();
            self.products = None;
            self.status = QueryStatus::Idle;
            self.sync_list();
            return;
        }

        match self.cache.lookup(&query, now) {
            CacheLookup::Fresh(products) => {
                self.dispatcher.cancel();
                self.products = Some(products);
                self.status = QueryStatus::Ready;
            }
            CacheLookup::Stale(products) => {
                self.products = Some(products);
                self.status = QueryStatus::Ready;
                self.refreshing = true;
                self.dispatcher.dispatch(&query);
            }
            CacheLookup::Miss => {
                self.products = None;
                self.status = QueryStatus::Loading;
                self.dispatcher.dispatch(&query);
            }
        }
        self.sync_list();
    }

    pub fn apply_message(&mut self, msg: FetchMessage, now: Instant) {
        let is_current = msg.query() == self.debouncer.settled();

        match msg {
            FetchMessage::Loaded { query, products } => {
                let products = self.cache.insert(&query, products, now);
                if !is_current {
                    debug!("Cached results for superseded query '{}'", query);
                    return;
                }
                info!("{} products for '{}'", products.len(), query);
                self.products = Some(products);
                self.status = QueryStatus::Ready;
                self.refreshing = false;
                self.last_updated = Some(Local::now());
            }
            FetchMessage::Failed { query, error } => {
                warn!("Fetching '{}' failed: {}", query, error);
                if !is_current {
                    return;
                }
                self.status = QueryStatus::Error(error);
                self.refreshing = false;
            }
        }
        self.sync_list();
    }

    /// Keep the virtual list and highlight consistent with the current items
    fn sync_list(&mut self) {
        let count = self.item_count();
        self.list.set_count(count);
        if !self.list_shown() || self.highlighted.is_some_and(|h| h >= count) {
            self.highlighted = None;
        }
    }

    // --- Dropdown items ---

    /// Current results, when there is at least one
    fn result_products(&self) -> Option<&[Product]> {
        self.products
            .as_deref()
            .map(|p| p.as_slice())
            .filter(|p| !p.is_empty())
    }

    pub fn showing_products(&self) -> bool {
        self.result_products().is_some()
    }

    pub fn item_count(&self) -> usize {
        match self.result_products() {
            Some(products) => products.len(),
            None => self.popular.len(),
        }
    }

    pub fn item(&self, index: usize) -> Option<DropdownItem<'_>> {
        match self.result_products() {
            Some(products) => products.get(index).map(DropdownItem::Product),
            None => self
                .popular
                .get(index)
                .map(|s| DropdownItem::Popular(s.as_str())),
        }
    }

    pub fn dropdown_content(&self) -> DropdownContent {
        match &self.status {
            QueryStatus::Loading => DropdownContent::Loading,
            QueryStatus::Error(_) => DropdownContent::Error,
            _ if !self.debouncer.settled().is_empty()
                && self.products.as_ref().is_some_and(|p| p.is_empty()) =>
            {
                DropdownContent::NoResults(self.debouncer.settled().to_string())
            }
            _ => DropdownContent::List,
        }
    }

    /// Rows are only selectable while the list itself is on screen
    fn list_shown(&self) -> bool {
        self.is_open && self.dropdown_content() == DropdownContent::List
    }

    pub fn show_popular_header(&self) -> bool {
        self.debouncer.settled().is_empty() && self.status != QueryStatus::Loading
    }

    // --- Actions ---

    fn on_input_changed(&mut self, now: Instant) {
        self.debouncer.push(self.search.query.clone(), now);
        self.is_open = !self.search.query.is_empty();
        self.highlighted = None;
        if self.search.query.is_empty() {
            self.selected = None;
        }
    }

    pub fn select_product(&mut self, index: usize, now: Instant) {
        let Some(product) = self
            .result_products()
            .and_then(|p| p.get(index))
            .cloned()
        else {
            return;
        };

        info!("Selected product {} '{}'", product.id, product.title);
        self.search.set(&product.title);
        self.debouncer.push(product.title.clone(), now);
        self.selected = Some(product);
        self.is_open = false;
        self.highlighted = None;
    }

    /// Use a popular search term as the query, keeping the dropdown open
    pub fn apply_popular(&mut self, index: usize, now: Instant) {
        let Some(term) = self.popular.get(index).cloned() else {
            return;
        };
        self.search.set(&term);
        self.debouncer.push(term, now);
        self.focus_input();
        self.highlighted = None;
    }

    /// Act on the row at `index` the way a click would
    pub fn activate(&mut self, index: usize, now: Instant) {
        if !self.list_shown() {
            return;
        }
        if self.showing_products() {
            self.select_product(index, now);
        } else {
            self.apply_popular(index, now);
        }
    }

    pub fn clear_input(&mut self, now: Instant) {
        self.search.clear();
        self.debouncer.flush("");
        self.apply_debounced(String::new(), now);
        self.selected = None;
        self.highlighted = None;
        self.focus_input();
        self.is_open = false;
    }

    fn focus_input(&mut self) {
        self.focus = Focus::Input;
        self.search.focused = true;
        self.is_open = true;
    }

    fn blur_input(&mut self) {
        self.focus = Focus::Details;
        self.search.focused = false;
        self.is_open = false;
    }

    pub fn highlight_next(&mut self) {
        let len = self.item_count();
        if len == 0 || !self.list_shown() {
            self.highlighted = None;
            return;
        }
        let next = match self.highlighted {
            Some(h) if h + 1 < len => h + 1,
            Some(h) => h,
            None => 0,
        };
        self.highlighted = Some(next);
        self.list.scroll_to_index(next);
    }

    pub fn highlight_prev(&mut self) {
        if self.item_count() == 0 || !self.list_shown() {
            self.highlighted = None;
            return;
        }
        let prev = match self.highlighted {
            Some(h) if h > 0 => h - 1,
            _ => 0,
        };
        self.highlighted = Some(prev);
        self.list.scroll_to_index(prev);
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global keys
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('u') if ctrl => {
                self.clear_input(now);
                return;
            }
            KeyCode::Esc => {
                if self.is_open {
                    self.is_open = false;
                } else if !self.search.query.is_empty() {
                    self.clear_input(now);
                } else {
                    self.should_quit = true;
                }
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key, now),
            Focus::Details => self.handle_details_key(key, now),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Down => {
                if self.is_open {
                    self.highlight_next();
                } else {
                    self.is_open = true;
                }
            }
            KeyCode::Up => {
                if self.is_open {
                    self.highlight_prev();
                } else {
                    self.is_open = true;
                }
            }
            KeyCode::Enter => {
                if let Some(h) = self.highlighted {
                    self.activate(h, now);
                }
            }
            KeyCode::Tab => self.blur_input(),
            KeyCode::PageDown if self.is_open => {
                self.list.scroll_by(self.list.viewport_size() as isize);
            }
            KeyCode::PageUp if self.is_open => {
                self.list.scroll_by(-(self.list.viewport_size() as isize));
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.insert_char(c);
                self.on_input_changed(now);
            }
            KeyCode::Backspace => {
                if self.search.backspace() {
                    self.on_input_changed(now);
                }
            }
            KeyCode::Delete => {
                if self.search.delete() {
                    self.on_input_changed(now);
                }
            }
            KeyCode::Left => self.search.move_left(),
            KeyCode::Right => self.search.move_right(),
            KeyCode::Home => self.search.move_home(),
            KeyCode::End => self.search.move_end(),
            _ => {}
        }
    }

    fn handle_details_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Tab | KeyCode::Char('/') | KeyCode::Enter => self.focus_input(),

            // Any other printable char focuses the input and types it
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focus_input();
                self.search.move_end();
                self.search.insert_char(c);
                self.on_input_changed(now);
            }
            _ => {}
        }
    }

    // --- Mouse handling ---

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let pos = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.search.query.is_empty() && self.layout.clear_button.contains(pos) {
                    self.clear_input(now);
                } else if self.layout.input.contains(pos) {
                    self.focus_input();
                } else if let Some(index) = self.row_at(pos) {
                    self.activate(index, now);
                } else if self.is_open {
                    self.is_open = false;
                }
            }
            MouseEventKind::Moved => {
                if let Some(index) = self.row_at(pos) {
                    self.highlighted = Some(index);
                }
            }
            MouseEventKind::ScrollDown if self.row_at(pos).is_some() => {
                self.list.scroll_by(self.list.item_size() as isize);
            }
            MouseEventKind::ScrollUp if self.row_at(pos).is_some() => {
                self.list.scroll_by(-(self.list.item_size() as isize));
            }
            _ => {}
        }
    }

    /// Dropdown row under `pos`, only while the list is on screen
    fn row_at(&self, pos: Position) -> Option<usize> {
        if !self.list_shown() || !self.layout.list.contains(pos) {
            return None;
        }
        self.list.index_at((pos.y - self.layout.list.y) as usize)
    }
}
