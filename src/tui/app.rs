//! Viewer Application State
//! Tabs, search, selection and the background dataset load.

use std::sync::mpsc::{channel, Receiver};
use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use crate::data::{DatasetLayout, LoaderError, ZoneRecord};
use crate::session::{UrbanUnit, ViewerSession};
use crate::stats::UrbanUnitStats;

/// Dataset loading result from the background thread.
pub enum LoadResult {
    Progress(f32, String),
    Complete(Box<ViewerSession>),
    Error(LoaderError),
}

/// Viewer tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Units,
    Zones,
    Help,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Units, Tab::Zones, Tab::Help];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Aperçu",
            Tab::Units => "Unités urbaines",
            Tab::Zones => "Zones",
            Tab::Help => "Aide",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Number of lines a page movement jumps.
const PAGE_STEP: usize = 10;

/// Main application state.
pub struct App {
    pub tab: Tab,
    pub session: Option<ViewerSession>,
    pub progress: f32,
    pub status: String,
    pub fatal: Option<LoaderError>,

    pub search: String,
    pub searching: bool,
    /// Indices into `session.units` matching the current search.
    pub filtered_units: Vec<usize>,
    /// Position within `filtered_units`.
    pub unit_selected: usize,
    pub unit_list_state: ListState,

    pub zones_scroll: usize,
    pub zones_show_all: bool,

    pub should_quit: bool,

    load_rx: Option<Receiver<LoadResult>>,
}

impl App {
    /// Start the viewer: the dataset loads in a background thread while the
    /// UI renders progress.
    pub fn new(layout: DatasetLayout) -> Self {
        let (tx, rx) = channel();

        thread::spawn(move || {
            let progress_tx = tx.clone();
            let result = ViewerSession::load_with(&layout, &move |pct, msg| {
                let _ = progress_tx.send(LoadResult::Progress(pct, msg.to_string()));
            });
            let _ = match result {
                Ok(session) => tx.send(LoadResult::Complete(Box::new(session))),
                Err(err) => tx.send(LoadResult::Error(err)),
            };
        });

        let mut app = Self::empty();
        app.load_rx = Some(rx);
        app
    }

    /// Build an app around an already-loaded session (tests, mostly).
    pub fn with_session(session: ViewerSession) -> Self {
        let mut app = Self::empty();
        app.install_session(session);
        app
    }

    fn empty() -> Self {
        Self {
            tab: Tab::Overview,
            session: None,
            progress: 0.0,
            status: "Chargement des données...".to_string(),
            fatal: None,
            search: String::new(),
            searching: false,
            filtered_units: Vec::new(),
            unit_selected: 0,
            unit_list_state: ListState::default(),
            zones_scroll: 0,
            zones_show_all: false,
            should_quit: false,
            load_rx: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_none() && self.fatal.is_none()
    }

    /// Drain pending results from the loading thread.
    pub fn check_load_results(&mut self) {
        // Take the receiver temporarily to avoid borrow issues
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        let mut should_keep_receiver = true;

        while let Ok(result) = rx.try_recv() {
            match result {
                LoadResult::Progress(progress, status) => {
                    self.progress = progress;
                    self.status = status;
                }
                LoadResult::Complete(session) => {
                    self.install_session(*session);
                    should_keep_receiver = false;
                }
                LoadResult::Error(err) => {
                    // Fatal: the loop tears the terminal down and the
                    // process exits non-zero
                    self.fatal = Some(err);
                    self.should_quit = true;
                    should_keep_receiver = false;
                }
            }
        }

        if should_keep_receiver {
            self.load_rx = Some(rx);
        }
    }

    fn install_session(&mut self, session: ViewerSession) {
        self.progress = 100.0;
        self.status = format!(
            "{} zones géographiques, {} unités urbaines, période {}",
            session.summary.row_count,
            session.summary.unit_count,
            year_span(&session.summary.years),
        );
        self.session = Some(session);
        self.apply_search();
    }

    /// Handle one key press.
    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.is_loading() {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.should_quit = true;
            }
            return;
        }

        if self.searching {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.searching = false,
                KeyCode::Backspace => {
                    self.search.pop();
                    self.apply_search();
                }
                KeyCode::Char(c) => {
                    self.search.push(c);
                    self.apply_search();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.set_tab(self.tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.set_tab(self.tab.prev()),
            KeyCode::Char('1') => self.set_tab(Tab::Overview),
            KeyCode::Char('2') => self.set_tab(Tab::Units),
            KeyCode::Char('3') => self.set_tab(Tab::Zones),
            KeyCode::Char('4') => self.set_tab(Tab::Help),
            KeyCode::Char('/') if self.tab == Tab::Units => self.searching = true,
            KeyCode::Char('a') if self.tab == Tab::Zones => {
                self.zones_show_all = !self.zones_show_all;
                self.zones_scroll = 0;
            }
            KeyCode::Enter if self.tab == Tab::Units => {
                self.zones_show_all = false;
                self.zones_scroll = 0;
                self.tab = Tab::Zones;
            }
            KeyCode::Up => self.move_up(1),
            KeyCode::Down => self.move_down(1),
            KeyCode::PageUp => self.move_up(PAGE_STEP),
            KeyCode::PageDown => self.move_down(PAGE_STEP),
            KeyCode::Home => self.move_home(),
            _ => {}
        }
    }

    fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    fn move_up(&mut self, step: usize) {
        match self.tab {
            Tab::Units => self.move_selection(-(step as isize)),
            Tab::Zones => self.zones_scroll = self.zones_scroll.saturating_sub(step),
            _ => {}
        }
    }

    fn move_down(&mut self, step: usize) {
        match self.tab {
            Tab::Units => self.move_selection(step as isize),
            Tab::Zones => {
                let max = self.zone_rows().len().saturating_sub(1);
                self.zones_scroll = (self.zones_scroll + step).min(max);
            }
            _ => {}
        }
    }

    fn move_home(&mut self) {
        match self.tab {
            Tab::Units => {
                self.unit_selected = 0;
                self.zones_scroll = 0;
            }
            Tab::Zones => self.zones_scroll = 0,
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.filtered_units.is_empty() {
            return;
        }
        let max = self.filtered_units.len() as isize - 1;
        let next = (self.unit_selected as isize + delta).clamp(0, max);
        if next as usize != self.unit_selected {
            self.unit_selected = next as usize;
            self.zones_scroll = 0;
        }
    }

    /// Recompute the unit list for the current search text.
    fn apply_search(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let needle = self.search.to_lowercase();
        self.filtered_units = session
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| {
                needle.is_empty() || unit.libelle_uu.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        self.unit_selected = self
            .unit_selected
            .min(self.filtered_units.len().saturating_sub(1));
        self.zones_scroll = 0;
    }

    pub fn selected_unit(&self) -> Option<&UrbanUnit> {
        let session = self.session.as_ref()?;
        let idx = *self.filtered_units.get(self.unit_selected)?;
        session.units.get(idx)
    }

    pub fn selected_unit_stats(&self) -> Option<&UrbanUnitStats> {
        let session = self.session.as_ref()?;
        session.unit_stats(&self.selected_unit()?.code_uu)
    }

    /// Rows for the zones table: the selected unit's, or everything.
    pub fn zone_rows(&self) -> Vec<&ZoneRecord> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        if self.zones_show_all {
            session.zones_for(None)
        } else {
            match self.selected_unit() {
                Some(unit) => session.zones_for(Some(&unit.code_uu)),
                None => session.zones_for(None),
            }
        }
    }
}

fn year_span(years: &[String]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => format!("{first}-{last}"),
        (Some(first), _) => first.clone(),
        _ => "aucune année".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetLayout, RateBand};
    use crate::session::{DatasetSummary, UrbanUnit};
    use crate::stats::StatsCalculator;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_session() -> ViewerSession {
        let records: Vec<ZoneRecord> = [
            ("2019", "00851", "Paris", "moins de 2,5"),
            ("2020", "00851", "Paris", "plus de 10"),
            ("2019", "00758", "Lyon", "de 5 à 10"),
            ("2019", "00501", "Marseille", "plus de 15"),
        ]
        .iter()
        .map(|(year, code, label, band)| ZoneRecord {
            year: year.to_string(),
            code_uu: code.to_string(),
            libelle_uu: label.to_string(),
            band_label: band.to_string(),
            band: RateBand::parse(band).unwrap(),
        })
        .collect();

        let stats = StatsCalculator::compute_all_parallel(&records);
        let mut units: Vec<UrbanUnit> = records
            .iter()
            .map(|r| UrbanUnit {
                code_uu: r.code_uu.clone(),
                libelle_uu: r.libelle_uu.clone(),
            })
            .collect();
        units.dedup_by(|a, b| a.code_uu == b.code_uu);
        units.sort_by(|a, b| a.libelle_uu.cmp(&b.libelle_uu));

        ViewerSession {
            summary: DatasetSummary {
                row_count: records.len(),
                years: vec!["2019".to_string(), "2020".to_string()],
                unit_count: units.len(),
                manifest: None,
            },
            records,
            units,
            stats,
        }
    }

    #[test]
    fn test_tab_cycling() {
        let mut app = App::with_session(test_session());
        assert_eq!(app.tab, Tab::Overview);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Units);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Zones);
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.tab, Tab::Units);
        app.on_key(key(KeyCode::Char('4')));
        assert_eq!(app.tab, Tab::Help);
    }

    #[test]
    fn test_quit_key() {
        let mut app = App::with_session(test_session());
        assert!(!app.should_quit);
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_loading() {
        let mut app = App::empty();
        assert!(app.is_loading());
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_search_filters_units() {
        let mut app = App::with_session(test_session());
        app.on_key(key(KeyCode::Char('2')));
        assert_eq!(app.filtered_units.len(), 3);

        app.on_key(key(KeyCode::Char('/')));
        assert!(app.searching);
        for c in "par".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.filtered_units.len(), 1);
        assert_eq!(app.selected_unit().unwrap().libelle_uu, "Paris");

        // While searching, 'q' types instead of quitting
        app.on_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.filtered_units.len(), 0);

        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Enter));
        assert!(!app.searching);
        assert_eq!(app.filtered_units.len(), 1);
    }

    #[test]
    fn test_selection_clamps() {
        let mut app = App::with_session(test_session());
        app.on_key(key(KeyCode::Char('2')));

        app.on_key(key(KeyCode::Up));
        assert_eq!(app.unit_selected, 0);
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.unit_selected, 1);
        app.on_key(key(KeyCode::PageDown));
        assert_eq!(app.unit_selected, 2);
        app.on_key(key(KeyCode::Home));
        assert_eq!(app.unit_selected, 0);
    }

    #[test]
    fn test_enter_opens_zones_for_selected_unit() {
        let mut app = App::with_session(test_session());
        app.on_key(key(KeyCode::Char('2')));
        app.on_key(key(KeyCode::Down));
        let selected = app.selected_unit().unwrap().code_uu.clone();

        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.tab, Tab::Zones);
        assert!(app.zone_rows().iter().all(|z| z.code_uu == selected));

        app.on_key(key(KeyCode::Char('a')));
        assert_eq!(app.zone_rows().len(), 4);
    }

    #[test]
    fn test_load_error_is_fatal() {
        let mut app = App::empty();
        let (tx, rx) = channel();
        app.load_rx = Some(rx);
        tx.send(LoadResult::Error(LoaderError::DataNotFound {
            dir: "/nowhere".into(),
        }))
        .unwrap();

        app.check_load_results();
        assert!(app.should_quit);
        assert!(app.fatal.is_some());
    }

    #[test]
    fn test_background_load_completes() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());
        std::fs::write(
            layout.year_file("2019"),
            "annee,code_uu,libelle_uu,classe\n2019,00851,Paris,\"moins de 2,5\"\n",
        )
        .unwrap();

        let mut app = App::new(layout);
        // Poll until the loading thread reports completion
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while app.is_loading() && std::time::Instant::now() < deadline {
            app.check_load_results();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(!app.is_loading());
        assert_eq!(app.session.as_ref().unwrap().summary.row_count, 1);
        assert_eq!(app.filtered_units.len(), 1);
    }
}
