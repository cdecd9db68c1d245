use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::filter::{init_filter_state, MovieFilter};
use crate::data::import;
use crate::data::loader::DatasetLoader;
use crate::data::model::MovieDataset;
use crate::data::store::MovieStore;
use crate::report::{build_report, Page, Report, ReportBody};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistributionView {
    #[default]
    Histogram,
    Boxplot,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Runs report queries; owns the query cache.
    pub loader: DatasetLoader,

    /// Page selected in the sidebar menu.
    pub page: Page,

    /// Data for the selected page (None until loaded, or after a failure).
    pub report: Option<Report>,

    /// Load failure for the selected page only.
    pub page_error: Option<String>,

    /// Filter Data page selections.
    pub filter: MovieFilter,

    /// Rows passing `filter` (cached).
    pub filtered: Option<MovieDataset>,

    /// Histogram or box plot on the Rating Distribution page.
    pub distribution_view: DistributionView,

    /// Genre colours for the current report.
    pub colors: CategoryColors,

    /// Status message shown in the top bar (imports, database switches).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let loader = DatasetLoader::new(config.store()?, config.cache_enabled);
        Ok(Self {
            config,
            loader,
            page: Page::default(),
            report: None,
            page_error: None,
            filter: MovieFilter::default(),
            filtered: None,
            distribution_view: DistributionView::default(),
            colors: CategoryColors::default(),
            status_message: None,
        })
    }

    /// Switch pages and load the new page's data. Filter selections start
    /// over each time the filter page is entered.
    pub fn select_page(&mut self, page: Page) {
        if page != self.page || self.report.is_none() {
            self.page = page;
            self.filter = MovieFilter::default();
            self.refresh();
        }
    }

    /// Rebuild the current page's report through the cache.
    pub fn refresh(&mut self) {
        match build_report(self.page, &mut self.loader) {
            Ok(report) => {
                log::info!("Loaded \"{}\"", self.page.label());
                self.colors = report_colors(&report);
                // Freshly loaded data selects every genre it contains.
                if let ReportBody::Filter(ds) = &report.body {
                    self.filter.genres = init_filter_state(ds).genres;
                }
                self.report = Some(report);
                self.page_error = None;
            }
            Err(e) => {
                log::error!("Failed to load \"{}\": {e:#}", self.page.label());
                self.report = None;
                self.filtered = None;
                self.page_error = Some(format!("Error: {e:#}"));
            }
        }
        self.refilter();
    }

    /// Drop cached query results and load the current page again.
    pub fn reload(&mut self) {
        self.loader.reload();
        self.refresh();
    }

    /// Recompute `filtered` after a filter change.
    pub fn refilter(&mut self) {
        self.filter.sanitize();
        self.filtered = match self.report.as_ref().map(|r| &r.body) {
            Some(ReportBody::Filter(ds)) => Some(self.filter.apply(ds)),
            _ => None,
        };
    }

    /// Genres present in the filter page's data.
    pub fn available_genres(&self) -> BTreeSet<String> {
        match self.report.as_ref().map(|r| &r.body) {
            Some(ReportBody::Filter(ds)) => ds.genres.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Toggle a single genre in the filter.
    pub fn toggle_genre(&mut self, genre: &str) {
        let all = self.available_genres();
        let selected = self.filter.genres.get_or_insert(all);
        if !selected.remove(genre) {
            selected.insert(genre.to_string());
        }
        self.refilter();
    }

    pub fn select_all_genres(&mut self) {
        self.filter.genres = Some(self.available_genres());
        self.refilter();
    }

    pub fn select_no_genres(&mut self) {
        self.filter.genres = Some(BTreeSet::new());
        self.refilter();
    }

    /// Point the dashboard at another database file.
    pub fn open_database(&mut self, path: &Path) {
        match MovieStore::new(path, &self.config.table, self.config.busy_timeout) {
            Ok(store) => {
                log::info!("Switched to database {}", path.display());
                self.config.db_path = path.to_path_buf();
                self.loader.replace_store(store);
                self.status_message = Some(format!("Opened {}", path.display()));
                self.refresh();
            }
            Err(e) => {
                log::error!("Failed to open database: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Import a CSV/JSON movie list into the current database.
    pub fn import_file(&mut self, path: &Path) {
        match import::import_file(path, &self.config.db_path, &self.config.table) {
            Ok(n) => {
                self.status_message = Some(format!("Imported {n} movies from {}", path.display()));
                self.reload();
            }
            Err(e) => {
                log::error!("Failed to import {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn report_colors(report: &Report) -> CategoryColors {
    match &report.body {
        ReportBody::Bars { series, .. } | ReportBody::Pie(series) | ReportBody::Heatmap(series) => {
            CategoryColors::new(series.points.iter().map(|(label, _)| label.as_str()))
        }
        ReportBody::Filter(ds) => CategoryColors::new(ds.genres.iter().map(String::as_str)),
        _ => CategoryColors::default(),
    }
}
