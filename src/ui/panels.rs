use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{DurationBucket, RATING_STEP, VOTES_STEP};
use crate::report::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – page menu
// ---------------------------------------------------------------------------

/// Render the sidebar menu. Selecting an entry loads that page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("🎬 IMDB Dashboard");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for page in Page::ALL {
                if ui
                    .selectable_label(state.page == page, page.label())
                    .clicked()
                {
                    state.select_page(page);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Filter controls (Filter Data page)
// ---------------------------------------------------------------------------

/// Render the four filter inputs in two columns and refilter on change.
pub fn filter_controls(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;
    let genres = state.available_genres();

    ui.columns(2, |cols: &mut [Ui]| {
        let ui = &mut cols[0];
        ui.strong("Duration (Hours)");
        egui::ComboBox::from_id_salt("duration_bucket")
            .selected_text(state.filter.duration.label())
            .show_ui(ui, |ui: &mut Ui| {
                for bucket in DurationBucket::ALL {
                    changed |= ui
                        .selectable_value(&mut state.filter.duration, bucket, bucket.label())
                        .changed();
                }
            });
        ui.add_space(6.0);
        changed |= ui
            .add(
                egui::Slider::new(&mut state.filter.min_rating, 0.0..=10.0)
                    .step_by(RATING_STEP)
                    .text("Minimum Rating"),
            )
            .changed();

        let ui = &mut cols[1];
        ui.horizontal(|ui: &mut Ui| {
            ui.strong("Minimum Voting Counts");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut state.filter.min_votes)
                        .speed(VOTES_STEP as f64)
                        .range(0..=u64::MAX),
                )
                .changed();
        });

        let n_selected = state.filter.genres.as_ref().map_or(genres.len(), |g| g.len());
        egui::CollapsingHeader::new(
            RichText::new(format!("Select Genre(s)  ({n_selected}/{})", genres.len())).strong(),
        )
        .id_salt("genre_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_genres();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_genres();
                }
            });

            for genre in &genres {
                let mut checked = state
                    .filter
                    .genres
                    .as_ref()
                    .map_or(true, |g| g.contains(genre));
                let text = RichText::new(genre).color(state.colors.color_for(genre));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_genre(genre);
                }
            }
        });
    });

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open database…").clicked() {
                open_database_dialog(state);
                ui.close_menu();
            }
            if ui.button("Import movies…").clicked() {
                import_dialog(state);
                ui.close_menu();
            }
        });

        if ui.button("Reload data").clicked() {
            state.reload();
        }

        ui.separator();

        ui.label(format!(
            "{} · table {}",
            state.config.db_path.display(),
            state.config.table
        ));

        ui.separator();

        let (hits, misses) = state.loader.cache().stats();
        ui.label(format!("cache: {} queries, {hits} hits / {misses} misses", state.loader.cache().len()))
            .on_hover_text("Results are reused until \"Reload data\"");

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_database_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie database")
        .add_filter("SQLite database", &["db", "sqlite", "sqlite3"])
        .pick_file();

    if let Some(path) = file {
        state.open_database(&path);
    }
}

pub fn import_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Import movie list")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.import_file(&path);
    }
}
