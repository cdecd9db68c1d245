use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Table;

/// Render a result table with one header row. Empty tables show their header
/// and a "No rows" note.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(60.0), table.columns.len())
            .min_scrolled_height(0.0)
            .header(22.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, table.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.as_label());
                        });
                    }
                });
            });
    });

    if table.is_empty() {
        ui.label(egui::RichText::new("No rows").italics());
    }
}
