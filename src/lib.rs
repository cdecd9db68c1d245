//! Analytics dashboard over the IMDB 2024 movie list.
//!
//! The [`data`] layer loads the movie table from SQLite, normalises its
//! free-text duration and vote-count columns, filters and summarises it.
//! [`report`] turns a sidebar [`report::Page`] into chart or table content,
//! which the egui front end in [`app`] and [`ui`] renders.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod report;
pub mod state;
pub mod ui;
