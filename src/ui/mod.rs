/// egui rendering of the application state.
///
/// * `panels` – top bar, sidebar menu and filter widgets, file dialogs
/// * `pages`  – the three pages of the central panel
/// * `table`  – sorted listings table
/// * `map`    – marker map and scatter map
/// * `charts` – bar and pie charts
pub mod charts;
pub mod map;
pub mod pages;
pub mod panels;
pub mod table;
