//! View binding: egui panels and plots drawn from [`crate::state::AppState`].

pub mod panels;
pub mod plot;
pub mod table;
