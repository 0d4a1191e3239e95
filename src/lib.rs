//! Terminal catalog viewer for PokeAPI: generations load in order into a card
//! grid with live substring search and a hover-intent detail popover.

pub mod action;
pub mod api;
pub mod catalog;
pub mod effect;
pub mod error;
pub mod grid;
pub mod hover;
pub mod layout;
pub mod loader;
pub mod logging;
pub mod popover;
pub mod reducer;
pub mod sprite;
pub mod state;
pub mod theme;
pub mod ui;
