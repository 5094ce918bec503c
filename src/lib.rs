//! Habit tracking core: an embedded habit store, the repository contract
//! over it, and the controllers that turn repository results into
//! [`models::ViewState`] snapshots for a UI to render.

pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
