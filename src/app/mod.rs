//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions, including the markup edits a zone
//!   gesture produces
//! - [`App::run`]: Main event loop with rendering and the sync timers

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Focus, Model, ModelOptions, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::config::ConfigFlags;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    image_path: Option<PathBuf>,
    options: ModelOptions,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the given markup file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            image_path: None,
            options: ModelOptions::default(),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Image to draw zones over. Without one the first `graphic/@url` in the
    /// markup is used.
    pub fn with_image(mut self, path: Option<PathBuf>) -> Self {
        self.image_path = path;
        self
    }

    /// Timers, hit tolerance and initial zoom from the merged config.
    pub fn with_config(mut self, flags: &ConfigFlags) -> Self {
        self.options = ModelOptions::from(flags);
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;
