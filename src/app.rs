use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use arboard::Clipboard;
use notify::RecommendedWatcher;
use ratatui::layout::Rect;

use crate::config::LocatorConfig;
use crate::keybinds::KeyBindings;
use crate::locator::Locator;
use crate::project::Project;
use crate::theme::Theme;
use crate::types::{Focus, OpenedFile};

mod core;
mod input;
mod viewer;

pub(crate) struct FsChangeEvent {
    pub(crate) paths: Vec<PathBuf>,
}

pub(crate) struct App {
    pub(crate) config: LocatorConfig,
    pub(crate) project: Project,
    pub(crate) locator: Locator,
    pub(crate) focus: Focus,
    pub(crate) opened: Option<OpenedFile>,
    pub(crate) status: String,
    pub(crate) quit: bool,
    pub(crate) help_open: bool,
    pub(crate) themes: Vec<Theme>,
    pub(crate) active_theme_index: usize,
    pub(crate) keybinds: KeyBindings,
    pub(crate) clipboard: Option<Clipboard>,
    pub(crate) viewer_rect: Rect,
    pub(crate) fs_watcher: Option<RecommendedWatcher>,
    pub(crate) fs_rx: Option<Receiver<FsChangeEvent>>,
    pub(crate) fs_refresh_pending: bool,
    pub(crate) fs_changed_paths: HashSet<PathBuf>,
    pub(crate) last_fs_refresh: Instant,
}
