use super::{App, FsChangeEvent};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use arboard::Clipboard;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::layout::Rect;

use crate::config::LocatorConfig;
use crate::keybinds::KeyBindings;
use crate::locator::{Locator, LocatorOptions};
use crate::persistence::{PersistedState, save_persisted_state};
use crate::project::Project;
use crate::theme::{Theme, load_themes, theme_index_by_name};
use crate::types::{Focus, OpenedFile};
use crate::util::text_to_lines;

impl App {
    pub(crate) const FS_REFRESH_DEBOUNCE_MS: u64 = 120;

    pub(crate) fn new(target: &Path, config: LocatorConfig, keybinds: KeyBindings) -> io::Result<Self> {
        let project = Project::open(target, &config.ignore_dirs)?;
        let themes = load_themes();
        let active_theme_index = theme_index_by_name(&themes, config.theme.as_deref());
        let locator = Locator::new(LocatorOptions::from(&config));
        let status = format!("{} files", project.len());
        Ok(Self {
            config,
            project,
            locator,
            focus: Focus::Locator,
            opened: None,
            status,
            quit: false,
            help_open: false,
            themes,
            active_theme_index,
            keybinds,
            clipboard: None,
            viewer_rect: Rect::default(),
            fs_watcher: None,
            fs_rx: None,
            fs_refresh_pending: false,
            fs_changed_paths: HashSet::new(),
            last_fs_refresh: Instant::now(),
        })
    }

    /// Attach the system clipboard; headless sessions simply go without paste.
    pub(crate) fn attach_clipboard(&mut self) {
        match Clipboard::new() {
            Ok(clipboard) => self.clipboard = Some(clipboard),
            Err(err) => tracing::info!(%err, "clipboard unavailable"),
        }
    }

    pub(crate) fn start_fs_watcher(&mut self) {
        let (tx, rx) = mpsc::channel::<FsChangeEvent>();
        let mut watcher = match RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(FsChangeEvent { paths: event.paths });
                }
            },
            Config::default().with_poll_interval(Duration::from_millis(250)),
        ) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(%err, "filesystem watch unavailable");
                self.set_status(format!("Filesystem watch unavailable: {err}"));
                return;
            }
        };
        let root = self.project.root().to_path_buf();
        if let Err(err) = watcher.watch(&root, RecursiveMode::Recursive) {
            tracing::warn!(%err, root = %root.display(), "filesystem watch unavailable");
            self.set_status(format!("Filesystem watch unavailable: {err}"));
            return;
        }
        self.fs_rx = Some(rx);
        self.fs_watcher = Some(watcher);
        self.fs_refresh_pending = false;
        self.fs_changed_paths.clear();
        self.last_fs_refresh = Instant::now();
    }

    pub(crate) fn poll_fs_changes(&mut self) -> io::Result<()> {
        if let Some(rx) = self.fs_rx.as_ref() {
            while let Ok(change) = rx.try_recv() {
                for path in change.paths {
                    if self.is_relevant_change(&path) {
                        self.fs_changed_paths.insert(path);
                    }
                }
            }
        }
        if !self.fs_changed_paths.is_empty() {
            self.fs_refresh_pending = true;
        }
        if self.fs_refresh_pending
            && self.last_fs_refresh.elapsed() >= Duration::from_millis(Self::FS_REFRESH_DEBOUNCE_MS)
        {
            tracing::debug!(changed = self.fs_changed_paths.len(), "project files changed");
            let opened_changed = self
                .opened
                .as_ref()
                .is_some_and(|f| self.fs_changed_paths.contains(&f.path));
            self.fs_changed_paths.clear();
            self.fs_refresh_pending = false;
            self.last_fs_refresh = Instant::now();
            self.refresh_project()?;
            if opened_changed {
                self.reload_opened_file();
            }
        }
        Ok(())
    }

    /// Re-read the viewed file after it changed on disk, keeping the scroll position.
    fn reload_opened_file(&mut self) {
        let Some(file) = self.opened.as_mut() else {
            return;
        };
        match fs::read(&file.path) {
            Ok(bytes) => {
                file.lines = text_to_lines(&String::from_utf8_lossy(&bytes));
                file.scroll = file.scroll.min(file.lines.len().saturating_sub(1));
            }
            Err(err) => {
                tracing::debug!(file = %file.name, %err, "viewed file no longer readable");
            }
        }
    }

    /// Changes inside hidden or ignored directories never affect the file list.
    fn is_relevant_change(&self, path: &Path) -> bool {
        if self.project.manifest().is_some_and(|m| m == path) {
            return true;
        }
        let rel = path.strip_prefix(self.project.root()).unwrap_or(path);
        !rel.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('.') || self.config.ignore_dirs.iter().any(|d| d.as_str() == name.as_ref())
        })
    }

    pub(crate) fn refresh_project(&mut self) -> io::Result<()> {
        self.project.reload()?;
        if self.locator.is_popup_visible() || !self.locator.text().is_empty() {
            self.locator.refresh(&self.project);
        }
        Ok(())
    }

    pub(crate) fn reload_project(&mut self) -> io::Result<()> {
        self.refresh_project()?;
        self.set_status(format!("Reloaded project: {} files", self.project.len()));
        Ok(())
    }

    pub(crate) fn active_theme(&self) -> &Theme {
        &self.themes[self.active_theme_index.min(self.themes.len() - 1)]
    }

    pub(crate) fn next_theme(&mut self) {
        if self.themes.is_empty() {
            return;
        }
        self.active_theme_index = (self.active_theme_index + 1) % self.themes.len();
        let name = self.active_theme().name.clone();
        self.set_status(format!("Theme: {name}"));
    }

    pub(crate) fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = status.into();
    }

    /// Focus the locator text box and re-show its popup if it holds a query.
    pub(crate) fn focus_locator(&mut self) {
        self.focus = Focus::Locator;
        self.locator.open();
    }

    pub(crate) fn focus_viewer(&mut self) {
        self.focus = Focus::Viewer;
        self.locator.close();
    }

    pub(crate) fn toggle_focus(&mut self) {
        match self.focus {
            Focus::Locator => self.focus_viewer(),
            Focus::Viewer => self.focus_locator(),
        }
    }

    /// Load a project file into the viewer.
    pub(crate) fn open_file(&mut self, name: &str) -> io::Result<()> {
        let path = self.project.absolute_path(name);
        let bytes = fs::read(&path)?;
        let text = String::from_utf8_lossy(&bytes);
        let lines = text_to_lines(&text);
        tracing::info!(file = %name, lines = lines.len(), "opened file");
        self.opened = Some(OpenedFile {
            name: name.to_string(),
            path,
            lines,
            scroll: 0,
        });
        self.focus = Focus::Viewer;
        self.set_status(format!("Opened {name}"));
        Ok(())
    }

    pub(crate) fn restore_persisted_state(&mut self, state: &PersistedState) {
        if self.config.theme.is_none() && state.theme_name.is_some() {
            self.active_theme_index = theme_index_by_name(&self.themes, state.theme_name.as_deref());
        }
        if let Some(query) = state.last_query.as_deref() {
            self.locator.restore(query, &self.project);
        }
        if let Some(name) = state.last_opened.as_deref()
            && let Err(err) = self.open_file(name)
        {
            tracing::debug!(file = %name, %err, "last opened file not restored");
        }
        self.focus = Focus::Locator;
    }

    pub(crate) fn persisted_state(&self) -> PersistedState {
        let query = self.locator.text();
        PersistedState {
            theme_name: Some(self.active_theme().name.clone()),
            last_query: (!query.is_empty()).then(|| query.to_string()),
            last_opened: self.opened.as_ref().map(|f| f.name.clone()),
        }
    }

    pub(crate) fn persist_state(&self) {
        if let Err(err) = save_persisted_state(&self.persisted_state()) {
            tracing::warn!(%err, "failed to save state");
        }
    }
}
