pub mod catalog;
pub mod config;
pub mod home;
pub mod input;
pub mod persist;
pub mod state;
pub mod view;

use anyhow::Result;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use catalog::ButtonCatalog;
use config::Config;
use home::HomeController;
use input::{Command, KeyPadController, HELP};
use persist::RecordStorage;
use state::{BoxEntry, BoxStore};
use view::BoxView;

/// Main application struct
pub struct App {
    store: Arc<BoxStore>,
    keypad: KeyPadController,
    home: HomeController,
    views: Vec<BoxView>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config, storage: Arc<dyn RecordStorage>) -> Result<Self> {
        let catalog = Arc::new(config.button_catalog()?);
        if catalog.is_empty() {
            warn!("Keypad catalog has no buttons");
        } else {
            debug!("Loaded {} keypad buttons", catalog.len());
        }
        Ok(Self::with_catalog(config, catalog, storage))
    }

    pub fn with_catalog(
        config: &Config,
        catalog: Arc<ButtonCatalog>,
        storage: Arc<dyn RecordStorage>,
    ) -> Self {
        let store = Arc::new(BoxStore::new(config.store_settings(), storage));
        let keypad = KeyPadController::new(store.clone(), catalog);
        let home = HomeController::new(store.clone());
        let views = (0..home.boxes())
            .map(|index| BoxView::attach(store.clone(), index))
            .collect();

        Self {
            store,
            keypad,
            home,
            views,
        }
    }

    pub fn store(&self) -> &Arc<BoxStore> {
        &self.store
    }

    pub fn views(&self) -> &[BoxView] {
        &self.views
    }

    /// Restore persisted boxes, refreshing each view as its box comes back
    pub fn start(&mut self) -> usize {
        let views = &mut self.views;
        self.home.on_ready_with(|slot, _| {
            if let Some(view) = views.get_mut(slot) {
                view.sync();
            }
        })
    }

    /// Apply one command and return the text to print.
    /// Returns `None` when the command asks to quit.
    pub fn execute(&mut self, command: Command) -> Option<String> {
        debug!("Executing {:?}", command);

        let output = match command {
            Command::Select(index) => {
                if index >= self.home.boxes() {
                    warn!("Box {} is outside the grid", index);
                }
                self.store.select_box(index);
                self.render()
            }
            Command::Press(key_id) => {
                self.keypad.press(key_id);
                self.render()
            }
            Command::Clear => {
                if let Some(index) = self.store.selected_index() {
                    self.store.update_box_value(index, BoxEntry::cleared());
                }
                self.render()
            }
            Command::Reset => {
                self.home.reset_all();
                self.render()
            }
            Command::Total => format!("total: {}", self.home.total_sum()),
            Command::Show => self.render(),
            Command::Keys => self.render_keys(),
            Command::Help => HELP.to_string(),
            Command::Quit => return None,
        };

        Some(output)
    }

    /// Bring every view and the keypad highlight up to date
    fn refresh(&mut self) {
        for view in &mut self.views {
            view.sync();
        }
        // Boxes change under a fixed binding too (last-box presses, reset)
        let index = self
            .store
            .selected_index()
            .unwrap_or(self.keypad.bound_index());
        self.keypad.set_bound_index(index);
    }

    /// Text rendering of the grid
    pub fn render(&mut self) -> String {
        self.refresh();

        let mut out = String::new();
        for view in &self.views {
            let marker = if view.is_selected() { '>' } else { ' ' };
            let _ = write!(out, "{}{}:[{:^4}] ", marker, view.index(), view.current_value());
        }
        let _ = write!(
            out,
            "\ntotal: {}  highlight: {}",
            self.home.total_sum(),
            self.keypad.current_highlighted_key()
        );
        out
    }

    fn render_keys(&self) -> String {
        let mut out = String::new();
        for (category, keys) in self.keypad.categories() {
            let _ = write!(out, "{:<10}", category.name());
            for key in keys {
                let _ = write!(out, " {}={}", key.id, key.label);
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// Read commands line by line until EOF or `quit`
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let restored = self.start();
        info!("Grid ready ({} boxes, {} restored)", self.home.boxes(), restored);

        let banner = self.render();
        output.write_all(format!("{}\n", banner).as_bytes()).await?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let text = match line.parse::<Command>() {
                Ok(command) => match self.execute(command) {
                    Some(text) => text,
                    None => break,
                },
                Err(e) => format!("error: {}", e),
            };

            output.write_all(format!("{}\n", text).as_bytes()).await?;
            output.flush().await?;
        }

        Ok(())
    }

    /// Drop all views, releasing their subscriptions
    pub fn shutdown(&mut self) {
        info!("Shutting down box-grid...");
        for view in self.views.drain(..) {
            view.retire();
        }
        info!("Shutdown complete");
    }
}
