use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ratatui::layout::Rect;

use crate::config::ConfigFlags;
use crate::document::{DocumentAccess, DocumentNotice, Subscription};
use crate::editor::XmlBuffer;
use crate::geometry::{Region, ScaleTransform};
use crate::image::ImageInfo;
use crate::scheduler::{CoalescingScheduler, SyncTask};
use crate::sync::MarkupSynchronizer;
use crate::ui::viewport::{LineViewport, ViewportController};
use crate::zone::{DecoratorOptions, RegionDecorator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Image,
    Source,
}

/// Tunables taken from the merged config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOptions {
    pub caret_delay_ms: u64,
    pub reload_delay_ms: u64,
    pub decorator: DecoratorOptions,
    /// Initial scale is `2^scale_exp`.
    pub scale_exp: i32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self::from(&ConfigFlags::default())
    }
}

impl From<&ConfigFlags> for ModelOptions {
    fn from(flags: &ConfigFlags) -> Self {
        Self {
            caret_delay_ms: flags.caret_delay(),
            reload_delay_ms: flags.reload_delay(),
            decorator: DecoratorOptions {
                tolerance: flags.tolerance(),
                side_handles: flags.side_handles,
            },
            scale_exp: flags.scale_exp(),
        }
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. The buffer, the
/// decorator and the synchronizer are owned side by side so one update can
/// borrow all three.
pub struct Model {
    /// Path to the markup file
    pub file_path: PathBuf,
    /// Image the zones are drawn over, when one could be read
    pub image: Option<ImageInfo>,
    /// The markup source
    pub buffer: XmlBuffer,
    /// Live zones, active zone and drag state
    pub decorator: RegionDecorator,
    pub sync: MarkupSynchronizer,
    /// Zoom, pan and visibility of the image pane
    pub viewport: ViewportController,
    /// Scroll position of the source pane
    pub source_view: LineViewport,
    pub focus: Focus,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether the app should quit
    pub should_quit: bool,
    pub(super) quit_confirmed: bool,
    pub(super) options: ModelOptions,
    pub(super) scheduler: CoalescingScheduler<SyncTask>,
    /// Timer work came due while the image pane was hidden.
    pub(super) resync_pending: bool,
    notices: Receiver<DocumentNotice>,
    _subscription: Subscription,
    toast: Option<Toast>,
    terminal_size: (u16, u16),
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("zones", &self.decorator.zones().len())
            .field("active", &self.decorator.active())
            .field("focus", &self.focus)
            .field("viewport", &self.viewport)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(
        file_path: PathBuf,
        mut buffer: XmlBuffer,
        image: Option<ImageInfo>,
        options: ModelOptions,
        terminal_size: (u16, u16),
    ) -> Self {
        let (sender, notices) = mpsc::channel();
        let sync = MarkupSynchronizer::new(image.as_ref().map(|info| info.file_name.clone()));
        let subscription = buffer.subscribe(sync.forwarder(sender));
        let content = image.as_ref().map_or((0, 0), ImageInfo::size);
        let viewport = ViewportController::new(
            terminal_size.0,
            terminal_size.1,
            content,
            ScaleTransform::from_exponent(options.scale_exp),
        );
        let source_view = LineViewport::new(terminal_size.1, buffer.line_count());
        let mut model = Self {
            file_path,
            image,
            buffer,
            decorator: RegionDecorator::new(options.decorator),
            sync,
            viewport,
            source_view,
            focus: Focus::default(),
            help_visible: false,
            config_global_path: None,
            config_local_path: None,
            should_quit: false,
            quit_confirmed: false,
            options,
            scheduler: CoalescingScheduler::new(),
            resync_pending: false,
            notices,
            _subscription: subscription,
            toast: None,
            terminal_size,
        };
        model.reflow_layout();
        model
    }

    pub const fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub const fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    pub(super) fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.reflow_layout();
    }

    /// Size the image viewport and source scroller to the current panes.
    pub(super) fn reflow_layout(&mut self) {
        let (w, h) = self.terminal_size;
        let layout = crate::ui::pane_layout(Rect::new(0, 0, w, h), self.viewport.is_visible());
        if let Some(image) = layout.image {
            self.viewport.resize(image.width, image.height);
        }
        self.source_view.resize(layout.source.height);
        self.source_view.set_total_lines(self.buffer.line_count());
    }

    /// Document bounds for new and duplicated zones.
    pub fn image_bounds(&self) -> Option<Region> {
        self.image.as_ref().map(ImageInfo::bounds)
    }

    /// Rebuild zones from the markup and re-derive the active zone.
    pub fn resync(&mut self) {
        self.scheduler.cancel(SyncTask::ReloadZones);
        self.scheduler.cancel(SyncTask::SyncCaret);
        self.resync_pending = false;
        self.reload_zones();
        self.sync_caret();
    }

    fn reload_zones(&mut self) {
        match self.sync.reload(&self.buffer, &mut self.decorator) {
            Ok(_) => self.fit_content_to_zones(),
            Err(err) => self.show_toast(ToastLevel::Warning, format!("Zones not reloaded: {err}")),
        }
    }

    fn sync_caret(&mut self) {
        if let Err(err) = self.sync.sync_caret(&self.buffer, &mut self.decorator) {
            tracing::debug!(%err, "caret sync skipped");
        }
    }

    /// Without an image the pan range follows the zones instead.
    fn fit_content_to_zones(&mut self) {
        if self.image.is_some() {
            return;
        }
        let (w, h) = self
            .decorator
            .zones()
            .iter()
            .fold((0, 0), |(w, h), z| (w.max(z.region.right), h.max(z.region.bottom)));
        self.viewport.set_content(w, h);
    }

    /// Turn document notices into timer entries. Returns true if any
    /// notice arrived.
    pub fn pump_notices(&mut self, now_ms: u64) -> bool {
        let mut any = false;
        while let Ok(notice) = self.notices.try_recv() {
            any = true;
            match notice {
                DocumentNotice::Changed => {
                    self.scheduler.schedule(
                        SyncTask::ReloadZones,
                        self.options.reload_delay_ms,
                        now_ms,
                    );
                }
                DocumentNotice::CaretMoved(_) => {
                    self.scheduler.schedule(
                        SyncTask::SyncCaret,
                        self.options.caret_delay_ms,
                        now_ms,
                    );
                }
            }
        }
        any
    }

    /// Run timer work that has come due. Returns true if zones may have
    /// changed.
    pub fn run_due(&mut self, now_ms: u64) -> bool {
        let due = self.scheduler.take_due(now_ms);
        if due.is_empty() {
            return false;
        }
        if !self.viewport.is_visible() {
            tracing::debug!(?due, "image pane hidden, deferring until shown");
            self.resync_pending = true;
            return false;
        }
        for task in due {
            match task {
                SyncTask::ReloadZones => {
                    self.reload_zones();
                    self.sync_caret();
                }
                SyncTask::SyncCaret => self.sync_caret(),
            }
        }
        true
    }

    /// Earliest pending timer, for the event poll timeout.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn is_task_pending(&self, task: SyncTask) -> bool {
        self.scheduler.is_pending(task)
    }

    pub const fn resync_pending(&self) -> bool {
        self.resync_pending
    }

    /// Show or hide the image pane. Showing it again resyncs only when a
    /// due task was dropped while it was hidden.
    pub(super) fn set_image_visible(&mut self, visible: bool) {
        if self.viewport.set_visible(visible) && self.resync_pending {
            self.resync();
        }
        if !visible {
            self.focus = Focus::Source;
        }
        self.reflow_layout();
    }

    /// Mirror pending zone events into the markup.
    pub(super) fn apply_zone_events(&mut self) {
        for event in self.decorator.take_events() {
            if let Err(err) = self.sync.apply(&mut self.buffer, &mut self.decorator, &event) {
                self.show_toast(ToastLevel::Error, format!("Markup not updated: {err}"));
            }
        }
        self.source_view.set_total_lines(self.buffer.line_count());
        self.follow_caret();
    }

    pub(super) fn follow_caret(&mut self) {
        self.source_view.ensure_visible(self.buffer.cursor().line);
    }

    /// Whether the zone overlay changed since the last frame.
    pub fn take_repaint(&mut self) -> bool {
        let damage = self.decorator.take_damage(self.viewport.scale());
        if !damage.is_empty() {
            tracing::trace!(rects = damage.len(), "zone overlay damaged");
        }
        !damage.is_empty()
    }

    pub(super) fn reload_from_disk(&mut self) -> Result<()> {
        let text = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        self.buffer.replace_all(&text);
        self.resync();
        self.source_view.set_total_lines(self.buffer.line_count());
        self.follow_caret();
        Ok(())
    }

    pub(super) fn save_to_disk(&mut self) -> Result<()> {
        write_markup(&self.file_path, &self.buffer.contents())?;
        self.buffer.mark_clean();
        Ok(())
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

fn write_markup(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(
            PathBuf::new(),
            XmlBuffer::empty(),
            None,
            ModelOptions::default(),
            (80, 24),
        )
    }
}
