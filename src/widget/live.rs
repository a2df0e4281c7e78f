//! Live chart instance: a [`ChartWidget`] plus its poll task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use super::poller::{self, PollStats, PollerConfig, ResetSignal};
use super::{ChartWidget, PollApply, PollTicket, RenderOptions, RenderedChart, WidgetError};
use crate::catalog::CategoryCatalog;
use crate::chart::{ChartConfig, Tooltip};
use crate::results::{ResultsApi, ResultsError, VoteCounts};
use crate::selector::{CategoryOption, SelectorView};

/// Callback invoked on every failed poll
pub type PollErrorHook = Arc<dyn Fn(&ResultsError) + Send + Sync>;

const RENDER_CHANNEL_CAPACITY: usize = 16;

/// State shared between the chart handle and its poll task
pub(super) struct Shared {
    pub(super) widget: Mutex<ChartWidget>,
    pub(super) api: Arc<dyn ResultsApi>,
    pub(super) renders: broadcast::Sender<Arc<RenderedChart>>,
    pub(super) latest: RwLock<Option<Arc<RenderedChart>>>,
    pub(super) stats: RwLock<PollStats>,
    pub(super) on_poll_error: Option<PollErrorHook>,
    pub(super) visible: watch::Sender<bool>,
    pub(super) live_loops: AtomicUsize,
}

impl Shared {
    /// Callers hold the widget lock so renders go out in order
    pub(super) async fn publish(&self, chart: Arc<RenderedChart>) {
        *self.latest.write().await = Some(chart.clone());
        // No subscribers is fine
        let _ = self.renders.send(chart);
    }
}

struct PollTask {
    ticket: PollTicket,
    handle: JoinHandle<()>,
}

/// A chart instance with a background poller.
///
/// At most one poll loop runs per instance; starting a new one aborts the
/// old one first. Dropping the instance stops polling.
pub struct LiveChart {
    shared: Arc<Shared>,
    poller: PollerConfig,
    reset: Option<broadcast::Sender<ResetSignal>>,
    task: Mutex<Option<PollTask>>,
}

impl LiveChart {
    pub fn new(
        catalog: CategoryCatalog,
        config: ChartConfig,
        poller: PollerConfig,
        api: Arc<dyn ResultsApi>,
    ) -> Self {
        let (renders, _) = broadcast::channel(RENDER_CHANNEL_CAPACITY);
        let (visible, _) = watch::channel(true);

        Self {
            shared: Arc::new(Shared {
                widget: Mutex::new(ChartWidget::new(catalog, config)),
                api,
                renders,
                latest: RwLock::new(None),
                stats: RwLock::new(PollStats::default()),
                on_poll_error: None,
                visible,
                live_loops: AtomicUsize::new(0),
            }),
            poller,
            reset: None,
            task: Mutex::new(None),
        }
    }

    /// Listen for reset signals on a shared channel
    pub fn with_reset_channel(mut self, reset: broadcast::Sender<ResetSignal>) -> Self {
        self.reset = Some(reset);
        self
    }

    /// Must be called before polling starts
    pub fn with_error_hook(mut self, hook: PollErrorHook) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.on_poll_error = Some(hook);
        } else {
            tracing::warn!("Poll error hook ignored: chart already shared");
        }
        self
    }

    /// Select a category, draw it, and restart polling for it
    pub async fn set_active(&self, index: usize) -> Result<Arc<RenderedChart>, WidgetError> {
        // Task lock first, as in start_polling, so the poller follows the last selection
        let mut task = self.task.lock().await;
        let mut widget = self.shared.widget.lock().await;
        let chart = Arc::new(widget.set_active(index)?);
        self.shared.publish(chart.clone()).await;
        let ticket = widget.begin_poll(index)?;
        drop(widget);

        tracing::info!(
            index,
            category = chart.category_number,
            animated = chart.is_animated(),
            "Category selected"
        );

        self.spawn_poller(&mut task, ticket);
        Ok(chart)
    }

    pub async fn render(
        &self,
        index: usize,
        options: RenderOptions,
    ) -> Result<Arc<RenderedChart>, WidgetError> {
        let mut widget = self.shared.widget.lock().await;
        let chart = Arc::new(widget.render(index, options)?);
        self.shared.publish(chart.clone()).await;
        drop(widget);
        Ok(chart)
    }

    /// Replace the poll loop with one for `index`
    pub async fn start_polling(&self, index: usize) -> Result<(), WidgetError> {
        let mut task = self.task.lock().await;
        let ticket = self.shared.widget.lock().await.begin_poll(index)?;
        self.spawn_poller(&mut task, ticket);
        Ok(())
    }

    fn spawn_poller(&self, task: &mut Option<PollTask>, ticket: PollTicket) {
        if let Some(old) = task.take() {
            old.handle.abort();
            tracing::debug!(index = old.ticket.index, "Poller stopped");
        }

        let reset = self.reset.as_ref().map(broadcast::Sender::subscribe);
        let handle = tokio::spawn(poller::run(
            self.shared.clone(),
            ticket,
            self.poller.clone(),
            reset,
        ));

        *task = Some(PollTask { ticket, handle });
    }

    /// Stop polling; the last render stays available
    pub async fn stop(&self) {
        if let Some(old) = self.task.lock().await.take() {
            old.handle.abort();
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.task.lock().await.is_some()
    }

    /// Fetch the polled category once, outside the interval
    pub async fn refresh_now(&self) -> Option<PollApply> {
        let ticket = match self.task.lock().await.as_ref() {
            Some(task) => task.ticket,
            None => {
                let widget = self.shared.widget.lock().await;
                widget.current_ticket(widget.active())
            }
        };
        poller::fetch_and_apply(&self.shared, ticket).await
    }

    /// Replace counts for several categories and redraw statically
    pub async fn update_vote_data(
        &self,
        snapshot: HashMap<usize, VoteCounts>,
    ) -> Result<Arc<RenderedChart>, WidgetError> {
        let mut widget = self.shared.widget.lock().await;
        let chart = Arc::new(widget.update_vote_data(snapshot)?);
        self.shared.publish(chart.clone()).await;
        drop(widget);
        Ok(chart)
    }

    /// Pause or resume interval fetches; resuming fetches immediately
    pub fn set_visible(&self, visible: bool) {
        self.shared.visible.send_if_modified(|current| {
            if *current == visible {
                return false;
            }
            *current = visible;
            true
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.shared.visible.borrow()
    }

    pub async fn build_options(&self) -> Vec<CategoryOption> {
        self.shared.widget.lock().await.build_options()
    }

    pub async fn selector_views(&self) -> Vec<SelectorView> {
        self.shared.widget.lock().await.selector_views()
    }

    pub async fn active(&self) -> usize {
        self.shared.widget.lock().await.active()
    }

    pub async fn catalog(&self) -> CategoryCatalog {
        self.shared.widget.lock().await.catalog().clone()
    }

    pub async fn latest(&self) -> Option<Arc<RenderedChart>> {
        self.shared.latest.read().await.clone()
    }

    /// Tooltip for a pointer position on the latest render
    pub async fn hit_test(&self, x: f64, y: f64) -> Option<Tooltip> {
        self.latest().await?.scene.hit_test(x, y)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RenderedChart>> {
        self.shared.renders.subscribe()
    }

    pub async fn stats(&self) -> PollStats {
        self.shared.stats.read().await.clone()
    }

    /// Poll loops currently running for this instance
    pub fn live_loops(&self) -> usize {
        self.shared.live_loops.load(Ordering::SeqCst)
    }
}

impl Drop for LiveChart {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.handle.abort();
        }
    }
}
