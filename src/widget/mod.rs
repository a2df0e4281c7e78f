//! Chart Widget
//!
//! One live results chart instance. [`ChartWidget`] is the synchronous
//! state machine (vote data, axis, animate-once bookkeeping, selection);
//! [`LiveChart`] wraps it with the background poller; [`ChartHost`] owns
//! the catalog and hands out instances.
//!
//! Every poll request carries a [`PollTicket`]. A result is only applied
//! when its ticket's generation is still current, so a slow response for
//! a category the user has already left can never overwrite the chart.

mod host;
mod live;
mod poller;

pub use host::ChartHost;
pub use live::{LiveChart, PollErrorHook};
pub use poller::{PollStats, PollerConfig, ResetSignal};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Category, CategoryCatalog};
use crate::chart::{
    build_scene, join_results, svg, AnimationPlan, AxisScaler, ChartConfig, ChartDataPoint,
    ChartScene,
};
use crate::results::VoteCounts;
use crate::selector::{CategoryOption, CategorySelector, SelectorView};

/// Widget errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Unknown category index {index} (catalog has {len})")]
    UnknownCategory { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Play the grow-in even if the category has been shown before
    pub animate_replay: bool,
}

impl RenderOptions {
    pub fn replay() -> Self {
        Self {
            animate_replay: true,
        }
    }
}

/// Output of one render pass
#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub index: usize,
    pub category_number: u32,
    pub title: String,
    pub points: Vec<ChartDataPoint>,
    pub axis_max: u64,
    #[serde(skip)]
    pub scene: ChartScene,
    #[serde(skip)]
    pub svg: String,
    pub animation: Option<AnimationPlan>,
    pub rendered_at: DateTime<Utc>,
}

impl RenderedChart {
    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}

/// Identity of one poll request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PollTicket {
    pub index: usize,
    pub generation: u64,
}

/// What happened to a poll result
#[derive(Debug, Clone)]
pub enum PollApply {
    /// Stored and the active chart was redrawn
    Rendered(Arc<RenderedChart>),
    /// Stored for a category that is not on screen
    Stored,
    /// Ticket superseded; result dropped
    Stale,
}

/// Synchronous state of one chart instance
#[derive(Debug)]
pub struct ChartWidget {
    catalog: CategoryCatalog,
    config: ChartConfig,
    axis: AxisScaler,
    selector: CategorySelector,
    vote_data: HashMap<usize, VoteCounts>,
    animated: HashSet<usize>,
    generation: u64,
}

impl ChartWidget {
    pub fn new(catalog: CategoryCatalog, config: ChartConfig) -> Self {
        Self {
            selector: CategorySelector::new(&catalog),
            axis: config.axis(),
            catalog,
            config,
            vote_data: HashMap::new(),
            animated: HashSet::new(),
            generation: 0,
        }
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn active(&self) -> usize {
        self.selector.active()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn axis_max(&self) -> u64 {
        self.axis.current_max()
    }

    pub fn build_options(&self) -> Vec<CategoryOption> {
        self.selector.options().to_vec()
    }

    pub fn selector_views(&self) -> Vec<SelectorView> {
        self.selector.views()
    }

    /// Whether the category has played its grow-in this session
    pub fn has_animated(&self, index: usize) -> bool {
        self.animated.contains(&index)
    }

    pub fn vote_data(&self, index: usize) -> Option<&VoteCounts> {
        self.vote_data.get(&index)
    }

    fn category(&self, index: usize) -> Result<&Category, WidgetError> {
        self.catalog.get(index).ok_or(WidgetError::UnknownCategory {
            index,
            len: self.catalog.len(),
        })
    }

    /// Nominees joined with the latest counts, zero where unknown
    pub fn chart_data(&self, index: usize) -> Result<Vec<ChartDataPoint>, WidgetError> {
        let category = self.category(index)?;
        Ok(join_results(category, self.vote_data.get(&index)))
    }

    /// Select a category and draw it.
    ///
    /// Invalidates every outstanding poll ticket; the caller is expected
    /// to start a new poll for the returned index.
    pub fn set_active(&mut self, index: usize) -> Result<RenderedChart, WidgetError> {
        self.category(index)?;
        self.selector.set_active(index);
        self.generation += 1;
        self.render(index, RenderOptions::default())
    }

    /// Draw a category.
    ///
    /// A category animates the first time it is drawn with data, or on
    /// replay. Drawing it before any data has arrived leaves the grow-in
    /// for the first poll result.
    pub fn render(
        &mut self,
        index: usize,
        options: RenderOptions,
    ) -> Result<RenderedChart, WidgetError> {
        let first_with_data =
            !self.animated.contains(&index) && self.vote_data.contains_key(&index);
        self.draw(index, options.animate_replay || first_with_data)
    }

    /// Ticket for a new poll of `index`; supersedes all earlier tickets
    pub fn begin_poll(&mut self, index: usize) -> Result<PollTicket, WidgetError> {
        self.category(index)?;
        self.generation += 1;
        Ok(PollTicket {
            index,
            generation: self.generation,
        })
    }

    /// Ticket matching the current generation, for out-of-band fetches
    pub fn current_ticket(&self, index: usize) -> PollTicket {
        PollTicket {
            index,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: PollTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Store a fetched snapshot if its ticket is still current
    pub fn apply_poll_result(&mut self, ticket: PollTicket, counts: VoteCounts) -> PollApply {
        if !self.is_current(ticket) {
            return PollApply::Stale;
        }

        self.vote_data.insert(ticket.index, counts);

        if ticket.index != self.active() {
            return PollApply::Stored;
        }

        match self.render(ticket.index, RenderOptions::default()) {
            Ok(chart) => PollApply::Rendered(Arc::new(chart)),
            Err(_) => PollApply::Stored,
        }
    }

    /// Replace counts for every category in the snapshot, then redraw the
    /// active one without animation.
    pub fn update_vote_data(
        &mut self,
        snapshot: HashMap<usize, VoteCounts>,
    ) -> Result<RenderedChart, WidgetError> {
        if let Some(&index) = snapshot.keys().find(|&&i| i >= self.catalog.len()) {
            return Err(WidgetError::UnknownCategory {
                index,
                len: self.catalog.len(),
            });
        }

        self.vote_data.extend(snapshot);

        let active = self.active();
        self.animated.insert(active);
        self.draw(active, false)
    }

    fn draw(&mut self, index: usize, animate: bool) -> Result<RenderedChart, WidgetError> {
        let category = self.category(index)?;
        let points = join_results(category, self.vote_data.get(&index));
        let title = category.title.clone();
        let category_number = category.number;

        self.axis.observe(points.iter().map(|p| p.value));
        let scene = build_scene(&title, &points, self.axis.state(), &self.config.layout);

        let animation =
            animate.then(|| AnimationPlan::for_scene(&scene, &self.config.animation));
        if animation.is_some() {
            self.animated.insert(index);
        }

        let svg = svg::render(&scene, animation.as_ref());

        Ok(RenderedChart {
            index,
            category_number,
            title,
            points,
            axis_max: self.axis.current_max(),
            scene,
            svg,
            animation,
            rendered_at: Utc::now(),
        })
    }
}
