use std::collections::BTreeMap;
use std::fmt;

use runtime::Timeline;
use scene::Length;
use tracing::warn;

use crate::config::ContainerConfig;
use crate::context::StoryContext;
use crate::procedures;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepId(pub u8);

impl StepId {
    pub const FLAT_MAP: StepId = StepId(1);
    pub const CHOROPLETH: StepId = StepId(2);
    pub const WEEKLY_CHART: StepId = StepId(3);
    pub const RADIAL_CHART: StepId = StepId(4);
    pub const FOCUS: StepId = StepId(5);
    pub const REPLAY: StepId = StepId(6);
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChartView {
    Area,
    Radial,
}

/// What the stage shows: the map, or one of the two charts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Map,
    Chart(ChartView),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContainerMode {
    /// Whole width, no padding.
    FullBleed,
    /// Beside the text panel.
    Split,
    /// Narrow windows.
    Compact,
}

impl ContainerMode {
    pub fn width(self, config: &ContainerConfig) -> Length {
        match self {
            ContainerMode::Split => Length::percent(config.split_width_percent),
            ContainerMode::FullBleed | ContainerMode::Compact => Length::percent(100.0),
        }
    }

    pub fn padding(self, config: &ContainerConfig) -> Length {
        match self {
            ContainerMode::FullBleed => Length::ZERO,
            ContainerMode::Split => Length::vh(config.split_padding_vh),
            ContainerMode::Compact => Length::rem(config.compact_padding_rem),
        }
    }
}

/// Generic visual state of a step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StepDescriptor {
    pub stage: Stage,
    /// Terminal step: no text panel, full-bleed map, timestamp overlay.
    pub terminal: bool,
}

impl StepDescriptor {
    /// Descriptor of any step id; ids outside the story get the plain map state.
    pub fn for_step(step: StepId) -> Self {
        let stage = match step {
            StepId::WEEKLY_CHART => Stage::Chart(ChartView::Area),
            StepId::RADIAL_CHART => Stage::Chart(ChartView::Radial),
            _ => Stage::Map,
        };
        Self {
            stage,
            terminal: step == StepId::REPLAY,
        }
    }

    pub fn map_visible(&self) -> bool {
        self.stage == Stage::Map
    }

    pub fn chart_visible(&self, view: ChartView) -> bool {
        self.stage == Stage::Chart(view)
    }

    pub fn any_chart_visible(&self) -> bool {
        matches!(self.stage, Stage::Chart(_))
    }

    pub fn text_panel_visible(&self) -> bool {
        !self.terminal
    }

    pub fn timestamp_visible(&self) -> bool {
        self.terminal
    }

    /// The compact layout wins over the terminal full-bleed layout.
    pub fn container_mode(&self, compact: bool) -> ContainerMode {
        if compact {
            ContainerMode::Compact
        } else if self.terminal {
            ContainerMode::FullBleed
        } else {
            ContainerMode::Split
        }
    }
}

/// Inputs handed to a step procedure.
#[derive(Debug, Copy, Clone)]
pub struct StepEnv<'a> {
    pub ctx: &'a StoryContext,
    pub direction: Direction,
    pub compact: bool,
}

/// Adds a step's own tracks to the transition timeline.
pub type StepProcedure = fn(&mut Timeline, &StepEnv<'_>);

#[derive(Debug, Copy, Clone)]
pub struct ResolvedStep {
    pub id: StepId,
    pub descriptor: StepDescriptor,
    pub procedure: Option<StepProcedure>,
}

/// Fixed table of the story's steps.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    procedures: BTreeMap<StepId, StepProcedure>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        let mut table: BTreeMap<StepId, StepProcedure> = BTreeMap::new();
        table.insert(StepId::FLAT_MAP, procedures::flat_map);
        table.insert(StepId::CHOROPLETH, procedures::choropleth);
        table.insert(StepId::WEEKLY_CHART, procedures::weekly_chart);
        table.insert(StepId::RADIAL_CHART, procedures::radial_chart);
        table.insert(StepId::FOCUS, procedures::focus_region);
        table.insert(StepId::REPLAY, procedures::replay);
        Self { procedures: table }
    }
}

impl StepRegistry {
    pub fn steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.procedures.keys().copied()
    }

    /// Unknown ids resolve to the generic descriptor alone.
    pub fn resolve(&self, step: StepId) -> ResolvedStep {
        let procedure = self.procedures.get(&step).copied();
        if procedure.is_none() {
            warn!(%step, "unknown step, applying generic transition only");
        }
        ResolvedStep {
            id: step,
            descriptor: StepDescriptor::for_step(step),
            procedure,
        }
    }
}
