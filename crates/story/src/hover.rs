use crate::context::StoryContext;
use crate::step::StepId;

/// Element under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HoverTarget {
    Region(String),
    RadialBar(u8),
}

/// Which hover tooltips the current step allows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct HoverGate {
    pub regions: bool,
    pub radial_bars: bool,
}

impl HoverGate {
    pub fn for_step(step: StepId) -> Self {
        Self {
            regions: step == StepId::CHOROPLETH,
            radial_bars: step == StepId::RADIAL_CHART,
        }
    }

    /// Tooltip text for `target`, or `None` when the step does not allow it or there
    /// is nothing to show.
    pub fn tooltip(&self, ctx: &StoryContext, target: &HoverTarget) -> Option<String> {
        match target {
            HoverTarget::Region(name) => {
                if !self.regions {
                    return None;
                }
                let aggregate = ctx.geometry.get(name)?.aggregate?;
                Some(format!(
                    "{}\n{:.0} годин у тривозі",
                    ctx.config.region_label(name),
                    aggregate.duration_hours
                ))
            }
            HoverTarget::RadialBar(hour) => {
                if !self.radial_bars {
                    return None;
                }
                let bar = ctx.radial_chart.bars.iter().find(|b| b.hour == *hour)?;
                Some(format!("{}:00\nТривоги: {}", bar.hour, bar.count))
            }
        }
    }
}
