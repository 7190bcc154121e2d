use tracing::{debug, trace};

use crate::step::{Direction, StepId};

/// Fraction of the viewport height, from the top, where a section's top activates it.
pub const TRIGGER_START_FRACTION: f64 = 0.8;
/// Fraction of the viewport height where a section's bottom deactivates it.
pub const TRIGGER_END_FRACTION: f64 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Narrative block that is highlighted while its step is current.
    TextBlock,
    /// Invisible marker that only drives the step.
    Trigger,
}

/// A marked page section in document coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Section {
    pub step: StepId,
    pub kind: SectionKind,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriggerFired {
    pub section: usize,
    pub step: StepId,
    pub kind: SectionKind,
    pub event: TriggerEvent,
    pub direction: Direction,
}

/// Turns scroll positions into enter/leave events for each section.
///
/// A section is active while the scroll offset lies strictly between its start
/// (top at 80% of the viewport) and its end (bottom at 20%).
#[derive(Debug, Clone)]
pub struct ScrollTriggers {
    sections: Vec<Section>,
    viewport_height: f64,
    scroll: Option<f64>,
    active: Vec<bool>,
}

impl ScrollTriggers {
    pub fn new(sections: Vec<Section>, viewport_height: f64) -> Self {
        let active = vec![false; sections.len()];
        Self {
            sections,
            viewport_height,
            scroll: None,
            active,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn scroll(&self) -> Option<f64> {
        self.scroll
    }

    fn start(&self, index: usize) -> f64 {
        self.sections[index].top - TRIGGER_START_FRACTION * self.viewport_height
    }

    fn end(&self, index: usize) -> f64 {
        self.sections[index].bottom - TRIGGER_END_FRACTION * self.viewport_height
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
    }

    /// Move to `scroll` and report every section boundary crossed.
    ///
    /// The first update counts as a forward scroll from above the page. A section
    /// jumped over entirely fires both of its events.
    pub fn update(&mut self, scroll: f64) -> Vec<TriggerFired> {
        let previous = self.scroll.unwrap_or(f64::NEG_INFINITY);
        if previous == scroll {
            return Vec::new();
        }
        self.scroll = Some(scroll);
        let direction = if scroll > previous {
            Direction::Forward
        } else {
            Direction::Backward
        };

        let mut order: Vec<usize> = (0..self.sections.len()).collect();
        if direction == Direction::Backward {
            order.reverse();
        }

        let mut fired = Vec::new();
        for index in order {
            let (start, end) = (self.start(index), self.end(index));
            let was = self.active[index];
            let is = start < scroll && scroll < end;
            self.active[index] = is;

            let events: &[TriggerEvent] = match (direction, was, is) {
                (Direction::Forward, false, true) => &[TriggerEvent::Enter],
                (Direction::Forward, true, false) => &[TriggerEvent::Leave],
                (Direction::Forward, false, false) if previous <= start && scroll >= end => {
                    &[TriggerEvent::Enter, TriggerEvent::Leave]
                }
                (Direction::Backward, false, true) => &[TriggerEvent::EnterBack],
                (Direction::Backward, true, false) => &[TriggerEvent::LeaveBack],
                (Direction::Backward, false, false) if previous >= end && scroll <= start => {
                    &[TriggerEvent::EnterBack, TriggerEvent::LeaveBack]
                }
                _ => &[],
            };
            let section = self.sections[index];
            fired.extend(events.iter().map(|&event| TriggerFired {
                section: index,
                step: section.step,
                kind: section.kind,
                event,
                direction,
            }));
        }
        trace!(scroll, events = fired.len(), "scroll triggers updated");
        fired
    }
}

/// Resolves trigger events to step transitions, at most one per distinct step entry.
///
/// Text-block highlighting is tracked separately from the current step.
#[derive(Debug, Clone, Default)]
pub struct ScrollStepMapper {
    last_step: Option<StepId>,
    active_block: Option<usize>,
}

impl ScrollStepMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_step(&self) -> Option<StepId> {
        self.last_step
    }

    /// Index of the highlighted text block.
    pub fn active_block(&self) -> Option<usize> {
        self.active_block
    }

    /// Record an entry into `step`. Returns the transition to run, if the step changed.
    pub fn enter(&mut self, step: StepId, direction: Direction) -> Option<(StepId, Direction)> {
        if self.last_step == Some(step) {
            trace!(%step, "step re-entered, ignoring");
            return None;
        }
        debug!(%step, direction = direction.sign(), "step entered");
        self.last_step = Some(step);
        Some((step, direction))
    }

    pub fn handle(&mut self, fired: &TriggerFired) -> Option<(StepId, Direction)> {
        let text_block = fired.kind == SectionKind::TextBlock;
        match fired.event {
            TriggerEvent::Enter | TriggerEvent::EnterBack => {
                if text_block {
                    self.active_block = Some(fired.section);
                }
                self.enter(fired.step, fired.direction)
            }
            TriggerEvent::Leave => {
                if text_block && fired.direction == Direction::Forward {
                    self.deactivate(fired.section);
                }
                None
            }
            TriggerEvent::LeaveBack => {
                if text_block && fired.direction == Direction::Backward {
                    self.deactivate(fired.section);
                }
                None
            }
        }
    }

    fn deactivate(&mut self, section: usize) {
        if self.active_block == Some(section) {
            self.active_block = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrollStepMapper, ScrollTriggers, Section, SectionKind, TriggerEvent};
    use crate::step::{Direction, StepId};
    use pretty_assertions::assert_eq;

    const VH: f64 = 1000.0;

    /// Six 1000px sections after a 1000px intro; the last is a bare trigger.
    fn page() -> Vec<Section> {
        (1..=6u8)
            .map(|n| Section {
                step: StepId(n),
                kind: if n == 6 {
                    SectionKind::Trigger
                } else {
                    SectionKind::TextBlock
                },
                top: f64::from(n) * VH,
                bottom: f64::from(n + 1) * VH,
            })
            .collect()
    }

    fn events(fired: &[super::TriggerFired]) -> Vec<(u8, TriggerEvent)> {
        fired.iter().map(|f| (f.step.0, f.event)).collect()
    }

    #[test]
    fn repeated_entries_transition_once_per_distinct_step() {
        let mut mapper = ScrollStepMapper::new();
        let calls: Vec<_> = [2, 2, 2, 3]
            .into_iter()
            .filter_map(|n| mapper.enter(StepId(n), Direction::Forward))
            .collect();
        assert_eq!(calls, vec![(StepId(2), Direction::Forward), (StepId(3), Direction::Forward)]);
    }

    #[test]
    fn returning_to_a_step_after_another_transitions_again() {
        let mut mapper = ScrollStepMapper::new();
        assert!(mapper.enter(StepId(2), Direction::Forward).is_some());
        assert!(mapper.enter(StepId(3), Direction::Forward).is_some());
        assert_eq!(
            mapper.enter(StepId(2), Direction::Backward),
            Some((StepId(2), Direction::Backward))
        );
    }

    #[test]
    fn trigger_window_uses_viewport_fractions() {
        let triggers = ScrollTriggers::new(page(), VH);
        assert_eq!(triggers.start(0), 200.0);
        assert_eq!(triggers.end(0), 1800.0);
    }

    #[test]
    fn forward_scroll_enters_and_leaves() {
        let mut triggers = ScrollTriggers::new(page(), VH);
        assert!(triggers.update(0.0).is_empty());
        assert_eq!(events(&triggers.update(500.0)), vec![(1, TriggerEvent::Enter)]);
        assert_eq!(events(&triggers.update(1500.0)), vec![(2, TriggerEvent::Enter)]);
        assert_eq!(events(&triggers.update(1900.0)), vec![(1, TriggerEvent::Leave)]);
        assert!(triggers.update(1900.0).is_empty());
    }

    #[test]
    fn backward_scroll_enters_back() {
        let mut triggers = ScrollTriggers::new(page(), VH);
        triggers.update(2500.0);
        let fired = triggers.update(1500.0);
        assert_eq!(
            events(&fired),
            vec![(3, TriggerEvent::LeaveBack), (1, TriggerEvent::EnterBack)]
        );
        assert!(fired.iter().all(|f| f.direction == Direction::Backward));
        assert_eq!(
            events(&triggers.update(100.0)),
            vec![(2, TriggerEvent::LeaveBack), (1, TriggerEvent::LeaveBack)]
        );
    }

    #[test]
    fn jumping_over_a_section_fires_both_events() {
        let mut triggers = ScrollTriggers::new(page(), VH);
        triggers.update(0.0);
        let fired = triggers.update(2900.0);
        assert_eq!(
            events(&fired),
            vec![
                (1, TriggerEvent::Enter),
                (1, TriggerEvent::Leave),
                (2, TriggerEvent::Enter),
                (2, TriggerEvent::Leave),
                (3, TriggerEvent::Enter),
            ]
        );
    }

    #[test]
    fn rapid_back_and_forth_does_not_duplicate_transitions() {
        let mut triggers = ScrollTriggers::new(page(), VH);
        let mut mapper = ScrollStepMapper::new();
        let mut calls = Vec::new();
        for scroll in [500.0, 1500.0, 1900.0, 1700.0, 1900.0, 1700.0, 1900.0] {
            for fired in triggers.update(scroll) {
                calls.extend(mapper.handle(&fired));
            }
        }
        let steps: Vec<u8> = calls.iter().map(|(s, _)| s.0).collect();
        // Section 2 stays active throughout, so leaving section 1 again does not re-enter 2.
        assert_eq!(steps, vec![1, 2, 1]);
    }

    #[test]
    fn hovering_on_a_boundary_inside_one_step_never_retransitions() {
        let mut triggers = ScrollTriggers::new(page(), VH);
        let mut mapper = ScrollStepMapper::new();
        let mut calls = 0;
        for scroll in [500.0, 1100.0, 900.0, 1100.0, 900.0] {
            for fired in triggers.update(scroll) {
                calls += usize::from(mapper.handle(&fired).is_some());
            }
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn highlight_follows_text_blocks_only() {
        let mut triggers = ScrollTriggers::new(page(), VH);
        let mut mapper = ScrollStepMapper::new();
        let mut run = |scroll: f64, mapper: &mut ScrollStepMapper| {
            for fired in triggers.update(scroll) {
                mapper.handle(&fired);
            }
        };

        run(500.0, &mut mapper);
        assert_eq!(mapper.active_block(), Some(0));
        run(1500.0, &mut mapper);
        assert_eq!(mapper.active_block(), Some(1));
        run(1900.0, &mut mapper);
        assert_eq!(mapper.active_block(), Some(1));
        assert_eq!(mapper.last_step(), Some(StepId(2)));

        run(6500.0, &mut mapper);
        assert_eq!(mapper.last_step(), Some(StepId(6)));
        assert_eq!(mapper.active_block(), None);
    }
}
