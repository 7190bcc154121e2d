use std::collections::BTreeMap;

use scene::{Property, Surface, Target, Value};
use tracing::trace;

use crate::timeline::{Repeat, Timeline};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    Completed,
    Killed,
}

#[derive(Debug, Clone)]
struct TrackEntry {
    tween: usize,
    from: Value,
}

/// Every tween driving one `(target, property)`, ordered by `(start, insertion)`.
#[derive(Debug, Clone)]
struct Track {
    target: Target,
    property: Property,
    entries: Vec<TrackEntry>,
}

/// Plays a [`Timeline`] against a [`Surface`].
///
/// Start values come from the surface the first time the playback renders. Each repeat
/// iteration starts from the state the previous iteration ended in. A killed playback
/// never writes again.
#[derive(Debug, Clone)]
pub struct Playback {
    timeline: Timeline,
    tracks: Option<Vec<Track>>,
    time: f64,
    iteration: u64,
    state: PlaybackState,
}

impl Playback {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            tracks: None,
            time: 0.0,
            iteration: 0,
            state: PlaybackState::Running,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Local time within the current iteration.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Stop immediately. Values already written stay on the surface.
    pub fn kill(&mut self) {
        self.state = PlaybackState::Killed;
    }

    /// Move the playhead forward by `dt` seconds and render.
    pub fn advance<S: Surface>(&mut self, dt: f64, surface: &mut S) -> PlaybackState {
        if self.state != PlaybackState::Running {
            return self.state;
        }
        self.ensure_tracks(surface);

        let duration = self.timeline.duration();
        if !dt.is_finite() {
            trace!(dt, "non-finite frame delta ignored");
        } else {
            self.time += dt.max(0.0);
        }
        if self.time < duration {
            self.render(self.time, surface);
            return self.state;
        }

        self.render(duration, surface);
        if self.timeline.repeat() == Repeat::Once || duration <= 0.0 {
            self.time = duration;
            self.state = PlaybackState::Completed;
            return self.state;
        }

        let end_state = self.sample_all(duration);
        self.iteration += (self.time / duration).floor() as u64;
        self.time = self.time.rem_euclid(duration);
        trace!(iteration = self.iteration, "timeline repeat");
        self.tracks = Some(build_tracks(&self.timeline, |target, property| {
            end_state.get(&(target.clone(), property)).cloned()
        }));
        self.render(self.time, surface);
        self.state
    }

    /// Render at an absolute position without touching repeat or completion state.
    ///
    /// Used for scroll-scrubbed timelines.
    pub fn seek<S: Surface>(&mut self, time: f64, surface: &mut S) {
        if self.state == PlaybackState::Killed {
            return;
        }
        self.ensure_tracks(surface);
        self.time = time.clamp(0.0, self.timeline.duration());
        self.render(self.time, surface);
    }

    fn ensure_tracks<S: Surface>(&mut self, surface: &S) {
        if self.tracks.is_none() {
            self.tracks = Some(build_tracks(&self.timeline, |target, property| {
                surface.read(target, property)
            }));
        }
    }

    fn render<S: Surface>(&self, t: f64, surface: &mut S) {
        let Some(tracks) = &self.tracks else {
            return;
        };
        for track in tracks {
            if let Some(value) = sample_track(&self.timeline, track, t) {
                surface.write(&track.target, track.property, value);
            }
        }
    }

    fn sample_all(&self, t: f64) -> BTreeMap<(Target, Property), Value> {
        let mut out = BTreeMap::new();
        if let Some(tracks) = &self.tracks {
            for track in tracks {
                if let Some(value) = sample_track(&self.timeline, track, t) {
                    out.insert((track.target.clone(), track.property), value);
                }
            }
        }
        out
    }
}

fn sample_track(timeline: &Timeline, track: &Track, t: f64) -> Option<Value> {
    let tweens = timeline.tweens();
    let owner = track.entries.iter().rev().find(|e| {
        let tw = &tweens[e.tween];
        tw.has_started(t) || tw.immediate_render
    })?;
    Some(tweens[owner.tween].value_at(&owner.from, t))
}

fn build_tracks(
    timeline: &Timeline,
    base: impl Fn(&Target, Property) -> Option<Value>,
) -> Vec<Track> {
    let tweens = timeline.tweens();
    let mut grouped: BTreeMap<(Target, Property), Vec<usize>> = BTreeMap::new();
    for (idx, tw) in tweens.iter().enumerate() {
        grouped
            .entry((tw.target.clone(), tw.property))
            .or_default()
            .push(idx);
    }

    let mut tracks = Vec::with_capacity(grouped.len());
    for ((target, property), mut indices) in grouped {
        // Stable: equal starts keep insertion order.
        indices.sort_by(|&a, &b| tweens[a].start.total_cmp(&tweens[b].start));

        let mut entries: Vec<TrackEntry> = Vec::with_capacity(indices.len());
        let initial = base(&target, property);
        for idx in indices {
            let tw = &tweens[idx];
            let inherited = match entries.last() {
                Some(prev) => Some(tweens[prev.tween].value_at(&prev.from, tw.start)),
                None => initial.clone(),
            };
            let from = tw
                .from
                .clone()
                .or(inherited)
                .unwrap_or_else(|| tw.to.clone());
            entries.push(TrackEntry { tween: idx, from });
        }
        tracks.push(Track {
            target,
            property,
            entries,
        });
    }
    tracks
}
