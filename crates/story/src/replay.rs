use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use formats::HourlySnapshot;
use layers::{Palette, RegionGeometryStore};
use runtime::{Timeline, Tween};
use scene::{Property, Target, Value};
use tracing::debug;

/// Schedule the hour-by-hour replay on `tl` and return its length in seconds.
///
/// Snapshot `i` applies at `i * step`: the clock label changes and only the regions whose
/// state differs from the previous snapshot get a zero-duration fill change. A final reset
/// at `len * step` clears whatever is still lit so every loop starts from a neutral map.
/// Names without geometry are tracked in the diff but never written.
pub fn schedule_replay(
    tl: &mut Timeline,
    snapshots: &[HourlySnapshot],
    regions: &RegionGeometryStore,
    palette: &Palette,
    step: f64,
    timestamp_format: &str,
) -> f64 {
    let on = Value::Color(palette.alert);
    let off = Value::Color(palette.neutral);

    let mut previous: BTreeSet<String> = BTreeSet::new();
    for (i, snapshot) in snapshots.iter().enumerate() {
        let at = i as f64 * step;
        tl.add(
            Tween::set(
                Target::TimestampLabel,
                Property::Text,
                Value::Text(format_timestamp(&snapshot.timestamp, timestamp_format)),
            )
            .at(at),
        );

        let current = &snapshot.active_regions;
        set_fills(tl, regions, current.difference(&previous), &on, at);
        set_fills(tl, regions, previous.difference(current), &off, at);
        previous = current.clone();
    }

    let total = snapshots.len() as f64 * step;
    set_fills(tl, regions, &previous, &off, total);
    tl.extend_to(total);

    debug!(
        snapshots = snapshots.len(),
        still_active = previous.len(),
        total,
        "replay built"
    );
    total
}

fn set_fills<'a>(
    tl: &mut Timeline,
    regions: &RegionGeometryStore,
    names: impl IntoIterator<Item = &'a String>,
    value: &Value,
    at: f64,
) {
    for name in names {
        if regions.contains(name) {
            tl.add(Tween::set(Target::region(name.as_str()), Property::Fill, value.clone()).at(at));
        }
    }
}

/// Render an ISO-8601 timestamp with `format`, keeping its own wall-clock time.
///
/// Timestamps that cannot be parsed, or formats chrono rejects, yield the input unchanged.
pub fn format_timestamp(iso: &str, format: &str) -> String {
    let trimmed = iso.trim();
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    let Some(dt) = parsed else {
        return iso.to_string();
    };
    let mut out = String::new();
    match write!(out, "{}", dt.format(format)) {
        Ok(()) => out,
        Err(_) => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, schedule_replay};
    use crate::context::fixtures;
    use formats::HourlySnapshot;
    use foundation::Rgb;
    use pretty_assertions::assert_eq;
    use runtime::{Playback, Repeat, Timeline};
    use scene::{Property, Target, Value};

    fn snapshot(ts: &str, regions: &[&str]) -> HourlySnapshot {
        HourlySnapshot {
            timestamp: ts.to_string(),
            active_regions: regions.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn example() -> Vec<HourlySnapshot> {
        vec![
            snapshot("2024-03-01T00:00:00", &["A", "B"]),
            snapshot("2024-03-01T01:00:00", &["B", "C"]),
            snapshot("2024-03-01T02:00:00", &[]),
        ]
    }

    /// `(time, region, lit)` for every fill change on the timeline.
    fn fill_events(tl: &Timeline, alert: Rgb) -> Vec<(f64, String, bool)> {
        let mut out: Vec<_> = tl
            .tweens()
            .iter()
            .filter_map(|t| match (&t.target, t.property, &t.to) {
                (Target::Region(name), Property::Fill, Value::Color(c)) => {
                    Some((t.start, name.clone(), *c == alert))
                }
                _ => None,
            })
            .collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out
    }

    #[test]
    fn schedules_only_diffs() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut tl = Timeline::default();
        let total = schedule_replay(&mut tl, &example(), &ctx.geometry, &ctx.palette, 0.5, "%d.%m.%Y %H:%M");

        assert_eq!(total, 1.5);
        assert_eq!(tl.duration(), 1.5);
        assert_eq!(
            fill_events(&tl, ctx.palette.alert),
            vec![
                (0.0, "A".to_string(), true),
                (0.0, "B".to_string(), true),
                (0.5, "A".to_string(), false),
                (0.5, "C".to_string(), true),
                (1.0, "B".to_string(), false),
                (1.0, "C".to_string(), false),
            ]
        );
        assert!(tl.tweens().iter().all(|t| t.duration == 0.0));
    }

    #[test]
    fn final_reset_clears_regions_still_lit() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut tl = Timeline::default();
        let snapshots = vec![snapshot("2024-03-01T00:00:00", &["A"]), snapshot("2024-03-01T01:00:00", &["A", "B"])];
        schedule_replay(&mut tl, &snapshots, &ctx.geometry, &ctx.palette, 0.5, "%H:%M");
        let events = fill_events(&tl, ctx.palette.alert);
        assert_eq!(
            &events[events.len() - 2..],
            &[(1.0, "A".to_string(), false), (1.0, "B".to_string(), false)]
        );
    }

    #[test]
    fn unknown_regions_are_skipped() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut tl = Timeline::default();
        let snapshots = vec![snapshot("2024-03-01T00:00:00", &["Atlantis", "A"])];
        schedule_replay(&mut tl, &snapshots, &ctx.geometry, &ctx.palette, 0.5, "%H:%M");
        let names: Vec<_> = fill_events(&tl, ctx.palette.alert)
            .into_iter()
            .map(|e| e.1)
            .collect();
        assert_eq!(names, vec!["A".to_string(), "A".to_string()]);
    }

    #[test]
    fn replay_loops_back_to_first_snapshot() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut tl = Timeline::default();
        schedule_replay(&mut tl, &example(), &ctx.geometry, &ctx.palette, 0.5, "%d.%m.%Y %H:%M");
        tl.set_repeat(Repeat::Infinite);
        let mut playback = Playback::new(tl);
        let lit = |scene: &scene::Scene, name: &str| {
            scene.color(&Target::region(name), Property::Fill) == Some(ctx.palette.alert)
        };

        playback.advance(0.0, &mut scene);
        assert!(lit(&scene, "A") && lit(&scene, "B") && !lit(&scene, "C"));
        assert_eq!(scene.text(&Target::TimestampLabel, Property::Text), Some("01.03.2024 00:00"));

        playback.advance(0.5, &mut scene);
        assert!(!lit(&scene, "A") && lit(&scene, "B") && lit(&scene, "C"));

        playback.advance(0.5, &mut scene);
        assert!(!lit(&scene, "A") && !lit(&scene, "B") && !lit(&scene, "C"));
        assert_eq!(scene.text(&Target::TimestampLabel, Property::Text), Some("01.03.2024 02:00"));

        playback.advance(0.5, &mut scene);
        assert_eq!(playback.iteration(), 1);
        assert!(lit(&scene, "A") && lit(&scene, "B") && !lit(&scene, "C"));
        assert_eq!(scene.text(&Target::TimestampLabel, Property::Text), Some("01.03.2024 00:00"));
    }

    #[test]
    fn state_between_keyframes_is_binary() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut tl = Timeline::default();
        schedule_replay(&mut tl, &example(), &ctx.geometry, &ctx.palette, 0.5, "%H:%M");
        let mut playback = Playback::new(tl);
        playback.advance(0.74, &mut scene);
        assert_eq!(scene.color(&Target::region("C"), Property::Fill), Some(ctx.palette.alert));
        assert_eq!(scene.color(&Target::region("A"), Property::Fill), Some(ctx.palette.neutral));
    }

    #[test]
    fn timestamps_keep_their_wall_clock() {
        assert_eq!(format_timestamp("2024-03-01T05:00:00", "%d.%m.%Y %H:%M"), "01.03.2024 05:00");
        assert_eq!(format_timestamp("2024-03-01T05:00:00+02:00", "%d.%m.%Y %H:%M"), "01.03.2024 05:00");
        assert_eq!(format_timestamp("2024-03-01 17:30", "%d.%m.%Y %H:%M"), "01.03.2024 17:30");
        assert_eq!(format_timestamp("2024-03-01", "%d.%m.%Y %H:%M"), "01.03.2024 00:00");
        assert_eq!(format_timestamp("yesterday", "%d.%m.%Y %H:%M"), "yesterday");
    }
}
