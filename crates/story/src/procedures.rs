//! Per-step tracks added on top of the generic transition.

use runtime::{Ease, Repeat, Timeline, Tween};
use layers::GeometryVariant;
use scene::{AreaPart, Property, Target, Value};
use tracing::{debug, warn};

use crate::replay::schedule_replay;
use crate::step::{Direction, StepEnv};

const AREA_REVEAL_DURATION: f64 = 0.6;
const AREA_REVEAL_STAGGER: f64 = 0.1;
const AREA_REVEAL_OFFSET: f64 = 30.0;
const RADIAL_GROW_DURATION: f64 = 0.5;
const RADIAL_GROW_STAGGER: f64 = 0.015;
const FOCUS_DIM_OPACITY: f64 = 0.6;

/// Geometry reset duration; scrolling back into a map step snaps instantly.
fn dezoom_duration(env: &StepEnv<'_>) -> f64 {
    match env.direction {
        Direction::Backward => 0.0,
        Direction::Forward => env.ctx.config.dezoom_duration,
    }
}

/// View box and region paths back to one geometry variant, fully opaque.
fn reset_geometry(
    tl: &mut Timeline,
    env: &StepEnv<'_>,
    variant: GeometryVariant,
    duration: Option<f64>,
) {
    let store = &env.ctx.geometry;
    let view_box = match variant {
        GeometryVariant::Final => store.final_view_box(),
        GeometryVariant::Initial | GeometryVariant::Zoom => store.initial_view_box(),
    };
    let timed = |tween: Tween| match duration {
        Some(d) => tween.duration(d),
        None => tween,
    };

    tl.add(timed(Tween::to(
        Target::Surface,
        Property::ViewBox,
        Value::ViewBox(view_box),
    )));
    for region in store.iter() {
        let target = Target::region(region.name.as_str());
        tl.add(timed(Tween::to(
            target.clone(),
            Property::PathData,
            Value::Path(region.path(variant).to_string()),
        )));
        tl.add(timed(Tween::to(target, Property::Opacity, Value::Number(1.0))));
    }
}

pub fn flat_map(tl: &mut Timeline, env: &StepEnv<'_>) {
    let duration = dezoom_duration(env);
    reset_geometry(tl, env, GeometryVariant::Initial, Some(duration));
    let neutral = Value::Color(env.ctx.palette.neutral);
    for region in env.ctx.geometry.iter() {
        tl.add(
            Tween::to(Target::region(region.name.as_str()), Property::Fill, neutral.clone())
                .duration(duration),
        );
    }
}

pub fn choropleth(tl: &mut Timeline, env: &StepEnv<'_>) {
    let duration = dezoom_duration(env);
    reset_geometry(tl, env, GeometryVariant::Initial, Some(duration));
    for region in env.ctx.geometry.iter() {
        let fill = env.ctx.choropleth_fill(&region.name);
        tl.add(
            Tween::to(Target::region(region.name.as_str()), Property::Fill, Value::Color(fill))
                .duration(duration),
        );
    }
}

pub fn weekly_chart(tl: &mut Timeline, _env: &StepEnv<'_>) {
    let reveal = |property: Property, from: f64, to: f64| {
        AreaPart::ALL.into_iter().map(move |part| {
            Tween::from_to(
                Target::AreaPart(part),
                property,
                Value::Number(from),
                Value::Number(to),
            )
            .duration(AREA_REVEAL_DURATION)
            .ease(Ease::Power3Out)
        })
    };
    tl.stagger(reveal(Property::Opacity, 0.0, 1.0), AREA_REVEAL_STAGGER);
    tl.stagger(
        reveal(Property::OffsetY, AREA_REVEAL_OFFSET, 0.0),
        AREA_REVEAL_STAGGER,
    );
}

pub fn radial_chart(tl: &mut Timeline, env: &StepEnv<'_>) {
    let bars = env.ctx.radial_chart.bars.iter().map(|bar| {
        Tween::from_to(
            Target::RadialBar(bar.hour),
            Property::ScaleY,
            Value::Number(0.0),
            Value::Number(1.0),
        )
        .duration(RADIAL_GROW_DURATION)
        .ease(Ease::Power3Out)
    });
    tl.stagger(bars, RADIAL_GROW_STAGGER);
}

pub fn focus_region(tl: &mut Timeline, env: &StepEnv<'_>) {
    let Some(focus) = env.ctx.geometry.focus() else {
        warn!("no focus region, zoom step keeps the current map");
        return;
    };
    reset_geometry(tl, env, GeometryVariant::Zoom, None);

    let neutral = Value::Color(env.ctx.palette.neutral);
    for region in env.ctx.geometry.iter() {
        let target = Target::region(region.name.as_str());
        tl.add(Tween::to(target.clone(), Property::Fill, neutral.clone()));
        tl.add(Tween::to(
            target,
            Property::Opacity,
            Value::Number(FOCUS_DIM_OPACITY),
        ));
    }

    let target = Target::region(focus.name.as_str());
    tl.add(Tween::to(target.clone(), Property::Opacity, Value::Number(1.0)));
    tl.add(Tween::to(
        target,
        Property::Fill,
        Value::Color(env.ctx.palette.alert),
    ));
}

pub fn replay(tl: &mut Timeline, env: &StepEnv<'_>) {
    let variant = if env.compact {
        GeometryVariant::Initial
    } else {
        GeometryVariant::Final
    };
    reset_geometry(tl, env, variant, None);
    let neutral = Value::Color(env.ctx.palette.neutral);
    for region in env.ctx.geometry.iter() {
        tl.add(Tween::to(
            Target::region(region.name.as_str()),
            Property::Fill,
            neutral.clone(),
        ));
    }

    let total = schedule_replay(
        tl,
        &env.ctx.snapshots,
        &env.ctx.geometry,
        &env.ctx.palette,
        env.ctx.config.replay_step_duration,
        &env.ctx.config.timestamp_format,
    );
    tl.set_repeat(Repeat::Infinite);
    debug!(snapshots = env.ctx.snapshots.len(), total, ?variant, "replay scheduled");
}
