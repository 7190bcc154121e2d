use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use formats::DatasetBundle;
use runtime::Frame;
use story::{
    Direction, PageLayout, StepId, StoryConfig, StoryContext, StoryController, StoryError,
    Viewport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the air-raid alert scrollytelling story")]
struct Args {
    /// Directory holding the boundary and alert tables
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// JSON config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every input and print a summary
    Check {
        /// Drawing surface size, WIDTHxHEIGHT
        #[arg(long, default_value = "792x720", value_parser = parse_size)]
        surface: (f64, f64),
    },

    /// Drive the story and print the final scene as JSON
    Play {
        /// Drawing surface size, WIDTHxHEIGHT
        #[arg(long, default_value = "792x720", value_parser = parse_size)]
        surface: (f64, f64),

        /// Browser window size, WIDTHxHEIGHT
        #[arg(long, default_value = "1440x900", value_parser = parse_size)]
        window: (f64, f64),

        /// Steps to enter in order, e.g. 1,2,2,3
        #[arg(long, value_delimiter = ',', conflicts_with = "scroll")]
        steps: Vec<u8>,

        /// Scroll offsets to visit in order, e.g. 0,600,1500
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        scroll: Vec<f64>,

        /// Seconds of animation to run after each step or scroll
        #[arg(long, default_value_t = 1.0)]
        seconds: f64,

        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => StoryConfig::load(path)?,
        None => StoryConfig::default(),
    };

    match args.command {
        Command::Check { surface } => check(config, &args.data, surface)?,
        Command::Play {
            surface,
            window,
            steps,
            scroll,
            seconds,
            fps,
        } => {
            let viewport = Viewport::new(surface.0, surface.1, window.0, window.1);
            let page = PageLayout::evenly_spaced((1..=6).map(StepId), window.1);
            let mut controller = match StoryController::initialize(config, &args.data, viewport, page)
            {
                Ok(controller) => controller,
                Err(e) => {
                    let scene = StoryController::failure_scene(&e);
                    println!("{}", serde_json::to_string_pretty(&scene.snapshot())?);
                    return Err(e.into());
                }
            };
            play(&mut controller, &steps, &scroll, seconds, fps);
            println!("{}", serde_json::to_string_pretty(&controller.scene().snapshot())?);
        }
    }

    Ok(())
}

fn check(config: StoryConfig, data: &Path, surface: (f64, f64)) -> Result<(), StoryError> {
    config.validate().map_err(StoryError::Config)?;
    let bundle = DatasetBundle::load_dir(data, &config.files, &config.region_name_property)
        .map_err(StoryError::Dataset)?;
    let viewport = Viewport::new(surface.0, surface.1, surface.0, surface.1);
    let ctx = StoryContext::build(config, bundle, viewport)?;

    println!("regions\t{}", ctx.geometry.len());
    println!("focus\t{}", ctx.geometry.focus_name().unwrap_or("-"));
    println!("weeks\t{}", ctx.weekly.len());
    println!("hours\t{}", ctx.hourly.len());
    println!("snapshots\t{}", ctx.snapshots.len());
    Ok(())
}

fn play(controller: &mut StoryController, steps: &[u8], scroll: &[f64], seconds: f64, fps: u32) {
    let mut frame = Frame::at_rate(0, fps);
    let mut run = |controller: &mut StoryController| {
        for f in frame.span(seconds) {
            controller.tick(f);
            frame = f.next();
        }
    };

    for &n in steps {
        let step = StepId(n);
        let direction = match controller.last_step() {
            Some(last) if last > step => Direction::Backward,
            _ => Direction::Forward,
        };
        controller.enter_step(step, direction);
        run(controller);
    }
    for &offset in scroll {
        let started = controller.scroll_to(offset);
        info!(scroll = offset, transitions = started.len(), "scrolled");
        run(controller);
    }
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid dimension {v:?}"))
    };
    Ok((parse(w)?, parse(h)?))
}
