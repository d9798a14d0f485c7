//! Headless howl driver.
//!
//! Runs an activity, the generator or a position track and prints one line
//! per 100ms step: the playback time and the hex-encoded `0xB0` frame.
//!
//! ```bash
//! howl-native --list
//! howl-native --activity "Milkmaster 3000" --seconds 30 --seed 7
//! howl-native --generator --realtime
//! howl-native --track strokes.txt --config howl.toml
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;

use howl::{ActivityHost, Player, Settings, SimulationSource, STEP_TIME};
use howl_core::activity::ActivityKind;
use howl_core::generator::{AutoChange, Generator};
use howl_core::shapes::GeneratorShape;
use howl_core::source::PulseSource;
use howl_core::track::ControlTrack;

#[derive(Parser)]
#[command(name = "howl-native")]
#[command(author, version, about = "Print Coyote command frames for howl activities")]
struct Args {
    /// Activity to run, by display name or identifier (random when omitted)
    #[arg(long, short = 'a', conflicts_with_all = ["generator", "track"])]
    activity: Option<String>,

    /// Run the free-form generator instead of an activity
    #[arg(long, short = 'g', conflicts_with = "track")]
    generator: bool,

    /// Play a two-column `seconds position` table
    #[arg(long, short = 't')]
    track: Option<PathBuf>,

    /// Seconds of playback to produce (tracks stop at their end regardless)
    #[arg(long, short = 's', default_value = "10")]
    seconds: f64,

    /// Seed for every random draw (defaults to the settings file, then 0)
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file (TOML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Pace output at the device's real 100ms cadence
    #[arg(long, short = 'r')]
    realtime: bool,

    /// List activities and generator shapes, then exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if args.list {
        print_catalog();
        return Ok(());
    }

    let settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if args.seconds.is_nan() || args.seconds <= 0.0 {
        bail!("--seconds must be positive, got {}", args.seconds);
    }
    let seed = args.seed.or(settings.activity.seed).unwrap_or(0);

    let source = build_source(&args, &settings, seed)?;
    let mut player = Player::from_settings(&settings);
    player.set_source(Some(source));
    if !player.start(Some(0.0)) {
        bail!("pulse source is not ready to play");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "# parameters {}", hex::encode_upper(player.parameter_frame()))?;

    let steps = (args.seconds / STEP_TIME).ceil() as u64;
    let started = Instant::now();
    for index in 0..steps {
        let Some(step) = player.step() else {
            break;
        };
        match &step.frame {
            Some(frame) => writeln!(out, "{:9.3} {}", step.time, hex::encode_upper(frame))?,
            None => writeln!(out, "{:9.3} muted", step.time)?,
        }
        if args.realtime {
            out.flush()?;
            let due = started + Duration::from_secs_f64(STEP_TIME * (index + 1) as f64);
            if let Some(wait) = due.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        }
    }
    Ok(())
}

fn build_source(args: &Args, settings: &Settings, seed: u64) -> Result<Box<dyn PulseSource>> {
    if let Some(path) = &args.track {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading track {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_owned());
        let mut track = ControlTrack::parse(name, &text)?;
        track.set_settings(settings.track.settings());
        return Ok(Box::new(track));
    }

    if args.generator {
        let mut generator = Generator::new(seed)?;
        generator.set_auto_change(AutoChange {
            cycle_secs: settings.activity.generator_auto_cycle,
            ..AutoChange::default()
        });
        return Ok(Box::new(SimulationSource::new(generator)));
    }

    let requested = args.activity.as_deref().or(settings.activity.initial.as_deref());
    let mut host = match requested {
        Some(name) => {
            let Some(kind) = ActivityKind::from_name(name) else {
                bail!("unknown activity `{name}` (see --list)");
            };
            ActivityHost::with_activity(seed, kind)?
        }
        None => ActivityHost::new(seed)?,
    };
    host.set_change_probability(settings.activity.change_probability);
    Ok(Box::new(host))
}

fn print_catalog() {
    println!("Activities:");
    for kind in ActivityKind::ALL {
        let note = if kind.is_calibration() { "  (never picked at random)" } else { "" };
        println!("  {:<18} {:?}{note}", kind.display_name(), kind);
    }
    println!("Generator shapes:");
    for shape in GeneratorShape::ALL {
        println!("  {}", shape.name());
    }
}
