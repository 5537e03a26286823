use std::{path::PathBuf, time::Instant};

use clap::Parser;
use fleet_anim::{
    callbacks::log_intents::LogIntentsCallback,
    config::SimConfig,
    model::{action::TimelineEvent, vehicle_info::VehicleInfo},
    scenario,
    scene::SceneMirror,
    simulation::{animation::AnimationLoop, callback::SimulationCallback, render::RenderTarget},
};
use humantime::format_duration;
use rand::{rngs::SmallRng, SeedableRng};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "fleet_anim",
    about = "Replays a ride-hailing fleet and its trip timeline",
    long_about = "Replays a ride-hailing fleet and its trip timeline.\n\
                  Without --drivers and --timeline a seeded demo around Hong Kong is played."
)]
struct Args {
    /// Simulation config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Drivers file: a JSON array of `{ "id", "route" }`
    #[arg(long, requires = "timeline")]
    drivers: Option<PathBuf>,
    /// Timeline file keyed by simulation timestamp
    #[arg(long, requires = "drivers")]
    timeline: Option<PathBuf>,
    /// Dump every frame's render intents under logs/<NAME>/
    #[arg(long, value_name = "NAME")]
    dump: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let (vehicles, events) = match (&args.drivers, &args.timeline) {
        (Some(drivers), Some(timeline)) => (
            VehicleInfo::load(drivers)?,
            TimelineEvent::load(timeline, config.time_interval)?,
        ),
        _ => {
            let mut rng = SmallRng::seed_from_u64(727);
            let demo = scenario::demo(&mut rng, 8, 60, &config);
            (demo.vehicles, demo.events)
        }
    };

    let callbacks: Vec<Box<dyn SimulationCallback>> = args
        .dump
        .into_iter()
        .map(|name| Box::new(LogIntentsCallback::new(name)) as Box<dyn SimulationCallback>)
        .collect();
    let mut animation = AnimationLoop::new(config, vehicles, events, callbacks)?;
    let mut scene = SceneMirror::new();

    let start = Instant::now();
    loop {
        let more = animation.run_frame();
        scene.apply_all(&animation.drain_intents());
        if !more {
            break;
        }
    }

    let stats = animation.stats();
    info!(
        elapsed = %format_duration(start.elapsed()),
        frames = stats.frames,
        dispatched = stats.dispatched,
        rejected = stats.rejected,
        "done"
    );
    info!(
        markers = scene.count(RenderTarget::Marker),
        lines = scene.count(RenderTarget::Line),
        images = scene.count(RenderTarget::Image),
        passengers = animation.registry().passenger_count(),
        inconsistent_intents = scene.anomalies(),
        "elements left on the map"
    );
    for vehicle in animation.registry().vehicles() {
        info!(
            vehicle = %vehicle.id(),
            position = %vehicle.position(),
            heading = ?vehicle.heading(),
            status = ?vehicle.status(),
            "final state"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn drivers_and_timeline_go_together() {
        assert!(Args::try_parse_from(["fleet_anim", "--drivers", "d.json"]).is_err());
        assert!(Args::try_parse_from(["fleet_anim", "--timeline", "t.json"]).is_err());

        let args = Args::try_parse_from([
            "fleet_anim",
            "--drivers",
            "d.json",
            "--timeline",
            "t.json",
            "--dump",
            "run1",
        ])
        .unwrap();
        assert_eq!(args.drivers, Some(PathBuf::from("d.json")));
        assert_eq!(args.timeline, Some(PathBuf::from("t.json")));
        assert_eq!(args.dump.as_deref(), Some("run1"));
        assert!(args.config.is_none());
    }

    #[test]
    fn no_arguments_plays_the_demo() {
        let args = Args::try_parse_from(["fleet_anim"]).unwrap();
        assert!(args.drivers.is_none() && args.timeline.is_none());
    }
}
