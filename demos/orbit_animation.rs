//! Terminal rendition of the orbit animation.
//!
//! Plays one full orbit frame by frame and prints the planet's distance,
//! speed and angle once per simulated tenth of an orbit.
//!
//! Run with:
//!   cargo run --example orbit_animation
//!   cargo run --example orbit_animation -- config.json --realtime
//!
//! Set `RUST_LOG=kepler_orbit=debug` to see the solver's log output.

use kepler_orbit::units::{meters_to_million_miles, m_per_s_to_km_per_s};
use kepler_orbit::{ApsisKind, SimulationConfig, SimulationDriver};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .init();

    let mut config_path = None;
    let mut realtime = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--realtime" => realtime = true,
            path => config_path = Some(path.to_owned()),
        }
    }

    let config = match config_path {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let mut driver = SimulationDriver::new(config)?;
    let model = *driver.model();

    println!("Orbit Animation");
    println!(
        "  Launch: {:.2} million miles at {:.2} km/s",
        meters_to_million_miles(model.initial_radius()),
        m_per_s_to_km_per_s(model.initial_speed())
    );
    println!(
        "  Period: {:.2} days, e = {:.4}",
        model.orbital_period()? / 86_400.0,
        model.eccentricity()?
    );
    println!(
        "  Perihelion {:.2} / aphelion {:.2} million miles",
        meters_to_million_miles(model.perihelion_distance()?),
        meters_to_million_miles(model.aphelion_distance()?)
    );
    println!(
        "  Speed range {:.3} .. {:.3} km/s",
        m_per_s_to_km_per_s(model.aphelion_speed()?),
        m_per_s_to_km_per_s(model.max_velocity()?)
    );
    for kind in [ApsisKind::Perihelion, ApsisKind::Aphelion] {
        if let Some(passage) = model.next_apsis(kind)? {
            println!("  Next {:?} after {:.2} days", kind, passage.time / 86_400.0);
        }
    }
    println!();

    let frames = driver.config().animation_fps as usize
        * driver.config().orbit_duration.ceil() as usize;
    let report_every = (frames / 10).max(1);
    let delay = driver.frame_delay();

    driver.start()?;
    for frame in 1..=frames {
        let Some(state) = driver.tick()? else {
            break;
        };
        if frame % report_every == 0 {
            println!(
                "  frame {:4}  t = {:7.2} d  r = {:7.3} Mmi  v = {:6.3} km/s  phi = {:6.1} deg",
                frame,
                state.time / 86_400.0,
                meters_to_million_miles(state.radius),
                m_per_s_to_km_per_s(state.speed()),
                state.angle.to_degrees()
            );
        }
        if realtime {
            std::thread::sleep(delay);
        }
    }
    driver.stop();

    let path = driver.trajectory()?;
    println!();
    println!("Orbit path: {} points", path.len());
    Ok(())
}
