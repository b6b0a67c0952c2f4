//! Simulates the reference roller racer and prints telemetry as CSV.
//!
//! # Usage
//!
//! ```text
//! cargo run --example ride -- propel
//! cargo run --example ride -- brake
//! cargo run --example ride -- turn 0.3
//! ```
//!
//! # Modes
//!
//! - **propel**: start at rest and oscillate the steer. The caster drags the
//!   front contact sideways and the constraints turn that into forward speed.
//!
//! - **brake**: start at 2 m/s and brake fully. Speed falls linearly until
//!   the brake switches to its viscous regime near stand-still.
//!
//! - **turn [angle]**: start at 1 m/s and steer to a fixed angle (default
//!   0.3 rad). Once the servo settles the racer coasts on a circle.

use std::error::Error;

use roller_racer::{Simulation, SteerCommand, Telemetry};
use uom::si::{angle::radian, energy::joule, time::second, velocity::meter_per_second};

const DT: f64 = 1e-3;
const STEPS: usize = 10_000;

fn main() -> Result<(), Box<dyn Error>> {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "propel".into());

    let mut simulation = Simulation::default();
    match mode.as_str() {
        "propel" => {
            simulation.set_steer_command(SteerCommand::Sinusoid {
                amplitude: 0.4,
                frequency: 0.5,
                offset: 0.0,
            })?;
        }
        "brake" => {
            simulation.set_initial_speed(2.0)?;
            simulation.set_brake_command(1.0)?;
        }
        "turn" => {
            let angle = std::env::args()
                .nth(2)
                .as_deref()
                .map(str::parse::<f64>)
                .transpose()?
                .unwrap_or(0.3);
            simulation.set_initial_speed(1.0)?;
            simulation.set_steer_setpoint(angle)?;
        }
        other => {
            eprintln!("Unknown mode: {other}");
            eprintln!("Usage: ride [propel|brake|turn [angle]]");
            std::process::exit(1);
        }
    }

    let mut telemetry = Telemetry::new(simulation.parameters(), 100);
    simulation.run(DT, STEPS, telemetry.observer())?;

    println!("time,speed,kinetic_energy,slip_rear,slip_front,heading,steer");
    for sample in telemetry.samples() {
        println!(
            "{:.3},{:.6},{:.6},{:.3e},{:.3e},{:.6},{:.6}",
            sample.time.get::<second>(),
            sample.speed.get::<meter_per_second>(),
            sample.kinetic_energy.get::<joule>(),
            sample.slip_rate_rear.get::<meter_per_second>(),
            sample.slip_rate_front.get::<meter_per_second>(),
            sample.heading.get::<radian>(),
            sample.steer_angle.get::<radian>(),
        );
    }

    Ok(())
}
