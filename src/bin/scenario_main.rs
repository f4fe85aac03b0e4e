// scenario_main.rs
//
// Drives the controller with a seeded random stream of operator intents on the
// logical clock (no sleeping) and records every tick to a CSV signal log.
//
// Usage: scenario_main [ticks] [seed] [log_path]

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smart_intersection::config::TimingConfig;
use smart_intersection::control_system::IntersectionController;
use smart_intersection::global_variables::SIGNAL_LOG_CSV;
use smart_intersection::monitoring::{append_snapshot, generate_report_summary, render_status};
use std::env;
use std::error::Error;

fn issue_random_intent(controller: &mut IntersectionController, rng: &mut StdRng) {
    let roll: f64 = rng.random_range(0.0..1.0);
    if roll < 0.55 {
        let road = rng.random_range(1..=4);
        if let Ok(outcome) = controller.select_road(road) {
            info!("Scenario: select R{} -> {:?}", road, outcome);
        }
    } else if roll < 0.67 {
        controller.toggle_emergency();
    } else if roll < 0.79 {
        controller.toggle_vip();
    } else if roll < 0.87 {
        controller.toggle_deadlock();
    } else if roll < 0.97 {
        let task = rng.random_range(1..=8);
        if let Ok(task) = controller.select_task(task) {
            info!("Scenario: {}", task);
        }
    } else {
        controller.reset();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks: u64 = args.get(1).map(|s| s.parse::<u64>()).transpose()?.unwrap_or(60);
    let seed: u64 = args.get(2).map(|s| s.parse::<u64>()).transpose()?.unwrap_or(7);
    let log_path = args.get(3).cloned().unwrap_or_else(|| SIGNAL_LOG_CSV.to_string());

    let config = TimingConfig::from_env()?;
    let mut controller = IntersectionController::new(config);
    let mut rng = StdRng::seed_from_u64(seed);
    println!("Running {} ticks with seed {}...", ticks, seed);

    for _ in 0..ticks {
        if rng.random_bool(0.2) {
            issue_random_intent(&mut controller, &mut rng);
        }
        controller.tick();
        if let Err(violation) = controller.state().check_invariants() {
            warn!("Invariant violated at t={}: {}", controller.now(), violation);
        }
        append_snapshot(&log_path, &controller.snapshot())?;
    }

    println!("{}", render_status(&controller.snapshot()));
    println!("{}", generate_report_summary(&log_path)?);
    Ok(())
}
