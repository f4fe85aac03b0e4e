use smart_intersection::config::TimingConfig;
use smart_intersection::control_system::IntersectionController;
use smart_intersection::global_variables::SIGNAL_LOG_CSV;
use smart_intersection::monitoring::{generate_report_summary, log_snapshot, run_cli};
use std::error::Error;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = TimingConfig::from_env()?;
    println!("Starting intersection controller...");
    let controller = Arc::new(Mutex::new(IntersectionController::new(config)));

    // Tick the controller in the background and record every snapshot.
    let update_loop = tokio::spawn(IntersectionController::run_update_loop(
        Arc::clone(&controller),
        config.tick_period(),
        |snapshot| log_snapshot(SIGNAL_LOG_CSV, snapshot),
    ));

    let cli_result = run_cli(Arc::clone(&controller)).await;
    update_loop.abort();
    cli_result?;

    match generate_report_summary(SIGNAL_LOG_CSV) {
        Ok(summary) => println!("{}", summary),
        Err(e) => eprintln!("No report available: {}", e),
    }
    Ok(())
}
