use log::info;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use crate::control_system::{ControlError, IntentOutcome, IntersectionController};
use crate::intersection::tasks::{description_for, info_for};
use crate::shared_data::SignalSnapshot;

/// Operator commands accepted on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Road(u8),
    Emergency,
    Vip,
    Deadlock,
    Reset,
    Task(u8),
    Status,
    Pause,
    Resume,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs a number")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a number")]
    BadNumber(String),
    #[error(transparent)]
    Control(#[from] ControlError),
}

pub const HELP: &str = "\
Commands:
  road <1-4>    give the right-of-way to a road
  emergency     toggle the emergency vehicle override
  vip           toggle the VIP priority override
  deadlock      toggle the deadlock simulation
  reset         reset the intersection
  task <1-8>    switch the active task
  status        print the signal table
  pause|resume  stop or restart the clock
  quit          exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let mut number = |name: &'static str| -> Result<u8, CommandError> {
            let raw = words.next().ok_or(CommandError::MissingArgument(name))?;
            raw.trim_start_matches(['r', 'R'])
                .parse()
                .map_err(|_| CommandError::BadNumber(raw.to_string()))
        };
        match verb.as_str() {
            "road" | "r" => Ok(Command::Road(number("road")?)),
            "task" | "t" => Ok(Command::Task(number("task")?)),
            "emergency" | "e" => Ok(Command::Emergency),
            "vip" | "v" => Ok(Command::Vip),
            "deadlock" | "d" => Ok(Command::Deadlock),
            "reset" => Ok(Command::Reset),
            "status" | "s" => Ok(Command::Status),
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Applies one command and returns the line to show the operator.
pub fn apply_command(
    controller: &mut IntersectionController,
    command: Command,
) -> Result<String, CommandError> {
    let message = match command {
        Command::Road(road) => match controller.select_road(road)? {
            IntentOutcome::Applied => format!("R{} has the right-of-way", road),
            IntentOutcome::TransitionStarted => {
                format!("Handover to R{} started (yellow, then red)", road)
            }
            IntentOutcome::Ignored => "Road selection ignored".to_string(),
        },
        Command::Emergency => {
            controller.toggle_emergency();
            format!("Mode: {}", controller.snapshot().mode)
        }
        Command::Vip => {
            controller.toggle_vip();
            format!("Mode: {}", controller.snapshot().mode)
        }
        Command::Deadlock => {
            controller.toggle_deadlock();
            format!("Mode: {}", controller.snapshot().mode)
        }
        Command::Reset => {
            controller.reset();
            "System reset".to_string()
        }
        Command::Task(id) => {
            let task = controller.select_task(id)?;
            format!("{} ({})\n  {}", task, description_for(id), info_for(id))
        }
        Command::Pause => {
            controller.pause();
            "Clock paused".to_string()
        }
        Command::Resume => {
            controller.resume();
            "Clock resumed".to_string()
        }
        Command::Status => render_status(&controller.snapshot()),
        Command::Help => HELP.to_string(),
        Command::Quit => "Exiting".to_string(),
    };
    Ok(message)
}

pub fn render_status(snapshot: &SignalSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "t={}  Task #{} {}  Mode: {}  Active: {}{}",
        snapshot.time,
        snapshot.task_id,
        snapshot.task_title,
        snapshot.mode,
        snapshot.active_road,
        if snapshot.paused { "  [PAUSED]" } else { "" }
    );
    for signal in &snapshot.roads {
        let mut flags = Vec::new();
        if signal.emergency {
            flags.push("emergency");
        }
        if signal.vip {
            flags.push("vip");
        }
        let _ = writeln!(
            out,
            "  {} ({:<5})  vehicle: {:<6}  pedestrian: {:<4}  {}",
            signal.road,
            signal.road.compass(),
            signal.color.to_string(),
            if signal.pedestrian_walk { "WALK" } else { "WAIT" },
            flags.join(",")
        );
    }
    if snapshot.controls_locked {
        let _ = writeln!(
            out,
            "  transition: {} (pair {})  manual control locked",
            snapshot.transition_phase,
            snapshot
                .transition_pair
                .map(|p| p.to_string())
                .unwrap_or_default()
        );
    }
    if let Some(road) = snapshot.critical_section {
        let _ = writeln!(out, "  critical section: {}", road);
    }
    if snapshot.deadlock_detected {
        let _ = writeln!(out, "  deadlock detected");
    }
    out
}

// Reads commands from stdin until 'quit' or end of input.
pub async fn run_cli(controller: Arc<Mutex<IntersectionController>>) -> std::io::Result<()> {
    println!("{}", HELP);
    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        let reply = {
            let mut ctrl = controller.lock().unwrap_or_else(PoisonError::into_inner);
            apply_command(&mut ctrl, command)
        };
        match reply {
            Ok(message) => println!("{}", message),
            Err(e) => println!("{}", e),
        }
        if command == Command::Quit {
            info!("Operator quit");
            break;
        }
    }
    Ok(())
}
