/* 3rd party libraries */
use clap::Parser;
use crossbeam_channel as cbc;
use log::{info, warn};
use std::path::Path;
use std::time::Duration;

/* Custom libraries */
use elevator_dispatch::config::{self, Config};
use elevator_dispatch::dispatcher::{Dispatcher, DispatcherService, TickReport};
use elevator_dispatch::shared::{Direction, Request};
use elevator_dispatch::unwrap_or_exit;

/* Command line */
#[derive(Parser, Debug)]
#[clap(name = "elevator_dispatch", about = "Runs an elevator fleet for a number of ticks")]
struct Args {
    /// Path to the configuration file
    #[clap(long, short, default_value = "config.toml")]
    config: String,

    /// Number of ticks to simulate
    #[clap(long, short, default_value_t = 10)]
    ticks: u64,

    /// Hall call as FLOOR:DIRECTION, e.g. 3:up. May be repeated.
    #[clap(long = "pickup", short, parse(try_from_str = parse_pickup))]
    pickups: Vec<Request>,

    /// Print the fleet status as JSON after every tick
    #[clap(long)]
    json: bool,
}

fn parse_pickup(arg: &str) -> Result<Request, String> {
    let (floor, direction) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected FLOOR:DIRECTION, got '{}'", arg))?;
    let floor = floor
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid floor '{}': {}", floor, e))?;
    let direction = direction.trim().parse::<Direction>()?;
    if direction == Direction::Idle {
        return Err("a hall call must go up or down".to_string());
    }
    Ok(Request::new(floor, direction))
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the configuration
    let config = if Path::new(&args.config).exists() {
        unwrap_or_exit!(config::load_config(&args.config))
    } else {
        warn!("No configuration at {}, using defaults", args.config);
        Config::default()
    };

    // Start the dispatcher
    let tick_interval = config.service.tick_interval;
    let (report_tx, report_rx) = cbc::unbounded::<TickReport>();
    let (handle, dispatcher_thread) = unwrap_or_exit!(DispatcherService::spawn(
        Dispatcher::from_config(&config),
        report_tx,
        tick_interval,
    ));
    info!(
        "Started {} cars serving floors {}..={}",
        config.fleet.start_floors.len(),
        config.building.lowest_floor,
        config.building.highest_floor
    );

    for request in args.pickups {
        info!("Hall call: floor {} going {}", request.floor(), request.direction());
        if let Err(e) = handle.submit_pickup(request.floor(), request.direction()) {
            warn!("Hall call rejected: {}", e);
        }
    }

    for tick in 1..=args.ticks {
        if tick_interval > 0 {
            // The service ticks on its own, wait for it
            unwrap_or_exit!(report_rx.recv_timeout(Duration::from_millis(tick_interval * 10)));
        } else {
            unwrap_or_exit!(handle.tick());
            // Drop the copy published on the report channel
            let _ = report_rx.try_recv();
        }

        let fleet = unwrap_or_exit!(handle.fleet_status());
        if args.json {
            let line = serde_json::json!({ "tick": tick, "cars": fleet });
            println!("{}", line);
        } else {
            for car in fleet {
                info!(
                    "[tick {}] car {} -> floor {}, direction {}, door {:?}, {:?}{}",
                    tick,
                    car.id,
                    car.floor,
                    car.direction,
                    car.door_state,
                    car.mode,
                    if car.overloaded { ", OVERLOADED" } else { "" }
                );
            }
        }
    }

    let waiting = unwrap_or_exit!(handle.pending_len());
    if waiting > 0 {
        warn!("{} hall calls never found a car", waiting);
    }

    unwrap_or_exit!(handle.terminate());
    if dispatcher_thread.join().is_err() {
        warn!("Dispatcher thread panicked");
    }
}
