//! Producer/consumer simulation runner.
//!
//! # Usage
//!
//! ```sh
//! prodcon <run-secs> <max-sleep-secs> <producers> <consumers> <verbose>
//! prodcon 10 2 3 4 y
//! ```
//!
//! # Exit codes
//!
//! - `0`: simulation completed
//! - `-1`: wrong number of arguments
//! - `1`: a numeric argument is zero or not a number
//! - `2`: more than 25 producers or consumers
//! - `3`: a worker thread could not be started

use std::sync::Arc;

use prodcon::buffer::SimBuffer;
use prodcon::config::{RunConfig, USAGE};
use prodcon::display::{ConsoleSink, EventSink, NullSink, render_view};
use prodcon::{Supervisor, SupervisorError};

fn main() {
    prodcon::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match RunConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            println!("{USAGE}");
            eprintln!("prodcon: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = run(config) {
        eprintln!("prodcon: {e}");
        let code = match &e {
            SupervisorError::Config(config) => config.exit_code(),
            SupervisorError::Spawn(_) => 3,
        };
        std::process::exit(code);
    }
}

fn run(config: RunConfig) -> Result<(), SupervisorError> {
    println!("Starting threads...");

    let sink: Arc<dyn EventSink> = if config.verbose {
        // Initial conditions, before any worker touches the buffer.
        print!("{}", render_view("", &SimBuffer::new().view()));
        Arc::new(ConsoleSink)
    } else {
        Arc::new(NullSink)
    };

    let run_duration = config.run_duration;
    let supervisor = Supervisor::spawn(config, sink)?;

    std::thread::sleep(run_duration);
    let report = supervisor.shutdown();

    println!("{report}");
    Ok(())
}
