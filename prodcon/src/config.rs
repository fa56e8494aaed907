//! Run configuration and command-line validation.
//!
//! The process takes five positional arguments:
//!
//! ```text
//! prodcon <run-secs> <max-sleep-secs> <producers> <consumers> <verbose>
//! ```
//!
//! Every numeric argument must be a positive integer and both worker counts
//! are capped at [`MAX_WORKERS`]. `verbose` is on only for the literal `y`.

use std::time::Duration;

use thiserror::Error;

/// Upper bound on producers and on consumers.
pub const MAX_WORKERS: usize = 25;

/// Number of positional arguments after the program name.
pub const ARGUMENT_COUNT: usize = 5;

/// Usage text printed on any configuration error.
pub const USAGE: &str = "\
INVALID ARGUMENTS!!
The format of parameters are as followed:
\tint Run time
\tint Max sleep time of threads
\tint Number of Producers  ( MIN:1  MAX:25 )
\tint Number of Consumers  ( MIN:1  MAX:25 )
\tchar 'y' - Verbose mode
";

/// Rejected configuration. Always detected before any worker starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Wrong number of positional arguments.
    #[error("expected {expected} arguments, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },
    /// A numeric argument did not parse as an integer.
    #[error("{field} must be a positive integer, got {value:?}")]
    NotANumber { field: &'static str, value: String },
    /// A numeric argument was zero (or negative).
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    /// More workers of one kind than the simulation supports.
    #[error("{field} is {requested}, the maximum is {max}")]
    TooManyWorkers {
        field: &'static str,
        requested: usize,
        max: usize,
    },
}

impl ConfigError {
    /// Process exit status reported for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::WrongArgumentCount { .. } => -1,
            Self::NotANumber { .. } | Self::NotPositive { .. } => 1,
            Self::TooManyWorkers { .. } => 2,
        }
    }
}

/// Immutable parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// How long the supervisor lets workers run before raising shutdown.
    pub run_duration: Duration,
    /// Upper bound of each worker's random pause. Zero means no pause.
    pub max_sleep: Duration,
    pub producers: usize,
    pub consumers: usize,
    /// Emit a buffer snapshot for every worker event.
    pub verbose: bool,
}

impl RunConfig {
    /// Parses the positional arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking argument count first, then
    /// each number in order, then the worker caps.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        let [run, sleep, producers, consumers, verbose] = args else {
            return Err(ConfigError::WrongArgumentCount {
                expected: ARGUMENT_COUNT,
                got: args.len(),
            });
        };

        let run_secs = parse_positive("run time", run.as_ref())?;
        let sleep_secs = parse_positive("max sleep time", sleep.as_ref())?;
        let producers = parse_positive("producer count", producers.as_ref())?;
        let consumers = parse_positive("consumer count", consumers.as_ref())?;
        let verbose: &str = verbose.as_ref();

        let config = Self {
            run_duration: Duration::from_secs(run_secs),
            max_sleep: Duration::from_secs(sleep_secs),
            producers: usize::try_from(producers).unwrap_or(usize::MAX),
            consumers: usize::try_from(consumers).unwrap_or(usize::MAX),
            verbose: verbose == "y",
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants every run relies on.
    ///
    /// A zero `max_sleep` is allowed here (workers then never pause); the
    /// command line still rejects it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] for a zero run duration or worker
    /// count and [`ConfigError::TooManyWorkers`] above [`MAX_WORKERS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_duration.is_zero() {
            return Err(ConfigError::NotPositive { field: "run time" });
        }
        for (field, requested) in [
            ("producer count", self.producers),
            ("consumer count", self.consumers),
        ] {
            if requested == 0 {
                return Err(ConfigError::NotPositive { field });
            }
            if requested > MAX_WORKERS {
                return Err(ConfigError::TooManyWorkers {
                    field,
                    requested,
                    max: MAX_WORKERS,
                });
            }
        }
        Ok(())
    }
}

fn parse_positive(field: &'static str, value: &str) -> Result<u64, ConfigError> {
    let parsed: i64 = value.trim().parse().map_err(|_| ConfigError::NotANumber {
        field,
        value: value.to_owned(),
    })?;
    match u64::try_from(parsed) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::NotPositive { field }),
    }
}
