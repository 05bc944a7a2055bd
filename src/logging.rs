use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Crate targets that receive the verbosity-derived level.
const LOG_TARGETS: &[&str] = &["extension_discovery", "extdisc"];

/// Log verbosity, ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn filter_directives(self) -> String {
        let level = self.level().to_string().to_ascii_lowercase();
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flags.
/// Logs go to stderr so stdout stays clean for the registry output.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directives()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbosity >= Verbosity::Debug)
        .with_line_number(verbosity >= Verbosity::Debug)
        .compact();

    // A subscriber may already be installed (tests, embedding callers).
    let _ = match verbosity {
        Verbosity::Quiet | Verbosity::Normal => subscriber.without_time().try_init(),
        _ => subscriber.try_init(),
    };
}
