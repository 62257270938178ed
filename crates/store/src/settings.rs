use clap::Parser;

/// Store configuration. There is no CLI surface; the derive exists so an
/// embedding host can pull every field from the environment (or a .env via
/// [`crate::load_dotenv`]) with the usual precedence rules.
#[derive(Debug, Clone, Parser)]
#[clap(name = "gymlog")]
pub struct Settings {
    /// The live store: current routines/exercises and not-yet-archived runs
    #[clap(long, env, default_value = "gymlog-live.sqlite")]
    pub live_connection_string: String,
    /// The archive store: historical run records
    #[clap(long, env, default_value = "gymlog-archive.sqlite")]
    pub archive_connection_string: String,
    /// Minimum age, in seconds since started_at, before a run is archived
    #[clap(long, env, default_value = "86400")]
    pub transfer_threshold_secs: u64,
    /// Remove run rows from the live store once they are archived
    #[clap(long, env)]
    pub delete_source_after_transfer: bool,
}

impl Settings {
    /// Resolve settings from env vars and defaults alone
    pub fn from_env() -> Self {
        Self::parse_from(["gymlog"])
    }
}
