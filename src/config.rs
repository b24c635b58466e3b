use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use crate::backend::Endpoints;

/// Validate SQL statements and forward them to the DDBMS data service.
#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "ddbms")]
pub struct Config {
    /// Endpoint receiving SELECT statements
    #[structopt(
        long,
        env = "DDBMS_SELECT_URL",
        default_value = "http://localhost:5000/select"
    )]
    pub select_url: String,

    /// Endpoint receiving INSERT fields
    #[structopt(
        long,
        env = "DDBMS_INSERT_URL",
        default_value = "http://localhost:5000/insert"
    )]
    pub insert_url: String,

    /// Seconds to wait for the data service before giving up
    #[structopt(long, default_value = "10")]
    pub timeout_secs: u64,

    /// Use an in-memory SQLite database instead of the data service
    #[structopt(long)]
    pub local: bool,

    /// SQL script run against the in-memory database at startup
    #[structopt(long, parse(from_os_str), requires = "local")]
    pub seed: Option<PathBuf>,

    /// File used to load and save the line editor history
    #[structopt(long, parse(from_os_str))]
    pub history: Option<PathBuf>,

    /// Submit this statement, print the result and exit
    #[structopt(short, long)]
    pub execute: Option<String>,
}

impl Config {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            select: self.select_url.clone(),
            insert: self.insert_url.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
