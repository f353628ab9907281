use std::env;
use std::path::PathBuf;

pub const DEFAULT_DEPOSITS_FILE: &str = "deposits.json";
pub const DEFAULT_TRANSFERS_FILE: &str = "transfers.json";
pub const DEFAULT_TRANSACTIONS_FILE: &str = "transactions.json";

pub const DEPOSITS_FILE_VAR: &str = "MONEY_DEPOSITS_FILE";
pub const TRANSFERS_FILE_VAR: &str = "MONEY_TRANSFERS_FILE";
pub const TRANSACTIONS_FILE_VAR: &str = "MONEY_TRANSACTIONS_FILE";
pub const BALANCE_DIR_VAR: &str = "MONEY_BALANCE_DIR";

/// Locations of every file the library reads or writes.
/// Relative paths resolve against the working directory of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub deposits_file: PathBuf,
    pub transfers_file: PathBuf,
    pub transactions_file: PathBuf,
    /// Directory receiving `balance_<IBAN>.json` files
    pub balance_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            deposits_file: PathBuf::from(DEFAULT_DEPOSITS_FILE),
            transfers_file: PathBuf::from(DEFAULT_TRANSFERS_FILE),
            transactions_file: PathBuf::from(DEFAULT_TRANSACTIONS_FILE),
            balance_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Defaults overridden by the `MONEY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        if let Some(path) = read(DEPOSITS_FILE_VAR) {
            config.deposits_file = path;
        }
        if let Some(path) = read(TRANSFERS_FILE_VAR) {
            config.transfers_file = path;
        }
        if let Some(path) = read(TRANSACTIONS_FILE_VAR) {
            config.transactions_file = path;
        }
        if let Some(path) = read(BALANCE_DIR_VAR) {
            config.balance_dir = path;
        }

        log::debug!("Resolved configuration: {config:?}");
        config
    }
}
