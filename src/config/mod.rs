//! Layered configuration: built-in defaults, then an optional
//! `config/default.*` file, then `LOADCAST__SECTION__KEY` environment
//! variables.

mod settings;

use config::{Config, Environment, File};

use settings::PartialSettings;

pub use settings::{BrokerSettings, LoggingSettings, ServerSettings, Settings, TrackingSettings};

use crate::utils::Result;

pub const ENV_PREFIX: &str = "LOADCAST";

/// Load settings from `config/default` and the environment.
pub fn load_config() -> Result<Settings> {
    load_config_from("config/default")
}

/// Load settings from the file at `path` (extension optional, file may be
/// absent) and the environment, merged over the defaults.
pub fn load_config_from(path: &str) -> Result<Settings> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let partial: PartialSettings = config.try_deserialize()?;
    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;
