use std::path::Path;

use serde::de::DeserializeOwned;

use crate::environment::Environment;

/// Directory holding the configuration files, relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// File loaded in every environment.
const BASE_CONFIG_FILE: &str = "base.yaml";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "APP";

const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested keys, e.g. `APP_CONTROL_PLANE__URL` sets `control_plane.url`.
const ENV_SEPARATOR: &str = "__";

/// Separator for list elements, e.g. `APP_API_KEYS=abc,def`.
const LIST_SEPARATOR: &str = ",";

/// Keys of a configuration type whose environment overrides are split into lists.
pub trait Config {
    const LIST_PARSE_KEYS: &'static [&'static str];
}

/// Loads configuration from `./configuration` for the environment in `APP_ENVIRONMENT`.
///
/// Sources are layered in order, later ones winning:
/// 1. `configuration/base.yaml`
/// 2. `configuration/{environment}.yaml`
/// 3. `APP_` prefixed environment variables
pub fn load_config<T>() -> Result<T, config::ConfigError>
where
    T: Config + DeserializeOwned,
{
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("failed to determine the current directory: {e}"))
    })?;
    let environment =
        Environment::load().map_err(|e| config::ConfigError::Message(e.to_string()))?;

    load_config_from(&base_path.join(CONFIGURATION_DIR), environment)
}

/// Loads configuration from `directory` for an explicit `environment`.
pub fn load_config_from<T>(directory: &Path, environment: Environment) -> Result<T, config::ConfigError>
where
    T: Config + DeserializeOwned,
{
    let environment_filename = format!("{environment}.yaml");

    let mut environment_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR);

    if !<T as Config>::LIST_PARSE_KEYS.is_empty() {
        environment_source = environment_source
            .try_parsing(true)
            .list_separator(LIST_SEPARATOR);

        for key in <T as Config>::LIST_PARSE_KEYS {
            environment_source = environment_source.with_list_parse_key(key);
        }
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join(BASE_CONFIG_FILE)))
        .add_source(config::File::from(directory.join(environment_filename)))
        .add_source(environment_source)
        .build()?;

    settings.try_deserialize::<T>()
}
