/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::DEFAULT_MAX_LOAD;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub building: BuildingConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct BuildingConfig {
    pub lowest_floor: i32,
    pub highest_floor: i32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct FleetConfig {
    pub start_floors: Vec<i32>,
    #[serde(default = "default_max_load")]
    pub max_load: u32,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServiceConfig {
    // Milliseconds between autonomous ticks, 0 means ticks are driven by the caller
    #[serde(default)]
    pub tick_interval: u64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            lowest_floor: 0,
            highest_floor: 10,
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        FleetConfig {
            start_floors: vec![1, 10],
            max_load: DEFAULT_MAX_LOAD,
        }
    }
}

fn default_max_load() -> u32 {
    DEFAULT_MAX_LOAD
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let building = &self.building;
        if building.lowest_floor > building.highest_floor {
            return Err(ConfigError::Invalid(format!(
                "lowest_floor {} is above highest_floor {}",
                building.lowest_floor, building.highest_floor
            )));
        }

        if self.fleet.start_floors.is_empty() {
            return Err(ConfigError::Invalid("fleet has no cars".to_string()));
        }

        if let Some(floor) = self
            .fleet
            .start_floors
            .iter()
            .find(|&&floor| floor < building.lowest_floor || floor > building.highest_floor)
        {
            return Err(ConfigError::Invalid(format!(
                "start floor {} is outside the building",
                floor
            )));
        }

        Ok(())
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
