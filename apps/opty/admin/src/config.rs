use core_config::FromEnv;
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// The admin tool only talks to MongoDB
#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb: MongoConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            mongodb: MongoConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
