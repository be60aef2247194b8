use envconfig::Envconfig;
use log::debug;

/// Connection details the host hands to its transport implementation.
#[derive(Envconfig, Clone)]
pub struct CubeApiConfig {
    #[envconfig(from = "CUBE_API_URL", default = "http://localhost:4000/cubejs-api/v1")]
    pub api_url: String,

    #[envconfig(from = "CUBE_API_TOKEN")]
    pub api_token: Option<String>,
}

impl CubeApiConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "CubeApiConfig loaded: api_url={}, api_token_set={}",
            config.api_url,
            config.api_token.is_some()
        );
        Ok(config)
    }
}

/// Identity the schema synchronizer stamps on metrics it registers.
#[derive(Envconfig, Clone)]
pub struct SyncConfig {
    #[envconfig(from = "SYNC_ACTOR_ID", default = "1")]
    pub system_actor: u64,
}

impl SyncConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!("SyncConfig loaded: system_actor={}", config.system_actor);
        Ok(config)
    }
}
