use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct Config {
    database_url: String,
    api_host: Option<String>,
    api_port: Option<u16>,
    /// upper bound of pooled database connections
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, max = 100))]
    database_max_connections: u32,
    /// directory holding the built frontend bundle
    frontend_dir: Option<String>,
}

fn default_max_connections() -> u32 {
    5
}

lazy_static! {
    static ref CONFIG: Config = match envy::from_env::<Config>() {
        Ok(config) => {
            match config.validate() {
                Ok(()) => config,
                Err(e) => panic!("invalid environment variable: {}", e),
            }
        }
        Err(error) => panic!("Missing or incorrect environment variable: {}", error),
    };
}

impl Config {
    /// Load and validate the configuration, panics when the environment is incomplete
    pub fn init() {
        lazy_static::initialize(&CONFIG);
    }

    pub fn database_url() -> &'static str {
        CONFIG.database_url.as_ref()
    }

    pub fn api_host() -> &'static str {
        match &CONFIG.api_host {
            Some(host) => host.as_ref(),
            None => "localhost",
        }
    }

    pub fn api_port() -> u16 {
        CONFIG.api_port.unwrap_or(8080)
    }

    pub fn database_max_connections() -> u32 {
        CONFIG.database_max_connections
    }

    pub fn frontend_dir() -> &'static str {
        match &CONFIG.frontend_dir {
            Some(dir) => dir.as_ref(),
            None => "./frontend_dist",
        }
    }
}
