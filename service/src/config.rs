use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default Google OAuth2 endpoints. Override these in tests (or for another
/// provider) via the corresponding env vars / CLI flags.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The OAuth2 client ID this application is registered under at the provider.
    #[arg(long, env)]
    oauth_client_id: Option<String>,

    /// The OAuth2 client secret for this application. Keep out of source control.
    #[arg(long, env)]
    oauth_client_secret: Option<String>,

    /// The provider's authorization (user consent) endpoint.
    #[arg(long, env, default_value = DEFAULT_AUTHORIZE_URL)]
    authorize_url: String,

    /// The provider's token endpoint used to exchange an authorization code.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_TOKEN_URL)]
    token_url: String,

    /// The provider's userinfo endpoint used to fetch the signed-in profile.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_USERINFO_URL)]
    userinfo_url: String,

    /// OAuth2 scopes requested during the consent redirect.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "profile"
    )]
    oauth_scope: Vec<String>,

    /// The path the login flow is mounted under. Appending `/new` to it logs
    /// the current session out.
    #[arg(long, env, default_value = "/login")]
    login_path: String,

    /// The externally visible base URL of this service (scheme + host + port).
    /// Used to build the absolute redirect URI sent to the provider, which
    /// must match one of the redirect URIs registered with it.
    #[arg(long, env, default_value = "http://localhost:9000")]
    public_base_url: String,

    /// When set, only provider accounts whose verified email address belongs
    /// to this domain (e.g. "example.com") may complete the login flow.
    #[arg(long, env)]
    required_email_domain: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 9000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Session expiry duration in seconds (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub session_expiry_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns a Config built from the given CLI-style args without loading
    /// a `.env` file first. Intended for tests.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::parse_from(args)
    }

    pub fn oauth_client_id(&self) -> Option<String> {
        self.oauth_client_id.clone()
    }

    pub fn oauth_client_secret(&self) -> Option<String> {
        self.oauth_client_secret.clone()
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn userinfo_url(&self) -> &str {
        &self.userinfo_url
    }

    pub fn oauth_scope(&self) -> &[String] {
        &self.oauth_scope
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn public_base_url(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }

    pub fn required_email_domain(&self) -> Option<String> {
        self.required_email_domain.clone()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
