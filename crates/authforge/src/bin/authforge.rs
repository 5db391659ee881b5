//! Brings the Authforge stores up and keeps them up until Ctrl-C.
//!
//! All settings come from flags or the environment:
//!
//! ```text
//! JWT_KEY=... JWT_RESET_KEY=... \
//! SESSION_DB_URL=postgres://app:pw@db/main CACHE_URL=redis://cache:6379/0 \
//! RUST_LOG=info authforge
//! ```
//!
//! The session store is tried 6 times, 15 s apart, before startup fails.
//! `CONNECT_ATTEMPTS` and `CONNECT_DELAY_SECS` are an operator override of
//! that policy (e.g. a shorter wait in CI); leave them unset in production.

use std::process::ExitCode;
use std::time::Duration;

use authforge::{AuthforgeConfig, PgAuthforge, RetryPolicy, SigningKey, TokenConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "authforge", version, about = "Session and claim-token service bootstrap")]
struct Args {
    /// Key for account-activation tokens.
    #[arg(long, env = "JWT_KEY", hide_env_values = true)]
    jwt_key: String,

    /// Key for password-reset tokens. Must differ from the activation key.
    #[arg(long, env = "JWT_RESET_KEY", hide_env_values = true)]
    jwt_reset_key: String,

    /// PostgreSQL DSN of the session store.
    #[arg(long, env = "SESSION_DB_URL", hide_env_values = true)]
    database_url: String,

    /// Redis URL of the session cache.
    #[arg(long, env = "CACHE_URL", hide_env_values = true)]
    cache_url: String,

    /// Name of the session table.
    #[arg(long, env = "SESSION_TABLE", default_value = "sessions")]
    session_table: String,

    /// Domain attribute of the session cookie.
    #[arg(long, env = "COOKIE_DOMAIN", default_value = "localhost")]
    cookie_domain: String,

    /// Operator override: connection attempts before giving up on the
    /// session store.
    #[arg(long, env = "CONNECT_ATTEMPTS", default_value_t = RetryPolicy::DEFAULT_ATTEMPTS)]
    connect_attempts: u32,

    /// Operator override: seconds between connection attempts.
    #[arg(long, env = "CONNECT_DELAY_SECS", default_value_t = RetryPolicy::DEFAULT_DELAY.as_secs())]
    connect_delay_secs: u64,
}

impl Args {
    fn into_config(self) -> AuthforgeConfig {
        let tokens = TokenConfig::new(
            SigningKey::new(self.jwt_key),
            SigningKey::new(self.jwt_reset_key),
        );
        AuthforgeConfig::new(self.database_url, self.cache_url, tokens)
            .with_session_table(self.session_table)
            .with_cookie_domain(self.cookie_domain)
            .with_retry_policy(RetryPolicy {
                attempts: self.connect_attempts,
                delay: Duration::from_secs(self.connect_delay_secs),
            })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config = Args::parse().into_config();

    let _auth = match PgAuthforge::connect(&config).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::error!(error = %e, fatal = e.is_fatal(), "startup failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for shutdown signal");
        return ExitCode::FAILURE;
    }
    tracing::info!("shutting down");
    ExitCode::SUCCESS
}
