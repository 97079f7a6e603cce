//! Logs an account in through the gateway and streams raw game text to
//! stdout until the server closes the connection or ctrl-c.
//!
//! Usage: `login-cli <config.json>`
//!
//! ```json
//! {
//!   "account": {
//!     "username": "katherine",
//!     "password": "...",
//!     "game_code": "DR",
//!     "character": "Kath"
//!   },
//!   "gateway": { "host": "eaccess.play.net", "port": 7900 }
//! }
//! ```

use serde::Deserialize;

use embergate::{Account, EmbergateError, GatewayClient, RawChunks};

#[derive(Debug, Deserialize)]
struct Config {
    account: Account,
    #[serde(default)]
    gateway: Option<Gateway>,
}

#[derive(Debug, Deserialize)]
struct Gateway {
    host: String,
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: login-cli <config.json>")?;
    let config: Config =
        serde_json::from_str(&std::fs::read_to_string(&path)?)?;

    let mut builder = GatewayClient::builder();
    if let Some(gateway) = &config.gateway {
        builder = builder.gateway(&gateway.host, gateway.port);
    }
    let client = builder.build();

    let credentials = client.login(&config.account).await?;
    let mut session = client.session(credentials).await?;
    let mut events = session.connect(RawChunks).await?;

    tracing::info!("connected; streaming game text (ctrl-c to quit)");
    loop {
        tokio::select! {
            chunk = events.next_event() => {
                match chunk {
                    Some(bytes) => {
                        print!("{}", String::from_utf8_lossy(&bytes));
                    }
                    None => {
                        tracing::info!("server closed the connection");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                if let Err(e) = session.disconnect().await {
                    let e: EmbergateError = e.into();
                    tracing::warn!(error = %e, "disconnect was not clean");
                }
                break;
            }
        }
    }

    Ok(())
}
