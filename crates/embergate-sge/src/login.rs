//! The gateway login driver.
//!
//! One login is a strictly forward sequence of request/response exchanges
//! over an already-pinned transport:
//!
//!   1. authenticate (salted password, `A`)
//!   2. validate the requested game code against the account's list (`M`)
//!   3. confirm the subscription for that game (`G`)
//!   4. resolve the character name to its server-assigned id (`C`)
//!   5. exchange the id for game-server credentials (`L`)
//!
//! Each step advances only on success; any failure is terminal for the
//! attempt. The driver owns its stream and shuts it down when it
//! finishes, success or failure: gateway connections are never reused
//! across login attempts.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use embergate_transport::{TransportConfig, exchange};

use crate::types::{
    Account, CharacterDescriptor, Game, GameCredentials, Subscription,
};
use crate::{SgeError, obfuscate, wire};

/// Fixed identifier for the game-client wire format this crate speaks,
/// sent verbatim during credential exchange.
const PROTOCOL_ID: &str = "STORM";

/// Drives the login sequence over a gateway stream.
///
/// Generic over the stream so tests can run the whole protocol against a
/// scripted peer on an in-memory duplex; production hands it the pinned
/// TLS stream.
pub struct LoginDriver<S> {
    stream: S,
    idle_timeout: Duration,
    request_timeout: Duration,
}

impl<S> LoginDriver<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected gateway stream with explicit timeouts.
    pub fn new(
        stream: S,
        idle_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            idle_timeout,
            request_timeout,
        }
    }

    /// Wraps a connected gateway stream, taking timeouts from `config`.
    pub fn with_config(stream: S, config: &TransportConfig) -> Self {
        Self::new(stream, config.idle_timeout, config.request_timeout)
    }

    /// Runs the full login sequence and returns the game credentials.
    ///
    /// Consumes the driver: whatever the outcome, the gateway stream is
    /// shut down before this returns.
    pub async fn login(
        mut self,
        account: &Account,
    ) -> Result<GameCredentials, SgeError> {
        let outcome = self.run(account).await;
        if let Err(e) = &outcome {
            tracing::debug!(error = %e, "login attempt failed");
        }
        let _ = self.stream.shutdown().await;
        outcome
    }

    async fn run(
        &mut self,
        account: &Account,
    ) -> Result<GameCredentials, SgeError> {
        self.authenticate(account).await?;
        tracing::debug!(username = %account.username, "authenticated");

        self.validate_game_code(&account.game_code).await?;

        let subscription =
            self.confirm_subscription(&account.game_code).await?;
        tracing::debug!(
            game = %subscription.game.name,
            status = %subscription.status,
            "subscription confirmed"
        );

        let character = self.resolve_character(&account.character).await?;
        self.exchange_credentials(&character).await
    }

    /// One lock-step exchange, response decoded for field parsing.
    ///
    /// Responses are ASCII; lossy decoding only ever fires on a corrupt
    /// chunk, which the parsers then reject field-by-field.
    async fn request(&mut self, payload: &[u8]) -> Result<String, SgeError> {
        let chunk = exchange(
            &mut self.stream,
            payload,
            self.idle_timeout,
            Some(self.request_timeout),
        )
        .await?;
        Ok(String::from_utf8_lossy(&chunk).into_owned())
    }

    async fn authenticate(
        &mut self,
        account: &Account,
    ) -> Result<(), SgeError> {
        let hashed = obfuscate::hashed_password(
            &mut self.stream,
            account.password.as_bytes(),
            self.idle_timeout,
            Some(self.request_timeout),
        )
        .await?;

        // The hash is raw bytes spliced after the text prefix; it must
        // not pass through a string encoding.
        let username = account.username.to_uppercase();
        let mut payload =
            Vec::with_capacity(3 + username.len() + hashed.len());
        payload.extend_from_slice(b"A\t");
        payload.extend_from_slice(username.as_bytes());
        payload.push(b'\t');
        payload.extend_from_slice(&hashed);

        let response = self.request(&payload).await?;
        parse_authentication(&response)
    }

    async fn validate_game_code(
        &mut self,
        code: &str,
    ) -> Result<(), SgeError> {
        let response = self.request(b"M").await?;
        let games = parse_game_list(&response);
        if games.iter().any(|g| g.code == code) {
            Ok(())
        } else {
            Err(SgeError::GameNotFound {
                code: code.to_string(),
            })
        }
    }

    async fn confirm_subscription(
        &mut self,
        code: &str,
    ) -> Result<Subscription, SgeError> {
        let response =
            self.request(format!("G\t{code}").as_bytes()).await?;
        parse_subscription(&response, code)
    }

    async fn resolve_character(
        &mut self,
        name: &str,
    ) -> Result<CharacterDescriptor, SgeError> {
        let response = self.request(b"C").await?;
        parse_character_list(&response)
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SgeError::CharacterNotFound {
                name: name.to_string(),
            })
    }

    async fn exchange_credentials(
        &mut self,
        character: &CharacterDescriptor,
    ) -> Result<GameCredentials, SgeError> {
        let response = self
            .request(
                format!("L\t{}\t{PROTOCOL_ID}", character.id).as_bytes(),
            )
            .await?;
        parse_credentials(&response, &character.name)
    }
}

/// Success is the literal `\tKEY\t` marker; anything else carries the
/// rejection reason in its last field.
fn parse_authentication(response: &str) -> Result<(), SgeError> {
    if response.contains("\tKEY\t") {
        Ok(())
    } else {
        Err(SgeError::Authentication {
            reason: wire::last_field(response).to_string(),
        })
    }
}

/// `M\t{code}\t{name}\t...` — code/name pairs from index 1.
fn parse_game_list(response: &str) -> Vec<Game> {
    let fields = wire::fields(response);
    fields[1..]
        .chunks_exact(2)
        .map(|pair| Game {
            code: pair[0].to_string(),
            name: pair[1].to_string(),
        })
        .collect()
}

/// `G\t{name}\t{status}\t...`; a literal `PROBLEM` in the second field
/// means the subscription is not in good standing.
fn parse_subscription(
    response: &str,
    code: &str,
) -> Result<Subscription, SgeError> {
    let fields = wire::fields(response);
    if fields.get(1).copied() == Some("PROBLEM") {
        return Err(SgeError::Subscription(code.to_string()));
    }
    Ok(Subscription {
        game: Game {
            code: code.to_string(),
            name: fields.get(1).copied().unwrap_or_default().to_string(),
        },
        status: fields.get(2).copied().unwrap_or_default().to_string(),
    })
}

/// `C\t{4 account fields}\t{id}\t{name}\t...` — skip the marker and the
/// four account fields, then id/name pairs.
fn parse_character_list(response: &str) -> Vec<CharacterDescriptor> {
    let fields = wire::fields(response);
    fields
        .get(5..)
        .unwrap_or(&[])
        .chunks_exact(2)
        .map(|pair| CharacterDescriptor {
            id: pair[0].to_string(),
            name: pair[1].to_string(),
        })
        .collect()
}

/// `L\tOK\t...\tGAMEHOST=h\tGAMEPORT=p\tKEY=k` — status gate first, then
/// named-field extraction; all three fields are required.
fn parse_credentials(
    response: &str,
    character: &str,
) -> Result<GameCredentials, SgeError> {
    let fields = wire::fields(response);
    let status = fields.get(1).copied().unwrap_or_default();
    if status != "OK" {
        return Err(SgeError::Subscription(status.to_string()));
    }

    let host = wire::named_field(response, "GAMEHOST");
    let port = wire::named_field(response, "GAMEPORT");
    let key = wire::named_field(response, "KEY");
    let (Some(host), Some(port), Some(key)) = (host, port, key) else {
        return Err(SgeError::CredentialParse {
            character: character.to_string(),
        });
    };
    let port: u16 =
        port.parse().map_err(|_| SgeError::CredentialParse {
            character: character.to_string(),
        })?;

    Ok(GameCredentials {
        host: host.to_string(),
        port,
        access_token: key.to_string(),
    })
}
