//! One-time-salt password obfuscation.
//!
//! The gateway never receives the password itself. It hands out a salt,
//! and the client sends a byte-wise transform of the password under that
//! salt. The transform is fixed and non-cryptographic; the point is
//! bit-exact compatibility with the server, not secrecy beyond what the
//! encrypted transport already provides.
//!
//! The obfuscated result is an opaque byte sequence. Bytes routinely fall
//! outside printable ASCII, so it must never round-trip through a string
//! encoding.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use embergate_transport::{TransportError, exchange};

/// Requests a one-time salt from the gateway.
///
/// The request is the single byte `K`; the entire response body, with no
/// further parsing, is the salt.
pub async fn fetch_salt<S>(
    stream: &mut S,
    idle_timeout: Duration,
    request_timeout: Option<Duration>,
) -> Result<Vec<u8>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    exchange(stream, b"K", idle_timeout, request_timeout).await
}

/// Applies the gateway's password transform.
///
/// For each index covered by both inputs:
/// `out[i] = ((password[i] - 0x20) ^ salt[i]) + 0x20`, with wrapping
/// arithmetic. The output length is always `min(password, salt)`; a
/// short salt truncates the password.
pub fn obfuscate(password: &[u8], salt: &[u8]) -> Vec<u8> {
    password
        .iter()
        .zip(salt.iter())
        .map(|(&p, &s)| (p.wrapping_sub(0x20) ^ s).wrapping_add(0x20))
        .collect()
}

/// Fetches a salt and obfuscates `password` under it.
pub async fn hashed_password<S>(
    stream: &mut S,
    password: &[u8],
    idle_timeout: Duration,
    request_timeout: Option<Duration>,
) -> Result<Vec<u8>, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let salt = fetch_salt(stream, idle_timeout, request_timeout).await?;
    Ok(obfuscate(password, &salt))
}
