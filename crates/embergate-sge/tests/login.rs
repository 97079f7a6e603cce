//! Integration tests for the login driver.
//!
//! These run the complete protocol sequence against a scripted gateway
//! on an in-memory duplex stream, so every byte the driver emits is
//! checked against the real wire format. No network, no TLS, no mocks
//! of our own code.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use embergate_sge::{Account, LoginDriver, SgeError, obfuscate};

const IDLE: Duration = Duration::from_secs(5);

fn account() -> Account {
    Account {
        username: "katherine".into(),
        password: "test-password".into(),
        game_code: "DR".into(),
        character: "Kath".into(),
    }
}

/// The exact authenticate payload for [`account`] under `test-salt`:
/// text prefix, uppercased username, then the raw obfuscated bytes.
fn auth_payload() -> Vec<u8> {
    let mut payload = b"A\tKATHERINE\t".to_vec();
    payload.extend_from_slice(&obfuscate::obfuscate(
        b"test-password",
        b"test-salt",
    ));
    payload
}

/// Plays one side of the protocol: for each (expected, reply) pair,
/// asserts the next request matches byte-for-byte and sends the reply.
/// Afterwards, asserts the client shuts the stream down; the driver
/// never leaves a gateway socket dangling.
async fn scripted_gateway(
    mut server: DuplexStream,
    script: Vec<(Vec<u8>, Vec<u8>)>,
) {
    let mut buf = vec![0u8; 1024];
    for (i, (expected, reply)) in script.into_iter().enumerate() {
        let n = server.read(&mut buf).await.expect("gateway read");
        assert_eq!(
            &buf[..n],
            &expected[..],
            "request {i} did not match the wire format"
        );
        server.write_all(&reply).await.expect("gateway write");
    }
    let n = server.read(&mut buf).await.unwrap_or(0);
    assert_eq!(n, 0, "driver should shut the stream down when finished");
}

#[tokio::test]
async fn test_login_happy_path_yields_game_credentials() {
    let (client, server) = tokio::io::duplex(4096);

    let gateway = tokio::spawn(scripted_gateway(
        server,
        vec![
            (b"K".to_vec(), b"test-salt".to_vec()),
            (
                auth_payload(),
                b"A\tKATHERINE\tKEY\ttest-api-key\t".to_vec(),
            ),
            (
                b"M".to_vec(),
                b"M\tDR\tDragonRealms\tGS\tGemStone".to_vec(),
            ),
            (b"G\tDR".to_vec(), b"G\tDragonRealms\tNORMAL\t".to_vec()),
            (
                b"C".to_vec(),
                b"C\t1\t2\t3\t4\tW_1\tKath\tW_2\tOther".to_vec(),
            ),
            (
                b"L\tW_1\tSTORM".to_vec(),
                b"L\tOK\tUPPORT=5535\tGAMEHOST=dr.game.test\tGAMEPORT=11024\tKEY=the-access-token"
                    .to_vec(),
            ),
        ],
    ));

    let driver = LoginDriver::new(client, IDLE, IDLE);
    let credentials = driver
        .login(&account())
        .await
        .expect("scripted login should succeed");

    assert_eq!(credentials.host, "dr.game.test");
    assert_eq!(credentials.port, 11024);
    assert_eq!(credentials.access_token, "the-access-token");
    gateway.await.unwrap();
}

#[tokio::test]
async fn test_login_rejected_credentials_fail_with_reason() {
    let (client, server) = tokio::io::duplex(4096);

    let gateway = tokio::spawn(scripted_gateway(
        server,
        vec![
            (b"K".to_vec(), b"test-salt".to_vec()),
            (auth_payload(), b"A\t\tNORECORD".to_vec()),
        ],
    ));

    let driver = LoginDriver::new(client, IDLE, IDLE);
    let err = driver.login(&account()).await.unwrap_err();

    assert!(matches!(
        err,
        SgeError::Authentication { reason } if reason == "NORECORD"
    ));
    gateway.await.unwrap();
}

#[tokio::test]
async fn test_login_unknown_game_code_fails_after_listing() {
    let (client, server) = tokio::io::duplex(4096);

    let gateway = tokio::spawn(scripted_gateway(
        server,
        vec![
            (b"K".to_vec(), b"test-salt".to_vec()),
            (
                auth_payload(),
                b"A\tKATHERINE\tKEY\ttest-api-key\t".to_vec(),
            ),
            // The account's list does not carry DR.
            (b"M".to_vec(), b"M\tGS\tGemStone".to_vec()),
        ],
    ));

    let driver = LoginDriver::new(client, IDLE, IDLE);
    let err = driver.login(&account()).await.unwrap_err();

    assert!(matches!(
        err,
        SgeError::GameNotFound { code } if code == "DR"
    ));
    gateway.await.unwrap();
}

#[tokio::test]
async fn test_login_subscription_problem_stops_the_sequence() {
    let (client, server) = tokio::io::duplex(4096);

    let gateway = tokio::spawn(scripted_gateway(
        server,
        vec![
            (b"K".to_vec(), b"test-salt".to_vec()),
            (
                auth_payload(),
                b"A\tKATHERINE\tKEY\ttest-api-key\t".to_vec(),
            ),
            (
                b"M".to_vec(),
                b"M\tDR\tDragonRealms\tGS\tGemStone".to_vec(),
            ),
            (b"G\tDR".to_vec(), b"X\tPROBLEM".to_vec()),
        ],
    ));

    let driver = LoginDriver::new(client, IDLE, IDLE);
    let err = driver.login(&account()).await.unwrap_err();

    assert!(matches!(
        err,
        SgeError::Subscription(code) if code == "DR"
    ));
    gateway.await.unwrap();
}

#[tokio::test]
async fn test_login_unknown_character_fails_after_listing() {
    let (client, server) = tokio::io::duplex(4096);

    let gateway = tokio::spawn(scripted_gateway(
        server,
        vec![
            (b"K".to_vec(), b"test-salt".to_vec()),
            (
                auth_payload(),
                b"A\tKATHERINE\tKEY\ttest-api-key\t".to_vec(),
            ),
            (
                b"M".to_vec(),
                b"M\tDR\tDragonRealms\tGS\tGemStone".to_vec(),
            ),
            (b"G\tDR".to_vec(), b"G\tDragonRealms\tNORMAL\t".to_vec()),
            (
                b"C".to_vec(),
                b"C\t1\t2\t3\t4\tW_2\tOther".to_vec(),
            ),
        ],
    ));

    let driver = LoginDriver::new(client, IDLE, IDLE);
    let err = driver.login(&account()).await.unwrap_err();

    assert!(matches!(
        err,
        SgeError::CharacterNotFound { name } if name == "Kath"
    ));
    gateway.await.unwrap();
}

#[tokio::test]
async fn test_login_gateway_hangup_surfaces_as_transport_error() {
    let (client, server) = tokio::io::duplex(4096);
    drop(server);

    let driver = LoginDriver::new(client, IDLE, IDLE);
    let err = driver.login(&account()).await.unwrap_err();

    assert!(matches!(err, SgeError::Transport(_)));
}
