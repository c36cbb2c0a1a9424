//! Anti-forgery state tokens for the provider login handshake

use rand::Rng;

use super::session::LoginSession;
use crate::common::ApiError;

pub const STATE_TOKEN_LENGTH: usize = 32;

const STATE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_state_token() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_TOKEN_LENGTH)
        .map(|_| STATE_ALPHABET[rng.gen_range(0..STATE_ALPHABET.len())] as char)
        .collect()
}

/// Store a fresh token as the session's `state`, replacing any earlier one.
pub fn issue_state(login: &mut LoginSession) -> String {
    let token = generate_state_token();
    login.state = Some(token.clone());
    token
}

/// Check the presented value against the session's current token.
///
/// Absent, empty, or merely similar values are all rejected; so is any value when
/// the session never had a token issued.
pub fn validate_state(login: &LoginSession, presented: Option<&str>) -> Result<(), ApiError> {
    match (login.state.as_deref(), presented) {
        (Some(expected), Some(presented))
            if !expected.is_empty() && constant_time_eq(expected.as_bytes(), presented.as_bytes()) =>
        {
            Ok(())
        }
        _ => Err(ApiError::StateMismatch),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
