//! Authenticator and User-Password computations (RFC 2865 Section 3 and 5.2,
//! RFC 2866 Section 3, RFC 5176 Section 2.3).

use crate::packet::{Packet, PacketError};
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Invalid hidden password length: {0}")]
    InvalidLength(usize),
    #[error("Password longer than 128 bytes")]
    TooLong,
    #[error("Invalid UTF-8 in password")]
    InvalidUtf8,
}

const ZERO_AUTHENTICATOR: [u8; 16] = [0u8; 16];

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut authenticator = [0u8; 16];
    rand::rng().fill(&mut authenticator);
    authenticator
}

fn digest(encoded: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut ctx = md5::Context::new();
    ctx.consume(encoded);
    ctx.consume(secret);
    ctx.compute().0
}

/// Calculate the Response Authenticator
///
/// MD5(Code + ID + Length + Request Authenticator + Attributes + Secret).
/// The same construction signs Accounting-Response, CoA-ACK/NAK and
/// Disconnect-ACK/NAK.
pub fn calculate_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let encoded = response.encode_with_authenticator(request_authenticator)?;
    Ok(digest(&encoded, secret))
}

/// Verify a Response Authenticator against the originating request
pub fn verify_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    calculate_response_authenticator(response, request_authenticator, secret)
        .map(|expected| expected == response.authenticator)
        .unwrap_or(false)
}

/// Calculate the Request Authenticator of a signed request
///
/// Accounting-Request, CoA-Request and Disconnect-Request carry
/// MD5(Code + ID + Length + 16 zero octets + Attributes + Secret).
pub fn calculate_request_authenticator(
    request: &Packet,
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let encoded = request.encode_with_authenticator(&ZERO_AUTHENTICATOR)?;
    Ok(digest(&encoded, secret))
}

/// Verify the Request Authenticator of an inbound request.
///
/// Access-Request and Status-Server authenticators are random nonces and
/// always pass; signed request codes must match the digest.
pub fn verify_request_authenticator(request: &Packet, secret: &[u8]) -> bool {
    if !request.code.has_signed_request_authenticator() {
        return true;
    }
    calculate_request_authenticator(request, secret)
        .map(|expected| expected == request.authenticator)
        .unwrap_or(false)
}

fn password_block_key(secret: &[u8], previous: &[u8]) -> [u8; 16] {
    let mut ctx = md5::Context::new();
    ctx.consume(secret);
    ctx.consume(previous);
    ctx.compute().0
}

/// Hide a User-Password attribute value per RFC 2865 Section 5.2
///
/// The password is zero-padded to a multiple of 16 bytes (at least 16), then
/// each block is XORed with MD5(secret + previous ciphertext block), where the
/// first "previous block" is the Request Authenticator.
pub fn encrypt_user_password(
    password: &str,
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PasswordError> {
    let bytes = password.as_bytes();
    if bytes.len() > 128 {
        return Err(PasswordError::TooLong);
    }

    let padded_len = bytes.len().div_ceil(16).max(1) * 16;
    let mut padded = bytes.to_vec();
    padded.resize(padded_len, 0);

    let mut result = Vec::with_capacity(padded_len);
    let mut previous: Vec<u8> = authenticator.to_vec();

    for chunk in padded.chunks(16) {
        let key = password_block_key(secret, &previous);
        let block: Vec<u8> = chunk.iter().zip(key.iter()).map(|(p, k)| p ^ k).collect();
        result.extend_from_slice(&block);
        previous = block;
    }

    Ok(result)
}

/// Recover a User-Password attribute value per RFC 2865 Section 5.2
pub fn decrypt_user_password(
    hidden: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<String, PasswordError> {
    if hidden.is_empty() || hidden.len() % 16 != 0 || hidden.len() > 128 {
        return Err(PasswordError::InvalidLength(hidden.len()));
    }

    let mut result = Vec::with_capacity(hidden.len());
    let mut previous: &[u8] = authenticator;

    for chunk in hidden.chunks(16) {
        let key = password_block_key(secret, previous);
        result.extend(chunk.iter().zip(key.iter()).map(|(c, k)| c ^ k));
        previous = chunk;
    }

    while result.last() == Some(&0) {
        result.pop();
    }

    String::from_utf8(result).map_err(|_| PasswordError::InvalidUtf8)
}
