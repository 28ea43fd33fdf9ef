//! Initial password generation for newly provisioned accounts.

use rand::Rng;

/// Password length used when provisioning learner accounts.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// ASCII letters, digits and punctuation.
const PASSWORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789\
      !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Generates a random password of the given length.
///
/// Drawn uniformly from ASCII letters, digits and punctuation. The result
/// is handed to the identity provider once and mailed to the learner; it
/// is never persisted here.
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}
