//! Passphrase encryption for passwords posted to `/api/auth/login` and
//! `/api/auth/register`.
//!
//! Output is the OpenSSL `enc` format that `CryptoJS.AES.encrypt(text,
//! passphrase)` produces and auth servers built against it decrypt:
//! base64 of `Salted__ || salt (8 bytes) || AES-256-CBC(PKCS#7)`, with key and
//! IV derived by `EVP_BytesToKey` over MD5 with one iteration.

use super::AuthError;
use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64ct::{Base64, Encoding};
use md5::{Digest, Md5};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

#[derive(Clone)]
pub struct PasswordCipher {
    passphrase: SecretString,
}

impl PasswordCipher {
    /// # Errors
    /// Returns an error if the passphrase is empty.
    pub fn new(passphrase: SecretString) -> Result<Self, AuthError> {
        if passphrase.expose_secret().is_empty() {
            return Err(AuthError::Config(
                "Password passphrase must not be empty.".to_string(),
            ));
        }
        Ok(Self { passphrase })
    }

    /// Encrypts with a fresh random salt, so equal passwords never produce
    /// equal ciphertexts.
    #[must_use]
    pub fn encrypt(&self, password: &SecretString) -> SecretString {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        self.encrypt_with_salt(password, &salt)
    }

    fn encrypt_with_salt(&self, password: &SecretString, salt: &[u8; SALT_LEN]) -> SecretString {
        let (key, iv) = derive_key_iv(self.passphrase.expose_secret().as_bytes(), salt);
        let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(password.expose_secret().as_bytes());

        let mut envelope = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len());
        envelope.extend_from_slice(MAGIC);
        envelope.extend_from_slice(salt);
        envelope.extend_from_slice(&ciphertext);

        SecretString::from(Base64::encode_string(&envelope))
    }
}

#[cfg(test)]
impl PasswordCipher {
    /// Inverse of [`PasswordCipher::encrypt`], as the auth server runs it.
    pub(crate) fn decrypt(&self, encoded: &str) -> Option<String> {
        use aes::cipher::BlockDecryptMut;

        let envelope = Base64::decode_vec(encoded).ok()?;
        let rest = envelope.strip_prefix(MAGIC.as_slice())?;
        if rest.len() < SALT_LEN {
            return None;
        }
        let (salt, ciphertext) = rest.split_at(SALT_LEN);
        let salt: [u8; SALT_LEN] = salt.try_into().ok()?;

        let (key, iv) = derive_key_iv(self.passphrase.expose_secret().as_bytes(), &salt);
        let plaintext = cbc::Decryptor::<aes::Aes256>::new(&key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .ok()?;
        String::from_utf8(plaintext).ok()
    }
}

impl fmt::Debug for PasswordCipher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PasswordCipher")
            .finish_non_exhaustive()
    }
}

/// `EVP_BytesToKey(MD5, count = 1)`: `D_i = MD5(D_{i-1} || passphrase || salt)`.
fn derive_key_iv(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut derived = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut block: Vec<u8> = Vec::new();
    while derived.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        derived.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    iv.copy_from_slice(&derived[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}
