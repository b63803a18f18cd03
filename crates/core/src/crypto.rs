//! Ciphers for data at rest.
//!
//! Credentials carry a scheme tag and are opened with whichever cipher sealed
//! them, so Fernet-sealed and envelope-sealed rows coexist. Note and todo text
//! is always sealed with Fernet.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;

use crate::{
    errors::{BotError, BotResult},
    models::user::{AccessToken, CipherScheme, SealedSecret},
};

const NONCE_SIZE: usize = 24;
const KEY_SIZE: usize = 32;

pub type DataKey = [u8; KEY_SIZE];

pub trait Cipher: Send + Sync {
    fn scheme(&self) -> CipherScheme;
    fn encrypt(&self, plaintext: &[u8]) -> BotResult<String>;
    fn decrypt(&self, ciphertext: &str) -> BotResult<Vec<u8>>;
}

#[derive(Clone)]
pub struct FernetCipher {
    fernet: fernet::Fernet,
}

impl FernetCipher {
    pub fn new(key: &str) -> BotResult<Self> {
        let fernet = fernet::Fernet::new(key)
            .ok_or_else(|| BotError::Crypto("FERNET_KEY is not a valid Fernet key".to_string()))?;
        Ok(Self { fernet })
    }

    pub fn generate_key() -> String {
        fernet::Fernet::generate_key()
    }
}

impl Cipher for FernetCipher {
    fn scheme(&self) -> CipherScheme {
        CipherScheme::Fernet
    }

    fn encrypt(&self, plaintext: &[u8]) -> BotResult<String> {
        Ok(self.fernet.encrypt(plaintext))
    }

    fn decrypt(&self, ciphertext: &str) -> BotResult<Vec<u8>> {
        self.fernet
            .decrypt(ciphertext)
            .map_err(|_| BotError::Crypto("Fernet token could not be decrypted".to_string()))
    }
}

/// Wraps per-record data keys with a master key held elsewhere (a KMS in
/// production deployments).
pub trait KeyWrapper: Send + Sync {
    fn wrap(&self, key: &DataKey) -> BotResult<Vec<u8>>;
    fn unwrap_key(&self, wrapped: &[u8]) -> BotResult<DataKey>;
}

/// Key wrapper backed by a locally configured 32-byte master key.
pub struct LocalKeyWrapper {
    master: DataKey,
}

impl LocalKeyWrapper {
    pub fn new(master: DataKey) -> Self {
        Self { master }
    }

    pub fn from_base64(encoded: &str) -> BotResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| BotError::Crypto("master key is not valid base64".to_string()))?;
        let master: DataKey = bytes
            .try_into()
            .map_err(|_| BotError::Crypto("master key must be 32 bytes".to_string()))?;
        Ok(Self::new(master))
    }
}

impl KeyWrapper for LocalKeyWrapper {
    fn wrap(&self, key: &DataKey) -> BotResult<Vec<u8>> {
        seal_bytes(&self.master, key)
    }

    fn unwrap_key(&self, wrapped: &[u8]) -> BotResult<DataKey> {
        let bytes = open_bytes(&self.master, wrapped)?;
        bytes
            .try_into()
            .map_err(|_| BotError::Crypto("unwrapped data key has the wrong length".to_string()))
    }
}

/// Envelope encryption: a fresh data key per record, itself wrapped by the
/// master key. Serialized as `wrapped_key.nonce.ciphertext`, each base64.
pub struct EnvelopeCipher {
    wrapper: Arc<dyn KeyWrapper>,
}

impl EnvelopeCipher {
    pub fn new(wrapper: Arc<dyn KeyWrapper>) -> Self {
        Self { wrapper }
    }
}

impl Cipher for EnvelopeCipher {
    fn scheme(&self) -> CipherScheme {
        CipherScheme::Envelope
    }

    fn encrypt(&self, plaintext: &[u8]) -> BotResult<String> {
        let data_key = random_key();
        let wrapped = self.wrapper.wrap(&data_key)?;
        let nonce = random_nonce();
        let cipher = XChaCha20Poly1305::new((&data_key).into());
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| BotError::Crypto("envelope encryption failed".to_string()))?;

        Ok(format!(
            "{}.{}.{}",
            STANDARD.encode(wrapped),
            STANDARD.encode(nonce),
            STANDARD.encode(ciphertext)
        ))
    }

    fn decrypt(&self, ciphertext: &str) -> BotResult<Vec<u8>> {
        let malformed = || BotError::Crypto("malformed envelope ciphertext".to_string());
        let mut parts = ciphertext.split('.');
        let (Some(wrapped), Some(nonce), Some(body), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let wrapped = STANDARD.decode(wrapped).map_err(|_| malformed())?;
        let nonce = STANDARD.decode(nonce).map_err(|_| malformed())?;
        let body = STANDARD.decode(body).map_err(|_| malformed())?;
        if nonce.len() != NONCE_SIZE {
            return Err(malformed());
        }

        let data_key = self.wrapper.unwrap_key(&wrapped)?;
        let cipher = XChaCha20Poly1305::new((&data_key).into());
        cipher
            .decrypt(XNonce::from_slice(&nonce), body.as_ref())
            .map_err(|_| BotError::Crypto("envelope decryption failed".to_string()))
    }
}

/// The set of ciphers available to this process.
#[derive(Clone)]
pub struct Keyring {
    fernet: Arc<FernetCipher>,
    envelope: Option<Arc<EnvelopeCipher>>,
}

impl Keyring {
    pub fn new(fernet_key: &str) -> BotResult<Self> {
        Ok(Self {
            fernet: Arc::new(FernetCipher::new(fernet_key)?),
            envelope: None,
        })
    }

    pub fn with_envelope(mut self, wrapper: Arc<dyn KeyWrapper>) -> Self {
        self.envelope = Some(Arc::new(EnvelopeCipher::new(wrapper)));
        self
    }

    /// Scheme used for newly stored credentials.
    pub fn preferred_scheme(&self) -> CipherScheme {
        if self.envelope.is_some() {
            CipherScheme::Envelope
        } else {
            CipherScheme::Fernet
        }
    }

    fn cipher(&self, scheme: CipherScheme) -> BotResult<&dyn Cipher> {
        match scheme {
            CipherScheme::Fernet => Ok(self.fernet.as_ref() as &dyn Cipher),
            CipherScheme::Envelope => self
                .envelope
                .as_deref()
                .map(|c| c as &dyn Cipher)
                .ok_or_else(|| BotError::Crypto("envelope scheme is not configured".to_string())),
        }
    }

    pub fn seal_credential(&self, token: &AccessToken) -> BotResult<SealedSecret> {
        self.seal_credential_with(token, self.preferred_scheme())
    }

    pub fn seal_credential_with(
        &self,
        token: &AccessToken,
        scheme: CipherScheme,
    ) -> BotResult<SealedSecret> {
        let ciphertext = self.cipher(scheme)?.encrypt(token.expose().as_bytes())?;
        Ok(SealedSecret { scheme, ciphertext })
    }

    pub fn open_credential(&self, sealed: &SealedSecret) -> BotResult<AccessToken> {
        let bytes = self.cipher(sealed.scheme)?.decrypt(&sealed.ciphertext)?;
        let token = String::from_utf8(bytes)
            .map_err(|_| BotError::Crypto("credential is not valid UTF-8".to_string()))?;
        Ok(AccessToken::new(token))
    }

    /// Re-encrypt a credential under another scheme.
    pub fn reseal(&self, sealed: &SealedSecret, target: CipherScheme) -> BotResult<SealedSecret> {
        let token = self.open_credential(sealed)?;
        self.seal_credential_with(&token, target)
    }

    pub fn seal_text(&self, text: &str) -> BotResult<String> {
        self.fernet.encrypt(text.as_bytes())
    }

    pub fn open_text(&self, ciphertext: &str) -> BotResult<String> {
        let bytes = self.fernet.decrypt(ciphertext)?;
        String::from_utf8(bytes).map_err(|_| BotError::Crypto("text is not valid UTF-8".to_string()))
    }
}

pub fn random_key() -> DataKey {
    let mut key = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

fn random_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

// nonce || ciphertext
fn seal_bytes(key: &DataKey, plaintext: &[u8]) -> BotResult<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let nonce = random_nonce();
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| BotError::Crypto("key wrap failed".to_string()))?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn open_bytes(key: &DataKey, data: &[u8]) -> BotResult<Vec<u8>> {
    if data.len() < NONCE_SIZE {
        return Err(BotError::Crypto("wrapped key is truncated".to_string()));
    }
    let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| BotError::Crypto("key unwrap failed".to_string()))
}
