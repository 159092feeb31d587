//! Ed25519 keypairs and 64-byte transaction signatures.

use {
    crate::pubkey::Pubkey,
    ed25519_dalek::Signer as _,
    rand::rngs::OsRng,
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Number of bytes in a signature.
pub const SIGNATURE_BYTES: usize = 64;
/// Maximum string length of a base58-encoded signature.
const MAX_BASE58_LEN: usize = 88;

/// An ed25519 signature over a transaction message. On the JSON wire,
/// signatures travel base58-encoded via [`FromStr`] and `Display` rather
/// than through serde.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_BYTES])
    }
}

impl Signature {
    pub const fn new_from_array(signature_array: [u8; SIGNATURE_BYTES]) -> Self {
        Self(signature_array)
    }

    /// Verify this signature over `message` for `pubkey`.
    ///
    /// Returns `false` for any pubkey that is not a valid ed25519 point.
    pub fn verify(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        match ed25519_dalek::VerifyingKey::from_bytes(&pubkey.to_bytes()) {
            Ok(verifying_key) => {
                let signature = ed25519_dalek::Signature::from_bytes(&self.0);
                verifying_key.verify_strict(message, &signature).is_ok()
            }
            Err(_) => false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseSignatureError {
    #[error("string is the wrong size")]
    WrongSize,
    #[error("invalid base58 string")]
    Invalid,
}

impl FromStr for Signature {
    type Err = ParseSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(ParseSignatureError::WrongSize);
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParseSignatureError::Invalid)?;
        Signature::try_from(bytes.as_slice()).map_err(|_| ParseSignatureError::WrongSize)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = std::array::TryFromSliceError;

    fn try_from(signature: &[u8]) -> Result<Self, Self::Error> {
        <[u8; SIGNATURE_BYTES]>::try_from(signature).map(Self)
    }
}

impl From<[u8; SIGNATURE_BYTES]> for Signature {
    fn from(from: [u8; SIGNATURE_BYTES]) -> Self {
        Self(from)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

/// An ed25519 keypair: a 32-byte secret and the public key derived from it.
pub struct Keypair(ed25519_dalek::SigningKey);

impl Keypair {
    /// Generate a keypair from OS randomness.
    pub fn new() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    /// Recreate a keypair from its 32-byte secret.
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(secret))
    }

    /// The 32-byte secret.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Never print the secret.
        write!(f, "Keypair({})", self.pubkey())
    }
}

/// Anything that can authorize a transaction: exposes a public key and signs
/// message bytes.
pub trait Signer {
    fn pubkey(&self) -> Pubkey;
    fn sign_message(&self, message: &[u8]) -> Signature;
}

impl Signer for Keypair {
    fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.0.verifying_key().to_bytes())
    }

    fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::new_from_array(self.0.sign(message).to_bytes())
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn pubkey(&self) -> Pubkey {
        (**self).pubkey()
    }

    fn sign_message(&self, message: &[u8]) -> Signature {
        (**self).sign_message(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = Keypair::new();
        let message = b"lamports for nothing";
        let signature = keypair.sign_message(message);
        assert!(signature.verify(&keypair.pubkey(), message));
        assert!(!signature.verify(&keypair.pubkey(), b"lamports for something"));
        assert!(!signature.verify(&Keypair::new().pubkey(), message));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = Keypair::from_bytes(&[0x55u8; 32]);
        let message = b"same bytes in, same bytes out";
        assert_eq!(keypair.sign_message(message), keypair.sign_message(message));
    }

    #[test]
    fn test_keypair_roundtrip() {
        let keypair = Keypair::new();
        let restored = Keypair::from_bytes(&keypair.to_bytes());
        assert_eq!(keypair.pubkey(), restored.pubkey());
    }

    #[test]
    fn test_keypair_pubkey_on_curve() {
        // every generated public key has a private key, so it must lie on
        // the curve
        for _ in 0..32 {
            assert!(Keypair::new().pubkey().is_on_curve());
        }
    }

    #[test]
    fn test_signature_fromstr() {
        let signature = Keypair::new().sign_message(b"x");
        let base58_str = bs58::encode(signature.as_ref()).into_string();
        assert_eq!(base58_str.parse::<Signature>(), Ok(signature));

        assert_eq!(
            "I am not base58".parse::<Signature>(),
            Err(ParseSignatureError::Invalid)
        );
        // a 32-byte payload is a pubkey, not a signature
        let short = bs58::encode([7u8; 32]).into_string();
        assert_eq!(
            short.parse::<Signature>(),
            Err(ParseSignatureError::WrongSize)
        );
    }

    #[test]
    fn test_signature_decode_known_bytes() {
        let signature: Signature =
            "4Umk1E47BhUNBHJQGJto6i5xpATqVs8UxW11QjpoVnBmiv7aZJyG78yVYj99SrozRa9x7av8p3GJmBuzvhpUHDZ"
                .parse()
                .unwrap();
        let mut expected = [0u8; 64];
        expected[0] = 3;
        assert_eq!(signature, Signature::new_from_array(expected));
    }

    #[test]
    fn test_signature_rejects_off_sizes() {
        assert!(Signature::try_from(&[1u8; 63][..]).is_err());
        assert!(Signature::try_from(&[1u8; 65][..]).is_err());
        assert!(Signature::try_from(&[1u8; 64][..]).is_ok());
    }
}
