//! 32-byte addresses: public keys, program ids, and program-derived
//! addresses (PDAs).
//!
//! A [`Pubkey`] is validated only by length; whether a private key can
//! exist for it is a separate question answered by [`Pubkey::is_on_curve`].
//! Program-derived addresses are deliberately constructed to lie *off* the
//! ed25519 curve so that only the owning program (never a wallet) can
//! authorize them.

use {
    crate::hash::hashv,
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr, sync::atomic::AtomicU64},
    thiserror::Error,
};

/// Number of bytes in a pubkey.
pub const PUBKEY_BYTES: usize = 32;
/// Maximum length of a derived `Pubkey` seed.
pub const MAX_SEED_LEN: usize = 32;
/// Maximum number of seeds.
pub const MAX_SEEDS: usize = 16;
/// Maximum string length of a base58-encoded pubkey.
const MAX_BASE58_LEN: usize = 44;

const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PubkeyError {
    /// A seed exceeded [`MAX_SEED_LEN`] bytes, or more than [`MAX_SEEDS`]
    /// seeds were supplied.
    #[error("length of the seed is too long for address generation")]
    MaxSeedLengthExceeded,
    /// The derived address landed on the ed25519 curve and therefore cannot
    /// be a program-derived address.
    #[error("provided seeds do not result in a valid address")]
    InvalidSeeds,
    /// No bump seed in `255..=1` produced an off-curve address.
    #[error("unable to find a viable program address bump seed")]
    NoViableBumpSeed,
}

#[repr(transparent)]
#[derive(
    Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParsePubkeyError {
    #[error("string is the wrong size")]
    WrongSize,
    #[error("invalid base58 string")]
    Invalid,
}

impl FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(ParsePubkeyError::WrongSize);
        }
        let pubkey_vec = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParsePubkeyError::Invalid)?;
        if pubkey_vec.len() != PUBKEY_BYTES {
            Err(ParsePubkeyError::WrongSize)
        } else {
            Pubkey::try_from(pubkey_vec.as_slice()).map_err(|_| ParsePubkeyError::WrongSize)
        }
    }
}

impl TryFrom<&str> for Pubkey {
    type Error = ParsePubkeyError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Pubkey::from_str(s)
    }
}

impl TryFrom<&[u8]> for Pubkey {
    type Error = std::array::TryFromSliceError;

    fn try_from(pubkey: &[u8]) -> Result<Self, Self::Error> {
        <[u8; PUBKEY_BYTES]>::try_from(pubkey).map(Self)
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(from: [u8; PUBKEY_BYTES]) -> Self {
        Self(from)
    }
}

/// Is `bytes` a point on the ed25519 curve?
pub fn bytes_are_curve_point<T: AsRef<[u8]>>(bytes: T) -> bool {
    match curve25519_dalek::edwards::CompressedEdwardsY::from_slice(bytes.as_ref()) {
        Ok(compressed) => compressed.decompress().is_some(),
        Err(_) => false,
    }
}

impl Pubkey {
    pub const fn new_from_array(pubkey_array: [u8; PUBKEY_BYTES]) -> Self {
        Self(pubkey_array)
    }

    /// Unique `Pubkey` for tests and benchmarks.
    pub fn new_unique() -> Self {
        use std::sync::atomic::Ordering;
        static I: AtomicU64 = AtomicU64::new(1);

        let mut b = [0u8; PUBKEY_BYTES];
        let i = I.fetch_add(1, Ordering::Relaxed);
        b[0..8].copy_from_slice(&i.to_le_bytes());
        Self(b)
    }

    /// Derive the address `sha256(base || seed || owner)`.
    ///
    /// The seed is a UTF-8 string; callers conventionally keep it at or
    /// under [`MAX_SEED_LEN`] bytes but any length is accepted.
    pub fn create_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Pubkey {
        Pubkey::new_from_array(
            hashv(&[base.as_ref(), seed.as_ref(), owner.as_ref()]).to_bytes(),
        )
    }

    /// Derive a program address from `seeds` and `program_id`.
    ///
    /// The digest is `sha256(seed[0] .. seed[n] + program_id + "ProgramDerivedAddress")`.
    /// Some seed combinations produce a digest that lies on the ed25519
    /// curve; those fail with [`PubkeyError::InvalidSeeds`] and callers
    /// should retry with a bump seed, or let [`Pubkey::find_program_address`]
    /// do the search.
    ///
    /// Seeds are hashed sequentially, so `["abcdef"]` and `["abc", "def"]`
    /// collide; programs must pick seed schemes that cannot collide with
    /// themselves.
    pub fn create_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<Pubkey, PubkeyError> {
        if seeds.len() > MAX_SEEDS {
            return Err(PubkeyError::MaxSeedLengthExceeded);
        }
        for seed in seeds.iter() {
            if seed.len() > MAX_SEED_LEN {
                return Err(PubkeyError::MaxSeedLengthExceeded);
            }
        }

        let mut hasher = crate::hash::Hasher::default();
        for seed in seeds.iter() {
            hasher.hash(seed);
        }
        hasher.hashv(&[program_id.as_ref(), PDA_MARKER]);
        let hash = hasher.result();

        if bytes_are_curve_point(&hash) {
            return Err(PubkeyError::InvalidSeeds);
        }

        Ok(Pubkey::new_from_array(hash.to_bytes()))
    }

    /// Find a valid program address and its corresponding bump seed.
    ///
    /// Walks bump seeds from 255 down to 1 (bump 0 is never tried, matching
    /// on-chain derivation) and returns the first off-curve address. The
    /// search is deterministic for a given input but takes a variable
    /// number of iterations.
    ///
    /// Fails with [`PubkeyError::NoViableBumpSeed`] only if every bump
    /// lands on the curve, which is statistically never.
    pub fn find_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<(Pubkey, u8), PubkeyError> {
        Self::try_find_program_address(seeds, program_id)
            .ok_or(PubkeyError::NoViableBumpSeed)
    }

    /// [`Pubkey::find_program_address`], with exhaustion expressed as `None`.
    pub fn try_find_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Option<(Pubkey, u8)> {
        let mut bump_seed = [u8::MAX];
        for _ in 0..u8::MAX {
            let mut seeds_with_bump = seeds.to_vec();
            seeds_with_bump.push(&bump_seed);
            match Self::create_program_address(&seeds_with_bump, program_id) {
                Ok(address) => return Some((address, bump_seed[0])),
                Err(PubkeyError::InvalidSeeds) => (),
                _ => break,
            }
            bump_seed[0] -= 1;
        }
        None
    }

    pub fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    /// Whether a private key can exist for this address.
    pub fn is_on_curve(&self) -> bool {
        bytes_are_curve_point(self)
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

/// Declare the id of a program or sysvar as a module-level `id()` function.
///
/// The address is parsed from its base58 form on first use and cached.
#[macro_export]
macro_rules! declare_id {
    ($address:literal) => {
        /// The canonical base58 form of this address.
        pub const ID_STR: &str = $address;

        /// The address as a [`Pubkey`](crate::pubkey::Pubkey).
        pub fn id() -> $crate::pubkey::Pubkey {
            use std::{str::FromStr, sync::OnceLock};
            static ID: OnceLock<$crate::pubkey::Pubkey> = OnceLock::new();
            *ID.get_or_init(|| {
                $crate::pubkey::Pubkey::from_str(ID_STR).expect("address literal is valid base58")
            })
        }

        pub fn check_id(pubkey: &$crate::pubkey::Pubkey) -> bool {
            pubkey == &id()
        }
    };
}
