//! Commitment levels: how final an observed cluster state is.

use {
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// The degree of on-chain finality, least to most final. The derived
/// ordering is what makes one level satisfy another.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "camelCase")]
pub enum CommitmentLevel {
    /// The transaction was seen and executed by a node.
    Processed,
    /// A cluster supermajority voted on the transaction's block.
    Confirmed,
    /// The block has been rooted and cannot be rolled back.
    #[default]
    Finalized,
}

impl CommitmentLevel {
    /// Does a status at this level meet a request for `requested`?
    pub fn satisfies(self, requested: CommitmentLevel) -> bool {
        self >= requested
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CommitmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid commitment level")]
pub struct ParseCommitmentLevelError;

impl FromStr for CommitmentLevel {
    type Err = ParseCommitmentLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            _ => Err(ParseCommitmentLevelError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_matrix() {
        use CommitmentLevel::*;
        for (status, requested, expected) in [
            (Processed, Processed, true),
            (Processed, Confirmed, false),
            (Processed, Finalized, false),
            (Confirmed, Processed, true),
            (Confirmed, Confirmed, true),
            (Confirmed, Finalized, false),
            (Finalized, Processed, true),
            (Finalized, Confirmed, true),
            (Finalized, Finalized, true),
        ] {
            assert_eq!(status.satisfies(requested), expected, "{status} vs {requested}");
        }
    }

    #[test]
    fn test_serde_camel_case() {
        assert_eq!(
            serde_json::to_string(&CommitmentLevel::Finalized).unwrap(),
            "\"finalized\""
        );
        assert_eq!(
            serde_json::from_str::<CommitmentLevel>("\"processed\"").unwrap(),
            CommitmentLevel::Processed
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("confirmed".parse(), Ok(CommitmentLevel::Confirmed));
        assert!("recent".parse::<CommitmentLevel>().is_err());
    }
}
