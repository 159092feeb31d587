//! Named cluster endpoints and custom endpoint validation.

use {std::str::FromStr, thiserror::Error, url::Url};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid cluster name or endpoint URL `{0}`")]
pub struct ClusterError(String);

/// A JSON-RPC endpoint: one of the public clusters, the local test
/// validator, or any http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcCluster {
    MainnetBeta,
    Devnet,
    Testnet,
    Localhost,
    Custom(String),
}

impl RpcCluster {
    pub fn url(&self) -> &str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::Localhost => "http://127.0.0.1:8899",
            Self::Custom(url) => url,
        }
    }
}

impl FromStr for RpcCluster {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "localhost" => Ok(Self::Localhost),
            custom => {
                let url = Url::parse(custom).map_err(|_| ClusterError(custom.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ClusterError(custom.to_string()));
                }
                Ok(Self::Custom(custom.to_string()))
            }
        }
    }
}
