//! Transaction fee rates reported by the cluster.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FeeCalculator {
    /// The cost in lamports the cluster charges per signature, the only
    /// fee input a transaction controls.
    pub lamports_per_signature: u64,
}

impl FeeCalculator {
    pub fn new(lamports_per_signature: u64) -> Self {
        Self {
            lamports_per_signature,
        }
    }

    /// The fee for a message with the given number of required signatures.
    pub fn calculate_fee(&self, num_required_signatures: u8) -> u64 {
        self.lamports_per_signature * num_required_signatures as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_fee() {
        assert_eq!(FeeCalculator::default().calculate_fee(2), 0);
        assert_eq!(FeeCalculator::new(5_000).calculate_fee(1), 5_000);
        assert_eq!(FeeCalculator::new(5_000).calculate_fee(3), 15_000);
    }

    #[test]
    fn test_json_field_name() {
        let json = serde_json::to_value(FeeCalculator::new(7)).unwrap();
        assert_eq!(json["lamportsPerSignature"], 7);
    }
}
