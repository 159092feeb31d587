//! The System program, owner of all plain lamport accounts.

crate::declare_id!("11111111111111111111111111111111");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_all_zeros() {
        assert_eq!(id().to_bytes(), [0u8; 32]);
        assert_eq!(id().to_string(), ID_STR);
        assert!(check_id(&id()));
    }
}
