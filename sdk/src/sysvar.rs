//! Sysvar addresses: read-only accounts through which the runtime exposes
//! cluster state to programs.

pub mod clock {
    crate::declare_id!("SysvarC1ock11111111111111111111111111111111");
}

pub mod recent_blockhashes {
    crate::declare_id!("SysvarRecentB1ockHashes11111111111111111111");
}

pub mod rent {
    crate::declare_id!("SysvarRent111111111111111111111111111111111");
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_sysvar_ids_parse() {
        assert_eq!(super::rent::id().to_string(), super::rent::ID_STR);
        assert_eq!(
            super::recent_blockhashes::id().to_string(),
            super::recent_blockhashes::ID_STR
        );
        assert_eq!(super::clock::id().to_string(), super::clock::ID_STR);
        assert_ne!(super::rent::id(), super::clock::id());
    }
}
