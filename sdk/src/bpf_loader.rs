//! BPF loader addresses.

crate::declare_id!("BPFLoader1111111111111111111111111111111111");

pub mod upgradeable {
    crate::declare_id!("BPFLoaderUpgradeab1e11111111111111111111111");
}
