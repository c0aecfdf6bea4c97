use rand::RngCore;
use rand_core::OsRng;
use zeroize::Zeroizing;

/// A fresh 32-byte Ed25519 seed from the OS CSPRNG, wiped when dropped.
pub fn random_seed() -> Zeroizing<[u8; 32]> {
    let mut seed = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(seed.as_mut());
    seed
}
