//! Owner identities and the signing capability used by single-owner chunks.
//!
//! An owner is identified by a 20-byte address: the last 20 bytes of the
//! Keccak-256 hash of the uncompressed secp256k1 public key without its
//! `0x04` prefix. Anything holding a private key can sign chunk digests
//! through [`ChunkSigner`]. Readers only ever need the [`Address`].

use alloy_primitives::{Address, B256, Signature, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use k256::ecdsa::VerifyingKey;

use crate::chunk::error::{ChunkError, Result};

/// Length of an uncompressed public key without the `0x04` prefix
const RAW_PUBLIC_KEY_LENGTH: usize = 64;

/// Prefix of an uncompressed SEC1 public key
const UNCOMPRESSED_PREFIX: u8 = 0x04;

/// Capability to sign chunk digests on behalf of an owner.
///
/// Signatures are produced over the raw 32-byte digest, with no message
/// prefix, and must be recoverable to [`ChunkSigner::owner`].
pub trait ChunkSigner: Send + Sync {
    /// Address the produced signatures recover to
    fn owner(&self) -> Address;

    /// Sign a 32-byte digest
    fn sign_digest(&self, digest: &B256) -> Result<Signature>;
}

impl ChunkSigner for PrivateKeySigner {
    fn owner(&self) -> Address {
        self.address()
    }

    fn sign_digest(&self, digest: &B256) -> Result<Signature> {
        Ok(self.sign_hash_sync(digest)?)
    }
}

impl<T: ChunkSigner + ?Sized> ChunkSigner for &T {
    fn owner(&self) -> Address {
        (**self).owner()
    }

    fn sign_digest(&self, digest: &B256) -> Result<Signature> {
        (**self).sign_digest(digest)
    }
}

impl<T: ChunkSigner + ?Sized> ChunkSigner for std::sync::Arc<T> {
    fn owner(&self) -> Address {
        (**self).owner()
    }

    fn sign_digest(&self, digest: &B256) -> Result<Signature> {
        (**self).sign_digest(digest)
    }
}

/// Derive an owner address from a raw uncompressed public key.
///
/// Accepts the 65-byte SEC1 form (`0x04 || x || y`) or the bare 64-byte `x || y`.
pub fn public_key_to_address(public_key: &[u8]) -> Result<Address> {
    let key = match public_key {
        [UNCOMPRESSED_PREFIX, rest @ ..] if rest.len() == RAW_PUBLIC_KEY_LENGTH => rest,
        key if key.len() == RAW_PUBLIC_KEY_LENGTH => key,
        key => {
            return Err(ChunkError::invalid_size(
                "public key must be 64 or 65 bytes",
                RAW_PUBLIC_KEY_LENGTH,
                key.len(),
            ));
        }
    };

    Ok(Address::from_slice(&keccak256(key)[12..]))
}

/// Derive an owner address from a verifying key
pub fn verifying_key_to_address(key: &VerifyingKey) -> Address {
    Address::from_public_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    fn test_signer() -> PrivateKeySigner {
        let pk = hex!("2c7536e3605d9c16a7a3d7b1898e529396a65c23a3bcbd4012a11cf2731b0fbc");
        PrivateKeySigner::from_slice(&pk).unwrap()
    }

    #[test]
    fn test_known_owner() {
        let signer = test_signer();
        assert_eq!(
            signer.owner(),
            address!("654bfe2e030ff82b8741c7a0bf9ec26ea523b31c")
        );
    }

    #[test]
    fn test_public_key_forms_agree() {
        let signer = test_signer();
        let key = signer.credential().verifying_key();
        let encoded = key.to_encoded_point(false);

        let with_prefix = public_key_to_address(encoded.as_bytes()).unwrap();
        let without_prefix = public_key_to_address(&encoded.as_bytes()[1..]).unwrap();

        assert_eq!(with_prefix, signer.owner());
        assert_eq!(without_prefix, signer.owner());
        assert_eq!(verifying_key_to_address(key), signer.owner());
    }

    #[test]
    fn test_public_key_wrong_length() {
        assert!(matches!(
            public_key_to_address(&[4u8; 33]),
            Err(ChunkError::InvalidSize { .. })
        ));
        // 65 bytes without the uncompressed prefix is not a key
        assert!(public_key_to_address(&[7u8; 65]).is_err());
    }

    #[test]
    fn test_signature_recovers_owner() {
        let signer = test_signer();
        let digest = keccak256(b"digest");

        let signature = signer.sign_digest(&digest).unwrap();
        assert_eq!(
            signature.recover_address_from_prehash(&digest).unwrap(),
            signer.owner()
        );

        let by_ref: &dyn ChunkSigner = &signer;
        assert_eq!(by_ref.owner(), signer.owner());
    }
}
