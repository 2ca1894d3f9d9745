//! Multi-signer abstraction.
//!
//! A signer abstracted over multiple underlying signers.

use super::SafeHashSigner;
use alloy::{
    network::{FullSigner, TxSigner},
    primitives::{Address, B256, Bytes, Signature},
    signers::{
        k256::ecdsa::SigningKey,
        local::{
            PrivateKeySigner,
            coins_bip39::{English, Mnemonic},
        },
    },
};
use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

/// Abstraction over a local signer.
#[derive(Clone)]
pub struct DynSigner(pub Arc<dyn FullSigner<Signature> + Send + Sync>);

impl fmt::Debug for DynSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynSigner").field(&self.address()).finish()
    }
}

impl DynSigner {
    /// Load a private key.
    pub fn from_signing_key(key: &str) -> eyre::Result<Self> {
        Ok(Self(Arc::new(PrivateKeySigner::from_str(key)?)))
    }

    /// Derives the signer at the given BIP-44 account index from a mnemonic.
    pub fn derive_from_mnemonic(mnemonic: Mnemonic<English>, idx: usize) -> eyre::Result<Self> {
        let path = format!("m/44'/60'/0'/0/{idx}");
        let key = mnemonic.derive_key(path.as_str(), None)?;
        let key: &SigningKey = key.as_ref();
        Ok(Self(Arc::new(PrivateKeySigner::from_signing_key(key.clone()))))
    }

    /// Returns the signer's Ethereum address.
    pub fn address(&self) -> Address {
        TxSigner::address(&self.0)
    }
}

impl Deref for DynSigner {
    type Target = dyn FullSigner<Signature> + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[async_trait::async_trait]
impl SafeHashSigner for DynSigner {
    fn address(&self) -> Address {
        DynSigner::address(self)
    }

    async fn sign_safe_hash(&self, hash: B256) -> eyre::Result<Bytes> {
        Ok(self.sign_hash(&hash).await?.as_bytes().into())
    }
}
