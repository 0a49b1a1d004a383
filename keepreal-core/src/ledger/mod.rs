//! Ledger access: wallet capability, record submission and owner queries.

pub mod program;

#[cfg(feature = "network")]
mod rpc;
#[cfg(feature = "network")]
pub use rpc::RpcLedger;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

#[cfg(feature = "network")]
use crate::error::Result;

/// Minimal wallet capability required by the pipeline: an identity and the
/// ability to sign a serialized transaction message. Keeps the pipeline
/// decoupled from any particular wallet SDK.
pub trait WalletSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;
    fn sign_message(&self, message: &[u8]) -> Signature;
}

impl WalletSigner for Keypair {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(self)
    }

    fn sign_message(&self, message: &[u8]) -> Signature {
        Signer::sign_message(self, message)
    }
}

/// Receipt of a confirmed ledger submission.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// Transaction signature, base58.
    pub signature: String,
    /// Address of the record account the transaction targeted.
    pub record_address: Pubkey,
}

/// A record fetched from the ledger.
#[derive(Debug, Clone)]
pub struct OwnedProof {
    pub address: Pubkey,
    pub proof: program::RealityProofAccount,
}

/// Ledger operations used by the pipeline.
#[cfg(feature = "network")]
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    /// Submit a `mint_memory` transaction signed by `signer`. Failure is
    /// not fatal to the capture: the caller keeps its optimistic record.
    async fn submit_mint(
        &self,
        signer: &dyn WalletSigner,
        args: program::MintMemoryArgs,
    ) -> Result<SubmitReceipt>;

    /// Close a record account, refunding rent to the owner.
    async fn submit_revoke(
        &self,
        signer: &dyn WalletSigner,
        record_address: &Pubkey,
    ) -> Result<SubmitReceipt>;

    /// Server-side filtered scan of all records owned by `owner`.
    async fn query_by_owner(&self, owner: &Pubkey) -> Result<Vec<OwnedProof>>;
}
