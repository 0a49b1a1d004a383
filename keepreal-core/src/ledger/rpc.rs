//! RPC-backed ledger client.

use std::time::Duration;

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, warn};

use super::{program, Ledger, OwnedProof, SubmitReceipt, WalletSigner};
use crate::error::{KeepRealError, Result};

/// RPC request timeout.
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RpcLedger {
    client: RpcClient,
    treasury: Pubkey,
}

impl RpcLedger {
    /// Connect with confirmed commitment and the default treasury.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_treasury(rpc_url, program::DAO_TREASURY)
    }

    pub fn with_treasury(rpc_url: impl Into<String>, treasury: Pubkey) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            rpc_url.into(),
            RPC_TIMEOUT,
            CommitmentConfig::confirmed(),
        );
        Self { client, treasury }
    }

    /// The underlying RPC client, for operations outside the pipeline
    /// (balance checks, devnet airdrops).
    pub fn rpc(&self) -> &RpcClient {
        &self.client
    }

    /// Build, sign through the wallet capability, and submit a
    /// single-instruction transaction with the signer as fee payer.
    async fn send_signed(
        &self,
        signer: &dyn WalletSigner,
        instruction: Instruction,
    ) -> Result<String> {
        let payer = signer.pubkey();

        let recent_blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| KeepRealError::SubmissionFailed(format!("failed to get recent blockhash: {e}")))?;

        let message = Message::new_with_blockhash(&[instruction], Some(&payer), &recent_blockhash);
        let mut transaction = Transaction::new_unsigned(message);

        // The owner is the sole required signer (the record account is
        // program-derived), so its signature fills slot 0.
        let signature = signer.sign_message(&transaction.message_data());
        transaction.signatures[0] = signature;

        let confirmed = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| KeepRealError::SubmissionFailed(e.to_string()))?;

        Ok(confirmed.to_string())
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn submit_mint(
        &self,
        signer: &dyn WalletSigner,
        args: program::MintMemoryArgs,
    ) -> Result<SubmitReceipt> {
        let owner = signer.pubkey();
        let (record_address, _bump) = program::derive_record_address(&owner, &args.image_hash);
        let instruction = program::mint_memory_instruction(&owner, &self.treasury, &args)?;

        info!(record = %record_address, cid = %args.ipfs_cid, "Submitting mint_memory");
        let signature = self.send_signed(signer, instruction).await?;
        debug!(%signature, "Mint confirmed");

        Ok(SubmitReceipt {
            signature,
            record_address,
        })
    }

    async fn submit_revoke(
        &self,
        signer: &dyn WalletSigner,
        record_address: &Pubkey,
    ) -> Result<SubmitReceipt> {
        let instruction = program::revoke_memory_instruction(&signer.pubkey(), record_address);

        info!(record = %record_address, "Submitting revoke_memory");
        let signature = self.send_signed(signer, instruction).await?;

        Ok(SubmitReceipt {
            signature,
            record_address: *record_address,
        })
    }

    async fn query_by_owner(&self, owner: &Pubkey) -> Result<Vec<OwnedProof>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                program::OWNER_FIELD_OFFSET,
                owner.to_bytes().to_vec(),
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(CommitmentConfig::confirmed()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .client
            .get_program_accounts_with_config(&program::PROGRAM_ID, config)
            .await
            .map_err(|e| KeepRealError::QueryFailed(e.to_string()))?;

        let mut proofs = Vec::with_capacity(accounts.len());
        for (address, account) in accounts {
            match program::RealityProofAccount::decode(&account.data) {
                Ok(proof) => proofs.push(OwnedProof { address, proof }),
                Err(e) => warn!(%address, error = %e, "Skipping undecodable record account"),
            }
        }

        debug!(owner = %owner, count = proofs.len(), "Fetched owner records");
        Ok(proofs)
    }
}
