//! On-chain program interface.
//!
//! Address derivation, instruction encoding and account layout for the
//! deployed Keep It Real program. Everything in this module must stay
//! bit-exact with what the program expects: seeds, byte order,
//! discriminators and borsh layouts are all part of the wire contract.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::error::{KeepRealError, Result};

/// The deployed program.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("7iLFBYxQFx4QL9GHmeh6ELJBiizavd7dTWxi1sQNjsJ5");

/// Treasury account receiving the preservation fee on every mint.
pub const DAO_TREASURY: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

/// Preservation fee transferred to the treasury by the program, in lamports.
pub const STORAGE_FEE_LAMPORTS: u64 = 2_000_000;

/// Record address derivation namespace tag.
pub const RECORD_SEED: &[u8] = b"memory";

/// Longest content identifier the program accepts, in bytes.
pub const MAX_CID_LEN: usize = 64;

/// Anchor instruction discriminator for `mint_memory`.
pub const MINT_MEMORY_DISCRIMINATOR: [u8; 8] = [13, 175, 116, 95, 164, 199, 151, 15];

/// Anchor instruction discriminator for `revoke_memory`.
pub const REVOKE_MEMORY_DISCRIMINATOR: [u8; 8] = [43, 184, 66, 119, 163, 164, 140, 17];

/// Anchor account discriminator for `RealityProof`.
pub const REALITY_PROOF_DISCRIMINATOR: [u8; 8] = [245, 170, 92, 135, 16, 21, 150, 154];

/// Byte offset of the `owner` field inside a `RealityProof` account
/// (right after the discriminator). Owner queries memcmp-filter here.
pub const OWNER_FIELD_OFFSET: usize = 8;

/// Derive the record address for an `(owner, content hash)` pair.
///
/// Pure function of its inputs: seeds are the namespace tag, the owner's
/// raw key bytes and the raw digest bytes, in that order, under the
/// program id.
pub fn derive_record_address(owner: &Pubkey, image_hash: &[u8; 32]) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RECORD_SEED, owner.as_ref(), image_hash], &PROGRAM_ID)
}

/// Arguments of the `mint_memory` instruction.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct MintMemoryArgs {
    pub image_hash: [u8; 32],
    pub ipfs_cid: String,
    /// Reserved application signature slot; currently always zero-filled.
    pub app_signature: [u8; 64],
    /// Claimed capture time, Unix seconds. The program rejects values more
    /// than ten minutes from chain time.
    pub timestamp: i64,
}

impl MintMemoryArgs {
    /// Client-side mirror of the program's CID bound.
    pub fn validate(&self) -> Result<()> {
        if self.ipfs_cid.is_empty() || self.ipfs_cid.len() > MAX_CID_LEN {
            return Err(KeepRealError::InvalidRecord(format!(
                "content id must be 1..={MAX_CID_LEN} bytes, got {}",
                self.ipfs_cid.len()
            )));
        }
        Ok(())
    }
}

/// Build the `mint_memory` instruction targeting the derived record
/// account, with the owner as signing fee payer and the treasury as the
/// fee recipient.
pub fn mint_memory_instruction(
    owner: &Pubkey,
    treasury: &Pubkey,
    args: &MintMemoryArgs,
) -> Result<Instruction> {
    args.validate()?;

    let (record_address, _bump) = derive_record_address(owner, &args.image_hash);

    let mut data = Vec::with_capacity(8 + 32 + 4 + args.ipfs_cid.len() + 64 + 8);
    data.extend_from_slice(&MINT_MEMORY_DISCRIMINATOR);
    args.serialize(&mut data)
        .map_err(|e| KeepRealError::Serialization(e.to_string()))?;

    Ok(Instruction {
        program_id: PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(record_address, false),
            AccountMeta::new(*owner, true),
            AccountMeta::new(*treasury, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Build the `revoke_memory` instruction closing a record account back to
/// its owner.
pub fn revoke_memory_instruction(owner: &Pubkey, record_address: &Pubkey) -> Instruction {
    let mut data = Vec::with_capacity(8);
    data.extend_from_slice(&REVOKE_MEMORY_DISCRIMINATOR);

    Instruction {
        program_id: PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*record_address, false),
            AccountMeta::new(*owner, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// On-chain `RealityProof` account payload, laid out after the 8-byte
/// discriminator:
/// owner (32) + image_hash (32) + ipfs_cid (4 + len, max 64) +
/// app_signature (64) + timestamp (8) + is_verified (1).
#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct RealityProofAccount {
    pub owner: [u8; 32],
    pub image_hash: [u8; 32],
    pub ipfs_cid: String,
    pub app_signature: [u8; 64],
    pub timestamp: i64,
    pub is_verified: bool,
}

impl RealityProofAccount {
    /// Decode raw account data, checking the discriminator. Accounts are
    /// allocated at their maximum size, so trailing padding is tolerated.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || data[..8] != REALITY_PROOF_DISCRIMINATOR {
            return Err(KeepRealError::InvalidRecord(
                "not a RealityProof account".to_string(),
            ));
        }

        let mut payload = &data[8..];
        Self::deserialize(&mut payload)
            .map_err(|e| KeepRealError::InvalidRecord(format!("malformed RealityProof data: {e}")))
    }

    pub fn owner_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    fn args(cid: &str) -> MintMemoryArgs {
        MintMemoryArgs {
            image_hash: [9u8; 32],
            ipfs_cid: cid.to_string(),
            app_signature: [0u8; 64],
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_derivation_is_pure() {
        let owner = Keypair::new().pubkey();
        let hash = [3u8; 32];
        assert_eq!(
            derive_record_address(&owner, &hash),
            derive_record_address(&owner, &hash)
        );
    }

    #[test]
    fn test_derivation_sensitive_to_owner() {
        let hash = [3u8; 32];
        let a = derive_record_address(&Keypair::new().pubkey(), &hash);
        let b = derive_record_address(&Keypair::new().pubkey(), &hash);
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn test_derivation_sensitive_to_hash() {
        let owner = Keypair::new().pubkey();
        let a = derive_record_address(&owner, &[3u8; 32]);
        let b = derive_record_address(&owner, &[4u8; 32]);
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn test_mint_instruction_layout() {
        let owner = Keypair::new().pubkey();
        let args = args("QmTestCid");
        let ix = mint_memory_instruction(&owner, &DAO_TREASURY, &args).unwrap();

        assert_eq!(ix.program_id, PROGRAM_ID);

        // Discriminator, then borsh: [u8;32] ++ (u32 len + bytes) ++ [u8;64] ++ i64.
        assert_eq!(&ix.data[..8], &MINT_MEMORY_DISCRIMINATOR);
        assert_eq!(&ix.data[8..40], &[9u8; 32]);
        assert_eq!(&ix.data[40..44], &9u32.to_le_bytes());
        assert_eq!(&ix.data[44..53], b"QmTestCid");
        assert_eq!(&ix.data[53..117], &[0u8; 64]);
        assert_eq!(&ix.data[117..125], &1_700_000_000i64.to_le_bytes());
        assert_eq!(ix.data.len(), 125);

        // Accounts: record (writable), owner (writable signer),
        // treasury (writable), system program (readonly).
        let (record_address, _) = derive_record_address(&owner, &args.image_hash);
        assert_eq!(ix.accounts.len(), 4);
        assert_eq!(ix.accounts[0].pubkey, record_address);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1].pubkey, owner);
        assert!(ix.accounts[1].is_writable && ix.accounts[1].is_signer);
        assert_eq!(ix.accounts[2].pubkey, DAO_TREASURY);
        assert!(ix.accounts[2].is_writable && !ix.accounts[2].is_signer);
        assert_eq!(ix.accounts[3].pubkey, system_program::id());
        assert!(!ix.accounts[3].is_writable && !ix.accounts[3].is_signer);
    }

    #[test]
    fn test_cid_bound_mirrored() {
        let owner = Keypair::new().pubkey();
        assert!(mint_memory_instruction(&owner, &DAO_TREASURY, &args("")).is_err());
        assert!(mint_memory_instruction(&owner, &DAO_TREASURY, &args(&"a".repeat(65))).is_err());
        assert!(mint_memory_instruction(&owner, &DAO_TREASURY, &args(&"a".repeat(64))).is_ok());
    }

    #[test]
    fn test_revoke_instruction_layout() {
        let owner = Keypair::new().pubkey();
        let record = Keypair::new().pubkey();
        let ix = revoke_memory_instruction(&owner, &record);

        assert_eq!(ix.data, REVOKE_MEMORY_DISCRIMINATOR);
        assert_eq!(ix.accounts.len(), 3);
        assert_eq!(ix.accounts[0].pubkey, record);
        assert_eq!(ix.accounts[1].pubkey, owner);
        assert!(ix.accounts[1].is_signer);
    }

    #[test]
    fn test_account_decode_roundtrip() {
        let proof = RealityProofAccount {
            owner: [1u8; 32],
            image_hash: [2u8; 32],
            ipfs_cid: "QmProof".to_string(),
            app_signature: [0u8; 64],
            timestamp: 1_700_000_000,
            is_verified: true,
        };

        let mut data = REALITY_PROOF_DISCRIMINATOR.to_vec();
        borsh::to_writer(&mut data, &proof).unwrap();
        // Anchor allocates the account at its maximum size.
        data.resize(8 + 32 + 32 + 4 + 64 + 64 + 8 + 1, 0);

        assert_eq!(RealityProofAccount::decode(&data).unwrap(), proof);
    }

    #[test]
    fn test_account_decode_rejects_wrong_discriminator() {
        let data = [0u8; 128];
        assert!(RealityProofAccount::decode(&data).is_err());
        assert!(RealityProofAccount::decode(&[1, 2, 3]).is_err());
    }
}
