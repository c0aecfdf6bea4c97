//! Token transfer assembly: the one place that decides which instructions
//! go into a token transfer transaction, and in what order.

use crate::address::{address_to_bytes, bytes_to_address};
use crate::error::SolError;
use crate::spl_token::{
    build_create_associated_token_account, build_transfer_checked,
    derive_associated_token_address,
};
use crate::transaction::SolInstruction;

/// Every account a token transfer touches, with both ATAs already derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAccounts {
    pub sender: [u8; 32],
    pub sender_ata: [u8; 32],
    pub recipient: [u8; 32],
    pub recipient_ata: [u8; 32],
    pub mint: [u8; 32],
}

impl TransferAccounts {
    /// Parse the recipient owner and mint and derive both associated token
    /// accounts. Pure; no network access.
    pub fn resolve(sender: [u8; 32], recipient: &str, mint: &str) -> Result<Self, SolError> {
        let recipient = address_to_bytes(recipient)?;
        let mint = address_to_bytes(mint)?;
        let (sender_ata, _) = derive_associated_token_address(&sender, &mint)?;
        let (recipient_ata, _) = derive_associated_token_address(&recipient, &mint)?;

        Ok(Self {
            sender,
            sender_ata,
            recipient,
            recipient_ata,
            mint,
        })
    }

    pub fn sender_ata_address(&self) -> String {
        bytes_to_address(&self.sender_ata)
    }

    pub fn recipient_ata_address(&self) -> String {
        bytes_to_address(&self.recipient_ata)
    }
}

/// Ordered instructions for one atomic token transfer: an optional
/// create-ATA followed by exactly one `TransferChecked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstructionSet(Vec<SolInstruction>);

impl TransferInstructionSet {
    pub fn instructions(&self) -> &[SolInstruction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn creates_recipient_account(&self) -> bool {
        self.0.len() == 2
    }
}

/// Assemble the instruction set for a token transfer.
///
/// With `create_recipient_account`, the sender pays to create the
/// recipient's ATA first, so the transfer that follows can credit it.
pub fn assemble_transfer(
    accounts: &TransferAccounts,
    amount_base_units: u64,
    scale: u8,
    create_recipient_account: bool,
) -> Result<TransferInstructionSet, SolError> {
    for (name, key) in [
        ("sender", &accounts.sender),
        ("sender token account", &accounts.sender_ata),
        ("recipient", &accounts.recipient),
        ("recipient token account", &accounts.recipient_ata),
        ("mint", &accounts.mint),
    ] {
        if *key == [0u8; 32] {
            return Err(SolError::InvalidInstructionInput(format!("{name} is empty")));
        }
    }

    let mut instructions = Vec::with_capacity(2);
    if create_recipient_account {
        instructions.push(build_create_associated_token_account(
            &accounts.sender,
            &accounts.recipient_ata,
            &accounts.recipient,
            &accounts.mint,
        ));
    }
    instructions.push(build_transfer_checked(
        &accounts.sender_ata,
        &accounts.mint,
        &accounts.recipient_ata,
        &accounts.sender,
        amount_base_units,
        scale,
    )?);

    Ok(TransferInstructionSet(instructions))
}
