//! `BankKeeper`: the chip-custody interface consumed at `Sit`/`Leave`
//! (spec §1: bank is an external collaborator). Seat stacks are the
//! authoritative in-hand ledger once a player is seated; this interface only
//! governs the boundary crossing between a player's wallet and the table's
//! escrow.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("account {0} has insufficient balance")]
    InsufficientBalance(String),
}

pub trait BankKeeper {
    /// Moves `amount` from `from`'s wallet into the table's escrow.
    fn escrow(&mut self, from: &str, amount: u64) -> Result<(), BankError>;

    /// Moves `amount` out of the table's escrow back to `to`'s wallet.
    fn release(&mut self, to: &str, amount: u64) -> Result<(), BankError>;
}

/// Reference implementation for tests and any embedder that has not wired a
/// real bank module.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBankKeeper {
    balances: std::collections::BTreeMap<String, u64>,
    escrowed: u64,
}

impl InMemoryBankKeeper {
    pub fn new(balances: std::collections::BTreeMap<String, u64>) -> Self {
        InMemoryBankKeeper { balances, escrowed: 0 }
    }

    pub fn balance(&self, account: &str) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

impl BankKeeper for InMemoryBankKeeper {
    fn escrow(&mut self, from: &str, amount: u64) -> Result<(), BankError> {
        let balance = self.balances.entry(from.to_string()).or_insert(0);
        if *balance < amount {
            return Err(BankError::InsufficientBalance(from.to_string()));
        }
        *balance -= amount;
        self.escrowed = self.escrowed.saturating_add(amount);
        Ok(())
    }

    fn release(&mut self, to: &str, amount: u64) -> Result<(), BankError> {
        self.escrowed = self.escrowed.saturating_sub(amount);
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }
}
