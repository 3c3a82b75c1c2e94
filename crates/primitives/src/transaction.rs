use crate::{ShortHash, TxHash};
use alloy_primitives::{keccak256, Bytes};

/// An opaque signed transaction as gossiped between nodes.
///
/// The synchronization layer never interprets the payload; it only moves it
/// between peers and the local pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// The raw transaction payload.
    pub payload: Bytes,
}

impl Transaction {
    /// Returns the hash of the transaction payload.
    pub fn hash(&self) -> TxHash {
        keccak256(&self.payload)
    }

    /// Returns the compact identifier used to advertise this transaction to
    /// peers without sending the full hash.
    pub fn short_hash(&self) -> ShortHash {
        let hash = self.hash();
        u32::from_le_bytes(hash[..4].try_into().expect("hash is at least 4 bytes"))
    }

    /// Transaction size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

impl From<Bytes> for Transaction {
    fn from(payload: Bytes) -> Self {
        Self { payload }
    }
}

/// An ordered sequence of transactions returned by a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRange {
    transactions: Vec<Transaction>,
}

impl TransactionRange {
    /// Creates a range from the given transactions.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// The number of transactions in the range.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns `true` if the range holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Iterator over the transactions in the range.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Consumes the range, returning the transactions.
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}

impl From<Vec<Transaction>> for TransactionRange {
    fn from(transactions: Vec<Transaction>) -> Self {
        Self::new(transactions)
    }
}

impl IntoIterator for TransactionRange {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_hash_prefix() {
        let tx = Transaction { payload: Bytes::from_static(b"payload") };
        let hash = tx.hash();
        assert_eq!(tx.short_hash().to_le_bytes(), hash[..4]);
    }

    #[test]
    fn size_matches_payload() {
        let tx = Transaction { payload: vec![0u8; 100].into() };
        assert_eq!(tx.size(), 100);
    }
}
