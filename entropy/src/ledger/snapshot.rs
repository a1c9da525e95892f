use super::{Commit, LedgerInner, MAX_RECENT_BLOCKHASHES};
use crate::core::address::{ProgramId, StateAddress};
use crate::types::instruction::{Blockhash, Receipt};
use crate::types::state::PrimeRecord;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Serializable image of a ledger, written with bincode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub program_id: ProgramId,
    pub slot: u64,
    /// Recent blockhashes, oldest first
    pub blockhashes: Vec<Blockhash>,
    pub accounts: Vec<(StateAddress, Vec<u8>)>,
    /// Committed receipts in slot order
    pub receipts: Vec<Receipt>,
    pub history: Vec<PrimeRecord>,
}

/// Borrowed view of the ledger with an optional pending commit applied.
///
/// Serializes exactly like [`LedgerSnapshot`], so a commit can be written to
/// disk before it touches the in-memory ledger.
pub(super) struct SnapshotView<'a> {
    pub program_id: &'a ProgramId,
    pub state_address: &'a StateAddress,
    pub inner: &'a LedgerInner,
    pub commit: Option<&'a Commit>,
}

/// Sequence backed by an iterator with an exact size hint.
struct SeqView<I>(I);

impl<I> Serialize for SeqView<I>
where
    I: Iterator + Clone,
    I::Item: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.clone())
    }
}

impl Serialize for SnapshotView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let inner = self.inner;
        let commit = self.commit;

        let pending_blockhash = commit.map(|c| &c.blockhash);
        let window = inner.blockhashes.len() + usize::from(pending_blockhash.is_some());
        let evicted = window.saturating_sub(MAX_RECENT_BLOCKHASHES);
        let blockhashes = inner.blockhashes.iter().skip(evicted).chain(pending_blockhash);

        let account = commit
            .and_then(|c| c.account.as_ref())
            .or(inner.account.as_ref());
        let state_address = self.state_address;
        let accounts = account.into_iter().map(move |data| (state_address, data));

        let receipts = inner.receipts.iter().chain(commit.map(|c| &c.receipt));
        let history = inner
            .history
            .iter()
            .chain(commit.and_then(|c| c.prime.as_ref()));

        let mut state = serializer.serialize_struct("LedgerSnapshot", 6)?;
        state.serialize_field("program_id", self.program_id)?;
        state.serialize_field("slot", &commit.map_or(inner.slot, |c| c.receipt.slot))?;
        state.serialize_field("blockhashes", &SeqView(blockhashes))?;
        state.serialize_field("accounts", &SeqView(accounts))?;
        state.serialize_field("receipts", &SeqView(receipts))?;
        state.serialize_field("history", &SeqView(history))?;
        state.end()
    }
}

