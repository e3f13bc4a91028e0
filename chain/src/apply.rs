// Copyright 2018 The Grin Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Translates a block's claim-relevant transaction outputs into cache
//! operations, and reverses the effect of a previously-applied block
//! during a reorganisation.
//!
//! Per §4.6: for each transaction, spends are applied before adds (a
//! transaction that both spends an old claim and creates a new one on
//! the same name sees the old claim vanish and the new claim go through
//! normal activation delay, never inheriting the old one's state); after
//! every transaction in the block has been applied, the queues are
//! drained at the block's height.

use log::info;

use claimtrie_core::ser::{deserialize_from_slice, ser_vec};
use claimtrie_core::{Claim, Support, TrieOp};
use claimtrie_store::PersistentTrie;

use crate::cache::extending;
use crate::error::{Error, ErrorKind};
use crate::undo::{UndoLog, UndoOp};

fn apply_op(cache: &mut crate::cache::Cache, height: u32, op: &TrieOp) -> Result<(), Error> {
	match op {
		TrieOp::ClaimSpend { name, claim_id } => cache.spend_claim(name.as_bytes(), claim_id),
		TrieOp::SupportSpend { name, support_id } => cache.spend_support(name.as_bytes(), support_id),
		TrieOp::ClaimAdd { name, claim_id, amount } => {
			cache.add_claim(name.as_bytes(), Claim::new(*claim_id, *amount, height))
		}
		TrieOp::SupportAdd {
			name,
			support_id,
			supported_claim_id,
			amount,
		} => cache.add_support(
			name.as_bytes(),
			Support::new(*support_id, *supported_claim_id, *amount, height),
		),
	}
}

/// Apply one block's operations to `trie`, in block order: every spend
/// first, then every add, then the queue drain for `height`. Returns the
/// serialized undo log the caller must persist alongside the block.
pub fn apply_block(trie: &mut PersistentTrie, height: u32, ops: &[TrieOp]) -> Result<Vec<u8>, Error> {
	let spends = ops
		.iter()
		.filter(|op| matches!(op, TrieOp::ClaimSpend { .. } | TrieOp::SupportSpend { .. }));
	let adds = ops
		.iter()
		.filter(|op| matches!(op, TrieOp::ClaimAdd { .. } | TrieOp::SupportAdd { .. }));

	let (_, undo_log) = extending(trie, height, |cache| {
		for op in spends {
			apply_op(cache, height, op)?;
		}
		for op in adds {
			apply_op(cache, height, op)?;
		}
		cache.increment_block(height)?;
		Ok(())
	})?;

	info!("chain: applied block {}, root {}", height, trie.merkle_hash());
	Ok(ser_vec(&UndoLog(undo_log))?)
}

/// Reverse a previously-applied block: replay its undo log back to
/// front against a fresh cache over `trie`, and flush the result. `trie`
/// must currently be at `height` (the block being disconnected);
/// afterwards it is at `height - 1`.
pub fn disconnect_block(trie: &mut PersistentTrie, height: u32, undo_bytes: &[u8]) -> Result<(), Error> {
	if trie.height() != height {
		return Err(ErrorKind::InapplicableUndo(format!(
			"trie is at height {}, cannot disconnect block {}",
			trie.height(),
			height
		))
		.into());
	}
	let UndoLog(ops) = deserialize_from_slice(undo_bytes)?;

	extending(trie, height, |cache| {
		for op in ops.iter().rev() {
			match op {
				UndoOp::AddClaim { name, claim_id } => cache.undo_add_claim(name, claim_id)?,
				UndoOp::SpendClaim { name, claim } => cache.undo_spend_claim(name, claim.clone())?,
				UndoOp::AddSupport { name, support_id } => cache.undo_add_support(name, support_id)?,
				UndoOp::SpendSupport { name, support } => cache.undo_spend_support(name, support.clone())?,
				UndoOp::QueueDrain {
					height: drained_height,
					activated_claims,
					activated_supports,
					expired_claims,
				} => cache.decrement_block(
					*drained_height,
					activated_claims,
					activated_supports,
					expired_claims,
				)?,
			}
		}
		Ok(())
	})?;

	info!("chain: disconnected block {}, new height {}", height, trie.height());
	Ok(())
}
