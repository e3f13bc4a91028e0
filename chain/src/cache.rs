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

//! The cache overlay: a copy-on-write layer above a `PersistentTrie`
//! that accumulates one block's mutations, computes the candidate
//! Merkle root, and is either flushed into the base or discarded.
//!
//! `Node` already derives `Clone`, so a `Cache` takes its working copy by
//! cloning the base's root, queues and pending-entry indices once at
//! construction rather than layering a separate path-keyed shadow map on
//! top of `PersistentTrie`'s own node tree: the base is never touched
//! until `commit_into` runs, which is the property copy-on-write is
//! actually standing in for here, and `Node`'s own dirty-hash cache
//! (`node::Node::merkle_hash`) already means a block's `merkle_hash`
//! call only re-walks the handful of subtrees that mutation touched.

use log::{debug, trace};

use claimtrie_core::{Claim, ClaimTrieParams, Hash, Node, OutPoint, Support};
use claimtrie_store::{PendingClaim, PendingStore, PendingSupport, PersistentTrie, QueueEntry};

use crate::error::{Error, ErrorKind};
use crate::undo::UndoOp;

/// One block's worth of pending mutations against a `PersistentTrie`.
pub struct Cache<'a> {
	base: &'a PersistentTrie,
	root: Node,
	activation_queue: claimtrie_store::ActivationQueue,
	expiration_queue: claimtrie_store::ExpirationQueue,
	pending: PendingStore,
	height: u32,
	undo_log: Vec<UndoOp>,
	rollback: bool,
}

impl<'a> Cache<'a> {
	/// Build a cache over `base`, for applying (or disconnecting) the
	/// block at `height`.
	pub fn new(base: &'a PersistentTrie, height: u32) -> Cache<'a> {
		Cache {
			base,
			root: base.root().clone(),
			activation_queue: base.activation_queue().clone(),
			expiration_queue: base.expiration_queue().clone(),
			pending: base.pending().clone(),
			height,
			undo_log: Vec::new(),
			rollback: false,
		}
	}

	/// Chain parameters this cache's base trie was constructed with.
	pub fn params(&self) -> &ClaimTrieParams {
		self.base.params()
	}

	/// Height this cache is currently operating at.
	pub fn height(&self) -> u32 {
		self.height
	}

	/// The undo log accumulated so far.
	pub fn undo_log(&self) -> &[UndoOp] {
		&self.undo_log
	}

	/// Mark this cache to be discarded regardless of whether the
	/// closure that built it up returns `Ok`, mirroring the teacher's
	/// `Extension::force_rollback`.
	pub fn force_rollback(&mut self) {
		self.rollback = true;
	}

	fn should_commit(&self) -> bool {
		!self.rollback
	}

	/// Read-only query, consulting the overlay rather than the base.
	pub fn get_info_for_name(&self, name: &[u8]) -> Option<claimtrie_store::NameInfo> {
		let node = self.root.walk(name)?;
		let (claim, amount) = node.controlling_claim(self.height)?;
		Some(claimtrie_store::NameInfo {
			claim_id: claim.claim_id,
			effective_amount: amount,
			height_valid: claim.height_valid,
		})
	}

	/// Force recomputation of every dirty hash and return the root.
	pub fn merkle_hash(&mut self) -> Hash {
		self.root.merkle_hash(self.height)
	}

	fn activation_delay_for(&self, name: &[u8]) -> u32 {
		let controlling_height_valid = self
			.root
			.walk(name)
			.and_then(|n| n.controlling_claim(self.height))
			.map(|(c, _)| c.height_valid);
		self.params().activation_delay(self.height, controlling_height_valid)
	}

	/// Insert a new claim on `name`, scheduling it per the activation
	/// delay (§4.4) or inserting it immediately if none applies.
	pub fn add_claim(&mut self, name: &[u8], mut claim: Claim) -> Result<(), Error> {
		if self.pending.claim(&claim.claim_id).is_some()
			|| self.pending.active_claim_name(&claim.claim_id).is_some()
		{
			return Err(ErrorKind::DuplicateClaim(name.to_vec(), claim.claim_id.to_string()).into());
		}
		let delay = self.activation_delay_for(name);
		claim.height_valid = self.height + delay;
		if delay == 0 {
			self.root.walk_mut(name).insert_claim(claim.clone());
			self.pending.note_active_claim(claim.claim_id, name.to_vec());
			let expiry = self.params().expiration_height(claim.height_valid);
			self.expiration_queue.enqueue(expiry, claim.claim_id);
		} else {
			self.activation_queue.enqueue(
				claim.height_valid,
				QueueEntry {
					name: name.to_vec(),
					id: claim.claim_id,
				},
			);
			self.pending.insert_claim(PendingClaim {
				name: name.to_vec(),
				claim: claim.clone(),
			});
		}
		self.undo_log.push(UndoOp::AddClaim {
			name: name.to_vec(),
			claim_id: claim.claim_id,
		});
		Ok(())
	}

	/// Inverse of `add_claim`: remove `claim_id` from wherever it
	/// currently sits.
	pub fn undo_add_claim(&mut self, name: &[u8], claim_id: &OutPoint) -> Result<(), Error> {
		if self.activation_queue.contains(claim_id) {
			self.activation_queue.remove(claim_id);
			self.pending.remove_claim(claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("queued claim {} missing pending payload", claim_id))
			})?;
		} else {
			Node::remove_claim_at_path(&mut self.root, name, claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("claim {} not present to undo add at {:?}", claim_id, name))
			})?;
			self.pending.forget_active_claim(claim_id);
			self.expiration_queue.remove(claim_id);
		}
		Ok(())
	}

	/// Remove `claim_id` from the trie or the activation queue
	/// (whichever applies), cancel its expiration entry, and record the
	/// removed state for undo. Supports targeting it are left in place
	/// but stop contributing, since `Claim::effective_amount` filters by
	/// the target claim's presence, not by an explicit link.
	pub fn spend_claim(&mut self, name: &[u8], claim_id: &OutPoint) -> Result<(), Error> {
		if self.activation_queue.contains(claim_id) {
			self.activation_queue.remove(claim_id);
			let pending = self.pending.remove_claim(claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("queued claim {} missing pending payload", claim_id))
			})?;
			self.undo_log.push(UndoOp::SpendClaim {
				name: name.to_vec(),
				claim: pending.claim,
			});
		} else {
			let claim = Node::remove_claim_at_path(&mut self.root, name, claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("claim {} not active at {:?}", claim_id, name))
			})?;
			self.pending.forget_active_claim(claim_id);
			self.expiration_queue.remove(claim_id);
			self.undo_log.push(UndoOp::SpendClaim {
				name: name.to_vec(),
				claim,
			});
		}
		Ok(())
	}

	/// Inverse of `spend_claim`: reinsert `claim` exactly as it was,
	/// into the trie if it had already activated by the cache's current
	/// height, or back into the activation queue otherwise.
	pub fn undo_spend_claim(&mut self, name: &[u8], claim: Claim) -> Result<(), Error> {
		if self.height >= claim.height_valid {
			self.root.walk_mut(name).insert_claim(claim.clone());
			self.pending.note_active_claim(claim.claim_id, name.to_vec());
			let expiry = self.params().expiration_height(claim.height_valid);
			self.expiration_queue.enqueue(expiry, claim.claim_id);
		} else {
			self.activation_queue.enqueue(
				claim.height_valid,
				QueueEntry {
					name: name.to_vec(),
					id: claim.claim_id,
				},
			);
			self.pending.insert_claim(PendingClaim {
				name: name.to_vec(),
				claim,
			});
		}
		Ok(())
	}

	/// Insert a new support on an existing (or not yet existing) claim,
	/// subject to the same activation delay as a claim on the same name
	/// (§4.4: "the same formula applies to supports").
	pub fn add_support(&mut self, name: &[u8], support: Support) -> Result<(), Error> {
		if self.pending.support(&support.support_id).is_some()
			|| self.pending.active_support_name(&support.support_id).is_some()
		{
			return Err(
				ErrorKind::DuplicateSupport(name.to_vec(), support.support_id.to_string()).into(),
			);
		}
		let delay = self.activation_delay_for(name);
		let mut support = support;
		support.height_valid = self.height + delay;
		if delay == 0 {
			self.root.walk_mut(name).insert_support(support.clone());
			self.pending.note_active_support(support.support_id, name.to_vec());
		} else {
			self.activation_queue.enqueue(
				support.height_valid,
				QueueEntry {
					name: name.to_vec(),
					id: support.support_id,
				},
			);
			self.pending.insert_support(PendingSupport {
				name: name.to_vec(),
				support: support.clone(),
			});
		}
		self.undo_log.push(UndoOp::AddSupport {
			name: name.to_vec(),
			support_id: support.support_id,
		});
		Ok(())
	}

	/// Inverse of `add_support`.
	pub fn undo_add_support(&mut self, name: &[u8], support_id: &OutPoint) -> Result<(), Error> {
		if self.activation_queue.contains(support_id) {
			self.activation_queue.remove(support_id);
			self.pending.remove_support(support_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!(
					"queued support {} missing pending payload",
					support_id
				))
			})?;
		} else {
			Node::remove_support_at_path(&mut self.root, name, support_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!(
					"support {} not present to undo add at {:?}",
					support_id, name
				))
			})?;
			self.pending.forget_active_support(support_id);
		}
		Ok(())
	}

	/// Remove `support_id` from the trie or the activation queue, and
	/// record it for undo.
	pub fn spend_support(&mut self, name: &[u8], support_id: &OutPoint) -> Result<(), Error> {
		if self.activation_queue.contains(support_id) {
			self.activation_queue.remove(support_id);
			let pending = self.pending.remove_support(support_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!(
					"queued support {} missing pending payload",
					support_id
				))
			})?;
			self.undo_log.push(UndoOp::SpendSupport {
				name: name.to_vec(),
				support: pending.support,
			});
		} else {
			let support = Node::remove_support_at_path(&mut self.root, name, support_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("support {} not active at {:?}", support_id, name))
			})?;
			self.pending.forget_active_support(support_id);
			self.undo_log.push(UndoOp::SpendSupport {
				name: name.to_vec(),
				support,
			});
		}
		Ok(())
	}

	/// Inverse of `spend_support`.
	pub fn undo_spend_support(&mut self, name: &[u8], support: Support) -> Result<(), Error> {
		if self.height >= support.height_valid {
			self.root.walk_mut(name).insert_support(support.clone());
			self.pending.note_active_support(support.support_id, name.to_vec());
		} else {
			self.activation_queue.enqueue(
				support.height_valid,
				QueueEntry {
					name: name.to_vec(),
					id: support.support_id,
				},
			);
			self.pending.insert_support(PendingSupport {
				name: name.to_vec(),
				support,
			});
		}
		Ok(())
	}

	/// Drain the activation and expiration queues at `new_height`,
	/// materializing anything scheduled there and retiring anything
	/// expiring there. Records exactly what was drained so
	/// `decrement_block` can reverse it precisely.
	pub fn increment_block(&mut self, new_height: u32) -> Result<(), Error> {
		let drained = self.activation_queue.drain_at(new_height);
		let mut activated_claims = Vec::new();
		let mut activated_supports = Vec::new();
		for entry in drained {
			if let Some(pending) = self.pending.remove_claim(&entry.id) {
				self.root.walk_mut(&pending.name).insert_claim(pending.claim.clone());
				self.pending
					.note_active_claim(pending.claim.claim_id, pending.name.clone());
				let expiry = self.params().expiration_height(pending.claim.height_valid);
				self.expiration_queue.enqueue(expiry, pending.claim.claim_id);
				activated_claims.push((pending.name, pending.claim));
			} else if let Some(pending) = self.pending.remove_support(&entry.id) {
				self.root
					.walk_mut(&pending.name)
					.insert_support(pending.support.clone());
				self.pending
					.note_active_support(pending.support.support_id, pending.name.clone());
				activated_supports.push((pending.name, pending.support));
			} else {
				return Err(ErrorKind::QueueInvariant(format!(
					"activation entry {} at height {} has no pending payload",
					entry.id, new_height
				))
				.into());
			}
		}

		let expired_ids = self.expiration_queue.drain_at(new_height);
		let mut expired_claims = Vec::new();
		for claim_id in expired_ids {
			let name = self.pending.forget_active_claim(&claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("expiring claim {} has no active-name record", claim_id))
			})?;
			let claim = Node::remove_claim_at_path(&mut self.root, &name, &claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!("expiring claim {} not found at {:?}", claim_id, name))
			})?;
			trace!("cache: claim {} on {:?} expired at height {}", claim_id, name, new_height);
			expired_claims.push((name, claim));
		}

		self.height = new_height;
		self.undo_log.push(UndoOp::QueueDrain {
			height: new_height,
			activated_claims,
			activated_supports,
			expired_claims,
		});
		Ok(())
	}

	/// Reverse the queue drain `increment_block(height)` performed:
	/// retract activations back into the activation queue and restore
	/// expired claims. Used only while replaying an undo log (see
	/// `apply::disconnect_block`).
	pub fn decrement_block(
		&mut self,
		height: u32,
		activated_claims: &[(Vec<u8>, Claim)],
		activated_supports: &[(Vec<u8>, Support)],
		expired_claims: &[(Vec<u8>, Claim)],
	) -> Result<(), Error> {
		for (name, claim) in expired_claims {
			self.root.walk_mut(name).insert_claim(claim.clone());
			self.pending.note_active_claim(claim.claim_id, name.clone());
			let expiry = self.params().expiration_height(claim.height_valid);
			self.expiration_queue.enqueue(expiry, claim.claim_id);
		}
		for (name, claim) in activated_claims {
			Node::remove_claim_at_path(&mut self.root, name, &claim.claim_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!(
					"activated claim {} not present while decrementing height {}",
					claim.claim_id, height
				))
			})?;
			self.pending.forget_active_claim(&claim.claim_id);
			self.expiration_queue.remove(&claim.claim_id);
			self.activation_queue.enqueue(
				height,
				QueueEntry {
					name: name.clone(),
					id: claim.claim_id,
				},
			);
			self.pending.insert_claim(PendingClaim {
				name: name.clone(),
				claim: claim.clone(),
			});
		}
		for (name, support) in activated_supports {
			Node::remove_support_at_path(&mut self.root, name, &support.support_id).ok_or_else(|| {
				ErrorKind::QueueInvariant(format!(
					"activated support {} not present while decrementing height {}",
					support.support_id, height
				))
			})?;
			self.pending.forget_active_support(&support.support_id);
			self.activation_queue.enqueue(
				height,
				QueueEntry {
					name: name.clone(),
					id: support.support_id,
				},
			);
			self.pending.insert_support(PendingSupport {
				name: name.clone(),
				support: support.clone(),
			});
		}
		self.height = height.saturating_sub(1);
		Ok(())
	}

	fn commit_into(self, trie: &mut PersistentTrie) {
		*trie.root_mut() = self.root;
		*trie.activation_queue_mut() = self.activation_queue;
		*trie.expiration_queue_mut() = self.expiration_queue;
		*trie.pending_mut() = self.pending;
		trie.set_height(self.height);
	}
}

/// Starts a new unit of work against `trie` for the block at `height`.
/// The closure has access to a `Cache` built against `trie`'s current
/// state. If the closure returns `Ok` (and never called
/// `force_rollback`), the cache's mutations are written into `trie` and
/// its accumulated undo log is returned alongside the closure's result;
/// otherwise `trie` is left untouched.
pub fn extending<F, T>(trie: &mut PersistentTrie, height: u32, inner: F) -> Result<(T, Vec<UndoOp>), Error>
where
	F: FnOnce(&mut Cache) -> Result<T, Error>,
{
	let mut cache = Cache::new(trie, height);
	trace!("cache: starting extension at height {}", height);
	let res = inner(&mut cache);
	match res {
		Err(e) => {
			debug!("cache: error {}, discarding extension", e);
			Err(e)
		}
		Ok(val) => {
			if cache.should_commit() {
				let undo_log = cache.undo_log.clone();
				trace!("cache: committing extension, new height {}", cache.height);
				cache.commit_into(trie);
				Ok((val, undo_log))
			} else {
				trace!("cache: force_rollback requested, discarding extension");
				Ok((val, Vec::new()))
			}
		}
	}
}

/// Read-only variant of `extending`: always discards the cache's
/// mutations regardless of the closure's result, used by query paths
/// that want to simulate a block's effect without committing it.
pub fn extending_readonly<F, T>(trie: &PersistentTrie, height: u32, inner: F) -> Result<T, Error>
where
	F: FnOnce(&mut Cache) -> Result<T, Error>,
{
	let mut cache = Cache::new(trie, height);
	cache.force_rollback();
	inner(&mut cache)
}

#[cfg(test)]
mod tests {
	use super::*;
	use claimtrie_core::{ClaimTrieParams, Hash as H};

	fn op(byte: u8) -> OutPoint {
		OutPoint::new(H::from_bytes([byte; 32]), 0)
	}

	fn trie() -> PersistentTrie {
		PersistentTrie::new(ClaimTrieParams::for_testing())
	}

	#[test]
	fn add_claim_activates_immediately_on_uncontested_name() {
		let mut base = trie();
		let ((), undo_log) =
			extending(&mut base, 10, |cache| cache.add_claim(b"atest", Claim::new(op(1), 10, 10))).unwrap();
		assert_eq!(undo_log.len(), 1);
	}

	#[test]
	fn extending_readonly_never_mutates_base() {
		let mut base = trie();
		let before = base.merkle_hash();
		extending_readonly(&base, 10, |cache| cache.add_claim(b"atest", Claim::new(op(1), 10, 10))).unwrap();
		assert_eq!(base.merkle_hash(), before);
	}

	#[test]
	fn commit_then_query_sees_the_claim() {
		let mut base = trie();
		extending(&mut base, 10, |cache| cache.add_claim(b"atest", Claim::new(op(1), 10, 10))).unwrap();
		assert_eq!(base.get_info_for_name(b"atest").unwrap().claim_id, op(1));
	}

	#[test]
	fn add_then_undo_add_restores_empty_trie() {
		let mut base = trie();
		let (_, undo_log) =
			extending(&mut base, 10, |cache| cache.add_claim(b"atest", Claim::new(op(1), 10, 10))).unwrap();
		assert!(base.get_info_for_name(b"atest").is_some());

		extending(&mut base, 10, |cache| {
			for op in undo_log.iter().rev() {
				match op {
					UndoOp::AddClaim { name, claim_id } => cache.undo_add_claim(name, claim_id)?,
					_ => unreachable!(),
				}
			}
			Ok(())
		})
		.unwrap();
		assert!(base.get_info_for_name(b"atest").is_none());
	}
}
