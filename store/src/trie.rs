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

//! The persisted trie: owns the root node and the activation/expiration
//! queues, and answers read-only queries directly. Mutation only ever
//! happens by a `Cache` flushing into it (see the `chain` crate); this
//! crate never mutates a `PersistentTrie` except through `root_mut`,
//! which only a flush is meant to call.

use claimtrie_core::{ClaimTrieParams, Hash, Node, OutPoint};

use crate::error::{Error, ErrorKind};
use crate::pending::PendingStore;
use crate::queue::{ActivationQueue, ExpirationQueue};

/// Owns the committed state of the trie: the node tree, both queues, and
/// the side indices (`PendingStore`) the `chain` crate's cache overlay
/// needs to materialize queued entries. This is the "base" a `Cache` is
/// built on top of.
pub struct PersistentTrie {
	root: Node,
	activation_queue: ActivationQueue,
	expiration_queue: ExpirationQueue,
	pending: PendingStore,
	height: u32,
	params: ClaimTrieParams,
}

/// Result of `get_info_for_name`: the controlling claim's identity,
/// effective amount, and `height_valid`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameInfo {
	/// Identity of the controlling claim.
	pub claim_id: OutPoint,
	/// Its effective amount (own stake plus active supports).
	pub effective_amount: u64,
	/// Height at which it became eligible to control the name.
	pub height_valid: u32,
}

impl PersistentTrie {
	/// An empty trie at height 0, governed by `params`.
	pub fn new(params: ClaimTrieParams) -> PersistentTrie {
		PersistentTrie {
			root: Node::new(),
			activation_queue: ActivationQueue::new(),
			expiration_queue: ExpirationQueue::new(),
			pending: PendingStore::new(),
			height: 0,
			params,
		}
	}

	/// The parameters this trie was constructed with.
	pub fn params(&self) -> &ClaimTrieParams {
		&self.params
	}

	/// Current height: the height of the last block whose effects were
	/// applied via a flushed `Cache`.
	pub fn height(&self) -> u32 {
		self.height
	}

	/// Read-only access to the root, for queries and for `Cache`'s
	/// copy-on-write shadowing.
	pub fn root(&self) -> &Node {
		&self.root
	}

	/// Mutable access to the root and queues; only `Cache::flush` is
	/// meant to call this.
	pub fn root_mut(&mut self) -> &mut Node {
		&mut self.root
	}

	/// Mutable access to the activation queue.
	pub fn activation_queue_mut(&mut self) -> &mut ActivationQueue {
		&mut self.activation_queue
	}

	/// Read-only access to the activation queue.
	pub fn activation_queue(&self) -> &ActivationQueue {
		&self.activation_queue
	}

	/// Mutable access to the expiration queue.
	pub fn expiration_queue_mut(&mut self) -> &mut ExpirationQueue {
		&mut self.expiration_queue
	}

	/// Read-only access to the expiration queue.
	pub fn expiration_queue(&self) -> &ExpirationQueue {
		&self.expiration_queue
	}

	/// Mutable access to the pending-entry side indices.
	pub fn pending_mut(&mut self) -> &mut PendingStore {
		&mut self.pending
	}

	/// Read-only access to the pending-entry side indices.
	pub fn pending(&self) -> &PendingStore {
		&self.pending
	}

	/// Advance the trie's recorded height; called once a `Cache` for
	/// that height has been flushed.
	pub fn set_height(&mut self, height: u32) {
		self.height = height;
	}

	/// The controlling claim for `name`, its effective amount and
	/// `height_valid`, or `None` if the name has no active claim.
	pub fn get_info_for_name(&self, name: &[u8]) -> Option<NameInfo> {
		let node = self.root.walk(name)?;
		let (claim, amount) = node.controlling_claim(self.height)?;
		Some(NameInfo {
			claim_id: claim.claim_id,
			effective_amount: amount,
			height_valid: claim.height_valid,
		})
	}

	/// Whether `claim_id` is among the active claims on `name`.
	pub fn has_claim(&self, name: &[u8], claim_id: &OutPoint) -> bool {
		self.root
			.walk(name)
			.map(|n| n.claims().iter().any(|c| &c.claim_id == claim_id))
			.unwrap_or(false)
	}

	/// Root hash, recomputing any dirty subtrees first.
	pub fn merkle_hash(&mut self) -> Hash {
		let height = self.height;
		self.root.merkle_hash(height)
	}

	/// Whether the trie has no claimed names at all.
	pub fn is_empty(&self) -> bool {
		self.root.is_empty()
	}

	/// Recompute every node's hash from scratch and compare it against
	/// the cached `merkle_hash`. A `false` result (or, via
	/// `check_consistency_result`, a fatal `Error`) indicates corrupted
	/// state and must never be treated as recoverable.
	pub fn check_consistency(&mut self) -> bool {
		let cached = self.merkle_hash();
		let fresh = self.root.recompute_hash_fresh(self.height);
		cached == fresh
	}

	/// Like `check_consistency`, but surfaces the mismatch as a fatal
	/// `ErrorKind::HashMismatch` rather than a bare bool, for callers
	/// that want to propagate it through `?`.
	pub fn check_consistency_result(&mut self) -> Result<(), Error> {
		if self.check_consistency() {
			Ok(())
		} else {
			Err(ErrorKind::HashMismatch("root".to_string()).into())
		}
	}

	/// Every claimed name in the trie, in ascending byte order, paired
	/// with its controlling claim's id. Used by debugging tools and by
	/// `check_consistency`'s bottom-up walk.
	pub fn name_iter(&self) -> Vec<(Vec<u8>, OutPoint)> {
		let mut out = Vec::new();
		collect_names(&self.root, &mut Vec::new(), self.height, &mut out);
		out
	}
}

fn collect_names(node: &Node, path: &mut Vec<u8>, height: u32, out: &mut Vec<(Vec<u8>, OutPoint)>) {
	if let Some((claim, _)) = node.controlling_claim(height) {
		out.push((path.clone(), claim.claim_id));
	}
	for (byte, child) in node.children() {
		path.push(byte);
		collect_names(child, path, height, out);
		path.pop();
	}
}
