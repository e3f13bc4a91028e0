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

//! Side indices the cache overlay needs alongside the activation and
//! expiration queues. None of this is consensus-hashed (it is never an
//! input to `Node::merkle_hash`): the queues themselves only carry a
//! `(name, id)` pair, not the full claim or support payload, and the
//! expiration queue carries only a claim id with no name at all. Both
//! gaps would otherwise force a full trie walk to materialize a queued
//! entry or to locate an expiring claim's name, which is exactly the
//! kind of bookkeeping an O(1) id index exists to avoid (see
//! `queue::ActivationQueue`'s own `by_id` index for the same reasoning).

use std::collections::HashMap;

use claimtrie_core::{Claim, OutPoint, Support};

/// A claim waiting in the activation queue, with the payload it will be
/// inserted into the trie with once drained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingClaim {
	/// Name the claim is scheduled against.
	pub name: Vec<u8>,
	/// The claim itself, `height_valid` already set to its activation height.
	pub claim: Claim,
}

/// A support waiting in the activation queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSupport {
	/// Name the supported claim is on.
	pub name: Vec<u8>,
	/// The support itself.
	pub support: Support,
}

/// Queued claim/support payloads plus a name index for currently-active
/// claims and supports. Copy-on-write alongside the trie and queues
/// themselves: a `Cache` clones this, mutates its clone, and only merges
/// it back into the base on flush.
#[derive(Clone, Debug, Default)]
pub struct PendingStore {
	claims: HashMap<OutPoint, PendingClaim>,
	supports: HashMap<OutPoint, PendingSupport>,
	active_claim_names: HashMap<OutPoint, Vec<u8>>,
	active_support_names: HashMap<OutPoint, Vec<u8>>,
}

impl PendingStore {
	/// An empty set of side indices.
	pub fn new() -> PendingStore {
		PendingStore::default()
	}

	/// Record a claim as waiting in the activation queue.
	pub fn insert_claim(&mut self, pending: PendingClaim) {
		self.claims.insert(pending.claim.claim_id, pending);
	}

	/// Remove and return a queued claim's payload, if still queued.
	pub fn remove_claim(&mut self, claim_id: &OutPoint) -> Option<PendingClaim> {
		self.claims.remove(claim_id)
	}

	/// A queued claim's payload, if still queued.
	pub fn claim(&self, claim_id: &OutPoint) -> Option<&PendingClaim> {
		self.claims.get(claim_id)
	}

	/// Record a support as waiting in the activation queue.
	pub fn insert_support(&mut self, pending: PendingSupport) {
		self.supports.insert(pending.support.support_id, pending);
	}

	/// Remove and return a queued support's payload, if still queued.
	pub fn remove_support(&mut self, support_id: &OutPoint) -> Option<PendingSupport> {
		self.supports.remove(support_id)
	}

	/// A queued support's payload, if still queued.
	pub fn support(&self, support_id: &OutPoint) -> Option<&PendingSupport> {
		self.supports.get(support_id)
	}

	/// Record that `claim_id` is now active in the trie at `name`.
	pub fn note_active_claim(&mut self, claim_id: OutPoint, name: Vec<u8>) {
		self.active_claim_names.insert(claim_id, name);
	}

	/// Forget an active claim (on spend or expiration), returning its name.
	pub fn forget_active_claim(&mut self, claim_id: &OutPoint) -> Option<Vec<u8>> {
		self.active_claim_names.remove(claim_id)
	}

	/// The name an active claim lives at, if tracked.
	pub fn active_claim_name(&self, claim_id: &OutPoint) -> Option<&[u8]> {
		self.active_claim_names.get(claim_id).map(|v| v.as_slice())
	}

	/// Record that `support_id` is now active in the trie at `name`.
	pub fn note_active_support(&mut self, support_id: OutPoint, name: Vec<u8>) {
		self.active_support_names.insert(support_id, name);
	}

	/// Forget an active support (on spend), returning its name.
	pub fn forget_active_support(&mut self, support_id: &OutPoint) -> Option<Vec<u8>> {
		self.active_support_names.remove(support_id)
	}

	/// The name an active support lives at, if tracked.
	pub fn active_support_name(&self, support_id: &OutPoint) -> Option<&[u8]> {
		self.active_support_names.get(support_id).map(|v| v.as_slice())
	}
}
