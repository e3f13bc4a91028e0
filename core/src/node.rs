// Copyright 2016 The Grin Developers
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

//! A single node of the name-claim trie.
//!
//! Edges are labeled with single bytes, the raw bytes of the name being
//! walked; names are opaque byte strings, not necessarily valid UTF-8.
//! A node may carry claims (and the supports backing them) even when it
//! also has children, since a shorter name can be claimed independently
//! of any longer name that extends it.

use std::collections::BTreeMap;

use crate::claim::{cmp_claims, Claim};
use crate::hash::{hash_bytes, Hash, EMPTY_TRIE_HASH};
use crate::outpoint::OutPoint;
use crate::ser::{self, Readable, Reader, Writeable, Writer};
use crate::support::Support;

/// One node of the trie. Owns its children directly; the persisted
/// layout (C2) is free to flatten this into a path-keyed store, but the
/// in-memory shape a `Cache` operates on is this simple recursive tree.
#[derive(Clone, Debug, Default)]
pub struct Node {
	/// Children keyed by the next byte of the name.
	children: BTreeMap<u8, Box<Node>>,
	/// Claims on the name ending at this node, in no particular stored
	/// order; `controlling_claim` and `merkle_hash` both re-derive I2's
	/// order on demand since it depends on supports and height.
	claims: Vec<Claim>,
	/// Supports targeting any claim on the name ending at this node.
	supports: Vec<Support>,
	/// Cached hash of this subtree; `None` whenever this node or any
	/// descendant has been mutated since the cache was last filled.
	cached_hash: Option<Hash>,
}

impl Node {
	/// An empty node with no children and no claims.
	pub fn new() -> Node {
		Node::default()
	}

	/// True iff this node has no children and no claims — the state a
	/// node must be pruned back to once it stops being needed.
	pub fn is_empty(&self) -> bool {
		self.children.is_empty() && self.claims.is_empty()
	}

	/// Claims on the name ending at this node.
	pub fn claims(&self) -> &[Claim] {
		&self.claims
	}

	/// Supports on the name ending at this node.
	pub fn supports(&self) -> &[Support] {
		&self.supports
	}

	/// Children of this node, in ascending byte order.
	pub fn children(&self) -> impl Iterator<Item = (u8, &Node)> {
		self.children.iter().map(|(b, n)| (*b, n.as_ref()))
	}

	fn mark_dirty(&mut self) {
		self.cached_hash = None;
	}

	/// Mutable access to the child at `byte`, creating it if absent and
	/// marking this node dirty (a fresh child is itself already dirty).
	pub fn child_mut(&mut self, byte: u8) -> &mut Node {
		self.cached_hash = None;
		self.children.entry(byte).or_insert_with(|| Box::new(Node::new()))
	}

	/// Child at `byte`, if present, without creating it.
	pub fn child(&self, byte: u8) -> Option<&Node> {
		self.children.get(&byte).map(|n| n.as_ref())
	}

	/// Walk `path` from this node, returning the node it terminates at,
	/// if the whole path exists.
	pub fn walk(&self, path: &[u8]) -> Option<&Node> {
		match path.split_first() {
			None => Some(self),
			Some((byte, rest)) => self.child(*byte).and_then(|c| c.walk(rest)),
		}
	}

	/// Walk `path` from this node, creating nodes as needed, and mark
	/// every node on the path dirty.
	pub fn walk_mut(&mut self, path: &[u8]) -> &mut Node {
		match path.split_first() {
			None => {
				self.mark_dirty();
				self
			}
			Some((byte, rest)) => self.child_mut(*byte).walk_mut(rest),
		}
	}

	/// Remove the child at `byte` if it is present and has become empty
	/// and childless, pruning it from the map entirely. Safe to call
	/// speculatively after every removal.
	pub fn prune_child(&mut self, byte: u8) {
		if let Some(child) = self.children.get(&byte) {
			if child.is_empty() {
				self.children.remove(&byte);
			}
		}
	}

	/// Insert (or replace) a claim by `claim_id`, marking this node
	/// dirty. Two claims with the same id never coexist (I3's identity
	/// rule): inserting one evicts any existing claim with that id.
	pub fn insert_claim(&mut self, claim: Claim) {
		self.claims.retain(|c| c.claim_id != claim.claim_id);
		self.claims.push(claim);
		self.mark_dirty();
	}

	/// Remove the claim with the given id, returning it if present.
	pub fn remove_claim(&mut self, claim_id: &OutPoint) -> Option<Claim> {
		let pos = self.claims.iter().position(|c| &c.claim_id == claim_id)?;
		self.mark_dirty();
		Some(self.claims.remove(pos))
	}

	/// Insert (or replace) a support by `support_id`.
	pub fn insert_support(&mut self, support: Support) {
		self.supports.retain(|s| s.support_id != support.support_id);
		self.supports.push(support);
		self.mark_dirty();
	}

	/// Remove the support with the given id, returning it if present.
	pub fn remove_support(&mut self, support_id: &OutPoint) -> Option<Support> {
		let pos = self.supports.iter().position(|s| &s.support_id == support_id)?;
		self.mark_dirty();
		Some(self.supports.remove(pos))
	}

	/// Claims at this node in I2 order: descending `effective_amount`,
	/// ascending `height_valid`, ascending `claim_id`. The first entry,
	/// if any, is the controlling claim.
	pub fn ordered_claims(&self, at_height: u32) -> Vec<&Claim> {
		let mut ordered: Vec<&Claim> = self.claims.iter().collect();
		ordered.sort_by(|a, b| cmp_claims(a, b, &self.supports, at_height));
		ordered
	}

	/// The controlling claim at this node, if any, plus its effective
	/// amount at `at_height`.
	pub fn controlling_claim(&self, at_height: u32) -> Option<(&Claim, u64)> {
		let best = self.ordered_claims(at_height).into_iter().next()?;
		let amount = best.effective_amount(&self.supports, at_height);
		Some((best, amount))
	}

	/// Hash committing to this node's claims vector alone (not its
	/// children): the concatenation, in I2 order, of each claim's
	/// `commitment_bytes`.
	fn hash_of_claims(&self, at_height: u32) -> Hash {
		let ordered = self.ordered_claims(at_height);
		let mut bytes = Vec::new();
		for claim in ordered {
			bytes.extend_from_slice(&claim.commitment_bytes());
		}
		Hash::from_bytes(hash_bytes(&bytes))
	}

	/// Recompute (if dirty) and return this subtree's hash:
	/// `HASH(concat over sorted child bytes b of (b || H(child_b)) ||
	/// hash_of_claims(claims))`. An empty node hashes to the
	/// distinguished empty-trie value.
	pub fn merkle_hash(&mut self, at_height: u32) -> Hash {
		if let Some(h) = self.cached_hash {
			return h;
		}
		if self.is_empty() {
			self.cached_hash = Some(EMPTY_TRIE_HASH);
			return EMPTY_TRIE_HASH;
		}
		let mut bytes = Vec::new();
		for (byte, child) in self.children.iter_mut() {
			bytes.push(*byte);
			bytes.extend_from_slice(child.merkle_hash(at_height).as_bytes());
		}
		bytes.extend_from_slice(self.hash_of_claims(at_height).as_bytes());
		let hash = Hash::from_bytes(hash_bytes(&bytes));
		self.cached_hash = Some(hash);
		hash
	}

	/// Recompute every hash in the subtree from scratch, ignoring the
	/// dirty cache, and compare against what `merkle_hash` currently
	/// reports. Used by `check_consistency`.
	pub fn recompute_hash_fresh(&self, at_height: u32) -> Hash {
		if self.is_empty() {
			return EMPTY_TRIE_HASH;
		}
		let mut bytes = Vec::new();
		for (byte, child) in self.children.iter() {
			bytes.push(*byte);
			bytes.extend_from_slice(child.recompute_hash_fresh(at_height).as_bytes());
		}
		bytes.extend_from_slice(self.hash_of_claims(at_height).as_bytes());
		Hash::from_bytes(hash_bytes(&bytes))
	}

	/// Walk to `path` from `root`, remove the claim with id `claim_id`
	/// there if present, and prune every node left empty along the way
	/// back up. Used by the cache overlay to retire a claim on spend or
	/// expiration without leaving dead nodes behind.
	pub fn remove_claim_at_path(root: &mut Node, path: &[u8], claim_id: &OutPoint) -> Option<Claim> {
		match path.split_first() {
			None => root.remove_claim(claim_id),
			Some((byte, rest)) => {
				let removed = Node::remove_claim_at_path(root.child_mut(*byte), rest, claim_id);
				if removed.is_some() {
					root.prune_child(*byte);
				}
				removed
			}
		}
	}

	/// Same as `remove_claim_at_path`, for supports.
	pub fn remove_support_at_path(
		root: &mut Node,
		path: &[u8],
		support_id: &OutPoint,
	) -> Option<Support> {
		match path.split_first() {
			None => root.remove_support(support_id),
			Some((byte, rest)) => {
				let removed = Node::remove_support_at_path(root.child_mut(*byte), rest, support_id);
				if removed.is_some() {
					root.prune_child(*byte);
				}
				removed
			}
		}
	}
}

/// Equality ignores `cached_hash`: it is a derived performance cache, not
/// part of a node's logical content, and two nodes built by different
/// paths (one hashed along the way, one not) are still the same node.
impl PartialEq for Node {
	fn eq(&self, other: &Node) -> bool {
		self.children == other.children && self.claims == other.claims && self.supports == other.supports
	}
}

impl Eq for Node {}

/// On-disk order for a node's claims and supports is ascending `claim_id`
/// (respectively `support_id`): a fixed, time-independent order, unlike
/// the height- and support-dependent I2 order `ordered_claims` computes
/// on demand. Children are written in the `BTreeMap`'s natural ascending
/// byte order, which needs no separate check on read since the map can't
/// represent anything else. `cached_hash` is not persisted; a
/// deserialized node is dirty and recomputes its hash on first use.
impl Writeable for Node {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u64(self.children.len() as u64)?;
		for (byte, child) in self.children.iter() {
			writer.write_u8(*byte)?;
			child.write(writer)?;
		}

		let mut claims: Vec<&Claim> = self.claims.iter().collect();
		claims.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
		writer.write_u64(claims.len() as u64)?;
		for claim in claims {
			claim.write(writer)?;
		}

		let mut supports: Vec<&Support> = self.supports.iter().collect();
		supports.sort_by(|a, b| a.support_id.cmp(&b.support_id));
		writer.write_u64(supports.len() as u64)?;
		for support in supports {
			support.write(writer)?;
		}
		Ok(())
	}
}

impl Readable for Node {
	fn read(reader: &mut dyn Reader) -> Result<Node, ser::Error> {
		let child_count = reader.read_u64()?;
		let mut children = BTreeMap::new();
		let mut prev_byte: Option<u8> = None;
		for _ in 0..child_count {
			let byte = reader.read_u8()?;
			if prev_byte.map_or(false, |p| byte <= p) {
				return Err(ser::Error::CorruptedData);
			}
			prev_byte = Some(byte);
			children.insert(byte, Box::new(Node::read(reader)?));
		}

		let claim_count = reader.read_u64()?;
		let mut claims = Vec::with_capacity(claim_count as usize);
		let mut prev_claim_id: Option<OutPoint> = None;
		for _ in 0..claim_count {
			let claim = Claim::read(reader)?;
			if prev_claim_id.as_ref().map_or(false, |p| claim.claim_id <= *p) {
				return Err(ser::Error::CorruptedData);
			}
			prev_claim_id = Some(claim.claim_id);
			claims.push(claim);
		}

		let support_count = reader.read_u64()?;
		let mut supports = Vec::with_capacity(support_count as usize);
		let mut prev_support_id: Option<OutPoint> = None;
		for _ in 0..support_count {
			let support = Support::read(reader)?;
			if prev_support_id.as_ref().map_or(false, |p| support.support_id <= *p) {
				return Err(ser::Error::CorruptedData);
			}
			prev_support_id = Some(support.support_id);
			supports.push(support);
		}

		Ok(Node {
			children,
			claims,
			supports,
			cached_hash: None,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hash::Hash as H;

	fn op(byte: u8) -> OutPoint {
		OutPoint::new(H::from_bytes([byte; 32]), 0)
	}

	#[test]
	fn empty_node_hashes_to_distinguished_value() {
		let mut n = Node::new();
		assert_eq!(n.merkle_hash(0), EMPTY_TRIE_HASH);
	}

	#[test]
	fn controlling_claim_is_highest_effective_amount() {
		let mut n = Node::new();
		n.insert_claim(Claim::new(op(1), 10, 0));
		n.insert_claim(Claim::new(op(2), 20, 0));
		let (best, amount) = n.controlling_claim(0).unwrap();
		assert_eq!(best.claim_id, op(2));
		assert_eq!(amount, 20);
	}

	#[test]
	fn support_can_flip_control() {
		let mut n = Node::new();
		n.insert_claim(Claim::new(op(1), 10, 0));
		n.insert_claim(Claim::new(op(2), 20, 0));
		n.insert_support(Support::new(op(3), op(1), 100, 0));
		let (best, amount) = n.controlling_claim(0).unwrap();
		assert_eq!(best.claim_id, op(1));
		assert_eq!(amount, 110);
	}

	#[test]
	fn mutation_invalidates_cached_hash() {
		let mut n = Node::new();
		let empty_hash = n.merkle_hash(0);
		n.insert_claim(Claim::new(op(1), 10, 0));
		assert_ne!(n.merkle_hash(0), empty_hash);
	}

	#[test]
	fn child_byte_order_affects_hash_input_deterministically() {
		let mut a = Node::new();
		a.child_mut(1).insert_claim(Claim::new(op(1), 5, 0));
		a.child_mut(2).insert_claim(Claim::new(op(2), 5, 0));

		let mut b = Node::new();
		b.child_mut(2).insert_claim(Claim::new(op(2), 5, 0));
		b.child_mut(1).insert_claim(Claim::new(op(1), 5, 0));

		assert_eq!(a.merkle_hash(0), b.merkle_hash(0));
	}

	#[test]
	fn pruning_removes_emptied_children() {
		let mut n = Node::new();
		n.child_mut(1).insert_claim(Claim::new(op(1), 5, 0));
		n.child_mut(1).remove_claim(&op(1));
		n.prune_child(1);
		assert!(n.child(1).is_none());
	}

	#[test]
	fn remove_claim_at_path_prunes_dead_branch() {
		let mut root = Node::new();
		root.walk_mut(b"test").insert_claim(Claim::new(op(1), 5, 0));
		let removed = Node::remove_claim_at_path(&mut root, b"test", &op(1));
		assert_eq!(removed.unwrap().claim_id, op(1));
		assert!(root.walk(b"test").is_none());
	}

	#[test]
	fn remove_claim_at_path_keeps_branch_with_sibling_claim() {
		let mut root = Node::new();
		root.walk_mut(b"tes").insert_claim(Claim::new(op(2), 5, 0));
		root.walk_mut(b"test").insert_claim(Claim::new(op(1), 5, 0));
		Node::remove_claim_at_path(&mut root, b"test", &op(1));
		assert!(root.walk(b"tes").is_some());
		assert!(root.walk(b"test").is_none());
	}

	#[test]
	fn node_round_trips_through_serialization() {
		use crate::ser::{deserialize_from_slice, ser_vec};

		let mut root = Node::new();
		root.insert_claim(Claim::new(op(2), 20, 0));
		root.insert_claim(Claim::new(op(1), 10, 0));
		root.insert_support(Support::new(op(3), op(1), 5, 0));
		root.child_mut(b't').insert_claim(Claim::new(op(4), 7, 0));

		let bytes = ser_vec(&root).unwrap();
		let back: Node = deserialize_from_slice(&bytes).unwrap();
		assert_eq!(root, back);
	}

	#[test]
	fn node_equality_ignores_cached_hash() {
		let mut hashed = Node::new();
		hashed.insert_claim(Claim::new(op(1), 10, 0));
		hashed.merkle_hash(0);

		let mut fresh = Node::new();
		fresh.insert_claim(Claim::new(op(1), 10, 0));

		assert_eq!(hashed, fresh);
	}

	#[test]
	fn deserializing_non_canonical_claim_order_is_corrupted() {
		use crate::ser::{deserialize_from_slice, Error as SerError};

		// Two claims written highest-id-first: violates the ascending
		// claim_id disk order Node::write always produces.
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&0u64.to_be_bytes()); // no children
		bytes.extend_from_slice(&2u64.to_be_bytes()); // two claims
		let hi = Claim::new(op(2), 10, 0);
		let lo = Claim::new(op(1), 10, 0);
		let mut tmp = Vec::new();
		crate::ser::serialize(&mut tmp, &hi).unwrap();
		bytes.extend_from_slice(&tmp);
		tmp.clear();
		crate::ser::serialize(&mut tmp, &lo).unwrap();
		bytes.extend_from_slice(&tmp);
		bytes.extend_from_slice(&0u64.to_be_bytes()); // no supports

		let res: Result<Node, SerError> = deserialize_from_slice(&bytes);
		assert_eq!(res.unwrap_err(), SerError::CorruptedData);
	}
}
