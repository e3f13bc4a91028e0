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

//! Height-indexed queues scheduling delayed activations and expirations.
//!
//! Both queues are an ordered map keyed by height (for efficient
//! drain-at-height) plus a hash index keyed by id (for efficient
//! removal on spend/undo without a linear scan).

use std::collections::{BTreeMap, HashMap, HashSet};

use claimtrie_core::OutPoint;

/// One pending activation: a claim or support, named, waiting to enter
/// the trie at a future height.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueueEntry {
	/// Name the entry is scheduled against.
	pub name: Vec<u8>,
	/// Id of the claim or support waiting to activate.
	pub id: OutPoint,
}

/// Height-indexed multimap of claims and supports waiting to activate.
#[derive(Clone, Debug, Default)]
pub struct ActivationQueue {
	by_height: BTreeMap<u32, HashSet<QueueEntry>>,
	by_id: HashMap<OutPoint, u32>,
}

impl ActivationQueue {
	/// An empty queue.
	pub fn new() -> ActivationQueue {
		ActivationQueue::default()
	}

	/// Schedule `entry` to activate at `height`.
	pub fn enqueue(&mut self, height: u32, entry: QueueEntry) {
		self.by_id.insert(entry.id, height);
		self.by_height.entry(height).or_insert_with(HashSet::new).insert(entry);
	}

	/// Remove the pending entry for `id`, if any, returning it along
	/// with the height it was scheduled for.
	pub fn remove(&mut self, id: &OutPoint) -> Option<(u32, QueueEntry)> {
		let height = self.by_id.remove(id)?;
		let set = self.by_height.get_mut(&height)?;
		let entry = set.iter().find(|e| &e.id == id)?.clone();
		set.remove(&entry);
		if set.is_empty() {
			self.by_height.remove(&height);
		}
		Some((height, entry))
	}

	/// Whether `id` is currently queued.
	pub fn contains(&self, id: &OutPoint) -> bool {
		self.by_id.contains_key(id)
	}

	/// Height `id` is scheduled to activate at, if queued.
	pub fn height_of(&self, id: &OutPoint) -> Option<u32> {
		self.by_id.get(id).copied()
	}

	/// Remove and return every entry scheduled at exactly `height`.
	pub fn drain_at(&mut self, height: u32) -> Vec<QueueEntry> {
		match self.by_height.remove(&height) {
			None => Vec::new(),
			Some(set) => {
				for entry in &set {
					self.by_id.remove(&entry.id);
				}
				set.into_iter().collect()
			}
		}
	}
}

/// Height-indexed multimap of active claims scheduled to expire.
#[derive(Clone, Debug, Default)]
pub struct ExpirationQueue {
	by_height: BTreeMap<u32, HashSet<OutPoint>>,
	by_id: HashMap<OutPoint, u32>,
}

impl ExpirationQueue {
	/// An empty queue.
	pub fn new() -> ExpirationQueue {
		ExpirationQueue::default()
	}

	/// Schedule `claim_id` to expire at `height`.
	pub fn enqueue(&mut self, height: u32, claim_id: OutPoint) {
		self.by_id.insert(claim_id, height);
		self.by_height.entry(height).or_insert_with(HashSet::new).insert(claim_id);
	}

	/// Cancel the pending expiration for `claim_id`, if any, returning
	/// the height it was scheduled for.
	pub fn remove(&mut self, claim_id: &OutPoint) -> Option<u32> {
		let height = self.by_id.remove(claim_id)?;
		if let Some(set) = self.by_height.get_mut(&height) {
			set.remove(claim_id);
			if set.is_empty() {
				self.by_height.remove(&height);
			}
		}
		Some(height)
	}

	/// Remove and return every claim id scheduled to expire at exactly
	/// `height`.
	pub fn drain_at(&mut self, height: u32) -> Vec<OutPoint> {
		match self.by_height.remove(&height) {
			None => Vec::new(),
			Some(set) => {
				for id in &set {
					self.by_id.remove(id);
				}
				set.into_iter().collect()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use claimtrie_core::Hash;

	fn op(byte: u8) -> OutPoint {
		OutPoint::new(Hash::from_bytes([byte; 32]), 0)
	}

	#[test]
	fn activation_queue_drains_only_scheduled_height() {
		let mut q = ActivationQueue::new();
		q.enqueue(
			100,
			QueueEntry {
				name: b"atest".to_vec(),
				id: op(1),
			},
		);
		assert!(q.drain_at(99).is_empty());
		let drained = q.drain_at(100);
		assert_eq!(drained.len(), 1);
		assert!(!q.contains(&op(1)));
	}

	#[test]
	fn removal_before_activation_cancels_it() {
		let mut q = ActivationQueue::new();
		let entry = QueueEntry {
			name: b"atest".to_vec(),
			id: op(1),
		};
		q.enqueue(100, entry);
		let (height, _) = q.remove(&op(1)).unwrap();
		assert_eq!(height, 100);
		assert!(q.drain_at(100).is_empty());
	}

	#[test]
	fn expiration_queue_round_trips() {
		let mut q = ExpirationQueue::new();
		q.enqueue(300, op(1));
		assert_eq!(q.remove(&op(1)), Some(300));
		assert!(q.drain_at(300).is_empty());
	}
}
