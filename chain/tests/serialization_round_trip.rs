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

//! A trie root built up through ordinary block application
//! serializes and deserializes back to an equal node, and a node that
//! has had a claim inserted then removed again is equal to the node
//! from before the insertion.

use claimtrie_chain::apply_block;
use claimtrie_core::ser::{deserialize_from_slice, ser_vec};
use claimtrie_core::{ClaimTrieParams, Hash as H, Node, OutPoint, TrieOp};
use claimtrie_store::PersistentTrie;
use claimtrie_util as util;

fn op(byte: u8) -> OutPoint {
	OutPoint::new(H::from_bytes([byte; 32]), 0)
}

#[test]
fn trie_root_round_trips_through_serialization() {
	util::init_test_logger();

	let mut trie = PersistentTrie::new(ClaimTrieParams::for_testing());
	apply_block(
		&mut trie,
		1,
		&[
			TrieOp::ClaimAdd {
				name: "test".to_string(),
				claim_id: op(1),
				amount: 10,
			},
			TrieOp::ClaimAdd {
				name: "test2".to_string(),
				claim_id: op(2),
				amount: 5,
			},
			TrieOp::SupportAdd {
				name: "test".to_string(),
				support_id: op(3),
				supported_claim_id: op(1),
				amount: 2,
			},
		],
	)
	.unwrap();

	let bytes = ser_vec(trie.root()).unwrap();
	let back: Node = deserialize_from_slice(&bytes).unwrap();
	assert_eq!(trie.root(), &back);
}

#[test]
fn insert_then_remove_matches_the_original_node() {
	util::init_test_logger();

	let mut trie = PersistentTrie::new(ClaimTrieParams::for_testing());
	apply_block(
		&mut trie,
		1,
		&[TrieOp::ClaimAdd {
			name: "test".to_string(),
			claim_id: op(1),
			amount: 10,
		}],
	)
	.unwrap();
	let before = trie.root().clone();

	apply_block(
		&mut trie,
		2,
		&[TrieOp::ClaimAdd {
			name: "test".to_string(),
			claim_id: op(2),
			amount: 3,
		}],
	)
	.unwrap();
	apply_block(
		&mut trie,
		3,
		&[TrieOp::ClaimSpend {
			name: "test".to_string(),
			claim_id: op(2),
		}],
	)
	.unwrap();

	assert_eq!(trie.root(), &before);
}
