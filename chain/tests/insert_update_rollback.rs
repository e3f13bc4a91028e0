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

//! A claim created, spent and replaced in one block, then reorganised
//! away, ends up back exactly where it started.

use claimtrie_chain::{apply_block, disconnect_block};
use claimtrie_core::{ClaimTrieParams, Hash as H, OutPoint, TrieOp};
use claimtrie_store::PersistentTrie;
use claimtrie_util as util;

fn op(byte: u8) -> OutPoint {
	OutPoint::new(H::from_bytes([byte; 32]), 0)
}

#[test]
fn same_block_spend_and_add_then_reorg_restores_the_original() {
	util::init_test_logger();

	let mut trie = PersistentTrie::new(ClaimTrieParams::for_testing());

	apply_block(
		&mut trie,
		10,
		&[TrieOp::ClaimAdd {
			name: "atest".to_string(),
			claim_id: op(1),
			amount: 10,
		}],
	)
	.unwrap();

	// advance 100 blocks with nothing else happening on the name
	for h in 11..=110 {
		apply_block(&mut trie, h, &[]).unwrap();
	}
	let info = trie.get_info_for_name(b"atest").unwrap();
	assert_eq!(info.claim_id, op(1));

	let root_before_spend = trie.merkle_hash();

	let undo = apply_block(
		&mut trie,
		111,
		&[
			TrieOp::ClaimSpend {
				name: "atest".to_string(),
				claim_id: op(1),
			},
			TrieOp::ClaimAdd {
				name: "atest".to_string(),
				claim_id: op(2),
				amount: 10,
			},
		],
	)
	.unwrap();

	// same-transaction replacement activates with no delay
	let info = trie.get_info_for_name(b"atest").unwrap();
	assert_eq!(info.claim_id, op(2));
	assert_eq!(info.height_valid, 111);

	// reorg one block back: control returns to the original claim
	disconnect_block(&mut trie, 111, &undo).unwrap();
	let info = trie.get_info_for_name(b"atest").unwrap();
	assert_eq!(info.claim_id, op(1));
	assert_eq!(trie.merkle_hash(), root_before_spend);
}
