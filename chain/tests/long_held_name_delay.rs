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

//! A name held since height 0 makes a challenger wait
//! `min(activation_max_delay, age / activation_delay_factor)` blocks
//! before it can take control, even though the challenger's own amount
//! would win outright once active.

use claimtrie_chain::apply_block;
use claimtrie_core::{ClaimTrieParams, Hash as H, OutPoint, TrieOp};
use claimtrie_store::PersistentTrie;
use claimtrie_util as util;

fn op(byte: u8) -> OutPoint {
	OutPoint::new(H::from_bytes([byte; 32]), 0)
}

#[test]
fn challenger_waits_the_full_delay_before_taking_over() {
	util::init_test_logger();

	let mut trie = PersistentTrie::new(ClaimTrieParams::for_testing());
	apply_block(
		&mut trie,
		0,
		&[TrieOp::ClaimAdd {
			name: "atest".to_string(),
			claim_id: op(1),
			amount: 1,
		}],
	)
	.unwrap();

	apply_block(
		&mut trie,
		10_000,
		&[TrieOp::ClaimAdd {
			name: "atest".to_string(),
			claim_id: op(2),
			amount: 1_000,
		}],
	)
	.unwrap();

	// min(4032, 10000 / 32) = 312
	let expected_activation = 10_000 + 312;

	// still controlled by the original claim right up to the block before
	// the challenger activates
	for h in 10_001..expected_activation {
		apply_block(&mut trie, h, &[]).unwrap();
		assert_eq!(trie.get_info_for_name(b"atest").unwrap().claim_id, op(1));
	}

	apply_block(&mut trie, expected_activation, &[]).unwrap();
	let info = trie.get_info_for_name(b"atest").unwrap();
	assert_eq!(info.claim_id, op(2));
	assert_eq!(info.height_valid, expected_activation);
}
