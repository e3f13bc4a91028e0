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

//! A claim expires `expiration_time` blocks after activation, a reorg
//! one block short of expiry restores it, and re-advancing expires it
//! again.

use claimtrie_chain::{apply_block, disconnect_block};
use claimtrie_core::{ClaimTrieParams, Hash as H, OutPoint, TrieOp};
use claimtrie_store::PersistentTrie;
use claimtrie_util as util;

fn op(byte: u8) -> OutPoint {
	OutPoint::new(H::from_bytes([byte; 32]), 0)
}

#[test]
fn claim_expires_and_a_reorg_can_restore_it() {
	util::init_test_logger();

	// expiration_time = 200 for the test parameter set.
	let params = ClaimTrieParams::for_testing();
	assert_eq!(params.expiration_time, 200);
	let mut trie = PersistentTrie::new(params);

	apply_block(
		&mut trie,
		0,
		&[TrieOp::ClaimAdd {
			name: "atest".to_string(),
			claim_id: op(1),
			amount: 10,
		}],
	)
	.unwrap();
	assert!(trie.get_info_for_name(b"atest").is_some());

	// claim activates with no delay (height_valid = 0) and so expires at
	// height_valid + expiration_time = 200.
	for h in 1..200u32 {
		apply_block(&mut trie, h, &[]).unwrap();
		assert!(trie.get_info_for_name(b"atest").is_some());
	}
	let expiring_undo = apply_block(&mut trie, 200, &[]).unwrap();
	assert!(trie.is_empty());
	assert!(trie.get_info_for_name(b"atest").is_none());

	// reorg back to h = 199: the claim had not yet expired there
	disconnect_block(&mut trie, 200, &expiring_undo).unwrap();
	assert!(trie.get_info_for_name(b"atest").is_some());
	assert_eq!(trie.height(), 199);

	// re-advancing to 200 expires it again
	apply_block(&mut trie, 200, &[]).unwrap();
	assert!(trie.get_info_for_name(b"atest").is_none());
}
