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

//! Chain parameters threaded explicitly through `PersistentTrie` and
//! `Cache` construction. There is no process-wide singleton here: callers
//! build one `ClaimTrieParams` (typically once, from their own consensus
//! parameters) and pass it down, the same way a keychain or a set of PoW
//! parameters would be passed rather than reached for through a global.

use crate::hash::{Hash, EMPTY_TRIE_HASH};

/// Default activation delay divisor for mainnet: the older a name's
/// current controlling claim, the longer a challenger must wait.
pub const MAINNET_ACTIVATION_DELAY_FACTOR: u32 = 32;

/// Default activation delay ceiling for mainnet, roughly one week at a
/// 30 second block spacing.
pub const MAINNET_ACTIVATION_MAX_DELAY: u32 = 4032;

/// Default claim/support lifetime for mainnet.
pub const MAINNET_EXPIRATION_TIME: u32 = 262_974;

/// The full set of consensus parameters the trie needs to activate,
/// expire and hash claims. Built once by the caller and threaded through
/// every `PersistentTrie`/`Cache` it constructs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimTrieParams {
	/// Blocks a claim or support remains active after activation.
	pub expiration_time: u32,
	/// Divisor applied to the controlling claim's age when computing the
	/// activation delay of a challenger (see `activation_delay`).
	pub activation_delay_factor: u32,
	/// Upper bound on the activation delay regardless of age.
	pub activation_max_delay: u32,
	/// Root hash of an empty trie.
	pub empty_trie_hash: Hash,
}

impl ClaimTrieParams {
	/// Production parameter set.
	pub fn mainnet() -> ClaimTrieParams {
		ClaimTrieParams {
			expiration_time: MAINNET_EXPIRATION_TIME,
			activation_delay_factor: MAINNET_ACTIVATION_DELAY_FACTOR,
			activation_max_delay: MAINNET_ACTIVATION_MAX_DELAY,
			empty_trie_hash: EMPTY_TRIE_HASH,
		}
	}

	/// A parameter set with small delays and a short expiration, so tests
	/// can exercise activation and expiration without mining thousands of
	/// blocks.
	pub fn for_testing() -> ClaimTrieParams {
		ClaimTrieParams {
			expiration_time: 200,
			activation_delay_factor: 32,
			activation_max_delay: 4032,
			empty_trie_hash: EMPTY_TRIE_HASH,
		}
	}

	/// Delay, in blocks, a claim or support becoming effective at height
	/// `h` must serve before activating, given the controlling claim (or
	/// support's target) has stood since `height_valid_of_controlling`.
	/// Zero whenever there is no controlling claim yet to challenge.
	pub fn activation_delay(&self, h: u32, height_valid_of_controlling: Option<u32>) -> u32 {
		match height_valid_of_controlling {
			None => 0,
			Some(since) => {
				let age = h.saturating_sub(since);
				std::cmp::min(self.activation_max_delay, age / self.activation_delay_factor)
			}
		}
	}

	/// Height at which a claim or support activated at `height_valid`
	/// expires.
	pub fn expiration_height(&self, height_valid: u32) -> u32 {
		height_valid + self.expiration_time
	}
}

impl Default for ClaimTrieParams {
	fn default() -> ClaimTrieParams {
		ClaimTrieParams::mainnet()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn delay_is_capped_and_floored() {
		let p = ClaimTrieParams::mainnet();
		assert_eq!(p.activation_delay(100, None), 0);
		assert_eq!(p.activation_delay(10_000, Some(0)), 312);
		assert_eq!(p.activation_delay(1_000_000, Some(0)), 4032);
	}

	#[test]
	fn expiration_is_height_valid_plus_lifetime() {
		let p = ClaimTrieParams::for_testing();
		assert_eq!(p.expiration_height(100), 300);
	}
}
