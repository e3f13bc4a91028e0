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

//! Hash function used throughout the trie.
//!
//! The consensus hash is a single (not double) Blake2b-256, the same
//! primitive this workspace already reaches for elsewhere (see
//! `blake2::blake2b::blake2b` uses in the PoW and bulletproof-commitment
//! code this crate was distilled from).

use std::fmt;

use blake2::blake2b::blake2b;

use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// A 32-byte hash identifying the state of a trie node or subtree.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

/// The distinguished root hash of an empty trie. Not the output of the
/// hash function over any input; a fixed sentinel per the genesis
/// `hashClaimTrie` value.
pub const EMPTY_TRIE_HASH: Hash = Hash([
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
]);

impl Hash {
	/// Build a hash from a 32-byte array.
	pub fn from_bytes(bytes: [u8; 32]) -> Hash {
		Hash(bytes)
	}

	/// Borrow the hash as a byte slice.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl Default for Hash {
	fn default() -> Hash {
		EMPTY_TRIE_HASH
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", util::to_hex(&self.0))
	}
}

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Hash({})", self)
	}
}

impl Writeable for Hash {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_fixed_bytes(&self.0)
	}
}

impl Readable for Hash {
	fn read(reader: &mut dyn Reader) -> Result<Hash, ser::Error> {
		let bytes = reader.read_fixed_bytes(32)?;
		let mut out = [0u8; 32];
		out.copy_from_slice(&bytes);
		Ok(Hash(out))
	}
}

/// A type that can be committed to via the workspace's single hash
/// function by way of its binary serialization.
pub trait Hashed {
	/// Hash of this value's canonical byte serialization.
	fn hash(&self) -> Hash {
		Hash::from_bytes(hash_bytes(&self.bytes()))
	}

	/// Canonical byte serialization used as the hash's preimage.
	fn bytes(&self) -> Vec<u8>;
}

/// Hashes two child hashes together the way interior trie nodes combine
/// the hashes of their children (see `node::Node::recompute_hash`).
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
	let digest = blake2b(32, &[], data);
	let mut out = [0u8; 32];
	out.copy_from_slice(digest.as_bytes());
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_trie_hash_is_distinguished() {
		let mut expected = [0u8; 32];
		expected[31] = 1;
		assert_eq!(EMPTY_TRIE_HASH.as_bytes(), &expected[..]);
	}

	#[test]
	fn display_is_lowercase_hex() {
		let h = Hash::from_bytes([0xab; 32]);
		assert_eq!(format!("{}", h), "ab".repeat(32));
	}
}
