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

//! Identity of a claim or support: the transaction output that created it.

use std::cmp::Ordering;
use std::fmt;

use crate::hash::Hash;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// A transaction output identity: the txid that created it and the index
/// of the output within that transaction's output list. Claims and
/// supports are identified by the outpoint of the output that staked
/// them, so this is also what the spec calls a `claim_id`/`support_id`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
	/// Id of the transaction that created the output.
	pub txid: Hash,
	/// Index of the output within that transaction.
	pub index: u32,
}

impl OutPoint {
	/// Build an outpoint from its parts.
	pub fn new(txid: Hash, index: u32) -> OutPoint {
		OutPoint { txid, index }
	}
}

impl fmt::Display for OutPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.txid, self.index)
	}
}

impl fmt::Debug for OutPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "OutPoint({})", self)
	}
}

// Lexicographic by txid, then by index; this is the tie-break order I2
// falls back to when amount and height_valid are equal, and the order
// `hash_of_claims` requires claims and supports to be stored in.
impl Ord for OutPoint {
	fn cmp(&self, other: &OutPoint) -> Ordering {
		self.txid
			.cmp(&other.txid)
			.then_with(|| self.index.cmp(&other.index))
	}
}

impl PartialOrd for OutPoint {
	fn partial_cmp(&self, other: &OutPoint) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Writeable for OutPoint {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.txid.write(writer)?;
		writer.write_u32(self.index)
	}
}

impl Readable for OutPoint {
	fn read(reader: &mut dyn Reader) -> Result<OutPoint, ser::Error> {
		let txid = Hash::read(reader)?;
		let index = reader.read_u32()?;
		Ok(OutPoint { txid, index })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ser::{deserialize_from_slice, ser_vec};

	fn h(byte: u8) -> Hash {
		Hash::from_bytes([byte; 32])
	}

	#[test]
	fn orders_by_txid_then_index() {
		let a = OutPoint::new(h(1), 5);
		let b = OutPoint::new(h(1), 6);
		let c = OutPoint::new(h(2), 0);
		assert!(a < b);
		assert!(b < c);
	}

	#[test]
	fn round_trips() {
		let o = OutPoint::new(h(9), 3);
		let bytes = ser_vec(&o).unwrap();
		let back: OutPoint = deserialize_from_slice(&bytes).unwrap();
		assert_eq!(o, back);
	}
}
