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

//! A third-party endorsement of a claim.

use crate::outpoint::OutPoint;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// Stakes an amount behind an existing claim without competing for
/// control in its own right. A support is re-linked to its target purely
/// by `supported_claim_id` lookup at read time: it carries no pointer
/// into the node's claim list, so a claim removed and later restored by
/// undo automatically regains every support that still names it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Support {
	/// Identity of this support: the outpoint of the transaction output
	/// that staked it.
	pub support_id: OutPoint,
	/// Identity of the claim this support boosts.
	pub supported_claim_id: OutPoint,
	/// Amount staked by this support.
	pub amount: u64,
	/// Height at which the support transaction was mined.
	pub height_claimed: u32,
	/// Height at which the support starts contributing.
	pub height_valid: u32,
}

impl Support {
	/// Build a new support, born at `height` with no activation delay
	/// applied yet.
	pub fn new(
		support_id: OutPoint,
		supported_claim_id: OutPoint,
		amount: u64,
		height_claimed: u32,
	) -> Support {
		Support {
			support_id,
			supported_claim_id,
			amount,
			height_claimed,
			height_valid: height_claimed,
		}
	}

	/// Whether this support contributes to its target's
	/// `effective_amount` at `at_height`: only once activated.
	pub fn is_active(&self, at_height: u32) -> bool {
		at_height >= self.height_valid
	}
}

impl Writeable for Support {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.support_id.write(writer)?;
		self.supported_claim_id.write(writer)?;
		writer.write_u64(self.amount)?;
		writer.write_u32(self.height_claimed)?;
		writer.write_u32(self.height_valid)
	}
}

impl Readable for Support {
	fn read(reader: &mut dyn Reader) -> Result<Support, ser::Error> {
		let support_id = OutPoint::read(reader)?;
		let supported_claim_id = OutPoint::read(reader)?;
		let amount = reader.read_u64()?;
		let height_claimed = reader.read_u32()?;
		let height_valid = reader.read_u32()?;
		Ok(Support {
			support_id,
			supported_claim_id,
			amount,
			height_claimed,
			height_valid,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hash::Hash;
	use crate::ser::{deserialize_from_slice, ser_vec};

	fn op(byte: u8, index: u32) -> OutPoint {
		OutPoint::new(Hash::from_bytes([byte; 32]), index)
	}

	#[test]
	fn round_trips() {
		let s = Support::new(op(1, 0), op(2, 0), 50, 5);
		let bytes = ser_vec(&s).unwrap();
		let back: Support = deserialize_from_slice(&bytes).unwrap();
		assert_eq!(s, back);
	}

	#[test]
	fn inactive_before_height_valid() {
		let mut s = Support::new(op(1, 0), op(2, 0), 50, 5);
		s.height_valid = 10;
		assert!(!s.is_active(9));
		assert!(s.is_active(10));
	}
}
