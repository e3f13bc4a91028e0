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

//! A bid on a name.

use crate::hash::Hashed;
use crate::outpoint::OutPoint;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// A single bid on a name. Identity is `claim_id` alone: two claims with
/// the same id can never coexist at the same node (see `Node::insert_claim`).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Claim {
	/// Identity of this claim: the outpoint of the transaction output
	/// that staked it.
	pub claim_id: OutPoint,
	/// Amount staked by this claim alone, not counting supports.
	pub amount: u64,
	/// Height at which the claim transaction was mined.
	pub height_claimed: u32,
	/// Height at which the claim becomes eligible to control the name.
	pub height_valid: u32,
}

impl Claim {
	/// Build a new claim, born at `height` with no activation delay
	/// applied yet; callers compute and overwrite `height_valid` once the
	/// delay (see `params::activation_delay`) is known.
	pub fn new(claim_id: OutPoint, amount: u64, height_claimed: u32) -> Claim {
		Claim {
			claim_id,
			amount,
			height_claimed,
			height_valid: height_claimed,
		}
	}

	/// `amount` plus the sum of every currently-active support that
	/// targets this claim. Never stored: recomputed from the node's
	/// support list at read time because the consensus hash does not
	/// commit to it (see `commitment_bytes`).
	pub fn effective_amount(&self, supports: &[crate::support::Support], at_height: u32) -> u64 {
		self.amount
			+ supports
				.iter()
				.filter(|s| s.supported_claim_id == self.claim_id && s.is_active(at_height))
				.map(|s| s.amount)
				.sum::<u64>()
	}

	/// Bytes committed to by `hash_of_claims`: `claim_id` and
	/// `height_valid` only. `amount` (and so `effective_amount`) is
	/// deliberately excluded — supports can move in and out of activity
	/// without touching the claim's own commitment.
	pub fn commitment_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(36 + 4);
		bytes.extend_from_slice(self.claim_id.txid.as_bytes());
		bytes.extend_from_slice(&self.claim_id.index.to_be_bytes());
		bytes.extend_from_slice(&self.height_valid.to_be_bytes());
		bytes
	}
}

impl Hashed for Claim {
	fn bytes(&self) -> Vec<u8> {
		self.commitment_bytes()
	}
}

impl Writeable for Claim {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.claim_id.write(writer)?;
		writer.write_u64(self.amount)?;
		writer.write_u32(self.height_claimed)?;
		writer.write_u32(self.height_valid)
	}
}

impl Readable for Claim {
	fn read(reader: &mut dyn Reader) -> Result<Claim, ser::Error> {
		let claim_id = OutPoint::read(reader)?;
		let amount = reader.read_u64()?;
		let height_claimed = reader.read_u32()?;
		let height_valid = reader.read_u32()?;
		Ok(Claim {
			claim_id,
			amount,
			height_claimed,
			height_valid,
		})
	}
}

/// Total order over claims at a node (I2): descending `effective_amount`,
/// ties broken by ascending `height_valid`, further ties by lexicographic
/// `claim_id`. The first element under this order is the controlling claim.
pub fn cmp_claims(
	a: &Claim,
	b: &Claim,
	supports: &[crate::support::Support],
	at_height: u32,
) -> std::cmp::Ordering {
	let ea = a.effective_amount(supports, at_height);
	let eb = b.effective_amount(supports, at_height);
	eb.cmp(&ea)
		.then_with(|| a.height_valid.cmp(&b.height_valid))
		.then_with(|| a.claim_id.cmp(&b.claim_id))
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
		let c = Claim {
			claim_id: op(1, 0),
			amount: 500,
			height_claimed: 10,
			height_valid: 42,
		};
		let bytes = ser_vec(&c).unwrap();
		let back: Claim = deserialize_from_slice(&bytes).unwrap();
		assert_eq!(c, back);
	}

	#[test]
	fn commitment_excludes_amount() {
		let mut c = Claim::new(op(1, 0), 500, 10);
		c.height_valid = 20;
		let d = Claim {
			amount: 999,
			..c.clone()
		};
		assert_eq!(c.commitment_bytes(), d.commitment_bytes());
	}

	#[test]
	fn ordering_breaks_ties_by_height_then_claim_id() {
		let a = Claim::new(op(1, 0), 100, 0);
		let b = Claim::new(op(2, 0), 100, 0);
		assert_eq!(cmp_claims(&a, &b, &[], 0), std::cmp::Ordering::Less);
	}

	#[test]
	fn serde_json_round_trips() {
		let c = Claim::new(op(1, 0), 500, 10);
		let json = serde_json::to_string(&c).unwrap();
		let back: Claim = serde_json::from_str(&json).unwrap();
		assert_eq!(c, back);
	}
}
