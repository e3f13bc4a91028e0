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

//! The closed set of mutations a block can apply to the trie, as a
//! single tagged enum rather than an inheritance hierarchy: every
//! transaction output consumed or produced against a name maps to
//! exactly one of these four variants.

use crate::outpoint::OutPoint;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// One claim- or support-affecting event carried by a transaction
/// output, scoped to the name it targets.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TrieOp {
	/// A new claim on `name`, staking `amount`.
	ClaimAdd {
		/// Name being claimed.
		name: String,
		/// Identity of the new claim.
		claim_id: OutPoint,
		/// Amount staked.
		amount: u64,
	},
	/// The output backing an existing claim was spent.
	ClaimSpend {
		/// Name the claim was on.
		name: String,
		/// Identity of the spent claim.
		claim_id: OutPoint,
	},
	/// A new support on an existing claim.
	SupportAdd {
		/// Name the supported claim is on.
		name: String,
		/// Identity of the new support.
		support_id: OutPoint,
		/// Claim being supported.
		supported_claim_id: OutPoint,
		/// Amount staked.
		amount: u64,
	},
	/// The output backing an existing support was spent.
	SupportSpend {
		/// Name the support was on.
		name: String,
		/// Identity of the spent support.
		support_id: OutPoint,
	},
}

const TAG_CLAIM_ADD: u8 = 0;
const TAG_CLAIM_SPEND: u8 = 1;
const TAG_SUPPORT_ADD: u8 = 2;
const TAG_SUPPORT_SPEND: u8 = 3;

fn write_name<W: Writer>(name: &str, writer: &mut W) -> Result<(), ser::Error> {
	writer.write_bytes(name.as_bytes())
}

fn read_name(reader: &mut dyn Reader) -> Result<String, ser::Error> {
	let bytes = reader.read_bytes()?;
	String::from_utf8(bytes).map_err(|_| ser::Error::CorruptedData)
}

impl Writeable for TrieOp {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		match self {
			TrieOp::ClaimAdd {
				name,
				claim_id,
				amount,
			} => {
				writer.write_u8(TAG_CLAIM_ADD)?;
				write_name(name, writer)?;
				claim_id.write(writer)?;
				writer.write_u64(*amount)
			}
			TrieOp::ClaimSpend { name, claim_id } => {
				writer.write_u8(TAG_CLAIM_SPEND)?;
				write_name(name, writer)?;
				claim_id.write(writer)
			}
			TrieOp::SupportAdd {
				name,
				support_id,
				supported_claim_id,
				amount,
			} => {
				writer.write_u8(TAG_SUPPORT_ADD)?;
				write_name(name, writer)?;
				support_id.write(writer)?;
				supported_claim_id.write(writer)?;
				writer.write_u64(*amount)
			}
			TrieOp::SupportSpend { name, support_id } => {
				writer.write_u8(TAG_SUPPORT_SPEND)?;
				write_name(name, writer)?;
				support_id.write(writer)
			}
		}
	}
}

impl Readable for TrieOp {
	fn read(reader: &mut dyn Reader) -> Result<TrieOp, ser::Error> {
		let tag = reader.read_u8()?;
		match tag {
			TAG_CLAIM_ADD => Ok(TrieOp::ClaimAdd {
				name: read_name(reader)?,
				claim_id: OutPoint::read(reader)?,
				amount: reader.read_u64()?,
			}),
			TAG_CLAIM_SPEND => Ok(TrieOp::ClaimSpend {
				name: read_name(reader)?,
				claim_id: OutPoint::read(reader)?,
			}),
			TAG_SUPPORT_ADD => Ok(TrieOp::SupportAdd {
				name: read_name(reader)?,
				support_id: OutPoint::read(reader)?,
				supported_claim_id: OutPoint::read(reader)?,
				amount: reader.read_u64()?,
			}),
			TAG_SUPPORT_SPEND => Ok(TrieOp::SupportSpend {
				name: read_name(reader)?,
				support_id: OutPoint::read(reader)?,
			}),
			_ => Err(ser::Error::CorruptedData),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hash::Hash;
	use crate::ser::{deserialize_from_slice, ser_vec};

	fn op(byte: u8) -> OutPoint {
		OutPoint::new(Hash::from_bytes([byte; 32]), 0)
	}

	#[test]
	fn round_trips_every_variant() {
		let ops = vec![
			TrieOp::ClaimAdd {
				name: "atest".to_string(),
				claim_id: op(1),
				amount: 10,
			},
			TrieOp::ClaimSpend {
				name: "atest".to_string(),
				claim_id: op(1),
			},
			TrieOp::SupportAdd {
				name: "atest".to_string(),
				support_id: op(2),
				supported_claim_id: op(1),
				amount: 5,
			},
			TrieOp::SupportSpend {
				name: "atest".to_string(),
				support_id: op(2),
			},
		];
		for o in ops {
			let bytes = ser_vec(&o).unwrap();
			let back: TrieOp = deserialize_from_slice(&bytes).unwrap();
			assert_eq!(o, back);
		}
	}

	#[test]
	fn unknown_tag_is_corrupted_data() {
		let bytes = vec![0xffu8];
		let res: Result<TrieOp, ser::Error> = deserialize_from_slice(&bytes);
		assert_eq!(res.unwrap_err(), ser::Error::CorruptedData);
	}
}
