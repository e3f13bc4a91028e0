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

//! The per-block undo log: an ordered record of every mutation a
//! `Cache` applied, sufficient to reverse a flushed block during
//! reorganisation. Recorded in the order operations were applied;
//! reversing a block means replaying this vector back to front, with
//! each variant dispatching to the matching `Cache::undo_*` method (see
//! `apply::disconnect_block`).

use claimtrie_core::ser::{self, Readable, Reader, Writeable, Writer};
use claimtrie_core::{Claim, OutPoint, Support};

/// One entry in a block's undo log.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UndoOp {
	/// Reverses an `add_claim`: remove `claim_id` again, from wherever
	/// it currently sits (queue or trie).
	AddClaim { name: Vec<u8>, claim_id: OutPoint },
	/// Reverses a `spend_claim`: reinsert `claim` exactly as it was.
	SpendClaim { name: Vec<u8>, claim: Claim },
	/// Reverses an `add_support`.
	AddSupport { name: Vec<u8>, support_id: OutPoint },
	/// Reverses a `spend_support`.
	SpendSupport { name: Vec<u8>, support: Support },
	/// Reverses the queue drain performed by `increment_block(height)`:
	/// every claim and support that activated, and every claim that
	/// expired, at that height.
	QueueDrain {
		height: u32,
		activated_claims: Vec<(Vec<u8>, Claim)>,
		activated_supports: Vec<(Vec<u8>, Support)>,
		expired_claims: Vec<(Vec<u8>, Claim)>,
	},
}

const TAG_ADD_CLAIM: u8 = 0;
const TAG_SPEND_CLAIM: u8 = 1;
const TAG_ADD_SUPPORT: u8 = 2;
const TAG_SPEND_SUPPORT: u8 = 3;
const TAG_QUEUE_DRAIN: u8 = 4;

fn write_name<W: Writer>(name: &[u8], writer: &mut W) -> Result<(), ser::Error> {
	writer.write_bytes(name)
}

fn read_name(reader: &mut dyn Reader) -> Result<Vec<u8>, ser::Error> {
	reader.read_bytes()
}

fn write_named_claims<W: Writer>(items: &[(Vec<u8>, Claim)], writer: &mut W) -> Result<(), ser::Error> {
	writer.write_u64(items.len() as u64)?;
	for (name, claim) in items {
		write_name(name, writer)?;
		claim.write(writer)?;
	}
	Ok(())
}

fn read_named_claims(reader: &mut dyn Reader) -> Result<Vec<(Vec<u8>, Claim)>, ser::Error> {
	let len = reader.read_u64()?;
	let mut out = Vec::with_capacity(len as usize);
	for _ in 0..len {
		out.push((read_name(reader)?, Claim::read(reader)?));
	}
	Ok(out)
}

fn write_named_supports<W: Writer>(
	items: &[(Vec<u8>, Support)],
	writer: &mut W,
) -> Result<(), ser::Error> {
	writer.write_u64(items.len() as u64)?;
	for (name, support) in items {
		write_name(name, writer)?;
		support.write(writer)?;
	}
	Ok(())
}

fn read_named_supports(reader: &mut dyn Reader) -> Result<Vec<(Vec<u8>, Support)>, ser::Error> {
	let len = reader.read_u64()?;
	let mut out = Vec::with_capacity(len as usize);
	for _ in 0..len {
		out.push((read_name(reader)?, Support::read(reader)?));
	}
	Ok(out)
}

impl Writeable for UndoOp {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		match self {
			UndoOp::AddClaim { name, claim_id } => {
				writer.write_u8(TAG_ADD_CLAIM)?;
				write_name(name, writer)?;
				claim_id.write(writer)
			}
			UndoOp::SpendClaim { name, claim } => {
				writer.write_u8(TAG_SPEND_CLAIM)?;
				write_name(name, writer)?;
				claim.write(writer)
			}
			UndoOp::AddSupport { name, support_id } => {
				writer.write_u8(TAG_ADD_SUPPORT)?;
				write_name(name, writer)?;
				support_id.write(writer)
			}
			UndoOp::SpendSupport { name, support } => {
				writer.write_u8(TAG_SPEND_SUPPORT)?;
				write_name(name, writer)?;
				support.write(writer)
			}
			UndoOp::QueueDrain {
				height,
				activated_claims,
				activated_supports,
				expired_claims,
			} => {
				writer.write_u8(TAG_QUEUE_DRAIN)?;
				writer.write_u32(*height)?;
				write_named_claims(activated_claims, writer)?;
				write_named_supports(activated_supports, writer)?;
				write_named_claims(expired_claims, writer)
			}
		}
	}
}

impl Readable for UndoOp {
	fn read(reader: &mut dyn Reader) -> Result<UndoOp, ser::Error> {
		let tag = reader.read_u8()?;
		match tag {
			TAG_ADD_CLAIM => Ok(UndoOp::AddClaim {
				name: read_name(reader)?,
				claim_id: OutPoint::read(reader)?,
			}),
			TAG_SPEND_CLAIM => Ok(UndoOp::SpendClaim {
				name: read_name(reader)?,
				claim: Claim::read(reader)?,
			}),
			TAG_ADD_SUPPORT => Ok(UndoOp::AddSupport {
				name: read_name(reader)?,
				support_id: OutPoint::read(reader)?,
			}),
			TAG_SPEND_SUPPORT => Ok(UndoOp::SpendSupport {
				name: read_name(reader)?,
				support: Support::read(reader)?,
			}),
			TAG_QUEUE_DRAIN => Ok(UndoOp::QueueDrain {
				height: reader.read_u32()?,
				activated_claims: read_named_claims(reader)?,
				activated_supports: read_named_supports(reader)?,
				expired_claims: read_named_claims(reader)?,
			}),
			_ => Err(ser::Error::CorruptedData),
		}
	}
}

/// A whole block's undo log, as persisted and handed back to
/// `apply::disconnect_block`.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct UndoLog(pub Vec<UndoOp>);

impl Writeable for UndoLog {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u64(self.0.len() as u64)?;
		for op in &self.0 {
			op.write(writer)?;
		}
		Ok(())
	}
}

impl Readable for UndoLog {
	fn read(reader: &mut dyn Reader) -> Result<UndoLog, ser::Error> {
		let len = reader.read_u64()?;
		let mut ops = Vec::with_capacity(len as usize);
		for _ in 0..len {
			ops.push(UndoOp::read(reader)?);
		}
		Ok(UndoLog(ops))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use claimtrie_core::ser::{deserialize_from_slice, ser_vec};
	use claimtrie_core::Hash;

	fn op(byte: u8) -> OutPoint {
		OutPoint::new(Hash::from_bytes([byte; 32]), 0)
	}

	#[test]
	fn undo_log_round_trips_every_variant() {
		let log = UndoLog(vec![
			UndoOp::AddClaim {
				name: b"atest".to_vec(),
				claim_id: op(1),
			},
			UndoOp::SpendClaim {
				name: b"atest".to_vec(),
				claim: Claim::new(op(1), 10, 0),
			},
			UndoOp::AddSupport {
				name: b"atest".to_vec(),
				support_id: op(2),
			},
			UndoOp::SpendSupport {
				name: b"atest".to_vec(),
				support: Support::new(op(2), op(1), 5, 0),
			},
			UndoOp::QueueDrain {
				height: 100,
				activated_claims: vec![(b"atest".to_vec(), Claim::new(op(1), 10, 0))],
				activated_supports: vec![(b"atest".to_vec(), Support::new(op(2), op(1), 5, 0))],
				expired_claims: vec![],
			},
		]);
		let bytes = ser_vec(&log).unwrap();
		let back: UndoLog = deserialize_from_slice(&bytes).unwrap();
		assert_eq!(log, back);
	}
}
