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

//! Serialization and deserialization layer specialized for binary
//! encoding. Ensures consistency and safety across the consensus-critical
//! types. To use it, implement `Writeable`/`Readable` and then use
//! `serialize`/`deserialize` (or `ser_vec`) as appropriate.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use failure::Fail;

/// Largest single length-prefixed read we will honor; guards against a
/// corrupted or hostile length prefix causing an unbounded allocation.
const MAX_READ_LEN: u64 = 1_000_000;

/// Possible errors deriving from serializing or deserializing.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum Error {
	/// Wraps an io error produced when reading or writing.
	#[fail(display = "IO error: {}", _0)]
	IOErr(String),
	/// Expected a given value that wasn't found.
	#[fail(display = "unexpected data")]
	UnexpectedData,
	/// Data wasn't in a consumable format: a claim vector was not in
	/// canonical order, a tag byte was out of range, etc.
	#[fail(display = "corrupted data")]
	CorruptedData,
	/// A length prefix asked for more data than we are willing to read.
	#[fail(display = "read of {} bytes exceeds the maximum allowed", _0)]
	TooLargeReadErr(u64),
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::IOErr(e.to_string())
	}
}

/// Writes numbers and byte sequences in the canonical big-endian, explicit
/// width encoding used by every on-the-wire and on-disk claimtrie type.
pub trait Writer {
	/// Writes a u8.
	fn write_u8(&mut self, n: u8) -> Result<(), Error>;
	/// Writes a u32, big-endian.
	fn write_u32(&mut self, n: u32) -> Result<(), Error>;
	/// Writes a u64, big-endian.
	fn write_u64(&mut self, n: u64) -> Result<(), Error>;
	/// Writes a length-prefixed byte vector.
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
	/// Writes a fixed number of bytes, with no length prefix; the reader
	/// is expected to already know the length.
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// Reads numbers and byte sequences written by a `Writer`.
pub trait Reader {
	/// Reads a u8.
	fn read_u8(&mut self) -> Result<u8, Error>;
	/// Reads a u32, big-endian.
	fn read_u32(&mut self) -> Result<u32, Error>;
	/// Reads a u64, big-endian.
	fn read_u64(&mut self) -> Result<u64, Error>;
	/// Reads a length-prefixed byte vector.
	fn read_bytes(&mut self) -> Result<Vec<u8>, Error>;
	/// Reads a fixed number of bytes.
	fn read_fixed_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error>;
	/// Reads a byte and errors unless it matches `expected`.
	fn expect_u8(&mut self, expected: u8) -> Result<u8, Error>;
}

/// Implemented by every type with a canonical binary encoding.
pub trait Writeable {
	/// Write `self` to the given writer.
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error>
	where
		Self: Sized;
}

/// Implemented by every type that can be reconstructed from its canonical
/// binary encoding.
pub trait Readable: Sized {
	/// Read an instance of `Self` from the given reader.
	fn read(reader: &mut dyn Reader) -> Result<Self, Error>;
}

/// Deserializes a `Readable` from any `std::io::Read` implementation.
pub fn deserialize<T: Readable>(source: &mut dyn Read) -> Result<T, Error> {
	let mut reader = BinReader { source };
	T::read(&mut reader)
}

/// Serializes a `Writeable` into any `std::io::Write` implementation.
pub fn serialize<W: Writeable>(sink: &mut dyn Write, thing: &W) -> Result<(), Error> {
	let mut writer = BinWriter { sink };
	thing.write(&mut writer)
}

/// Serializes a `Writeable` directly into a `Vec<u8>`.
pub fn ser_vec<W: Writeable>(thing: &W) -> Result<Vec<u8>, Error> {
	let mut vec = Vec::new();
	serialize(&mut vec, thing)?;
	Ok(vec)
}

/// Deserializes a `Readable` directly from a byte slice.
pub fn deserialize_from_slice<T: Readable>(bytes: &[u8]) -> Result<T, Error> {
	let mut source = bytes;
	deserialize(&mut source)
}

struct BinReader<'a> {
	source: &'a mut dyn Read,
}

impl<'a> Reader for BinReader<'a> {
	fn read_u8(&mut self) -> Result<u8, Error> {
		Ok(self.source.read_u8()?)
	}
	fn read_u32(&mut self) -> Result<u32, Error> {
		Ok(self.source.read_u32::<BigEndian>()?)
	}
	fn read_u64(&mut self) -> Result<u64, Error> {
		Ok(self.source.read_u64::<BigEndian>()?)
	}
	fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
		let len = self.read_u64()?;
		self.read_fixed_bytes(len as usize)
	}
	fn read_fixed_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
		if len as u64 > MAX_READ_LEN {
			return Err(Error::TooLargeReadErr(len as u64));
		}
		let mut buf = vec![0u8; len];
		self.source.read_exact(&mut buf)?;
		Ok(buf)
	}
	fn expect_u8(&mut self, expected: u8) -> Result<u8, Error> {
		let b = self.read_u8()?;
		if b == expected {
			Ok(b)
		} else {
			Err(Error::UnexpectedData)
		}
	}
}

struct BinWriter<'a> {
	sink: &'a mut dyn Write,
}

impl<'a> Writer for BinWriter<'a> {
	fn write_u8(&mut self, n: u8) -> Result<(), Error> {
		Ok(self.sink.write_u8(n)?)
	}
	fn write_u32(&mut self, n: u32) -> Result<(), Error> {
		Ok(self.sink.write_u32::<BigEndian>(n)?)
	}
	fn write_u64(&mut self, n: u64) -> Result<(), Error> {
		Ok(self.sink.write_u64::<BigEndian>(n)?)
	}
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.write_u64(bytes.len() as u64)?;
		Ok(self.sink.write_all(bytes)?)
	}
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		Ok(self.sink.write_all(bytes)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Pair(u32, u64);

	impl Writeable for Pair {
		fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error> {
			writer.write_u32(self.0)?;
			writer.write_u64(self.1)
		}
	}

	impl Readable for Pair {
		fn read(reader: &mut dyn Reader) -> Result<Pair, Error> {
			Ok(Pair(reader.read_u32()?, reader.read_u64()?))
		}
	}

	#[test]
	fn round_trip_numbers() {
		let p = Pair(42, 1 << 40);
		let bytes = ser_vec(&p).unwrap();
		let back: Pair = deserialize_from_slice(&bytes).unwrap();
		assert_eq!(back.0, 42);
		assert_eq!(back.1, 1 << 40);
	}

	#[test]
	fn oversized_length_prefix_is_rejected() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&(MAX_READ_LEN + 1).to_be_bytes());
		let res: Result<Vec<u8>, Error> = deserialize(&mut BinReaderBytesHelper(&bytes).0.as_slice());
		assert!(res.is_err());
	}

	// helper to avoid importing Readable for Vec<u8> just for this test
	struct BinReaderBytesHelper<'a>(&'a Vec<u8>);

	impl Readable for Vec<u8> {
		fn read(reader: &mut dyn Reader) -> Result<Vec<u8>, Error> {
			reader.read_bytes()
		}
	}
}
