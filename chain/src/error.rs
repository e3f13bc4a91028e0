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

//! Error type for the cache overlay and block application. Every variant
//! is fatal: the core never retries (see §7 of the design document this
//! crate implements). A query that finds nothing returns `None`, never
//! an `Err`; only the mutating cache operations and `check_consistency`
//! return `Result`.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

use claimtrie_core::ser;
use claimtrie_store::ErrorKind as StoreErrorKind;

/// Wraps an `ErrorKind` with a backtrace, in the same shape as
/// `claimtrie_store::Error`.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Reasons applying or undoing a block can fail. None of these are
/// meant to be retried; a caller seeing one should treat the node's
/// claim-trie state as unreliable and halt.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// `add_claim` named a claim id that is already active or queued.
	#[fail(display = "duplicate claim id {} at name {:?}", _1, _0)]
	DuplicateClaim(Vec<u8>, String),
	/// `add_support` named a support id that is already active or queued.
	#[fail(display = "duplicate support id {} at name {:?}", _1, _0)]
	DuplicateSupport(Vec<u8>, String),
	/// A spend, undo, or queue-drain step referenced an id the cache has
	/// no record of: I4 (every active claim has exactly one expiration
	/// entry; every queued entry references an object not yet present)
	/// has been violated.
	#[fail(display = "queue invariant violated: {}", _0)]
	QueueInvariant(String),
	/// A serialized undo log could not be read back, or did not apply
	/// cleanly to the trie state it targeted.
	#[fail(display = "inapplicable undo: {}", _0)]
	InapplicableUndo(String),
	/// Propagated from the persisted trie or its queues.
	#[fail(display = "store error: {}", _0)]
	Store(StoreErrorKind),
	/// Propagated from (de)serializing an undo log.
	#[fail(display = "serialization error: {:?}", _0)]
	Ser(ser::Error),
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	/// The underlying kind of this error.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}

	/// The error's cause, if any.
	pub fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	/// The backtrace captured when this error was created, if any.
	pub fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}

impl From<claimtrie_store::Error> for Error {
	fn from(e: claimtrie_store::Error) -> Error {
		ErrorKind::Store(e.kind()).into()
	}
}

impl From<ser::Error> for Error {
	fn from(e: ser::Error) -> Error {
		ErrorKind::Ser(e).into()
	}
}
