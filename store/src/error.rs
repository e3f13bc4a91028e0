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

//! Error types for the persisted trie and its queues. Every variant here
//! is fatal: a query that finds nothing returns `None`, never an `Err`.

use std::fmt::{self, Display};

use failure::{Backtrace, Context, Fail};

/// Store error wrapper, carrying a backtrace alongside the `ErrorKind`.
#[derive(Debug, Fail)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Reasons a store operation can fail. This indicates a
/// consensus-breaking condition; it is never meant to be retried.
///
/// Duplicate-insert, queue-invariant and inapplicable-undo conditions are
/// all detected and reported one layer up, by `chain::ErrorKind`, since
/// this crate exposes no mutating API of its own beyond what a `Cache`
/// flush writes directly into `root_mut()`/the queues — it never
/// constructs those failures itself, so no variant for them lives here.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// `check_consistency` found a node whose cached hash does not match
	/// a from-scratch recomputation.
	#[fail(display = "hash mismatch at name {:?}", _0)]
	HashMismatch(String),
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
