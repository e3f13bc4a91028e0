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

//! The persisted trie and its delayed-activation/expiration queues.
//! Checkpointable and in-process: no on-disk format is prescribed here,
//! only the shape a future on-disk backend would need to fill in.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

extern crate claimtrie_core;

pub mod error;
pub mod pending;
pub mod queue;
pub mod trie;

pub use crate::error::{Error, ErrorKind};
pub use crate::pending::{PendingClaim, PendingStore, PendingSupport};
pub use crate::queue::{ActivationQueue, ExpirationQueue, QueueEntry};
pub use crate::trie::{NameInfo, PersistentTrie};
