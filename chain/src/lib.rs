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

//! The cache overlay (C5) and block application/undo (C6): the two
//! mechanisms that turn a `PersistentTrie` plus a stream of blocks into
//! a validator-usable claim trie. A block is applied through
//! `apply::apply_block`, which drives a `Cache` built over the
//! persisted trie and returns a serialized undo log; `apply::disconnect_block`
//! reverses it during a reorganisation.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

extern crate claimtrie_core;
extern crate claimtrie_store;

pub mod apply;
pub mod cache;
pub mod error;
pub mod undo;

pub use crate::apply::{apply_block, disconnect_block};
pub use crate::cache::{extending, extending_readonly, Cache};
pub use crate::error::{Error, ErrorKind};
pub use crate::undo::{UndoLog, UndoOp};
