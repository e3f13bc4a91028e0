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

//! Core types shared across the claimtrie workspace: the binary
//! serialization layer, the hash primitive, the claim/support value
//! objects and their total order, the closed set of trie operations, and
//! the explicit chain-parameter configuration that replaces any
//! process-wide singleton.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

extern crate blake2_rfc as blake2;
extern crate byteorder;
extern crate serde;
#[macro_use]
extern crate serde_derive;

extern crate claimtrie_util as util;

pub mod claim;
pub mod hash;
pub mod node;
pub mod ops;
pub mod outpoint;
pub mod params;
pub mod ser;
pub mod support;

pub use crate::claim::Claim;
pub use crate::hash::{Hash, Hashed};
pub use crate::node::Node;
pub use crate::ops::TrieOp;
pub use crate::outpoint::OutPoint;
pub use crate::params::ClaimTrieParams;
pub use crate::support::Support;
