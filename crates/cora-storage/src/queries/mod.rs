// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity family.

pub mod domain;
pub mod messages;
pub mod sessions;

pub use domain::*;
pub use messages::*;
pub use sessions::*;
