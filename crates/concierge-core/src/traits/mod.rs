// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the desk and its backends.
//!
//! Store traits use `#[async_trait]` so the desk can hold them as
//! `Arc<dyn Trait>`.

pub mod adapter;
pub mod catalog;
pub mod feed;
pub mod roles;
pub mod store;

pub use adapter::Backend;
pub use catalog::Catalog;
pub use feed::{ChangeFeed, MessageStream};
pub use roles::RoleDirectory;
pub use store::{MessageStore, RequestStore};
