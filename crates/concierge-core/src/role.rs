// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roles, capability sets, and the acting identity.
//!
//! Roles are never compared directly by operations. Each operation asks the
//! actor's [`RoleSet`] whether it grants a [`Capability`].

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::policy::RowScope;

/// A role held by a user, as stored in `user_roles.role`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Concierge,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Player, Role::Concierge, Role::Admin];

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    fn bit(self) -> u8 {
        match self {
            Role::Player => 0b001,
            Role::Concierge => 0b010,
            Role::Admin => 0b100,
        }
    }
}

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    CreateRequest,
    ViewAllRequests,
    TransitionStatus,
    EditInternalNotes,
    ViewInternalNotes,
    AssignConcierge,
    SendAsPlayer,
    SendAsConcierge,
    ManageRoles,
}

impl Capability {
    /// Whether holding `role` grants this capability.
    pub fn granted_by(self, role: Role) -> bool {
        use Capability::*;
        match role {
            Role::Player => matches!(self, CreateRequest | SendAsPlayer),
            Role::Concierge => matches!(
                self,
                ViewAllRequests
                    | TransitionStatus
                    | EditInternalNotes
                    | ViewInternalNotes
                    | AssignConcierge
                    | SendAsConcierge
            ),
            Role::Admin => !matches!(self, CreateRequest | SendAsPlayer),
        }
    }
}

/// A small set of roles.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn empty() -> Self {
        RoleSet(0)
    }

    pub fn of(roles: &[Role]) -> Self {
        roles.iter().copied().collect()
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn remove(&mut self, role: Role) {
        self.0 &= !role.bit();
    }

    pub fn with(mut self, role: Role) -> Self {
        self.insert(role);
        self
    }

    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    /// True when any held role grants `capability`.
    pub fn allows(self, capability: Capability) -> bool {
        self.iter().any(|role| capability.granted_by(role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for RoleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(roles.into_iter().collect())
    }
}

/// The authenticated identity performing an operation.
///
/// Supplied by the identity provider; the core never creates or verifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub roles: RoleSet,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
        }
    }

    pub fn player(user_id: impl Into<String>) -> Self {
        Self::new(user_id, RoleSet::of(&[Role::Player]))
    }

    pub fn concierge(user_id: impl Into<String>) -> Self {
        Self::new(user_id, RoleSet::of(&[Role::Concierge]))
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, RoleSet::of(&[Role::Admin]))
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.roles.allows(capability)
    }

    /// Rows of `requests` this actor may read.
    pub fn scope(&self) -> RowScope {
        if self.allows(Capability::ViewAllRequests) {
            RowScope::All
        } else {
            RowScope::OwnedBy(self.user_id.clone())
        }
    }
}
