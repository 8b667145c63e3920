//! Device identity and role assignment
//!
//! Devices report themselves with an opaque identifier chosen by the
//! platform. Roll call turns those identifiers into stable, 1-based roles
//! ("button 1", "button 2", ...) kept in a [`Roster`]. The roster is the only
//! place roles are assigned, so the role/identifier pairing and the number of
//! enrolled devices can never drift apart.

use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Opaque platform-assigned identifier of a physical device
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct DeviceId(String);

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl DeviceId {
    /// Returns the identifier as reported by the platform
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stable 1-based position of a device within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Role(usize);

/// A role number outside the roles a game hands out
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("role {0} is outside of 1..={max}", max = constants::roll_call::MAX_DEVICES)]
pub struct RoleOutOfRange(pub usize);

impl TryFrom<usize> for Role {
    type Error = RoleOutOfRange;

    fn try_from(number: usize) -> Result<Self, Self::Error> {
        Role::new(number).ok_or(RoleOutOfRange(number))
    }
}

impl From<Role> for usize {
    fn from(role: Role) -> Self {
        role.0
    }
}

impl Role {
    /// Button 1
    pub const FIRST: Role = Role(1);
    /// Button 2
    pub const SECOND: Role = Role(2);
    /// Button 3
    pub const THIRD: Role = Role(3);
    /// Button 4
    pub const FOURTH: Role = Role(4);

    /// Creates a role from its 1-based number
    ///
    /// Returns `None` for zero or for numbers beyond the most devices a
    /// game supports.
    pub fn new(number: usize) -> Option<Self> {
        (1..=constants::roll_call::MAX_DEVICES)
            .contains(&number)
            .then_some(Self(number))
    }

    /// The 1-based number of this role, as spoken to players
    pub fn number(self) -> usize {
        self.0
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Reasons a device cannot take a role
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrollError {
    /// The role is not the next one to hand out
    #[error("role {requested} requested while role {expected} is next")]
    OutOfOrder {
        /// Role the check-in asked for
        requested: Role,
        /// Role that would be assigned next
        expected: usize,
    },
    /// The device already holds a role
    #[error("device {device} already holds role {role}")]
    AlreadyEnrolled {
        /// The device in question
        device: DeviceId,
        /// Its existing role
        role: Role,
    },
}

/// Serialization helper for Roster struct
#[derive(Deserialize)]
struct RosterSerde {
    devices: Vec<DeviceId>,
}

/// Ordered mapping from role to device for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RosterSerde")]
pub struct Roster {
    /// Devices in role order; index 0 holds role 1
    devices: Vec<DeviceId>,

    /// Reverse lookup rebuilt on deserialization
    #[serde(skip_serializing)]
    roles: HashMap<DeviceId, Role>,
}

impl From<RosterSerde> for Roster {
    fn from(serde: RosterSerde) -> Self {
        let mut roster = Roster::default();
        for device in serde.devices {
            if let Some(role) = roster.next_role() {
                // duplicates in stored attributes are dropped
                let _ = roster.enroll(role, device);
            }
        }
        roster
    }
}

impl Roster {
    /// Number of devices enrolled so far
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device has been enrolled
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// The role the next enrolled device would receive
    pub fn next_role(&self) -> Option<Role> {
        Role::new(self.len() + 1)
    }

    /// Assigns `role` to `device`
    ///
    /// This is the only way a roster grows. The role must be exactly the next
    /// one to hand out and the device must not already hold a role.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::OutOfOrder`] when `role` is not the next role
    /// and [`EnrollError::AlreadyEnrolled`] when the device is on the roster.
    pub fn enroll(&mut self, role: Role, device: DeviceId) -> Result<Role, EnrollError> {
        if role.number() != self.len() + 1 {
            return Err(EnrollError::OutOfOrder {
                requested: role,
                expected: self.len() + 1,
            });
        }
        if let Some(existing) = self.roles.get(&device) {
            return Err(EnrollError::AlreadyEnrolled {
                device,
                role: *existing,
            });
        }
        self.roles.insert(device.clone(), role);
        self.devices.push(device);
        Ok(role)
    }

    /// Removes every device
    pub fn clear(&mut self) {
        self.devices.clear();
        self.roles.clear();
    }

    /// Role held by `device`, if it was enrolled
    pub fn role_of(&self, device: &DeviceId) -> Option<Role> {
        self.roles.get(device).copied()
    }

    /// Device holding `role`
    pub fn device(&self, role: Role) -> Option<&DeviceId> {
        self.devices.get(role.number().checked_sub(1)?)
    }

    /// Whether `device` was enrolled
    pub fn contains(&self, device: &DeviceId) -> bool {
        self.roles.contains_key(device)
    }

    /// Enrolled devices in role order
    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    /// The most recently enrolled `count` devices, in role order
    pub fn last(&self, count: usize) -> &[DeviceId] {
        &self.devices[self.devices.len().saturating_sub(count)..]
    }
}
