//! Canonical semantic roles of region dataset columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three independent classification families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassificationFamily {
    Pers,
    Ofg,
    Gw,
}

impl ClassificationFamily {
    pub const ALL: [ClassificationFamily; 3] = [
        ClassificationFamily::Pers,
        ClassificationFamily::Ofg,
        ClassificationFamily::Gw,
    ];

    /// Suffix used in report column names (`AmpelcodePers`, `AmpelcodeOFG`, ...).
    pub fn suffix(self) -> &'static str {
        match self {
            ClassificationFamily::Pers => "Pers",
            ClassificationFamily::Ofg => "OFG",
            ClassificationFamily::Gw => "GW",
        }
    }

    pub fn role(self) -> Role {
        Role::Classification(self)
    }
}

impl fmt::Display for ClassificationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A canonical column role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Segment length in meters.
    Length,
    /// Exemption flag (`KB-befreit`).
    Exemption,
    /// Classification code of one family.
    Classification(ClassificationFamily),
    /// Nominal computation interval. Only present in the current generation.
    Interval,
}

impl Role {
    /// Roles every analyzable region must resolve.
    pub const REQUIRED: [Role; 5] = [
        Role::Length,
        Role::Exemption,
        Role::Classification(ClassificationFamily::Pers),
        Role::Classification(ClassificationFamily::Ofg),
        Role::Classification(ClassificationFamily::Gw),
    ];

    /// Roles in resolution order.
    pub const ALL: [Role; 6] = [
        Role::Length,
        Role::Exemption,
        Role::Classification(ClassificationFamily::Pers),
        Role::Classification(ClassificationFamily::Ofg),
        Role::Classification(ClassificationFamily::Gw),
        Role::Interval,
    ];

    pub fn is_required(self) -> bool {
        !matches!(self, Role::Interval)
    }

    /// Column name a resolved role is written under in per-region subsets.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Role::Length => "IDLaenge",
            Role::Exemption => "KBfrei",
            Role::Classification(ClassificationFamily::Pers) => "AmpelCodePers",
            Role::Classification(ClassificationFamily::Ofg) => "AmpelCodeOFG",
            Role::Classification(ClassificationFamily::Gw) => "AmpelCodeGW",
            Role::Interval => "Intervall",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Length => f.write_str("length"),
            Role::Exemption => f.write_str("exemption"),
            Role::Classification(family) => write!(f, "classification-{family}"),
            Role::Interval => f.write_str("interval"),
        }
    }
}
