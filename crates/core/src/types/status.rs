//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders only ever move forward:
/// `pending -> paid -> confirmed -> delivered -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Confirmed,
    Delivered,
    Completed,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Confirmed,
        Self::Delivered,
        Self::Completed,
    ];

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// Staying on the same status is allowed; skipping ahead is allowed.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next >= self
    }

    /// Whether the order has been paid (or progressed beyond payment).
    #[must_use]
    pub fn is_paid(self) -> bool {
        self >= Self::Paid
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Delivered => write!(f, "delivered"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "confirmed" => Ok(Self::Confirmed),
            "delivered" => Ok(Self::Delivered),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Kind of event recorded in a vendor's statistics feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Sale,
    View,
    Contact,
}

impl std::fmt::Display for StatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::View => write!(f, "view"),
            Self::Contact => write!(f, "contact"),
        }
    }
}

impl std::str::FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "view" => Ok(Self::View),
            "contact" => Ok(Self::Contact),
            _ => Err(format!("invalid stat kind: {s}")),
        }
    }
}

/// Out-of-band channel a buyer leaves for the vendor to reply on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    #[default]
    Session,
    Signal,
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Signal => write!(f, "signal"),
        }
    }
}

impl std::str::FromStr for ContactMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(Self::Session),
            "signal" => Ok(Self::Signal),
            _ => Err(format!("invalid contact method: {s}")),
        }
    }
}

/// Marketplace colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Default,
    Neon,
    Minimal,
    Cyberpunk,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Neon => write!(f, "neon"),
            Self::Minimal => write!(f, "minimal"),
            Self::Cyberpunk => write!(f, "cyberpunk"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "neon" => Ok(Self::Neon),
            "minimal" => Ok(Self::Minimal),
            "cyberpunk" => Ok(Self::Cyberpunk),
            _ => Err(format!("invalid theme: {s}")),
        }
    }
}

/// Vendor license application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    #[default]
    Unpaid,
    Paid,
    Approved,
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::Approved => write!(f, "approved"),
        }
    }
}
