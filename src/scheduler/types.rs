/*!
 * Scheduler Types
 * Policy selectors and observable worker state
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How the worker picks its next task when delayed work is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayPolicy {
    /// Single priority-ordered store; the worker only ever looks at the top.
    /// A far-future urgent task at the top holds back eligible work beneath it.
    #[default]
    HeadOfLine,
    /// Eligible-now priority queue plus a time-ordered delayed set; delayed
    /// tasks are promoted as their time arrives, so eligible work never waits
    /// behind a task that cannot run yet.
    EligibleFirst,
}

impl DelayPolicy {
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HeadOfLine => "head_of_line",
            Self::EligibleFirst => "eligible_first",
        }
    }
}

impl FromStr for DelayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head_of_line" | "headofline" | "hol" => Ok(Self::HeadOfLine),
            "eligible_first" | "eligiblefirst" | "eligible" => Ok(Self::EligibleFirst),
            _ => Err(format!(
                "Invalid delay policy '{}'. Valid: head_of_line, eligible_first",
                s
            )),
        }
    }
}

/// What `stop()` does with work still pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// Keep executing work that is already eligible, discard delayed work
    #[default]
    DrainEligible,
    /// Discard everything still pending
    Abandon,
}

impl ShutdownMode {
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DrainEligible => "drain_eligible",
            Self::Abandon => "abandon",
        }
    }
}

impl FromStr for ShutdownMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drain_eligible" | "drain" => Ok(Self::DrainEligible),
            "abandon" | "discard" => Ok(Self::Abandon),
            _ => Err(format!(
                "Invalid shutdown mode '{}'. Valid: drain_eligible, abandon",
                s
            )),
        }
    }
}

macro_rules! impl_str_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_str_serde!(DelayPolicy);
impl_str_serde!(ShutdownMode);

/// Worker loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Store is empty; blocked until work arrives
    WaitingForWork,
    /// Top task is not yet eligible; blocked until its eligible time
    WaitingForEligibility,
    /// Running a task body
    Executing,
    /// Worker has exited (or was never started)
    Stopped,
}
