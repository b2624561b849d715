pub mod graph;
pub mod sorting;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use graph::{Graph, Node};

/// Per-ID version map captured at each successful fetch.
///
/// Only used to count added/changed/removed issues between two fetches.
pub type Digest = HashMap<String, String>;

/// Dependency type that places an issue underneath another in the tree
pub const PARENT_CHILD: &str = "parent-child";

/// One issue as emitted by `bd list --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: BeadStatus,
    #[serde(default)]
    pub priority: BeadPriority,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

/// Edge between two issues (`issue_id` depends on `depends_on_id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub issue_id: String,
    pub depends_on_id: String,
    #[serde(rename = "type")]
    pub dep_type: String,
}

impl DependencyRecord {
    pub fn is_parent_child(&self) -> bool {
        self.dep_type == PARENT_CHILD
    }
}

/// A comment attached to an issue (`bd comments <id> --json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BeadStatus {
    #[default]
    Open,
    InProgress,
    Blocked,
    Deferred,
    Closed,
    #[serde(other)]
    Unknown,
}

impl BeadStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Blocked => "Blocked",
            Self::Deferred => "Deferred",
            Self::Closed => "Closed",
            Self::Unknown => "Unknown",
        }
    }

    pub fn sort_order(&self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Blocked => 1,
            Self::Open => 2,
            Self::Deferred => 3,
            Self::Unknown => 4,
            Self::Closed => 5,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Iterator over all status variants in display order
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Open,
            Self::InProgress,
            Self::Blocked,
            Self::Deferred,
            Self::Closed,
            Self::Unknown,
        ]
        .into_iter()
    }
}

/// Beads priority, P0 (critical) through P4 (backlog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub enum BeadPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
    Backlog,
}

impl BeadPriority {
    /// Create from the integer stored by bd (0-4)
    pub fn from_int(value: i64) -> Self {
        match value {
            i64::MIN..=0 => Self::Critical,
            1 => Self::High,
            2 => Self::Medium,
            3 => Self::Low,
            _ => Self::Backlog,
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Backlog => 4,
        }
    }

    /// Sort order (lower = higher priority for sorting)
    pub fn sort_order(&self) -> u8 {
        self.as_int() as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "P0",
            Self::High => "P1",
            Self::Medium => "P2",
            Self::Low => "P3",
            Self::Backlog => "P4",
        }
    }
}

impl From<i64> for BeadPriority {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<BeadPriority> for i64 {
    fn from(value: BeadPriority) -> Self {
        value.as_int()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    Feature,
    #[default]
    Task,
    Epic,
    Chore,
    #[serde(other)]
    Other,
}

impl IssueType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Chore => "chore",
            Self::Other => "other",
        }
    }
}

/// Ordering applied to roots and to each node's children when a graph is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    ByStatus,
    ByPriority,
    ByLastUpdated,
    ById,
}

impl SortMode {
    pub fn next(&self) -> Self {
        match self {
            Self::ByStatus => Self::ByPriority,
            Self::ByPriority => Self::ByLastUpdated,
            Self::ByLastUpdated => Self::ById,
            Self::ById => Self::ByStatus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ByStatus => "Status",
            Self::ByPriority => "Priority",
            Self::ByLastUpdated => "Last Updated",
            Self::ById => "ID",
        }
    }
}
