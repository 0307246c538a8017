use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Request body of `POST /create-boxer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBoxer {
    pub name: String,
    pub weight: u32,
    pub height: u32,
    pub reach: f64,
    pub age: u32,
}

/// Boxer record as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boxer {
    pub id: i64,
    pub name: String,
    pub weight: u32,
    pub height: u32,
    pub reach: f64,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_class: Option<String>,
}

/// One leaderboard row. Only the ranking columns are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub fights: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub win_pct: f64,
}

/// Leaderboard sort key accepted by `GET /get-leaderboard`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortBy {
    Wins,
    WinPct,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Wins => "wins",
            SortBy::WinPct => "win_pct",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "wins" => Ok(SortBy::Wins),
            "win_pct" => Ok(SortBy::WinPct),
            other => Err(format!("Invalid sort_by parameter: {other}")),
        }
    }
}
