// Status page models (statuspage.io `/api/v2/status.json`)

use serde::{Deserialize, Serialize};

/// Severity reported by a status page; serializes to lowercase JSON (e.g. "major").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    None,
    Minor,
    Major,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::None => "none",
            Indicator::Minor => "minor",
            Indicator::Major => "major",
            Indicator::Critical => "critical",
            Indicator::Unknown => "unknown",
        }
    }

    /// Anything other than `none` is shown emphasized.
    pub fn is_emphasized(&self) -> bool {
        !matches!(self, Indicator::None)
    }

    /// CSS class used by the rendered list entry (e.g. `status_major`).
    pub fn css_class(&self) -> String {
        format!("status_{}", self.as_str())
    }
}

/// Response body of `<base>/api/v2/status.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPage {
    pub page: PageInfo,
    pub status: StatusInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusInfo {
    pub indicator: Indicator,
    pub description: String,
}

/// One monitored service as shown in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub url: String,
    pub indicator: Indicator,
    pub description: String,
}

impl From<StatusPage> for ServiceStatus {
    fn from(p: StatusPage) -> Self {
        Self {
            name: p.page.name,
            url: p.page.url,
            indicator: p.status.indicator,
            description: p.status.description,
        }
    }
}
