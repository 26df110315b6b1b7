use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Shortest reporting interval accepted for a long-running agent.
pub const MIN_INTERVAL_SECS: u64 = 15;

/// Longest child node name accepted by the monitoring service.
pub const MAX_NODE_NAME_LEN: usize = 30;

/// Alerting level attached to thresholds and heartbeats.
///
/// # Examples
///
/// ```
/// use ays_common::types::Level;
///
/// let level = Level::parse("warning", "threshold").unwrap();
/// assert_eq!(level, Level::Warning);
/// assert_eq!(level.to_string(), "warning");
/// assert!(Level::parse("info", "threshold").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    Error,
    #[default]
    Critical,
}

impl Level {
    pub const OPTIONS: &'static str = "warning, error, critical";

    /// Validates a level token. `context` names what the level belongs to
    /// (e.g. `"threshold"`, `"heartbeat"`) and is carried into the error.
    pub fn parse(value: &str, context: &'static str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(AgentError::InvalidLevel {
                context,
                value: value.to_string(),
                options: Self::OPTIONS,
            }),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// State carried by a status report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Healthy,
    Warning,
    Error,
    #[default]
    Critical,
}

impl StatusState {
    pub const OPTIONS: &'static str = "healthy, warning, error, critical";

    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(AgentError::InvalidLevel {
                context: "status",
                value: value.to_string(),
                options: Self::OPTIONS,
            }),
        }
    }
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Kind of node created when the agent registers a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Machine,
    Service,
    Vendor,
}

impl NodeType {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "machine" => Ok(Self::Machine),
            "service" => Ok(Self::Service),
            "vendor" => Ok(Self::Vendor),
            _ => Err(AgentError::InvalidNodeType(value.to_string())),
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Machine => write!(f, "machine"),
            Self::Service => write!(f, "service"),
            Self::Vendor => write!(f, "vendor"),
        }
    }
}

/// System resource the agent can sample on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonitorResource {
    Cpu,
    Ram,
    Hdd,
    Net,
}

impl MonitorResource {
    pub const ALL: [MonitorResource; 4] = [Self::Cpu, Self::Ram, Self::Hdd, Self::Net];

    /// Parses a comma-separated selector list such as `"cpu, net"` or `"all"`.
    ///
    /// The result is de-duplicated and ordered cpu, ram, hdd, net.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        let mut selected = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_lowercase().as_str() {
                "all" => selected.extend(Self::ALL),
                "cpu" => selected.push(Self::Cpu),
                "ram" => selected.push(Self::Ram),
                "hdd" => selected.push(Self::Hdd),
                "net" => selected.push(Self::Net),
                _ => return Err(AgentError::InvalidMonitorResource(token.to_string())),
            }
        }
        selected.sort();
        selected.dedup();
        Ok(selected)
    }
}

impl std::fmt::Display for MonitorResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Ram => write!(f, "ram"),
            Self::Hdd => write!(f, "hdd"),
            Self::Net => write!(f, "net"),
        }
    }
}

/// Rule deciding whether a reported value is nominal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Threshold {
    Above { value: f64, level: Level },
    Below { value: f64, level: Level },
    Equal { value: f64, level: Level },
    NotEqual { value: f64, level: Level },
    Outside { min: f64, max: f64, level: Level },
}

impl Threshold {
    pub fn level(&self) -> Level {
        match self {
            Self::Above { level, .. }
            | Self::Below { level, .. }
            | Self::Equal { level, .. }
            | Self::NotEqual { level, .. }
            | Self::Outside { level, .. } => *level,
        }
    }
}

/// A single named value, optionally guarded by a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
}

impl Measurement {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            threshold: None,
        }
    }
}

/// Reference to the parent node, addressed by path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    pub property: String,
    pub value: String,
}

impl ParentRef {
    pub fn path(value: impl Into<String>) -> Self {
        Self {
            property: "path".to_string(),
            value: value.into(),
        }
    }
}

/// Whether the monitor attaches to the parent itself or to a child node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Relationship {
    Parent { monitor_name: String },
    Child { monitor_name: String, path: String },
}

impl Relationship {
    pub fn is_child(&self) -> bool {
        matches!(self, Self::Child { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub timeout: u64,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub message: String,
    pub state: StatusState,
}

/// What a payload reports. At most one is sent per payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Value(Measurement),
    Values(Vec<Measurement>),
    Status(Status),
}

/// Wire object posted to the agent endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub org_secret: String,
    pub parent: ParentRef,
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<Heartbeat>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(flatten)]
    pub body: Option<Body>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn level_parse_is_case_insensitive_and_names_options() {
        assert_eq!(Level::parse("ERROR", "heartbeat").unwrap(), Level::Error);
        let err = Level::parse("info", "heartbeat").unwrap_err().to_string();
        assert!(err.contains("heartbeat"));
        assert!(err.contains("(info)"));
        assert!(err.contains("warning, error, critical"));
    }

    #[test]
    fn monitor_resources_expand_all_and_dedup() {
        let all = MonitorResource::parse_list("net, all,cpu").unwrap();
        assert_eq!(all, MonitorResource::ALL.to_vec());
        let some = MonitorResource::parse_list("net,cpu").unwrap();
        assert_eq!(some, vec![MonitorResource::Cpu, MonitorResource::Net]);
        assert!(MonitorResource::parse_list("gpu").is_err());
    }

    #[test]
    fn threshold_serializes_with_type_tag() {
        let t = Threshold::Outside {
            min: 1.0,
            max: 2.5,
            level: Level::Warning,
        };
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            json!({"type": "outside", "min": 1.0, "max": 2.5, "level": "warning"})
        );
        let t = Threshold::NotEqual {
            value: 3.0,
            level: Level::Critical,
        };
        assert_eq!(serde_json::to_value(&t).unwrap()["type"], "not_equal");
    }

    #[test]
    fn payload_omits_absent_fields() {
        let payload = Payload {
            org_secret: "s3cret".into(),
            parent: ParentRef::path("home.servers"),
            relationship: Relationship::Parent {
                monitor_name: "web-01".into(),
            },
            managed: None,
            heartbeat: None,
            node_type: None,
            body: Some(Body::Status(Status {
                message: String::new(),
                state: StatusState::Critical,
            })),
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            v,
            json!({
                "org_secret": "s3cret",
                "parent": {"property": "path", "value": "home.servers"},
                "relationship": {"type": "parent", "monitor_name": "web-01"},
                "status": {"message": "", "state": "critical"}
            })
        );
    }
}
