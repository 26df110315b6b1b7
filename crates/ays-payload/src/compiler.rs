use crate::align::align;
use crate::node_name;
use crate::options::{Options, Truthy};
use crate::threshold;
use ays_common::error::{AgentError, Result};
use ays_common::types::{
    Body, Heartbeat, Level, Measurement, NodeType, ParentRef, Payload, Relationship, Status,
    StatusState,
};

/// Agent endpoint used when no server is configured.
pub const DEFAULT_SERVER: &str = "https://api.bithead.io:9443/agent/";

/// Validates `options` and builds the destination and payload to send.
///
/// The report body is chosen in order: `value`, then `values`, then status.
/// With none of them set the payload only registers the monitor.
///
/// # Errors
///
/// The first failing check wins: missing org secret, parent, or monitor
/// name, then any child name, heartbeat level, node type, threshold, value
/// or status error.
pub fn compile(options: &Options) -> Result<(String, Payload)> {
    compile_with(options, None)
}

/// Like [`compile`], but reports `sampled` measurements as the `values`
/// body instead of the configured value, values or status.
pub fn compile_with(
    options: &Options,
    sampled: Option<Vec<Measurement>>,
) -> Result<(String, Payload)> {
    require("org_secret", &options.org_secret)?;
    require("parent", &options.parent)?;
    require("monitor_name", &options.monitor_name)?;

    let relationship = relationship(options)?;

    // a zero timeout counts as unset, like every other falsy option
    let heartbeat = match options.heartbeat_timeout.filter(|timeout| *timeout > 0) {
        Some(timeout) => Some(Heartbeat {
            timeout,
            level: match non_empty(&options.heartbeat_level) {
                Some(level) => Level::parse(level, "heartbeat")?,
                None => Level::Critical,
            },
        }),
        None => None,
    };

    // the node type only means something when a child node is created
    let node_type = match non_empty(&options.node_type) {
        Some(node_type) if relationship.is_child() => Some(NodeType::parse(node_type)?),
        _ => None,
    };

    let body = match sampled {
        Some(measurements) => Some(Body::Values(measurements)),
        None => body(options)?,
    };

    let destination = if options.server.is_empty() {
        DEFAULT_SERVER.to_string()
    } else {
        options.server.clone()
    };

    tracing::debug!(
        destination = %destination,
        parent = %options.parent,
        monitor = %options.monitor_name,
        child = relationship.is_child(),
        "Compiled agent payload"
    );

    Ok((
        destination,
        Payload {
            org_secret: options.org_secret.clone(),
            parent: ParentRef::path(&options.parent),
            relationship,
            managed: options.managed,
            heartbeat,
            node_type,
            body,
        },
    ))
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AgentError::MissingField(field));
    }
    Ok(())
}

fn relationship(options: &Options) -> Result<Relationship> {
    let monitor_name = options.monitor_name.clone();
    if let Some(child) = non_empty(&options.child) {
        return Ok(Relationship::Child {
            monitor_name,
            path: node_name::normalize(child)?,
        });
    }
    if options.create_child.is_truthy() {
        return Ok(Relationship::Child {
            path: monitor_name.clone(),
            monitor_name,
        });
    }
    Ok(Relationship::Parent { monitor_name })
}

fn body(options: &Options) -> Result<Option<Body>> {
    if let Some(value) = options.value {
        return Ok(Some(Body::Value(Measurement {
            name: non_empty(&options.value_name).unwrap_or("value").to_string(),
            value,
            threshold: threshold::parse(options.value_threshold.as_deref())?,
        })));
    }

    if let Some(values) = non_empty(&options.values) {
        let measurements = align(
            values,
            options.value_names.as_deref(),
            options.value_thresholds.as_deref(),
        )?;
        return Ok(Some(Body::Values(measurements)));
    }

    if options.status_message.is_some() || options.status_state.is_some() {
        let state = match non_empty(&options.status_state) {
            Some(state) => StatusState::parse(state)?,
            None => StatusState::Critical,
        };
        return Ok(Some(Body::Status(Status {
            message: options.status_message.clone().unwrap_or_default(),
            state,
        })));
    }

    Ok(None)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
