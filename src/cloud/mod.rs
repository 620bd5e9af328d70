//! Google Cloud Logging support.
//!
//! [`MetadataClient`] discovers the instance identity, [`GceResource`]
//! describes it to the logging API and [`CloudLoggingHandler`] ships
//! formatted records through a [`CloudLoggingClient`].

use std::collections::BTreeMap;

use serde::Serialize;

mod client;
mod error;
mod handler;
mod metadata;
#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use client::{CloudLoggingClient, DEFAULT_LOGGING_ENDPOINT};
pub use error::CloudError;
pub use handler::{CloudLoggingHandler, CloudTarget, TRANSPORT_TARGET, severity};
pub use metadata::{
    DEFAULT_METADATA_ENDPOINT, InstanceMetadata, METADATA_TIMEOUT, MetadataClient, short_zone,
};

/// Monitored-resource descriptor attached to every entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GceResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub labels: BTreeMap<String, String>,
}

impl GceResource {
    /// A `gce_instance` resource.
    pub fn new(project_id: &str, instance_id: &str, zone: &str) -> Self {
        Self {
            kind: "gce_instance".to_string(),
            labels: BTreeMap::from([
                ("project_id".to_string(), project_id.to_string()),
                ("instance_id".to_string(), instance_id.to_string()),
                ("zone".to_string(), zone.to_string()),
            ]),
        }
    }
}

/// Entry labels identifying the emitting host.
pub fn instance_labels(instance: &InstanceMetadata) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("resource_id".to_string(), instance.instance_id.clone()),
        ("resource_project".to_string(), instance.project_id.clone()),
        ("resource_zone".to_string(), instance.zone.clone()),
        ("resource_host".to_string(), instance.hostname.clone()),
    ])
}
