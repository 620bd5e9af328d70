//! Builder for [`CloudLoggingHandler`].
//!
//! Construction queries the instance metadata server once for the project
//! id (unless given), host name, instance id and zone, and caches them on
//! the builder. `build` then creates an authenticated client and starts the
//! transport. Entries can go to a different project than the host's by
//! supplying an explicit project id.

use std::{collections::BTreeMap, num::NonZeroU64};

use super::{
    Credentials, HandlerBuildError, HandlerBuilder, HandlerOptions,
    common::{CommonBuilder, ISO_DATEFMT, non_empty},
};
use crate::{
    cloud::{
        CloudError, CloudLoggingClient, CloudLoggingHandler, CloudTarget, GceResource,
        InstanceMetadata, MetadataClient, instance_labels,
    },
    formatter::{PatternFormatter, SharedFormatter, escape_literal},
    level::Level,
};

/// Builder for constructing [`CloudLoggingHandler`] instances.
#[derive(Clone, Debug)]
pub struct CloudLoggingHandlerBuilder {
    progname: String,
    instance: InstanceMetadata,
    resource: GceResource,
    metadata: MetadataClient,
    credentials: Option<Credentials>,
    debug_thread_worker: bool,
    log_name: Option<String>,
    logging_endpoint: Option<String>,
    common: CommonBuilder,
}

impl CloudLoggingHandlerBuilder {
    /// Query the standard metadata server and create a builder.
    ///
    /// # Errors
    ///
    /// Any failed or empty metadata lookup.
    pub fn new(progname: impl Into<String>, project_id: Option<String>) -> Result<Self, CloudError> {
        Self::with_metadata(progname, project_id, MetadataClient::new())
    }

    /// Create a builder using `metadata` for instance discovery and tokens.
    pub fn with_metadata(
        progname: impl Into<String>,
        project_id: Option<String>,
        metadata: MetadataClient,
    ) -> Result<Self, CloudError> {
        let project_id = project_id.filter(|p| !p.is_empty());
        let instance = metadata.instance(project_id)?;
        let resource = GceResource::new(&instance.project_id, &instance.instance_id, &instance.zone);
        Ok(Self {
            progname: progname.into(),
            instance,
            resource,
            metadata,
            credentials: None,
            debug_thread_worker: false,
            log_name: None,
            logging_endpoint: None,
            common: CommonBuilder::default(),
        })
    }

    /// Create a builder from the shared option bag.
    pub fn from_options(options: &HandlerOptions) -> Result<Self, HandlerBuildError> {
        let metadata = match options.metadata_endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => MetadataClient::with_endpoint(endpoint),
            _ => MetadataClient::new(),
        };
        let mut builder =
            Self::with_metadata(options.progname.clone(), options.project_id.clone(), metadata)?;
        builder.credentials = options.credentials.clone();
        builder.debug_thread_worker = options.debug_thread_worker;
        builder.log_name = non_empty(options.log_name.as_deref());
        builder.common.fmt = non_empty(options.fmt.as_deref());
        builder.common.datefmt = non_empty(options.datefmt.as_deref());
        Ok(builder)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Let the transport emit its per-entry `DEBUG` diagnostics.
    pub fn with_debug_thread_worker(mut self, enabled: bool) -> Self {
        self.debug_thread_worker = enabled;
        self
    }

    /// File entries under `log_name` instead of the program name.
    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    /// Send writes somewhere other than the public API.
    pub fn with_logging_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.logging_endpoint = Some(endpoint.into());
        self
    }

    /// Override the record format.
    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.common.fmt = Some(fmt.into());
        self
    }

    /// Override the `asctime` date format.
    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.common.datefmt = Some(datefmt.into());
        self
    }

    /// Set the bounded channel capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.common.set_capacity(capacity);
        self
    }

    /// Set the flush timeout in milliseconds.
    pub fn with_flush_timeout_ms(mut self, timeout_ms: NonZeroU64) -> Self {
        self.common.flush_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.instance.project_id
    }

    pub fn hostname(&self) -> &str {
        &self.instance.hostname
    }

    pub fn instance_id(&self) -> &str {
        &self.instance.instance_id
    }

    pub fn zone(&self) -> &str {
        &self.instance.zone
    }

    pub fn resource(&self) -> &GceResource {
        &self.resource
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        instance_labels(&self.instance)
    }

    /// Log name entries are filed under.
    pub fn log_name(&self) -> &str {
        self.log_name.as_deref().unwrap_or(&self.progname)
    }

    /// Threshold for the transport's own diagnostics.
    pub fn transport_log_level(&self) -> Level {
        if self.debug_thread_worker {
            Level::Debug
        } else {
            Level::Info
        }
    }

    /// Formatter the built handler will use, e.g.
    /// `2017-08-27T20:19:24.424 host-1 prog (23123): hello`.
    pub fn formatter(&self) -> Result<PatternFormatter, HandlerBuildError> {
        self.common.pattern(
            || {
                format!(
                    "%(asctime)s.%(msecs)03d {} {} (%(process)d): %(message)s",
                    escape_literal(&self.instance.hostname),
                    escape_literal(&self.progname)
                )
            },
            Some(ISO_DATEFMT),
        )
    }
}

impl HandlerBuilder for CloudLoggingHandlerBuilder {
    type Handler = CloudLoggingHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        self.common.is_capacity_valid()?;
        let formatter = SharedFormatter::new(self.formatter()?);
        let mut client = CloudLoggingClient::new(
            self.instance.project_id.clone(),
            self.credentials.clone(),
            self.metadata.clone(),
        )?;
        if let Some(endpoint) = &self.logging_endpoint {
            client = client.with_endpoint(endpoint.clone());
        }
        let target = CloudTarget {
            log_name: self.log_name().to_string(),
            resource: self.resource.clone(),
            labels: self.labels(),
        };
        Ok(CloudLoggingHandler::with_config(
            client,
            target,
            formatter,
            self.transport_log_level(),
            self.common.worker_config(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::assert_build_err;
    use super::*;
    use crate::{cloud::test_support::MetadataServer, handler::Handler, log_record::LogRecord};
    use rstest::{fixture, rstest};

    #[fixture]
    fn server() -> MetadataServer {
        MetadataServer::gce("host-project", "host-1", "1234", "projects/9/zones/europe-west1-d")
    }

    fn builder(server: &MetadataServer, project: Option<&str>) -> CloudLoggingHandlerBuilder {
        CloudLoggingHandlerBuilder::with_metadata(
            "prog",
            project.map(str::to_string),
            MetadataClient::with_endpoint(server.base_url()),
        )
        .expect("metadata lookups succeed")
    }

    #[rstest]
    fn caches_instance_metadata(server: MetadataServer) {
        let builder = builder(&server, None);
        assert_eq!(builder.project_id(), "host-project");
        assert_eq!(builder.hostname(), "host-1");
        assert_eq!(builder.instance_id(), "1234");
        assert_eq!(builder.zone(), "europe-west1-d");
        assert_eq!(server.requests().len(), 4);
        let _ = builder.formatter();
        let _ = builder.labels();
        assert_eq!(server.requests().len(), 4, "no further lookups");
    }

    #[rstest]
    fn explicit_project_is_used_everywhere(server: MetadataServer) {
        let builder = builder(&server, Some("other-project"));
        assert_eq!(builder.project_id(), "other-project");
        assert_eq!(
            builder.resource(),
            &GceResource::new("other-project", "1234", "europe-west1-d")
        );
        assert_eq!(builder.labels()["resource_project"], "other-project");
    }

    #[rstest]
    fn empty_project_falls_back_to_metadata(server: MetadataServer) {
        assert_eq!(builder(&server, Some("")).project_id(), "host-project");
    }

    #[rstest]
    fn labels_identify_the_host(server: MetadataServer) {
        let labels = builder(&server, None).labels();
        assert_eq!(
            labels,
            BTreeMap::from([
                ("resource_id".to_string(), "1234".to_string()),
                ("resource_project".to_string(), "host-project".to_string()),
                ("resource_zone".to_string(), "europe-west1-d".to_string()),
                ("resource_host".to_string(), "host-1".to_string()),
            ])
        );
    }

    #[rstest]
    fn default_formatter_names_host_and_program(server: MetadataServer) {
        let formatter = builder(&server, None).formatter().expect("default compiles");
        assert_eq!(
            formatter.format_string(),
            "%(asctime)s.%(msecs)03d host-1 prog (%(process)d): %(message)s"
        );
        assert_eq!(formatter.datefmt(), Some("%Y-%m-%dT%H:%M:%S"));
    }

    #[rstest]
    #[case(false, Level::Info)]
    #[case(true, Level::Debug)]
    fn transport_verbosity_follows_flag(
        server: MetadataServer,
        #[case] debug: bool,
        #[case] expected: Level,
    ) {
        let builder = builder(&server, None).with_debug_thread_worker(debug);
        assert_eq!(builder.transport_log_level(), expected);
    }

    #[rstest]
    fn log_name_defaults_to_progname(server: MetadataServer) {
        let builder = builder(&server, None);
        assert_eq!(builder.log_name(), "prog");
        assert_eq!(builder.with_log_name("audit").log_name(), "audit");
    }

    #[test]
    fn metadata_failure_propagates() {
        let server = MetadataServer::spawn(vec![("/project/project-id", 200, "p")]);
        let err = CloudLoggingHandlerBuilder::with_metadata(
            "prog",
            None,
            MetadataClient::with_endpoint(server.base_url()),
        )
        .unwrap_err();
        assert!(matches!(err, CloudError::Metadata { ref key, .. } if key == "name"));
    }

    #[rstest]
    fn zero_capacity_fails_build(server: MetadataServer) {
        let builder = builder(&server, None).with_capacity(0);
        assert_build_err(&builder, "build_inner must fail for zero capacity");
    }

    #[rstest]
    fn built_handler_ships_records(server: MetadataServer) {
        let handler = builder(&server, None)
            .with_logging_endpoint(format!("{}/v2/entries:write", server.base_url()))
            .with_debug_thread_worker(true)
            .build_inner()
            .expect("handler must build");
        assert_eq!(handler.project_id(), "host-project");
        assert_eq!(handler.log_name(), "prog");
        assert_eq!(handler.transport_log_level(), Level::Debug);
        handler
            .handle(LogRecord::new("core", Level::Error, "boom"))
            .expect("queue has room");
        assert!(handler.flush());
        let write = server.wait_for("/v2/entries:write").expect("write request");
        assert_eq!(write.header("authorization"), Some("Bearer meta-token"));
        assert!(write.body.contains("host-1 prog ("), "{}", write.body);
    }

    #[rstest]
    fn from_options_reads_cloud_fields(server: MetadataServer) {
        let options = HandlerOptions::new("prog")
            .with_metadata_endpoint(server.base_url())
            .with_project_id("explicit")
            .with_debug_thread_worker(true)
            .with_log_name("audit")
            .with_fmt("%(message)s");
        let builder =
            CloudLoggingHandlerBuilder::from_options(&options).expect("builder from options");
        assert_eq!(builder.project_id(), "explicit");
        assert_eq!(builder.log_name(), "audit");
        assert_eq!(builder.transport_log_level(), Level::Debug);
        assert_eq!(
            builder.formatter().expect("custom fmt").format_string(),
            "%(message)s"
        );
    }
}
