//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every collaborator from the validated configuration
//! - Hand them to the reconciler and run it until a fatal error
//!
//! # Design Decisions
//! - The template is compiled before the first tick so a broken template
//!   fails at startup rather than on the first membership change

use crate::config::SidecarConfig;
use crate::discovery::KubernetesSource;
use crate::error::ControllerError;
use crate::reconcile::Reconciler;
use crate::render::TemplateRenderer;
use crate::store::ConfigStore;
use crate::supervisor::{ProcessSpec, ProcessSupervisor};

/// Assemble the reconciler from configuration.
pub fn build(config: &SidecarConfig) -> Result<Reconciler<KubernetesSource, TemplateRenderer>, ControllerError> {
    let source = KubernetesSource::new(&config.discovery)?;
    let renderer = TemplateRenderer::from_file(&config.template.path)?;
    let store = ConfigStore::new(config.proxy.config_path.clone());
    let supervisor = ProcessSupervisor::new(ProcessSpec::from(&config.proxy));

    Ok(Reconciler::new(
        config.discovery.pool.clone(),
        source,
        renderer,
        store,
        supervisor,
        config.reconcile.interval(),
    ))
}

/// Run the controller. Only returns on a fatal error.
pub async fn run(config: SidecarConfig) -> ControllerError {
    tracing::info!(
        pool = %config.discovery.pool,
        namespace = %config.discovery.namespace,
        port_name = %config.discovery.port_name,
        template = %config.template.path.display(),
        output = %config.proxy.config_path.display(),
        proxy = %config.proxy.binary.display(),
        interval_secs = config.reconcile.interval_secs,
        "Configuration loaded"
    );

    match build(&config) {
        Ok(reconciler) => reconciler.run().await,
        Err(e) => e,
    }
}
