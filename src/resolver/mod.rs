//! Resolution of declared bindings onto managed instances.

mod discovery;
mod error;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::binding::Bindings;
use crate::config::ConfigLookup;

pub use discovery::{Discovery, InstanceKind, InstanceWrapper};
pub use error::ResolveError;

/// Counters describing one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Wrappers returned by discovery.
    pub visited: usize,
    /// Distinct instances that had at least one binding applied.
    pub bound: usize,
    /// Field slots written.
    pub fields: usize,
}

/// Writes configuration values onto the bound fields of managed instances.
///
/// The explorer runs once, when the container's init hook fires. Only
/// instances that exist at that point are bound; anything the container
/// creates afterwards keeps unresolved slots. Every slot is write-once, so
/// a second pass over the same instances fails with
/// [`ResolveError::ConfigurationConflict`].
#[derive(Debug, Clone)]
pub struct ValueExplorer {
    bindings: Arc<Bindings>,
}

impl ValueExplorer {
    pub fn new(bindings: Arc<Bindings>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Runs one resolution pass over every provider and controller.
    ///
    /// Wrappers without an instance or without a class identity are
    /// skipped, as are instances of classes that declared no bindings; no
    /// lookup is made for them. The first failure aborts the pass. Slots
    /// written before it keep their values.
    pub fn resolve<L, D>(&self, config: &L, discovery: &D) -> Result<ResolveReport, ResolveError>
    where
        L: ConfigLookup + ?Sized,
        D: Discovery + ?Sized,
    {
        let mut report = ResolveReport::default();
        let mut seen = HashSet::new();

        let providers = discovery.providers();
        let controllers = discovery.controllers();

        for wrapper in providers.into_iter().chain(controllers) {
            report.visited += 1;

            let (Some(instance), Some(class)) = (wrapper.instance(), wrapper.class()) else {
                debug!(name = wrapper.name(), "skipping wrapper without a typed instance");
                continue;
            };
            if !self.bindings.is_registered(&class) {
                continue;
            }
            let Some(metadata) = self.bindings.metadata(&class) else {
                continue;
            };
            if !seen.insert(Arc::as_ptr(instance) as *const ()) {
                debug!(name = wrapper.name(), %class, "instance already bound in this pass");
                continue;
            }

            for binding in metadata.iter() {
                let field = binding.field();
                let slot = instance
                    .slot(field)
                    .ok_or_else(|| ResolveError::MissingSlot {
                        class,
                        field: field.to_string(),
                    })?;

                let value = config.get(binding.path(), binding.default_value());
                trace!(
                    %class,
                    field,
                    path = binding.path(),
                    found = value.is_some(),
                    "binding field"
                );

                slot.resolve(value)
                    .map_err(|_| ResolveError::ConfigurationConflict {
                        class,
                        field: field.to_string(),
                    })?;
                report.fields += 1;
            }
            report.bound += 1;
        }

        info!(
            visited = report.visited,
            bound = report.bound,
            fields = report.fields,
            "resolved configuration bindings"
        );
        Ok(report)
    }
}
