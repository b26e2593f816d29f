//! Package removal

use pkengine_errors::{Error, OpsError};
use pkengine_events::EventEmitter;
use pkengine_types::{InfoKind, Percentage, StatusKind};

use crate::phase::{Once, PhaseCx};
use crate::plan::{require_ids, Plan};

pub(crate) fn remove_packages(
    cx: &PhaseCx<'_>,
    package_ids: &[String],
    allow_deps: bool,
    autoremove: bool,
) -> Result<Plan, Error> {
    let ids = require_ids(package_ids)?;
    cx.emitter.emit_status(StatusKind::Remove);

    if cx.shared.config.policy.remove_requires_network && !cx.is_online() {
        return Err(OpsError::NoNetwork {
            message: "No network connection available".to_string(),
        }
        .into());
    }

    tracing::debug!(count = ids.len(), allow_deps, autoremove, "removing");
    Ok(Plan::single(Once::new("remove", move |cx| {
        for id in &ids {
            if let Some(record) = cx.lookup(id) {
                cx.package(&record, InfoKind::Removing);
            }
        }
        cx.emitter.emit_percentage(Percentage::COMPLETE);
        Ok(())
    })))
}
