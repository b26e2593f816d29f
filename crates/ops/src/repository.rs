//! Repository operations

use pkengine_events::EventEmitter;
use pkengine_types::{FilterSet, StatusKind};

use crate::phase::{Once, PhaseCx};
use crate::plan::Plan;

pub(crate) fn repo_list(cx: &PhaseCx<'_>, filters: FilterSet) -> Plan {
    cx.emitter.emit_status(StatusKind::Query);
    Plan::single(Once::new("repo-list", move |cx| {
        for repo in cx.shared.repositories.list_filtered(&filters) {
            cx.emitter.emit_repo_detail(repo);
        }
        Ok(())
    }))
}

/// Unknown repositories are reported as a message, not a failure
pub(crate) fn repo_enable(cx: &PhaseCx<'_>, repo_id: String, enabled: bool) -> Plan {
    cx.emitter.emit_status(StatusKind::Request);
    Plan::single(Once::new("repo-enable", move |cx| {
        match cx.shared.repositories.set_enabled(&repo_id, enabled) {
            Ok(repo) => tracing::info!(repo = %repo.id, enabled = repo.enabled, "repository toggled"),
            Err(err) => {
                tracing::warn!(repo = %repo_id, error = %err, "repository not toggled");
                cx.emitter.emit_message(err.to_string());
            }
        }
        Ok(())
    }))
}

pub(crate) fn repo_set_data(
    cx: &PhaseCx<'_>,
    repo_id: String,
    parameter: String,
    value: String,
) -> Plan {
    cx.emitter.emit_status(StatusKind::Request);
    Plan::single(Once::new("repo-set-data", move |cx| {
        cx.shared
            .repositories
            .set_parameter(&repo_id, &parameter, &value);
        Ok(())
    }))
}

/// Register or withdraw removable media; registered media starts disabled
pub(crate) fn add_media_repository(cx: &PhaseCx<'_>, location: &str, enabled: bool) -> Plan {
    cx.emitter.emit_status(StatusKind::Running);
    let location = location.to_string();
    Plan::single(Once::new("add-media-repository", move |cx| {
        if let Some(repo) = cx.shared.repositories.add_media_repository(&location, enabled) {
            cx.emitter.emit_repo_detail(repo);
        }
        Ok(())
    }))
}
