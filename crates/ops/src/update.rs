//! Update operations

use std::collections::HashSet;

use pkengine_errors::{Error, OpsError};
use pkengine_events::EventEmitter;
use pkengine_types::{FilterSet, InfoKind, Percentage, RestartKind, StatusKind};

use crate::phase::{Once, PhaseCx, Ramp, Subjects, Sweep};
use crate::plan::{parse_ids, require_ids, Plan};
use crate::schedule::{REFRESH_CACHE, UPDATE_APPLIED, UPDATE_DOWNLOADED, UPDATE_SYSTEM};

fn require_network(cx: &PhaseCx<'_>, message: &str) -> Result<(), Error> {
    if cx.shared.config.policy.updates_require_network && !cx.is_online() {
        return Err(OpsError::NoNetwork {
            message: message.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Pending updates not yet applied
pub(crate) fn get_updates(cx: &PhaseCx<'_>, filters: FilterSet) -> Result<Plan, Error> {
    cx.emitter.emit_status(StatusKind::Query);
    cx.emitter.emit_percentage(Percentage::UNKNOWN);
    require_network(cx, "Cannot check when offline")?;

    let phase = Once::new("updates", move |cx| {
        for update in cx.store().available_updates() {
            if cx.store().is_updated(&update.package.id) {
                continue;
            }
            if filters.matches(&update.package.facets) {
                cx.package(&update.package, update.info);
            }
        }
        Ok(())
    })
    .after(cx.timing().get_updates());
    Ok(Plan::single(phase))
}

pub(crate) fn get_update_detail(cx: &PhaseCx<'_>, package_ids: &[String]) -> Result<Plan, Error> {
    let ids = parse_ids(package_ids)?;
    cx.emitter.emit_status(StatusKind::Query);

    let phase = Once::new("update-detail", move |cx| {
        for id in &ids {
            match cx.store().update_detail(id) {
                Some(detail) => cx.emitter.emit_update_detail(detail),
                None => tracing::warn!(package = %id, "no update detail"),
            }
        }
        Ok(())
    })
    .after(cx.timing().get_update_detail());
    Ok(Plan::single(phase))
}

/// Download then apply the named updates, one package per tick
pub(crate) fn update_packages(cx: &PhaseCx<'_>, package_ids: &[String]) -> Result<Plan, Error> {
    let ids = require_ids(package_ids)?;
    require_network(cx, "Cannot update when offline")?;

    let mut seen = HashSet::new();
    let records: Vec<_> = ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .filter_map(|id| cx.lookup(&id))
        .collect();

    cx.emitter.emit_percentage(Percentage::ZERO);
    cx.emitter.emit_status(StatusKind::Download);

    let tick = cx.timing().update_packages();
    Ok(Plan::single(
        Sweep::new("download", records.clone(), InfoKind::Downloading, tick)
            .closing(UPDATE_DOWNLOADED),
    )
    .then(
        Sweep::new("update", records, InfoKind::Updating, tick)
            .marking_updated()
            .closing(UPDATE_APPLIED),
    ))
}

/// Apply every pending update; always asks for a system restart
pub(crate) fn update_system(cx: &PhaseCx<'_>) -> Result<Plan, Error> {
    require_network(cx, "Cannot update when offline")?;
    cx.emitter.emit_status(StatusKind::Download);
    cx.emitter.emit_require_restart(RestartKind::System, None);

    let items = cx
        .store()
        .available_updates()
        .into_iter()
        .map(|update| update.package)
        .collect();
    Ok(Plan::single(Ramp::new(
        "update-system",
        &UPDATE_SYSTEM,
        Subjects {
            items,
            ..Subjects::default()
        },
        cx.timing().update_system(),
    )))
}

/// Forget which updates were applied and ramp to completion
pub(crate) fn refresh_cache(cx: &PhaseCx<'_>, force: bool) -> Plan {
    tracing::debug!(force, "refreshing cache");
    cx.emitter.emit_status(StatusKind::RefreshCache);
    cx.emitter.emit_percentage(Percentage::ZERO);
    Plan::single(Once::new("reset-updates", |cx| {
        cx.store().reset_updates();
        Ok(())
    }))
    .then(Ramp::new(
        "refresh-cache",
        &REFRESH_CACHE,
        Subjects::default(),
        cx.timing().refresh_cache(),
    ))
}

pub(crate) fn rollback(cx: &PhaseCx<'_>, transaction_id: &str) -> Plan {
    cx.emitter.emit_status(StatusKind::Running);
    tracing::info!(target_transaction = transaction_id, "rollback requested");
    Plan::empty()
}
