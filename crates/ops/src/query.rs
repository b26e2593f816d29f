//! Package information and search operations

use pkengine_errors::Error;
use pkengine_events::EventEmitter;
use pkengine_store::SearchKind;
use pkengine_types::{FilterSet, Percentage, ProvidesKind, StatusKind};

use crate::phase::{Once, PhaseCx, Ramp, Subjects};
use crate::plan::{parse_ids, Plan};
use crate::schedule::WHAT_PROVIDES;

pub(crate) fn resolve(cx: &PhaseCx<'_>, filters: FilterSet, names: Vec<String>) -> Plan {
    cx.emitter.emit_status(StatusKind::Query);
    Plan::single(Once::new("resolve", move |cx| {
        for name in &names {
            cx.packages(cx.store().resolve(name), &filters);
        }
        Ok(())
    }))
}

/// Name searches take one tick; the other kinds answer immediately
pub(crate) fn search(
    cx: &PhaseCx<'_>,
    kind: SearchKind,
    filters: FilterSet,
    text: String,
) -> Plan {
    tracing::debug!(%kind, text = %text, %filters, "search");
    let mut phase = Once::new("search", move |cx| {
        cx.packages(cx.store().search(kind, &text), &filters);
        Ok(())
    })
    .cancellable();

    if kind == SearchKind::Name {
        cx.emitter.emit_percentage(Percentage::UNKNOWN);
        phase = phase.after(cx.timing().search_name());
    }
    cx.emitter.emit_status(StatusKind::Query);
    Plan::single(phase)
}

pub(crate) fn depends(
    cx: &PhaseCx<'_>,
    filters: FilterSet,
    package_ids: &[String],
    recursive: bool,
) -> Result<Plan, Error> {
    let ids = parse_ids(package_ids)?;
    cx.emitter.emit_status(StatusKind::Query);
    Ok(Plan::single(Once::new("depends", move |cx| {
        for id in &ids {
            cx.packages(cx.store().depends(id, recursive), &filters);
        }
        Ok(())
    })))
}

pub(crate) fn requires(
    cx: &PhaseCx<'_>,
    filters: FilterSet,
    package_ids: &[String],
    recursive: bool,
) -> Result<Plan, Error> {
    let ids = parse_ids(package_ids)?;
    cx.emitter.emit_status(StatusKind::Query);
    Ok(Plan::single(Once::new("requires", move |cx| {
        for id in &ids {
            cx.packages(cx.store().requires(id, recursive), &filters);
        }
        Ok(())
    })))
}

pub(crate) fn details(cx: &PhaseCx<'_>, package_ids: &[String]) -> Result<Plan, Error> {
    let ids = parse_ids(package_ids)?;
    cx.emitter.emit_status(StatusKind::Query);
    Ok(Plan::single(Once::new("details", move |cx| {
        for id in &ids {
            match cx.store().details(id) {
                Some(details) => cx.emitter.emit_details(details),
                None => tracing::warn!(package = %id, "no details for unknown package"),
            }
        }
        Ok(())
    })))
}

pub(crate) fn files(cx: &PhaseCx<'_>, package_ids: &[String]) -> Result<Plan, Error> {
    let ids = parse_ids(package_ids)?;
    cx.emitter.emit_status(StatusKind::Query);
    Ok(Plan::single(Once::new("files", move |cx| {
        for id in ids {
            match cx.store().files(&id) {
                Some(files) => cx.emitter.emit_files(Some(id), files),
                None => tracing::warn!(package = %id, "no file list for unknown package"),
            }
        }
        Ok(())
    })))
}

pub(crate) fn packages(cx: &PhaseCx<'_>, filters: FilterSet) -> Plan {
    cx.emitter.emit_status(StatusKind::Request);
    Plan::single(Once::new("packages", move |cx| {
        cx.packages(cx.store().packages(), &filters);
        Ok(())
    }))
}

pub(crate) fn distro_upgrades(cx: &PhaseCx<'_>) -> Plan {
    cx.emitter.emit_status(StatusKind::Query);
    Plan::single(Once::new("distro-upgrades", |cx| {
        for upgrade in cx.store().distro_upgrades() {
            cx.emitter.emit_distro_upgrade(upgrade);
        }
        Ok(())
    }))
}

/// Ramp to completion, then report the providers
pub(crate) fn what_provides(
    cx: &PhaseCx<'_>,
    filters: FilterSet,
    kind: ProvidesKind,
    text: String,
) -> Plan {
    cx.emitter.emit_status(StatusKind::Request);
    cx.emitter.emit_percentage(Percentage::ZERO);
    Plan::single(Ramp::new(
        "what-provides",
        &WHAT_PROVIDES,
        Subjects::default(),
        cx.timing().what_provides(),
    ))
    .then(Once::new("providers", move |cx| {
        cx.packages(cx.store().what_provides(kind, &text), &filters);
        Ok(())
    }))
}
