//! Integration tests for transaction scheduling

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pkengine_config::Config;
    use pkengine_errors::{Error, ErrorCode, OpsError};
    use pkengine_events::{EventReceiver, ExitKind, TransactionEvent};
    use pkengine_ops::*;
    use pkengine_repository::MEDIA_REPO_ID;
    use pkengine_store::{FixedLocale, MemoryStore, ResolvableStore, StaticNetwork};
    use pkengine_types::{
        FilterSet, InfoKind, PackageId, ProvidesKind, RestartKind, SigType, StatusKind,
    };
    use tokio::time::Instant;

    const POWERTOP: &str = "powertop;1.8-1.fc8;i386;fedora";
    const GTKHTML: &str = "gtkhtml2;2.19.1-4.fc8;i386;fedora";
    const GTKHTML_DEVEL: &str = "gtkhtml2-devel;2.19.1-0.fc8;i386;fedora";
    const GLIB: &str = "glib2;2.14.0;i386;fedora";
    const VIPS: &str = "vips-doc;7.12.4-2.fc8;noarch;linva";

    struct Harness {
        engine: Engine,
        store: MemoryStore,
        network: StaticNetwork,
        rx: EventReceiver,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_locale("en_GB.utf8")
        }

        fn with_locale(locale: &str) -> Self {
            Self::with_parts(MemoryStore::sample().unwrap(), locale)
        }

        fn with_store(store: MemoryStore) -> Self {
            Self::with_parts(store, "en_GB.utf8")
        }

        fn with_parts(store: MemoryStore, locale: &str) -> Self {
            let network = StaticNetwork::new(true);
            let (tx, rx) = pkengine_events::channel();
            let engine = EngineBuilder::new()
                .with_store(Arc::new(store.clone()))
                .with_network(Arc::new(network.clone()))
                .with_locale(Arc::new(FixedLocale::new(locale)))
                .with_config(Config::default())
                .with_event_sender(tx)
                .build()
                .unwrap();
            Self {
                engine,
                store,
                network,
                rx,
            }
        }

        async fn run(&mut self, operation: Operation) -> (TransactionOutcome, Vec<TransactionEvent>) {
            let (transaction, _handle) = self.engine.transaction(operation).unwrap();
            let outcome = transaction.run().await;
            let events = self.drain(&outcome.transaction_id);
            (outcome, events)
        }

        fn drain(&mut self, transaction_id: &str) -> Vec<TransactionEvent> {
            let mut events = Vec::new();
            while let Ok(message) = self.rx.try_recv() {
                assert_eq!(message.meta.correlation_id.as_deref(), Some(transaction_id));
                events.push(message.event);
            }
            events
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    fn packages(events: &[TransactionEvent], info: InfoKind) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                TransactionEvent::Package(result) if result.info == info => {
                    Some(result.id.name().to_string())
                }
                _ => None,
            })
            .collect()
    }

    fn any_packages(events: &[TransactionEvent]) -> bool {
        events
            .iter()
            .any(|e| matches!(e, TransactionEvent::Package(_)))
    }

    fn percentages(events: &[TransactionEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|event| match event {
                TransactionEvent::Percentage { percentage } => percentage.value(),
                _ => None,
            })
            .collect()
    }

    fn finished_count(events: &[TransactionEvent]) -> usize {
        events.iter().filter(|e| e.is_finished()).count()
    }

    /// The stream ends with `error(code)` then `finished(exit)`
    fn assert_ends_with_error(events: &[TransactionEvent], expected: ErrorCode, exit: ExitKind) {
        let n = events.len();
        assert!(n >= 2, "{events:?}");
        assert!(
            matches!(&events[n - 2], TransactionEvent::ErrorCode { code, .. } if *code == expected),
            "{events:?}"
        );
        assert_eq!(events[n - 1], TransactionEvent::Finished { exit });
        assert_eq!(finished_count(events), 1);
    }

    fn install(raw: &[&str]) -> Operation {
        Operation::InstallPackages {
            package_ids: ids(raw),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_single_package() {
        let mut harness = Harness::new();
        let (outcome, events) = harness
            .run(Operation::UpdatePackages {
                package_ids: ids(&[POWERTOP]),
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(packages(&events, InfoKind::Downloading), vec!["powertop"]);
        assert_eq!(packages(&events, InfoKind::Updating), vec!["powertop"]);
        assert_eq!(percentages(&events), vec![0, 50, 100]);
        assert_eq!(
            events.last(),
            Some(&TransactionEvent::Finished {
                exit: ExitKind::Success
            })
        );
        assert!(harness
            .store
            .is_updated(&PackageId::parse(POWERTOP).unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_repeated_ids_counted_once() {
        let mut harness = Harness::new();
        let (_, events) = harness
            .run(Operation::UpdatePackages {
                package_ids: ids(&[POWERTOP, POWERTOP]),
            })
            .await;
        assert_eq!(packages(&events, InfoKind::Downloading), vec!["powertop"]);
        assert_eq!(packages(&events, InfoKind::Updating), vec!["powertop"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_gated_on_signature_then_eula() {
        let mut harness = Harness::new();

        let (outcome, events) = harness.run(install(&[VIPS])).await;
        assert_eq!(outcome.terminal, TerminalState::Errored);
        assert_eq!(outcome.error, Some(ErrorCode::GpgFailure));
        assert!(matches!(
            events[0],
            TransactionEvent::RepoSignatureRequired(ref req) if req.key_id == "BB7576AC"
        ));
        assert!(!any_packages(&events));
        assert_ends_with_error(&events, ErrorCode::GpgFailure, ExitKind::Failed);

        let (outcome, _) = harness
            .run(Operation::InstallSignature {
                sig_type: SigType::Gpg,
                key_id: "BB7576AC".to_string(),
                package_id: VIPS.to_string(),
            })
            .await;
        assert!(outcome.is_success());

        let (outcome, events) = harness.run(install(&[VIPS])).await;
        assert_eq!(outcome.error, Some(ErrorCode::NoLicenseAgreement));
        assert!(matches!(
            events[0],
            TransactionEvent::EulaRequired(ref req) if req.eula_id == "eula_hughsie_dot_com"
        ));
        assert!(!any_packages(&events));
        assert_ends_with_error(&events, ErrorCode::NoLicenseAgreement, ExitKind::Failed);

        let (outcome, _) = harness
            .run(Operation::AcceptEula {
                eula_id: "eula_hughsie_dot_com".to_string(),
            })
            .await;
        assert!(outcome.is_success());

        let (outcome, events) = harness.run(install(&[VIPS])).await;
        assert!(outcome.is_success());
        assert_eq!(packages(&events, InfoKind::Downloading), vec!["vips-doc"]);
        assert_eq!(packages(&events, InfoKind::Installing), vec!["vips-doc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulled_package_gated() {
        const APP: &str = "app;1.0;noarch;fedora";
        let catalog = format!(
            r#"
[[packages]]
id = "{APP}"
summary = "Application"
pulls = ["{VIPS}"]

[[packages]]
id = "{VIPS}"
summary = "The vips documentation package."

[packages.signature]
repository_name = "updates"
key_url = "http://example.com/gpgkey"
key_userid = "Test Key (Fedora) fedora@example.com"
key_id = "BB7576AC"
key_fingerprint = "D8CC 06C2 77EC 9C53 372F C199 B1EE 1799 F24F 1B08"
key_timestamp = "2007-10-04"
sig_type = "gpg"

[packages.eula]
eula_id = "eula_vips"
vendor_name = "CATS Inc."
license_agreement = "All your base are belong to us."
"#
        );
        let mut harness = Harness::with_store(MemoryStore::from_toml(&catalog).unwrap());

        let (outcome, events) = harness.run(install(&[APP])).await;
        assert_eq!(outcome.error, Some(ErrorCode::GpgFailure));
        assert!(matches!(
            events[0],
            TransactionEvent::RepoSignatureRequired(ref req) if req.package_id.to_string() == VIPS
        ));
        assert!(!any_packages(&events));

        let (outcome, _) = harness
            .run(Operation::InstallSignature {
                sig_type: SigType::Gpg,
                key_id: "BB7576AC".to_string(),
                package_id: VIPS.to_string(),
            })
            .await;
        assert!(outcome.is_success());

        let (outcome, events) = harness.run(install(&[APP])).await;
        assert_eq!(outcome.error, Some(ErrorCode::NoLicenseAgreement));
        assert!(!any_packages(&events));

        let (outcome, _) = harness
            .run(Operation::AcceptEula {
                eula_id: "eula_vips".to_string(),
            })
            .await;
        assert!(outcome.is_success());

        let (outcome, events) = harness.run(install(&[APP])).await;
        assert!(outcome.is_success());
        assert_eq!(
            packages(&events, InfoKind::Installing),
            vec!["app", "vips-doc"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrequested_signature_rejected() {
        let mut harness = Harness::new();
        let (outcome, events) = harness
            .run(Operation::InstallSignature {
                sig_type: SigType::Gpg,
                key_id: "DEADBEEF".to_string(),
                package_id: VIPS.to_string(),
            })
            .await;
        assert_eq!(outcome.error, Some(ErrorCode::GpgFailure));
        assert_ends_with_error(&events, ErrorCode::GpgFailure, ExitKind::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_stream_invariants() {
        let mut harness = Harness::new();
        let (outcome, events) = harness.run(install(&[GTKHTML, GTKHTML_DEVEL])).await;

        assert!(outcome.is_success());
        assert_eq!(finished_count(&events), 1);
        assert_eq!(
            packages(&events, InfoKind::Installing),
            vec!["gtkhtml2", "gtkhtml2-devel"]
        );

        let seen = percentages(&events);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));

        // cancellation is withdrawn before anything is installed
        let disallowed = events
            .iter()
            .position(|e| *e == TransactionEvent::AllowCancel { allowed: false })
            .unwrap();
        let installing = events
            .iter()
            .position(|e| matches!(e, TransactionEvent::Package(r) if r.info == InfoKind::Installing))
            .unwrap();
        assert!(disallowed < installing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_unknown_package() {
        let mut harness = Harness::new();
        let (outcome, events) = harness.run(install(&["nothere;1;noarch;fedora"])).await;
        assert_eq!(outcome.terminal, TerminalState::Errored);
        assert_ends_with_error(&events, ErrorCode::InternalError, ExitKind::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_offline() {
        let mut harness = Harness::new();
        harness.network.set_online(false);

        let (outcome, events) = harness
            .run(Operation::RemovePackages {
                package_ids: ids(&[GLIB]),
                allow_deps: false,
                autoremove: false,
            })
            .await;

        assert_eq!(outcome.error, Some(ErrorCode::NoNetwork));
        assert_eq!(
            events[0],
            TransactionEvent::Status {
                status: StatusKind::Remove
            }
        );
        assert!(!any_packages(&events));
        assert_ends_with_error(&events, ErrorCode::NoNetwork, ExitKind::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_online() {
        let mut harness = Harness::new();
        let (outcome, events) = harness
            .run(Operation::RemovePackages {
                package_ids: ids(&[GLIB]),
                allow_deps: true,
                autoremove: false,
            })
            .await;
        assert!(outcome.is_success());
        assert_eq!(packages(&events, InfoKind::Removing), vec!["glib2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_updates_offline() {
        let mut harness = Harness::new();
        harness.network.set_online(false);
        let (_, events) = harness
            .run(Operation::GetUpdates {
                filters: FilterSet::none(),
            })
            .await;
        assert!(matches!(
            &events[events.len() - 2],
            TransactionEvent::ErrorCode { code: ErrorCode::NoNetwork, message }
                if message == "Cannot check when offline"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_system_then_refresh() {
        let mut harness = Harness::new();

        let (outcome, events) = harness.run(Operation::UpdateSystem).await;
        assert!(outcome.is_success());
        assert!(events.contains(&TransactionEvent::RequireRestart {
            restart: RestartKind::System,
            package_id: None,
        }));
        assert_eq!(
            packages(&events, InfoKind::Downloading),
            vec!["powertop", "kernel"]
        );
        assert_eq!(packages(&events, InfoKind::Blocked), vec!["gtkhtml2"]);
        assert_eq!(packages(&events, InfoKind::Installing), vec!["powertop"]);
        assert_eq!(packages(&events, InfoKind::Updating), vec!["kernel"]);
        assert!(packages(&events, InfoKind::Cleanup).is_empty());

        let (_, events) = harness
            .run(Operation::GetUpdates {
                filters: FilterSet::none(),
            })
            .await;
        let pending: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                TransactionEvent::Package(r) => Some(r.id.name().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(pending, vec!["gtkhtml2"]);

        // a second run only revisits what is still pending
        let (_, events) = harness.run(Operation::UpdateSystem).await;
        assert!(packages(&events, InfoKind::Downloading).is_empty());
        assert_eq!(packages(&events, InfoKind::Blocked), vec!["gtkhtml2"]);

        let (outcome, events) = harness.run(Operation::RefreshCache { force: true }).await;
        assert!(outcome.is_success());
        assert_eq!(percentages(&events).last(), Some(&100));

        let (_, events) = harness
            .run(Operation::GetUpdates {
                filters: FilterSet::none(),
            })
            .await;
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TransactionEvent::Package(_)))
                .count(),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_cancel_honoured_after_grace() {
        let mut harness = Harness::new();
        let grace = harness.engine.config().timing.cancel_grace();

        let (transaction, handle) = harness.engine.transaction(install(&[GTKHTML])).unwrap();
        assert_eq!(handle.cancel(), CancelRequest::Queued);

        let start = Instant::now();
        let outcome = transaction.run().await;
        assert!(start.elapsed() >= grace);

        assert_eq!(outcome.terminal, TerminalState::Cancelled);
        assert_eq!(outcome.error, Some(ErrorCode::TransactionCancelled));
        assert_eq!(handle.cancel(), CancelRequest::AlreadyFinished);

        let events = harness.drain(&outcome.transaction_id);
        assert!(packages(&events, InfoKind::Installing).is_empty());
        assert_ends_with_error(
            &events,
            ErrorCode::TransactionCancelled,
            ExitKind::Cancelled,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_accepted_while_allowed() {
        let harness = Harness::new();
        let tick = harness.engine.config().timing.search_name();

        let start = Instant::now();
        let (handle, join) = harness
            .engine
            .start(Operation::SearchName {
                filters: FilterSet::none(),
                text: "power".to_string(),
            })
            .unwrap();
        while !handle.is_cancel_allowed() {
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.cancel(), CancelRequest::Accepted);

        let outcome = join.await.unwrap();
        assert_eq!(outcome.terminal, TerminalState::Cancelled);
        assert!(start.elapsed() < tick);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_cancel_dropped_on_completion() {
        let mut harness = Harness::new();
        let (transaction, handle) = harness
            .engine
            .transaction(Operation::Resolve {
                filters: FilterSet::none(),
                names: ids(&["glib2"]),
            })
            .unwrap();
        assert_eq!(handle.cancel(), CancelRequest::Queued);

        let outcome = transaction.run().await;
        assert!(outcome.is_success());
        assert_eq!(outcome.error, None);
        let events = harness.drain(&outcome.transaction_id);
        assert_eq!(packages(&events, InfoKind::Installed), vec!["glib2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_transaction_rejected_while_running() {
        let harness = Harness::new();
        let (_handle, join) = harness.engine.start(install(&[GTKHTML])).unwrap();

        let Err(err) = harness.engine.transaction(Operation::GetDistroUpgrades) else {
            panic!("second transaction admitted while the first is running");
        };
        assert!(matches!(
            err,
            Error::Ops(OpsError::TransactionInProgress { .. })
        ));

        assert!(join.await.unwrap().is_success());
        assert!(harness.engine.active_transaction().is_none());
        assert!(harness
            .engine
            .transaction(Operation::GetDistroUpgrades)
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_labelled_with_role() {
        let mut harness = Harness::new();
        let (transaction, _handle) = harness
            .engine
            .transaction(Operation::GetDistroUpgrades)
            .unwrap();
        assert!(transaction.run().await.is_success());

        let mut roles = Vec::new();
        while let Ok(message) = harness.rx.try_recv() {
            roles.push(message.meta.labels.get("role").cloned());
        }
        assert!(!roles.is_empty());
        assert!(roles
            .iter()
            .all(|r| r.as_deref() == Some("get-distro-upgrades")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_id_reported() {
        let mut harness = Harness::new();
        let (outcome, events) = harness
            .run(Operation::GetDetails {
                package_ids: ids(&["powertop;1.8"]),
            })
            .await;
        assert_eq!(outcome.error, Some(ErrorCode::PackageIdInvalid));
        assert_ends_with_error(&events, ErrorCode::PackageIdInvalid, ExitKind::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_id_among_real_ones_reported() {
        let mut harness = Harness::new();
        let (outcome, events) = harness.run(install(&["", VIPS])).await;
        assert_eq!(outcome.error, Some(ErrorCode::PackageIdInvalid));
        assert!(!any_packages(&events));
        assert_ends_with_error(&events, ErrorCode::PackageIdInvalid, ExitKind::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_name_rendered_in_locale() {
        let mut harness = Harness::new();
        let (_, events) = harness
            .run(Operation::SearchName {
                filters: FilterSet::none(),
                text: "evince".to_string(),
            })
            .await;
        assert!(events.iter().any(|e| matches!(
            e,
            TransactionEvent::Package(r) if r.summary == "PDF Document viewer"
        )));

        let mut harness = Harness::with_locale("de_DE.utf8");
        let (_, events) = harness
            .run(Operation::SearchName {
                filters: FilterSet::none(),
                text: "evince".to_string(),
            })
            .await;
        assert!(events.iter().any(|e| matches!(
            e,
            TransactionEvent::Package(r) if r.summary == "PDF Dokument Ƥrŏgrȃɱ"
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_filters() {
        let mut harness = Harness::new();
        let (_, events) = harness
            .run(Operation::Resolve {
                filters: FilterSet::parse("~installed"),
                names: ids(&["glib2", "vips-doc"]),
            })
            .await;
        assert_eq!(packages(&events, InfoKind::Available), vec!["vips-doc"]);
        assert!(packages(&events, InfoKind::Installed).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_what_provides_after_ramp() {
        let mut harness = Harness::new();
        let (_, events) = harness
            .run(Operation::WhatProvides {
                filters: FilterSet::none(),
                kind: ProvidesKind::Codec,
                text: "gstreamer0.10(decoder-audio/x-wma)(wmaversion=3)".to_string(),
            })
            .await;

        let complete = events
            .iter()
            .position(|e| matches!(e, TransactionEvent::Percentage { percentage } if percentage.value() == Some(100)))
            .unwrap();
        let provider = events
            .iter()
            .position(|e| matches!(e, TransactionEvent::Package(_)))
            .unwrap();
        assert!(complete < provider);
        assert_eq!(
            packages(&events, InfoKind::Available),
            vec!["gstreamer-plugins-bad"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_media_repository_announced_disabled() {
        let mut harness = Harness::new();
        let (outcome, events) = harness
            .run(Operation::AddMediaRepository {
                location: "/media/usb0".to_string(),
                enabled: true,
            })
            .await;
        assert!(outcome.is_success());
        assert!(events.iter().any(|e| matches!(
            e,
            TransactionEvent::RepoDetail(repo) if repo.id == MEDIA_REPO_ID && !repo.enabled
        )));

        let (_, events) = harness
            .run(Operation::GetRepoList {
                filters: FilterSet::none(),
            })
            .await;
        let listed: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                TransactionEvent::RepoDetail(repo) => Some(repo.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(listed[0], MEDIA_REPO_ID);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_repo_still_finishes() {
        let mut harness = Harness::new();
        let (outcome, events) = harness
            .run(Operation::RepoEnable {
                repo_id: "nope".to_string(),
                enabled: true,
            })
            .await;
        assert!(outcome.is_success());
        assert!(events
            .iter()
            .any(|e| matches!(e, TransactionEvent::Message { .. })));
        assert_eq!(
            events.last(),
            Some(&TransactionEvent::Finished {
                exit: ExitKind::Success
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_writes_artifacts() {
        let mut harness = Harness::new();
        let dir = tempfile::tempdir().unwrap();
        let (outcome, events) = harness
            .run(Operation::DownloadPackages {
                package_ids: ids(&[POWERTOP]),
                directory: dir.path().to_path_buf(),
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(packages(&events, InfoKind::Downloading), vec!["powertop"]);
        let written = dir.path().join("powertop-1.8-1.fc8.rpm");
        assert!(events.contains(&TransactionEvent::Files {
            package_id: None,
            files: vec![written.display().to_string()],
        }));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "hello dave");
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_detail_after_one_tick() {
        let mut harness = Harness::new();
        let tick = harness.engine.config().timing.get_update_detail();
        let start = Instant::now();
        let (_, events) = harness
            .run(Operation::GetUpdateDetail {
                package_ids: ids(&[GTKHTML]),
            })
            .await;
        assert!(start.elapsed() >= tick - Duration::from_millis(1));
        assert!(events.iter().any(|e| matches!(
            e,
            TransactionEvent::UpdateDetail(detail) if detail.restart == RestartKind::Session
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_details_and_files() {
        let mut harness = Harness::new();
        let (_, events) = harness
            .run(Operation::GetDetails {
                package_ids: ids(&[POWERTOP, "unknown;1;noarch;nowhere"]),
            })
            .await;
        let details: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                TransactionEvent::Details(details) => Some(details.id.name()),
                _ => None,
            })
            .collect();
        assert_eq!(details, vec!["powertop"]);

        let (outcome, events) = harness
            .run(Operation::GetFiles {
                package_ids: ids(&[POWERTOP]),
            })
            .await;
        assert!(outcome.is_success());
        assert!(events.contains(&TransactionEvent::Files {
            package_id: Some(PackageId::parse(POWERTOP).unwrap()),
            files: ids(&["/usr/bin/powertop", "/usr/share/man/man1/powertop.1.gz"]),
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_depends_walk() {
        let mut harness = Harness::new();
        let names = |events: &[TransactionEvent]| -> Vec<String> {
            events
                .iter()
                .filter_map(|e| match e {
                    TransactionEvent::Package(result) => Some(result.id.name().to_string()),
                    _ => None,
                })
                .collect()
        };

        let (_, events) = harness
            .run(Operation::GetDepends {
                filters: FilterSet::none(),
                package_ids: ids(&[GTKHTML_DEVEL]),
                recursive: false,
            })
            .await;
        assert_eq!(names(&events), vec!["gtkhtml2"]);

        let (_, events) = harness
            .run(Operation::GetDepends {
                filters: FilterSet::none(),
                package_ids: ids(&[GTKHTML_DEVEL]),
                recursive: true,
            })
            .await;
        assert_eq!(names(&events), vec!["gtkhtml2", "gtk2", "glib2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_packages_and_distro_upgrades() {
        let mut harness = Harness::new();
        let (_, events) = harness
            .run(Operation::GetPackages {
                filters: FilterSet::parse("gui;~installed"),
            })
            .await;
        let available = packages(&events, InfoKind::Available);
        assert!(available.contains(&"gtkhtml2".to_string()));
        assert!(available.contains(&"scribus".to_string()));
        assert!(packages(&events, InfoKind::Installed).is_empty());

        let (_, events) = harness.run(Operation::GetDistroUpgrades).await;
        let upgrades: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                TransactionEvent::DistroUpgrade(upgrade) => Some(upgrade.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(upgrades, vec!["Fedora 9", "Fedora 10 RC1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acknowledged_operations_finish() {
        let mut harness = Harness::new();
        for operation in [
            Operation::InstallFiles {
                trusted: true,
                paths: vec!["/tmp/powertop-1.8-1.fc8.rpm".into()],
            },
            Operation::Rollback {
                transaction_id: "earlier".to_string(),
            },
            Operation::RepoSetData {
                repo_id: "fedora".to_string(),
                parameter: "gpgcheck".to_string(),
                value: "0".to_string(),
            },
        ] {
            let (outcome, events) = harness.run(operation).await;
            assert!(outcome.is_success());
            assert!(!any_packages(&events));
            assert_eq!(finished_count(&events), 1);
        }
        assert_eq!(
            harness.engine.repositories().parameter("fedora", "gpgcheck"),
            Some("0".to_string())
        );
    }
}
