//! Integration tests for store crate

#[cfg(test)]
mod tests {
    use pkengine_errors::{Error, StoreError};
    use pkengine_store::*;
    use pkengine_types::{InfoKind, PackageId, ProvidesKind};
    use tempfile::tempdir;
    use tokio::fs;

    fn id(text: &str) -> PackageId {
        PackageId::parse(text).unwrap()
    }

    fn names(records: &[PackageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.name()).collect()
    }

    #[test]
    fn test_resolve_by_name() {
        let store = MemoryStore::sample().unwrap();
        let glib = store.resolve("glib2");
        assert_eq!(glib.len(), 1);
        assert_eq!(glib[0].state(), InfoKind::Installed);

        let vips = store.resolve("vips-doc");
        assert_eq!(vips[0].state(), InfoKind::Available);
        assert!(store.resolve("vips").is_empty());
    }

    #[test]
    fn test_search_kinds() {
        let store = MemoryStore::sample().unwrap();
        assert_eq!(
            names(&store.search(SearchKind::Name, "gtkhtml")),
            vec!["gtkhtml2", "gtkhtml2-devel"]
        );
        assert!(names(&store.search(SearchKind::Details, "documentation")).contains(&"vips-doc"));
        assert_eq!(names(&store.search(SearchKind::Group, "games")), vec!["bǣwulf-utf8"]);
        assert!(store.search(SearchKind::Group, "no-such-group").is_empty());
        assert_eq!(
            names(&store.search(SearchKind::File, "gnome-power-manager.1.gz")),
            vec!["gnome-power-manager"]
        );
    }

    #[test]
    fn test_localized_summary() {
        let store = MemoryStore::sample().unwrap();
        let evince = store.lookup(&id("evince;0.9.3-5.fc8;i386;installed")).unwrap();
        assert_eq!(
            evince.result(InfoKind::Installed, "en_GB.utf8").summary,
            "PDF Document viewer"
        );
        let localized = evince.result(InfoKind::Installed, "de_DE.utf8");
        assert_eq!(localized.summary, "PDF Dokument Ƥrŏgrȃɱ");
        // identity unaffected by locale
        assert_eq!(localized.id, evince.id);
    }

    #[test]
    fn test_depends_and_requires() {
        let store = MemoryStore::sample().unwrap();
        let gtkhtml = id("gtkhtml2;2.19.1-4.fc8;i386;fedora");

        assert_eq!(names(&store.depends(&gtkhtml, false)), vec!["gtk2"]);
        assert_eq!(names(&store.depends(&gtkhtml, true)), vec!["gtk2", "glib2"]);

        let glib = id("glib2;2.14.0;i386;fedora");
        let direct = store.requires(&glib, false);
        assert_eq!(names(&direct), vec!["powertop", "gtk2"]);
        let all = store.requires(&glib, true);
        assert!(names(&all).contains(&"evince"));
    }

    #[test]
    fn test_what_provides() {
        let store = MemoryStore::sample().unwrap();
        let found = store.what_provides(
            ProvidesKind::Codec,
            "gstreamer0.10(decoder-audio/x-wma)(wmaversion=3)",
        );
        assert_eq!(names(&found), vec!["gstreamer-plugins-bad"]);

        let fallback = store.what_provides(ProvidesKind::Any, "something-else");
        assert_eq!(names(&fallback), vec!["evince", "scribus"]);
    }

    #[test]
    fn test_trust_and_install_plan() {
        let store = MemoryStore::sample().unwrap();
        let vips = id("vips-doc;7.12.4-2.fc8;noarch;linva");
        let reqs = store.trust_requirements(&vips);
        assert_eq!(reqs.signature.unwrap().key_id, "BB7576AC");
        assert_eq!(reqs.eula.unwrap().vendor_name, "CATS Inc.");
        assert!(store
            .trust_requirements(&id("glib2;2.14.0;i386;fedora"))
            .is_empty());

        let plan = store
            .install_plan(&[id("gtkhtml2;2.19.1-4.fc8;i386;fedora")])
            .unwrap();
        assert_eq!(names(&plan.targets), vec!["gtkhtml2"]);
        assert_eq!(names(&plan.derived), vec!["gtkhtml2-devel"]);
    }

    #[tokio::test]
    async fn test_artifact_writer() {
        let store = MemoryStore::sample().unwrap();
        let dir = tempdir().unwrap();
        let artifact = store
            .artifact(&id("powertop;1.8-1.fc8;i386;fedora"))
            .unwrap();

        let path = FsArtifactWriter::new()
            .write(dir.path(), &artifact)
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("powertop-1.8-1.fc8.rpm"));
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "hello dave");
    }

    #[tokio::test]
    async fn test_artifact_writer_missing_destination() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let artifact = Artifact {
            file_name: "x.rpm".to_string(),
            bytes: b"x".to_vec(),
        };
        let err = FsArtifactWriter::new()
            .write(&missing, &artifact)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::DestinationMissing { .. })
        ));
    }

    #[test]
    fn test_static_probes() {
        let network = StaticNetwork::new(true);
        assert!(network.is_online());
        network.clone().set_online(false);
        assert!(!network.is_online());
        assert_eq!(FixedLocale::new("en_GB.utf8").locale(), "en_GB.utf8");
    }
}
