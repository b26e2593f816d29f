//! Integration tests for the trust gate

#[cfg(test)]
mod tests {
    use pkengine_trust::{GateDecision, TrustGate};
    use pkengine_types::{EulaRequirement, PackageId, SigType, TrustRequirements};

    fn eula_only(package: &str) -> TrustRequirements {
        TrustRequirements {
            signature: None,
            eula: Some(EulaRequirement {
                eula_id: "eula_hughsie_dot_com".to_string(),
                package_id: PackageId::parse(package).unwrap(),
                vendor_name: "CATS Inc.".to_string(),
                license_agreement: "Use it wisely.".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_acceptance_visible_across_tasks() {
        let gate = TrustGate::new();
        let reqs = eula_only("vips-doc;7.12.4-2.fc8;noarch;linva");
        assert!(matches!(gate.evaluate(&reqs), GateDecision::EulaRequired(_)));

        let writer = gate.clone();
        tokio::spawn(async move { writer.accept_eula("eula_hughsie_dot_com") })
            .await
            .unwrap();

        assert!(gate.is_eula_accepted("eula_hughsie_dot_com"));
        assert!(gate.evaluate(&reqs).is_proceed());
    }

    #[test]
    fn test_eula_acceptance_outlives_one_package() {
        let gate = TrustGate::new();
        gate.accept_eula("eula_hughsie_dot_com");

        // same licence attached to a different package is already accepted
        let other = eula_only("vips;7.12.4-2.fc8;i386;linva");
        assert_eq!(gate.evaluate(&other), GateDecision::Proceed);
    }

    #[test]
    fn test_no_requirements_proceed() {
        let gate = TrustGate::new();
        assert!(gate.evaluate(&TrustRequirements::none()).is_proceed());
        let glib = PackageId::parse("glib2;2.14.0;i386;fedora").unwrap();
        assert!(!gate.requires_signature(&glib));
        assert!(gate.accept_signature(SigType::Gpg, "BB7576AC", &glib).is_err());
    }
}
