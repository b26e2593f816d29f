//! Integration tests for error types

#[cfg(test)]
mod tests {
    use pkengine_errors::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = OpsError::NoNetwork {
            message: "Cannot check when offline".into(),
        }
        .into();
        assert!(matches!(err, Error::Ops(_)));
        assert_eq!(err.code(), ErrorCode::NoNetwork);
    }

    #[test]
    fn test_trust_errors_map_to_codes() {
        let sig: Error = TrustError::SignatureRequired {
            package_id: "vips-doc;7.12.4-2.fc8;noarch;linva".into(),
        }
        .into();
        assert_eq!(sig.code(), ErrorCode::GpgFailure);

        let key: Error = TrustError::KeyNotRecognised {
            key_id: "DEADBEEF".into(),
            package_id: "vips-doc;7.12.4-2.fc8;noarch;linva".into(),
        }
        .into();
        assert_eq!(key.code(), ErrorCode::GpgFailure);

        let eula: Error = TrustError::EulaRequired {
            eula_id: "eula_hughsie_dot_com".into(),
            package_id: "vips-doc;7.12.4-2.fc8;noarch;linva".into(),
        }
        .into();
        assert_eq!(eula.code(), ErrorCode::NoLicenseAgreement);
    }

    #[test]
    fn test_parse_error_code() {
        let err: Error = PackageError::WrongFieldCount {
            input: "glib2;2.14.0".into(),
            found: 2,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::PackageIdInvalid);
        assert_eq!(
            err.to_string(),
            "package error: invalid package id 'glib2;2.14.0': expected 4 fields, found 2"
        );
    }

    #[test]
    fn test_cancelled_display() {
        let err: Error = OpsError::TransactionCancelled.into();
        assert_eq!(err.code(), ErrorCode::TransactionCancelled);
        assert_eq!(err.user_message(), "the task was stopped successfully");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io { path: None, .. }));
        assert!(err.is_retryable());
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ErrorCode::GpgFailure.to_string(), "gpg-failure");
        assert_eq!(ErrorCode::NoLicenseAgreement.as_str(), "no-license-agreement");
    }
}
