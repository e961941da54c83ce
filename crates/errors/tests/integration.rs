//! Integration tests for error types

#[cfg(test)]
mod tests {
    use bgdl_errors::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = TransferError::Enumeration {
            message: "service unavailable".into(),
        }
        .into();
        assert!(matches!(
            err,
            Error::Transfer(TransferError::Enumeration { .. })
        ));
        assert!(err.as_transfer().is_some());
    }

    #[test]
    fn test_error_display() {
        let err = TransferError::DestinationResolution {
            uri: "file:///readonly/f.bin".into(),
            reason: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot resolve destination file:///readonly/f.bin: permission denied"
        );
    }

    #[test]
    fn test_user_codes_are_stable() {
        let err: Error = TransferError::DestinationResolution {
            uri: "x".into(),
            reason: "y".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("transfer.destination_resolution"));

        let err: Error = TransferError::Cancelled { uri: "x".into() }.into();
        assert_eq!(err.user_code(), Some("transfer.cancelled"));

        let err: Error = NetworkError::HttpError {
            status: 404,
            message: "Not Found".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("network.http_error"));
        assert_eq!(err.http_status(), Some(404));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transfer_failure_retryable_by_status() {
        let server_side = TransferError::TransferFailure {
            uri: "https://example.com/f.bin".into(),
            status: Some(503),
            message: "Service Unavailable".into(),
        };
        assert!(server_side.is_retryable());
        assert!(server_side.user_hint().is_some());

        let client_side = TransferError::TransferFailure {
            uri: "https://example.com/f.bin".into(),
            status: Some(403),
            message: "Forbidden".into(),
        };
        assert!(!client_side.is_retryable());
        assert_eq!(client_side.uri(), Some("https://example.com/f.bin"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert_eq!(err.user_code(), Some("error.io"));
    }

    #[test]
    fn test_error_clone() {
        let err = TransferError::Cancellation {
            uri: "https://example.com/f.bin".into(),
            message: "host refused".into(),
        };
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
