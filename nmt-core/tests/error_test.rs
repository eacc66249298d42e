use nmt_core::errors::{ErrorKind, GraphError, HashError, NmtError, StorageError};

#[test]
fn storage_not_found_classifies_as_not_found() {
    let err: NmtError = StorageError::NotFound("chunk:abc".into()).into();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn merkle_mismatch_classifies_as_integrity_failure() {
    let err: NmtError = HashError::MerkleMismatch {
        expected: "a".into(),
        computed: "b".into(),
    }
    .into();
    assert_eq!(err.kind(), ErrorKind::IntegrityFailure);
}

#[test]
fn graph_not_found_propagates_kind() {
    let err: NmtError = GraphError::NeuronNotFound("n1".into()).into();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn storage_io_error_is_transient() {
    let err: NmtError = StorageError::Io("disk busy".into()).into();
    assert!(err.is_transient());
}
