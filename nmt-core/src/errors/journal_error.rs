/// Errors from the change journal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("append failed: {0}")]
    AppendFailed(String),

    #[error("sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("entry corrupted at sequence {sequence}: {reason}")]
    EntryCorrupted { sequence: u64, reason: String },

    #[error("meta record corrupted, sequence reset to 0")]
    MetaCorrupted,
}
