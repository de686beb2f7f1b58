use samo_linalg::RigidFitError;

/// Error types for the alignment engine.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// One of the input sequences has no points
    #[error("Cannot align empty sequences (lengths {len_a} and {len_b})")]
    EmptyInput {
        /// Length of the first sequence.
        len_a: usize,
        /// Length of the second sequence.
        len_b: usize,
    },

    /// The rigid fit could not produce a proper rotation
    #[error("Rigid fit failed: {0}")]
    Fit(#[from] RigidFitError),

    /// A correspondence does not fit the sequences it is used with
    #[error("Invalid correspondence: {0}")]
    InvalidCorrespondence(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A solution gives a translation but no rotation
    #[error("Solution has a translation but the rotation matrix is missing")]
    MissingRotation,

    /// A solution gives neither a correspondence nor a transform
    #[error("Solution has neither an alignment nor a translation")]
    MissingTransform,

    /// Consensus alignment needs at least two chains
    #[error("Consensus alignment needs at least 2 chains, got {0}")]
    ConsensusTooFewChains(usize),

    /// Error reading a configuration file
    #[error("error reading configuration file")]
    IoError(#[from] std::io::Error),

    /// Error decoding a configuration file
    #[error("error decoding configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
