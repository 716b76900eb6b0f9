use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("Configuration error on '{option}': {reason}")]
    Configuration { option: String, reason: String },

    #[error("Product not found in event: {0}")]
    ProductNotFound(String),

    #[error("Product '{0}' is stored with an unexpected type")]
    ProductTypeMismatch(String),

    #[error("Value map '{map}' has no entry for key {key}")]
    MissingValue { map: String, key: usize },

    #[error("Error during the effective area parsing: {0}")]
    EffectiveAreaParse(String),

    #[error("Invalid effective area table: {0}")]
    EffectiveAreaOrder(String),

    #[error("No object maps published by filler: {0}")]
    MissingObjectMap(String),

    #[error("Object map '{map}' cannot resolve key {key}")]
    UnresolvedReference { map: String, key: usize },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unable to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Unable to render run metadata: {0}")]
    MetadataRender(#[from] toml::ser::Error),
}

impl FillError {
    pub(crate) fn configuration(option: impl Into<String>, reason: impl Into<String>) -> Self {
        FillError::Configuration {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure comes from a misconfigured run rather than from event content.
    ///
    /// Configuration failures never depend on the event being processed: the run must be
    /// stopped, the configuration fixed, and the run restarted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FillError::Configuration { .. }
                | FillError::ConfigParse(_)
                | FillError::EffectiveAreaParse(_)
                | FillError::EffectiveAreaOrder(_)
                | FillError::MissingObjectMap(_)
        )
    }
}

impl PartialEq for FillError {
    fn eq(&self, other: &Self) -> bool {
        use FillError::*;
        match (self, other) {
            (
                Configuration {
                    option: a,
                    reason: ra,
                },
                Configuration {
                    option: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (ProductNotFound(a), ProductNotFound(b)) => a == b,
            (ProductTypeMismatch(a), ProductTypeMismatch(b)) => a == b,
            (MissingValue { map: a, key: ka }, MissingValue { map: b, key: kb }) => {
                a == b && ka == kb
            }
            (EffectiveAreaParse(a), EffectiveAreaParse(b)) => a == b,
            (EffectiveAreaOrder(a), EffectiveAreaOrder(b)) => a == b,
            (MissingObjectMap(a), MissingObjectMap(b)) => a == b,
            (
                UnresolvedReference { map: a, key: ka },
                UnresolvedReference { map: b, key: kb },
            ) => a == b && ka == kb,

            // not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (ConfigParse(_), ConfigParse(_)) => true,
            (MetadataRender(_), MetadataRender(_)) => true,

            _ => false,
        }
    }
}
