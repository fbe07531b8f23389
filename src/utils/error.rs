use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgenyError {
    #[error("Could not reach {service}: {source}")]
    ConnectionError {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unexpected response from {endpoint}: HTTP {status}")]
    HttpStatusError { endpoint: String, status: u16 },

    #[error("Collection '{name}' does not exist")]
    CollectionNotFound { name: String },

    #[error("Collection '{name}' has no {missing}")]
    EmptyCollection { name: String, missing: String },

    #[error("Species of samples in collection '{name}' is not annotated")]
    MissingSpecies { name: String },

    #[error("PROGENy matrix is not available for species '{species}'")]
    UnsupportedSpecies { species: String },

    #[error("Could not obtain PROGENy matrix for {species}: {reason}")]
    PathwayModelUnavailable { species: String, reason: String },

    #[error("No genes are shared between the dataset and the PROGENy matrix")]
    NoMatchingGenes,

    #[error("Matrix shape mismatch: {message}")]
    ShapeError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Repository,
    PathwayModel,
    Data,
    Configuration,
    System,
}

impl ProgenyError {
    /// Wraps a transport error, separating unreachable hosts from other failures.
    pub fn from_transport(service: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ProgenyError::ConnectionError {
                service: service.to_string(),
                source: err,
            }
        } else {
            ProgenyError::ApiError(err)
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProgenyError::ConnectionError { .. }
            | ProgenyError::ApiError(_)
            | ProgenyError::HttpStatusError { .. } => ErrorCategory::Network,
            ProgenyError::CollectionNotFound { .. }
            | ProgenyError::EmptyCollection { .. }
            | ProgenyError::MissingSpecies { .. } => ErrorCategory::Repository,
            ProgenyError::UnsupportedSpecies { .. }
            | ProgenyError::PathwayModelUnavailable { .. }
            | ProgenyError::NoMatchingGenes => ErrorCategory::PathwayModel,
            ProgenyError::ShapeError { .. }
            | ProgenyError::CsvError(_)
            | ProgenyError::SerializationError(_)
            | ProgenyError::ProcessingError { .. } => ErrorCategory::Data,
            ProgenyError::ConfigValidationError { .. }
            | ProgenyError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ProgenyError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProgenyError::ConnectionError { service, source } => format!(
                "There was a problem connecting to the {}. Please try again later.\n{}",
                service, source
            ),
            ProgenyError::CollectionNotFound { name } => format!(
                "Collection named '{}' does not exist.\nPlease select an existing dataset name.",
                name
            ),
            ProgenyError::EmptyCollection { name, missing } => format!(
                "Collection named '{}' has no {}.\nPlease select another dataset.",
                name, missing
            ),
            ProgenyError::MissingSpecies { name } => format!(
                "Could not determine the species of samples in collection '{}'.",
                name
            ),
            ProgenyError::UnsupportedSpecies { species } => format!(
                "There was a problem getting PROGENy matrix for {}.\nPlease try another dataset with samples from 'Homo sapiens'.",
                species
            ),
            ProgenyError::PathwayModelUnavailable { species, reason } => format!(
                "There was a problem getting PROGENy matrix for {}.\nPlease try another dataset with samples from 'Homo sapiens'.\n{}",
                species, reason
            ),
            ProgenyError::NoMatchingGenes => {
                "None of the genes in the dataset appear in the PROGENy matrix.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the repository URL",
            ErrorCategory::Repository => "Check the collection name on the repository",
            ErrorCategory::PathwayModel => "Use a dataset of human samples with gene symbols",
            ErrorCategory::Data => "The downloaded data is malformed; try another dataset",
            ErrorCategory::Configuration => "Fix the command line arguments or the config file",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProgenyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collection_message() {
        let err = ProgenyError::CollectionNotFound {
            name: "demo".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Repository);
        assert_eq!(
            err.user_friendly_message(),
            "Collection named 'demo' does not exist.\nPlease select an existing dataset name."
        );
    }

    #[test]
    fn test_unsupported_species_message() {
        let err = ProgenyError::UnsupportedSpecies {
            species: "Mus musculus".to_string(),
        };
        assert!(err
            .user_friendly_message()
            .starts_with("There was a problem getting PROGENy matrix for Mus musculus."));
        assert_eq!(err.category(), ErrorCategory::PathwayModel);
    }

    #[test]
    fn test_model_unavailable_message_keeps_cause() {
        let err = ProgenyError::PathwayModelUnavailable {
            species: "Homo sapiens".to_string(),
            reason: "Unexpected response from http://x/annotations: HTTP 500".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::PathwayModel);
        assert_eq!(
            err.user_friendly_message(),
            "There was a problem getting PROGENy matrix for Homo sapiens.\n\
             Please try another dataset with samples from 'Homo sapiens'.\n\
             Unexpected response from http://x/annotations: HTTP 500"
        );
    }
}
