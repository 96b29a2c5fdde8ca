//! Error types raised while validating campaigns and selecting candidates.

use thiserror::Error;

/// Malformed selection configuration, reported before any data is read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The travel radius was negative or not a finite number.
    #[error("maximum travel distance must be a finite, non-negative number of metres, got {meters}")]
    InvalidRadius {
        /// Radius supplied by the caller.
        meters: f64,
    },
    /// The minimum age exceeded the maximum age.
    #[error("minimum age {min_age} exceeds maximum age {max_age}")]
    InvertedAgeWindow {
        /// Lower bound supplied by the caller.
        min_age: u16,
        /// Upper bound supplied by the caller.
        max_age: u16,
    },
    /// The campaign location lies outside the WGS84 coordinate range.
    #[error("campaign location (lat {lat}, lon {lon}) is outside the WGS84 range")]
    InvalidLocation {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
    /// The campaign category was blank.
    #[error("campaign category must not be blank")]
    MissingCategory,
    /// The exclusion period was negative.
    #[error("exclusion period must not be negative")]
    NegativeExclusionPeriod,
    /// The exclusion period does not fit in a time delta.
    #[error("exclusion period of {hours} hours is out of range")]
    ExclusionPeriodOutOfRange {
        /// Requested period in hours.
        hours: u64,
    },
    /// The grid cell size was not finite or fell below the minimum.
    #[error("grid cell size must be at least 0.001 degrees, got {degrees}")]
    InvalidCellSize {
        /// Size supplied by the caller.
        degrees: f64,
    },
}

/// The population data source could not be read.
///
/// The engine never retries; retry policy belongs to the data source.
#[derive(Debug, Error)]
#[error("failed to retrieve the population snapshot")]
pub struct RetrievalError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl RetrievalError {
    /// Wrap a data-source failure.
    #[must_use]
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            source: source.into(),
        }
    }
}

/// Errors returned by [`ReachEngine`](crate::ReachEngine) operations.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The campaign or engine configuration was malformed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The population could not be read.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::error::Error as _;

    #[rstest]
    fn retrieval_error_keeps_its_source() {
        let err = RetrievalError::new("disk on fire");
        let source = err.source().expect("source should be attached");
        assert_eq!(source.to_string(), "disk on fire");
    }

    #[rstest]
    fn configuration_error_mentions_bounds() {
        let err = ConfigurationError::InvertedAgeWindow {
            min_age: 70,
            max_age: 30,
        };
        assert_eq!(err.to_string(), "minimum age 70 exceeds maximum age 30");
    }

    #[rstest]
    fn selection_error_is_transparent() {
        let err = SelectionError::from(ConfigurationError::MissingCategory);
        assert_eq!(err.to_string(), "campaign category must not be blank");
    }
}
