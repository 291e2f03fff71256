use serde::Deserialize;
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};

use crate::error::AppError;

// -- enums

/// Face recognition algorithm provided by the vision library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display, VariantNames)]
pub enum Algorithm {
    #[default]
    #[strum(serialize = "Fisher")]
    Fisher,

    #[strum(serialize = "Eigen")]
    Eigen,

    #[strum(serialize = "LBPH")]
    Lbph,
}

impl Algorithm {
    /// Human readable description, shown in logs
    pub const fn description(&self) -> &'static str {
        match self {
            Algorithm::Fisher => "Face recognition using the Fisher algorithm.",
            Algorithm::Eigen => "Face recognition using the Eigen algorithm.",
            Algorithm::Lbph => "Face recognition using the LBPH algorithm.",
        }
    }

    /// Parse the selector with the crate error type.
    ///
    /// Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        Algorithm::from_str(value).map_err(|_| {
            AppError::UnknownAlgorithm(format!(
                "{value:?}, expected one of {}",
                Algorithm::VARIANTS.join(", ")
            ))
        })
    }
}

/// Custom deserializer with helpful error message
pub fn deserialize_algorithm<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Algorithm::from_str(&value).map_err(|_| {
        let variants = Algorithm::VARIANTS;
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&value),
            &format!("one of {}", variants.join(", ")).as_str(),
        )
    })
}
