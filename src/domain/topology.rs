//! Pipeline topology: which stage timestamps bound each leg, per provider.

use crate::domain::envelope::ORIGIN_STAGE;
use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Number of leg columns in every measurement row.
pub const LEG_COUNT: usize = 5;

pub const RG_1_API_GATEWAY: &str = "RG_1_API_Gateway_timestamp";
pub const RG_1_SQS_FORWARDER: &str = "RG_1_SQS_Forwarder_timestamp";
pub const RG_GOV_IMS_API_GATEWAY: &str = "RG_GOV_IMS_API_Gateway_timestamp";
pub const RG_GOV_IMS_CONVERTER: &str = "RG_GOV_IMS_Converter_timestamp";
pub const RG_GOV_IMS_ARCHIVER: &str = "RG_GOV_IMS_Archiver_timestamp";

/// Leg position in the measurement row (Leg 1 ..= Leg 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Leg(u8);

impl Leg {
    pub const ALL: [Leg; LEG_COUNT] = [Leg(1), Leg(2), Leg(3), Leg(4), Leg(5)];

    pub fn new(number: u8) -> Option<Self> {
        (1..=LEG_COUNT as u8).contains(&number).then_some(Leg(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based column index.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Column label used in reports ("Leg 1").
    pub fn label(self) -> String {
        format!("Leg {}", self.0)
    }
}

impl TryFrom<u8> for Leg {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Leg::new(value).ok_or_else(|| format!("leg must be between 1 and {LEG_COUNT}, got {value}"))
    }
}

impl From<Leg> for u8 {
    fn from(leg: Leg) -> Self {
        leg.0
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leg {}", self.0)
    }
}

/// The two stage timestamps that bound one leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegSpan {
    pub leg: Leg,
    pub from: String,
    pub to: String,
}

impl LegSpan {
    pub fn new(leg: Leg, from: &str, to: &str) -> Self {
        Self {
            leg,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Leg layout for one provider, plus where its records live in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLegSchema {
    pub name: String,
    pub prefix: String,
    pub legs: Vec<LegSpan>,
}

impl ProviderLegSchema {
    /// Five contiguous legs through the regional forwarder.
    pub fn aws() -> Self {
        let [l1, l2, l3, l4, l5] = Leg::ALL;
        Self {
            name: "AWS".to_string(),
            prefix: "aws-".to_string(),
            legs: vec![
                LegSpan::new(l1, ORIGIN_STAGE, RG_1_API_GATEWAY),
                LegSpan::new(l2, RG_1_API_GATEWAY, RG_1_SQS_FORWARDER),
                LegSpan::new(l3, RG_1_SQS_FORWARDER, RG_GOV_IMS_API_GATEWAY),
                LegSpan::new(l4, RG_GOV_IMS_API_GATEWAY, RG_GOV_IMS_CONVERTER),
                LegSpan::new(l5, RG_GOV_IMS_CONVERTER, RG_GOV_IMS_ARCHIVER),
            ],
        }
    }

    /// Direct submission to the governance gateway: legs 2 and 3 never exist.
    pub fn ibm() -> Self {
        let [l1, _, _, l4, l5] = Leg::ALL;
        Self {
            name: "IBM".to_string(),
            prefix: "ibm-".to_string(),
            legs: vec![
                LegSpan::new(l1, ORIGIN_STAGE, RG_GOV_IMS_API_GATEWAY),
                LegSpan::new(l4, RG_GOV_IMS_API_GATEWAY, RG_GOV_IMS_CONVERTER),
                LegSpan::new(l5, RG_GOV_IMS_CONVERTER, RG_GOV_IMS_ARCHIVER),
            ],
        }
    }

    pub fn defines(&self, leg: Leg) -> bool {
        self.legs.iter().any(|span| span.leg == leg)
    }
}

/// All provider schemas known to one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTopology {
    pub providers: Vec<ProviderLegSchema>,
}

impl Default for PipelineTopology {
    fn default() -> Self {
        Self {
            providers: vec![ProviderLegSchema::aws(), ProviderLegSchema::ibm()],
        }
    }
}

impl PipelineTopology {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let topology: PipelineTopology =
            toml::from_str(content).map_err(|e| ConfigError::InvalidTopology {
                reason: e.to_string(),
            })?;
        topology.validate()?;
        Ok(topology)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidTopology { reason };

        if self.providers.is_empty() {
            return Err(invalid("no providers defined".to_string()));
        }

        let mut names = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(invalid("provider name must not be empty".to_string()));
            }
            if !names.insert(provider.name.as_str()) {
                return Err(invalid(format!("duplicate provider {}", provider.name)));
            }

            let mut legs = HashSet::new();
            for span in &provider.legs {
                if !legs.insert(span.leg) {
                    return Err(invalid(format!(
                        "{} defined twice for {}",
                        span.leg, provider.name
                    )));
                }
                if span.from.trim().is_empty() || span.to.trim().is_empty() {
                    return Err(invalid(format!(
                        "{} of {} has an empty stage key",
                        span.leg, provider.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderLegSchema> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name.clone()).collect()
    }
}
