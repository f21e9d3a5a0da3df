//! Isotopic-system registry.
//!
//! A single immutable table keyed by the canonical system identifier
//! (`"238U-206Pb"`, ...). Decay constants `λ = ln(2) / half-life` are computed
//! and validated once when the registry is first built; lookups afterwards are
//! plain exact-match reads.

use std::sync::OnceLock;

use serde::Serialize;

use crate::error::AgeError;

/// Identifier of the 238U → 206Pb system (concordia y axis).
pub const U238_PB206: &str = "238U-206Pb";

/// Identifier of the 235U → 207Pb system (concordia x axis).
pub const U235_PB207: &str = "235U-207Pb";

/// One tabulated decay scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsotopicSystem {
    pub id: &'static str,
    pub reaction: &'static str,
    pub half_life_years: f64,
    /// `ln(2) / half_life_years`, in years⁻¹.
    pub decay_constant: f64,
    pub source: &'static str,
}

/// (id, reaction, half-life in years, source)
const SYSTEMS: [(&str, &str, f64, &str); 9] = [
    ("40K-40Ar", "40K → 40Ar", 1_248_000_000.0, "Steiger & Jäger (1977)"),
    ("40K-40Ca", "40K → 40Ca", 1_248_000_000.0, "Steiger & Jäger (1977)"),
    ("87Rb-87Sr", "87Rb → 87Sr", 48_800_000_000.0, "Steiger & Jäger (1977)"),
    ("147Sm-143Nd", "147Sm → 143Nd", 106_000_000_000.0, "Lugmair & Marti (1978)"),
    (U238_PB206, "238U → 206Pb", 4_468_000_000.0, "Jaffey et al. (1971)"),
    (U235_PB207, "235U → 207Pb", 703_800_000.0, "Jaffey et al. (1971)"),
    ("176Lu-176Hf", "176Lu → 176Hf", 37_800_000_000.0, "Söderlund et al. (2004)"),
    ("187Re-187Os", "187Re → 187Os", 41_600_000_000.0, "Smoliar et al. (1996)"),
    ("14C-14N", "14C → 14N", 5_730.0, "Radiocarbon community"),
];

/// Decay constant for a half-life: `λ = ln(2) / half_life`.
pub fn decay_constant(half_life_years: f64) -> Result<f64, AgeError> {
    if !(half_life_years.is_finite() && half_life_years > 0.0) {
        return Err(AgeError::invalid(format!(
            "half-life must be finite and > 0 (got {half_life_years})"
        )));
    }
    let lambda = std::f64::consts::LN_2 / half_life_years;
    if !(lambda.is_finite() && lambda > 0.0) {
        return Err(AgeError::invalid(format!(
            "decay constant for half-life {half_life_years} is not a positive finite number"
        )));
    }
    Ok(lambda)
}

/// Lookup table of the supported isotopic systems.
#[derive(Debug, Clone)]
pub struct DecayRegistry {
    systems: Vec<IsotopicSystem>,
}

impl DecayRegistry {
    /// Build the registry from the built-in table.
    pub fn standard() -> Result<Self, AgeError> {
        let systems = SYSTEMS
            .iter()
            .map(|&(id, reaction, half_life_years, source)| {
                Ok(IsotopicSystem {
                    id,
                    reaction,
                    half_life_years,
                    decay_constant: decay_constant(half_life_years)?,
                    source,
                })
            })
            .collect::<Result<Vec<_>, AgeError>>()?;
        Ok(Self { systems })
    }

    /// Exact-match lookup by identifier.
    pub fn get(&self, id: &str) -> Result<&IsotopicSystem, AgeError> {
        self.systems
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AgeError::UnknownSystem(id.to_string()))
    }

    /// All systems in table order.
    pub fn systems(&self) -> &[IsotopicSystem] {
        &self.systems
    }
}

static REGISTRY: OnceLock<Result<DecayRegistry, AgeError>> = OnceLock::new();

/// Process-wide registry, built and validated on first use.
pub fn registry() -> Result<&'static DecayRegistry, AgeError> {
    REGISTRY
        .get_or_init(DecayRegistry::standard)
        .as_ref()
        .map_err(|e| e.clone())
}

/// Convenience: look up a system in the process-wide registry.
pub fn lookup(id: &str) -> Result<&'static IsotopicSystem, AgeError> {
    registry()?.get(id)
}
