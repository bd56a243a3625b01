//! Data models for extraction setups and their derived metrics

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::Error;

/// Kind of resource being extracted. Gas targets are counted in units, the rest in m³.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResourceType {
    #[default]
    Ore,
    Ice,
    Gas,
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ore" => Ok(Self::Ore),
            "ice" => Ok(Self::Ice),
            "gas" => Ok(Self::Gas),
            _ => Err(Error::UnknownResourceType(s.to_string())),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ore => write!(f, "ore"),
            Self::Ice => write!(f, "ice"),
            Self::Gas => write!(f, "gas"),
        }
    }
}

/// One extraction configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub resource_type: ResourceType,
    pub resource_name: String,
    pub num_modules: u32,
    pub yield_per_cycle: f64,  // m³ per module per cycle
    pub cycle_time: f64,       // seconds
    pub residue_percentage: f64,
    pub target_volume: f64,    // m³, or units for gas
    pub unit_size: f64,        // m³ per unit, gas only
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            resource_type: ResourceType::Ore,
            resource_name: String::new(),
            num_modules: 1,
            yield_per_cycle: 100.0,
            cycle_time: 60.0,
            residue_percentage: 0.0,
            target_volume: 10_000.0,
            unit_size: 1.0,
        }
    }
}

impl Setup {
    /// Apply a single field edit reported by the input surface
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::ResourceType(value) => self.resource_type = value,
            FieldEdit::ResourceName(value) => self.resource_name = value,
            FieldEdit::NumModules(value) => self.num_modules = value,
            FieldEdit::YieldPerCycle(value) => self.yield_per_cycle = value,
            FieldEdit::CycleTime(value) => self.cycle_time = value,
            FieldEdit::ResiduePercentage(value) => self.residue_percentage = value,
            FieldEdit::TargetVolume(value) => self.target_volume = value,
            FieldEdit::UnitSize(value) => self.unit_size = value,
        }
    }
}

/// A value that is either finite or can never be reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounded<T> {
    Finite(T),
    Unbounded,
}

impl<T: Copy> Bounded<T> {
    pub fn finite(self) -> Option<T> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Unbounded => None,
        }
    }

    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Bounded<U> {
        match self {
            Self::Finite(value) => Bounded::Finite(f(value)),
            Self::Unbounded => Bounded::Unbounded,
        }
    }
}

/// Result of one engine run. Replaced wholesale on every recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub total_yield_per_cycle: f64,
    pub effective_yield_per_cycle: f64,
    pub yield_per_minute: f64,
    pub total_cycles: Bounded<f64>, // whole number of cycles
    pub total_seconds: Bounded<f64>,
    pub total_residue: Bounded<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupId {
    First,
    Second,
}

impl SetupId {
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl FromStr for SetupId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::First),
            "2" => Ok(Self::Second),
            _ => Err(Error::InvalidSetupId(s.to_string())),
        }
    }
}

impl fmt::Display for SetupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Single,
    Compare,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "compare" => Ok(Self::Compare),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// A single field change coming from the input surface
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    ResourceType(ResourceType),
    ResourceName(String),
    NumModules(u32),
    YieldPerCycle(f64),
    CycleTime(f64),
    ResiduePercentage(f64),
    TargetVolume(f64),
    UnitSize(f64),
}

impl FieldEdit {
    /// Build an edit from a field name and its raw text value.
    ///
    /// Field names are accepted in camelCase or kebab-case. Numeric fields never fail:
    /// empty or non-numeric input becomes 0.
    pub fn parse(field: &str, raw: &str) -> Result<Self, Error> {
        let edit = match normalize_field_name(field).as_str() {
            "resourcetype" => Self::ResourceType(raw.parse()?),
            "resourcename" => Self::ResourceName(raw.to_string()),
            "nummodules" => Self::NumModules(coerce_count(raw)),
            "yieldpercycle" => Self::YieldPerCycle(coerce_number(raw)),
            "cycletime" => Self::CycleTime(coerce_number(raw)),
            "residuepercentage" => Self::ResiduePercentage(coerce_number(raw)),
            "targetvolume" => Self::TargetVolume(coerce_number(raw)),
            "unitsize" => Self::UnitSize(coerce_number(raw)),
            _ => return Err(Error::UnknownField(field.to_string())),
        };
        Ok(edit)
    }

    /// Parse a `field=value` pair as given on the command line
    pub fn parse_pair(pair: &str) -> Result<Self, Error> {
        let (field, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::MalformedEdit(pair.to_string()))?;
        Self::parse(field.trim(), raw.trim())
    }
}

fn normalize_field_name(field: &str) -> String {
    field
        .chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Parse a numeric input, treating anything unparseable or non-finite as 0
pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Parse a module count. Negatives land on 0, fractions truncate.
pub fn coerce_count(raw: &str) -> u32 {
    // Saturating cast
    coerce_number(raw) as u32
}
