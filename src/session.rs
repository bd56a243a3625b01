//! Calculator session: owns both setups and routes edits through the engine

use std::fmt;

use tracing::{debug, info};

use crate::calculator::{self, FormattedMetrics};
use crate::models::{DerivedMetrics, FieldEdit, Mode, ResourceType, Setup, SetupId};

/// Everything the display surface needs to render one setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: SetupId,
    pub resource_type: ResourceType,
    pub resource_name: String,
    pub target_unit: &'static str,
    pub outputs: FormattedMetrics,
    pub is_winner: bool,
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    setups: [Setup; 2],
    metrics: [Option<DerivedMetrics>; 2],
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with default setups, both already calculated
    pub fn new() -> Self {
        let mut session = Self {
            mode: Mode::Single,
            setups: [Setup::default(), Setup::default()],
            metrics: [None, None],
        };
        for id in SetupId::ALL {
            session.recalculate(id);
        }
        session
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub fn setup(&self, id: SetupId) -> &Setup {
        &self.setups[id.index()]
    }

    pub fn metrics(&self, id: SetupId) -> Option<&DerivedMetrics> {
        self.metrics[id.index()].as_ref()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!(?mode, "switching mode");
        }
        self.mode = mode;
    }

    /// Apply one field edit and recalculate the affected setup.
    ///
    /// Returns the winner when in comparison mode.
    pub fn apply(&mut self, id: SetupId, edit: FieldEdit) -> Option<SetupId> {
        debug!(setup = %id, ?edit, "applying edit");
        self.setups[id.index()].apply(edit);
        self.recalculate(id);
        self.winner()
    }

    fn recalculate(&mut self, id: SetupId) {
        self.metrics[id.index()] = Some(calculator::compute(&mut self.setups[id.index()]));
    }

    /// Winning setup, only reported in comparison mode
    pub fn winner(&self) -> Option<SetupId> {
        if self.mode != Mode::Compare {
            return None;
        }
        let yield_per_minute =
            |id: SetupId| self.metrics(id).map_or(0.0, |metrics| metrics.yield_per_minute);
        calculator::compare(
            yield_per_minute(SetupId::First),
            yield_per_minute(SetupId::Second),
        )
    }

    /// Render data for one setup
    pub fn view(&self, id: SetupId) -> Option<CardView> {
        let setup = self.setup(id);
        let metrics = self.metrics(id)?;
        Some(CardView {
            id,
            resource_type: setup.resource_type,
            resource_name: setup.resource_name.clone(),
            target_unit: calculator::target_unit_label(setup.resource_type),
            outputs: FormattedMetrics::from(metrics),
            is_winner: self.winner() == Some(id),
        })
    }

    /// Cards visible in the current mode: only the first one in single mode
    pub fn visible_cards(&self) -> Vec<CardView> {
        let ids: &[SetupId] = match self.mode {
            Mode::Single => &[SetupId::First],
            Mode::Compare => &SetupId::ALL,
        };
        ids.iter().filter_map(|&id| self.view(id)).collect()
    }
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "=== Setup {} ({}", self.id, self.resource_type)?;
        if !self.resource_name.is_empty() {
            write!(f, ": {}", self.resource_name)?;
        }
        write!(f, ", target in {})", self.target_unit)?;
        if self.is_winner {
            write!(f, " [MOST EFFICIENT]")?;
        }
        writeln!(f, " ===")?;
        write!(f, "{}", self.outputs)
    }
}
