//! Typed archive records: run, method, system and calculation sections.
//!
//! Every field is set explicitly by the mapper; absent data stays `None` or
//! an empty vector and is skipped on serialization.

use crate::domain::{ParserResult, Quantity, SiestaError};
use crate::modules::fdf::FdfValue;
use crate::modules::xc::{EnergyField, FunctionalKind};
use serde::Serialize;
use std::collections::BTreeMap;

pub type Vector3 = [f64; 3];
pub type Matrix3 = [[f64; 3]; 3];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Archive {
    pub run: Run,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
}

impl Archive {
    pub fn to_json_pretty(&self) -> ParserResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| {
            SiestaError::internal(
                "SYS.ARCHIVE_SERIALIZE",
                format!("failed to serialize archive: {}", source),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    SinglePoint,
    GeometryOptimization,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Run {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
    pub time_run: TimeRun,
    pub methods: Vec<Method>,
    pub systems: Vec<System>,
    pub calculations: Vec<Calculation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub name: String,
    pub version: String,
}

/// Unix timestamps in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_end: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Method {
    pub input_parameters: BTreeMap<String, FdfValue>,
    pub simulation_parameters: BTreeMap<String, String>,
    pub dft: Dft,
    pub electrons_representation: Vec<BasisSetContainer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dft {
    pub xc_functional: XcFunctional,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XcFunctional {
    pub exchange: Vec<Functional>,
    pub correlation: Vec<Functional>,
    pub hybrid: Vec<Functional>,
    pub contributions: Vec<Functional>,
}

impl XcFunctional {
    /// Files the functional under the component its name tags it with.
    pub fn push(&mut self, name: &str) {
        let functional = Functional {
            name: name.to_string(),
        };
        match FunctionalKind::classify(name) {
            FunctionalKind::Exchange => self.exchange.push(functional),
            FunctionalKind::Correlation => self.correlation.push(functional),
            FunctionalKind::Hybrid => self.hybrid.push(functional),
            FunctionalKind::Contribution => self.contributions.push(functional),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exchange.is_empty()
            && self.correlation.is_empty()
            && self.hybrid.is_empty()
            && self.contributions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Functional {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasisSetContainer {
    #[serde(rename = "type")]
    pub kind: String,
    pub scope: Vec<String>,
    pub basis_set: Vec<BasisSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasisSet {
    #[serde(rename = "type")]
    pub kind: String,
    pub scope: Vec<String>,
}

impl BasisSetContainer {
    /// SIESTA expands wavefunctions in numerical atom-centered orbitals.
    pub fn numeric_atomic_orbitals() -> Self {
        Self {
            kind: "atom-centered orbitals".to_string(),
            scope: vec!["wavefunction".to_string()],
            basis_set: vec![BasisSet {
                kind: "numeric AOs".to_string(),
                scope: vec!["full-electron".to_string()],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct System {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atoms: Option<Atoms>,
    pub is_representative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Atoms {
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Quantity<Vec<Vector3>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lattice_vectors: Option<Quantity<Matrix3>>,
}

impl Atoms {
    pub fn len(&self) -> usize {
        self.positions
            .as_ref()
            .map_or(self.labels.len(), |positions| positions.value.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Calculation {
    /// Index into [`Run::systems`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_ref: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<Energy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forces: Option<Forces>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<Stress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multipoles: Vec<Multipoles>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scf_iterations: Vec<ScfIteration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dos_electronic: Vec<Dos>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Energy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<EnergyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<EnergyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xc: Option<EnergyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrostatic: Option<EnergyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuclear_repulsion: Option<EnergyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fermi: Option<Quantity<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributions: Vec<EnergyEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<EnergyEntry>,
}

impl Energy {
    pub fn set(&mut self, field: EnergyField, entry: EnergyEntry) {
        let slot = match field {
            EnergyField::Total => &mut self.total,
            EnergyField::Free => &mut self.free,
            EnergyField::Xc => &mut self.xc,
            EnergyField::Electrostatic => &mut self.electrostatic,
            EnergyField::NuclearRepulsion => &mut self.nuclear_repulsion,
        };
        *slot = Some(entry);
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: Quantity<f64>,
}

impl EnergyEntry {
    pub fn new(value: Quantity<f64>) -> Self {
        Self { kind: None, value }
    }

    pub fn named(kind: impl Into<String>, value: Quantity<f64>) -> Self {
        Self {
            kind: Some(kind.into()),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forces {
    pub total: ForcesEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForcesEntry {
    pub value: Quantity<Vec<Vector3>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stress {
    pub total: StressEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressEntry {
    pub value: Quantity<Matrix3>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Multipoles {
    pub kind: String,
    pub dipole: MultipolesEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipolesEntry {
    pub total: Quantity<Vector3>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScfIteration {
    pub energy: Energy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dos {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spin_channel: Option<usize>,
    pub spin_polarized: bool,
    pub energies: Quantity<Vec<f64>>,
    pub total: Vec<DosValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosValues {
    pub value: Quantity<Vec<f64>>,
}
