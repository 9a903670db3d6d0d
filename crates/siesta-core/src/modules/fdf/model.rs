use crate::domain::{BOHR_IN_ANGSTROM, CoordinateFormat};
use crate::text::parse_fortran_f64;
use serde::Serialize;
use std::collections::BTreeMap;

pub(crate) const LATTICE_CONSTANT_LABEL: &str = "LatticeConstant";
pub(crate) const COORDINATES_FORMAT_LABEL: &str = "AtomicCoordinatesFormat";
pub(crate) const SPECIES_BLOCK: &str = "ChemicalSpeciesLabel";
pub(crate) const LATTICE_VECTORS_BLOCK: &str = "LatticeVectors";
pub(crate) const COORDINATES_BLOCK: &str = "AtomicCoordinatesAndAtomicSpecies";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FdfValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl FdfValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FdfParameter {
    pub key: String,
    pub value: FdfValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FdfBlock {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Geometry derived from the three structural blocks of a deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FdfGeometry {
    /// Angstrom.
    pub lattice_constant: f64,
    pub species_labels: Option<Vec<String>>,
    /// Angstrom, already scaled by the lattice constant.
    pub lattice_vectors: Option<[[f64; 3]; 3]>,
    /// Raw block values, in the units named by `coordinates_format`.
    pub positions: Option<Vec<[f64; 3]>>,
    pub atom_labels: Option<Vec<String>>,
    pub coordinates_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FdfDeck {
    parameters: Vec<FdfParameter>,
    blocks: Vec<FdfBlock>,
}

/// FDF labels ignore case as well as `.`, `_` and `-`.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FdfDeck {
    pub fn new(parameters: Vec<FdfParameter>, blocks: Vec<FdfBlock>) -> Self {
        Self { parameters, blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.blocks.is_empty()
    }

    pub fn parameters(&self) -> &[FdfParameter] {
        &self.parameters
    }

    pub fn blocks(&self) -> &[FdfBlock] {
        &self.blocks
    }

    /// Last definition of a label wins.
    pub fn parameter(&self, label: &str) -> Option<&FdfParameter> {
        let wanted = normalize_label(label);
        self.parameters
            .iter()
            .rev()
            .find(|parameter| normalize_label(&parameter.key) == wanted)
    }

    pub fn value(&self, label: &str) -> Option<&FdfValue> {
        self.parameter(label).map(|parameter| &parameter.value)
    }

    pub fn block(&self, name: &str) -> Option<&FdfBlock> {
        let wanted = normalize_label(name);
        self.blocks
            .iter()
            .rev()
            .find(|block| normalize_label(&block.name) == wanted)
    }

    pub fn parameter_map(&self) -> BTreeMap<String, FdfValue> {
        self.parameters
            .iter()
            .map(|parameter| (parameter.key.clone(), parameter.value.clone()))
            .collect()
    }

    /// Lattice constant in Angstrom; 1.0 when not given.
    pub fn lattice_constant(&self) -> f64 {
        self.explicit_lattice_constant().unwrap_or(1.0)
    }

    /// Lattice constant in Angstrom, only when the deck sets a numeric one.
    pub fn explicit_lattice_constant(&self) -> Option<f64> {
        let parameter = self.parameter(LATTICE_CONSTANT_LABEL)?;
        let value = parameter.value.as_f64()?;
        Some(
            match parameter.unit.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("bohr") => value * BOHR_IN_ANGSTROM,
                Some("nm") => value * 10.0,
                _ => value,
            },
        )
    }

    pub fn coordinates_format(&self) -> Option<CoordinateFormat> {
        self.value(COORDINATES_FORMAT_LABEL)
            .and_then(FdfValue::as_str)
            .map(CoordinateFormat::from_label)
    }

    pub fn species_labels(&self) -> Option<Vec<String>> {
        let block = self.block(SPECIES_BLOCK)?;
        block.rows.iter().map(|row| row.get(2).cloned()).collect()
    }

    pub fn lattice_vectors(&self) -> Option<[[f64; 3]; 3]> {
        let block = self.block(LATTICE_VECTORS_BLOCK)?;
        if block.rows.len() < 3 {
            return None;
        }
        let scale = self.lattice_constant();
        let mut vectors = [[0.0; 3]; 3];
        for (vector, row) in vectors.iter_mut().zip(&block.rows) {
            let components = numeric_triplet(row)?;
            for (target, component) in vector.iter_mut().zip(components) {
                *target = component * scale;
            }
        }
        Some(vectors)
    }

    pub fn positions(&self) -> Option<Vec<[f64; 3]>> {
        let block = self.block(COORDINATES_BLOCK)?;
        block.rows.iter().map(|row| numeric_triplet(row)).collect()
    }

    /// Per-atom labels resolved through the species index column.
    pub fn atom_labels(&self) -> Option<Vec<String>> {
        let species = self.block(SPECIES_BLOCK)?;
        let coordinates = self.block(COORDINATES_BLOCK)?;
        let by_index: BTreeMap<&str, &str> = species
            .rows
            .iter()
            .filter_map(|row| Some((row.first()?.as_str(), row.get(2)?.as_str())))
            .collect();
        coordinates
            .rows
            .iter()
            .map(|row| {
                let index = row.get(3)?;
                by_index.get(index.as_str()).map(|label| (*label).to_string())
            })
            .collect()
    }

    pub fn geometry(&self) -> FdfGeometry {
        FdfGeometry {
            lattice_constant: self.lattice_constant(),
            species_labels: self.species_labels(),
            lattice_vectors: self.lattice_vectors(),
            positions: self.positions(),
            atom_labels: self.atom_labels(),
            coordinates_format: self
                .value(COORDINATES_FORMAT_LABEL)
                .and_then(FdfValue::as_str)
                .map(str::to_string),
        }
    }
}

fn numeric_triplet(row: &[String]) -> Option<[f64; 3]> {
    if row.len() < 3 {
        return None;
    }
    Some([
        parse_fortran_f64(&row[0])?,
        parse_fortran_f64(&row[1])?,
        parse_fortran_f64(&row[2])?,
    ])
}

#[cfg(test)]
mod tests {
    use super::normalize_label;
    use crate::domain::{BOHR_IN_ANGSTROM, CoordinateFormat};
    use crate::modules::fdf::parse_fdf;

    const SILICON_DECK: &str = "\
SystemLabel        si
NumberOfSpecies    1
LatticeConstant    2.0 Ang
AtomicCoordinatesFormat Fractional
%block ChemicalSpeciesLabel
  1  14  Si
  2   8  O
%endblock ChemicalSpeciesLabel
%block LatticeVectors
  1  0  0
  0  2  0
  0  0  3
%endblock LatticeVectors
%block AtomicCoordinatesAndAtomicSpecies
  0.00  0.00  0.00  1
  0.25  0.25  0.25  2
%endblock AtomicCoordinatesAndAtomicSpecies
";

    #[test]
    fn lattice_vectors_are_scaled_by_lattice_constant() {
        let deck = parse_fdf(SILICON_DECK);
        assert_eq!(deck.lattice_constant(), 2.0);
        assert_eq!(
            deck.lattice_vectors(),
            Some([[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 6.0]])
        );
    }

    #[test]
    fn lattice_constant_defaults_to_one_and_converts_bohr() {
        let deck = parse_fdf("%block LatticeVectors\n1 0 0\n0 1 0\n0 0 1\n%endblock LatticeVectors\n");
        assert_eq!(deck.lattice_constant(), 1.0);
        assert_eq!(deck.lattice_vectors().map(|v| v[1][1]), Some(1.0));

        assert_eq!(deck.explicit_lattice_constant(), None);

        let bohr = parse_fdf("LatticeConstant 10.0 Bohr\n");
        assert!((bohr.lattice_constant() - 10.0 * BOHR_IN_ANGSTROM).abs() < 1.0e-12);
    }

    #[test]
    fn derived_geometry_resolves_species_per_atom() {
        let geometry = parse_fdf(SILICON_DECK).geometry();
        assert_eq!(
            geometry.species_labels,
            Some(vec!["Si".to_string(), "O".to_string()])
        );
        assert_eq!(
            geometry.atom_labels,
            Some(vec!["Si".to_string(), "O".to_string()])
        );
        assert_eq!(
            geometry.positions,
            Some(vec![[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]])
        );
        assert_eq!(geometry.coordinates_format.as_deref(), Some("Fractional"));
    }

    #[test]
    fn label_lookup_ignores_case_and_separators() {
        assert_eq!(normalize_label("XC.Authors"), "xcauthors");
        assert_eq!(normalize_label("xc_authors"), "xcauthors");
        let deck = parse_fdf(SILICON_DECK);
        assert_eq!(
            deck.coordinates_format(),
            Some(CoordinateFormat::Fractional)
        );
        assert!(deck.value("system-label").is_some());
        assert!(deck.block("latticevectors").is_some());
    }

    #[test]
    fn malformed_lattice_block_yields_none() {
        let deck = parse_fdf("%block LatticeVectors\n1 0\n0 1 0\n%endblock LatticeVectors\n");
        assert!(deck.lattice_vectors().is_none());
    }
}
