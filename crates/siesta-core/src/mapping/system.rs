use super::MappingContext;
use crate::archive::{Atoms, Matrix3, System, Vector3};
use crate::domain::{BOHR_IN_ANGSTROM, CoordinateFormat, Diagnostics, Quantity, Unit};
use crate::modules::output::names;
use crate::text::{Extraction, Value};

/// Label given to synthesized atoms when only the atom count is known.
pub(crate) const PLACEHOLDER_LABEL: &str = "X";

struct RawCoordinates {
    labels: Vec<String>,
    positions: Vec<Vector3>,
    format: CoordinateFormat,
}

pub(super) fn map_system(
    region: &Extraction,
    context: &MappingContext<'_>,
    diagnostics: &mut Diagnostics,
) -> System {
    let lattice_vectors = region
        .rows(names::LATTICE_VECTORS)
        .and_then(|rows| to_matrix(&rows))
        .or_else(|| context.deck.and_then(|deck| deck.lattice_vectors()));

    let mut atoms = Atoms {
        lattice_vectors: lattice_vectors.map(|vectors| Quantity::new(vectors, Unit::Angstrom)),
        ..Atoms::default()
    };

    match log_coordinates(region).or_else(|| deck_coordinates(context)) {
        Some(raw) => {
            let positions = to_angstrom(
                raw.positions,
                &raw.format,
                lattice_vectors,
                context,
                diagnostics,
            );
            atoms.labels = raw.labels;
            atoms.positions = Some(Quantity::new(positions, Unit::Angstrom));
        }
        None => {
            if let Some(count) = context.atom_count(region).filter(|count| *count > 0) {
                atoms.labels = vec![PLACEHOLDER_LABEL.to_string(); count];
                atoms.positions = Some(Quantity::new(vec![[0.0; 3]; count], Unit::Angstrom));
            }
        }
    }

    let has_atoms =
        !atoms.labels.is_empty() || atoms.positions.is_some() || atoms.lattice_vectors.is_some();
    System {
        atoms: has_atoms.then_some(atoms),
        is_representative: true,
    }
}

/// Coordinates printed in the region's `outcoor:` block; Angstrom unless the
/// block says otherwise.
fn log_coordinates(region: &Extraction) -> Option<RawCoordinates> {
    let atoms = region.record(names::ATOMS)?;
    let positions = atoms
        .rows(names::POSITIONS)
        .filter(|rows| !rows.is_empty())?
        .iter()
        .map(|row| to_vector(row))
        .collect::<Option<Vec<_>>>()?;
    Some(RawCoordinates {
        labels: atoms
            .list(names::LABELS)
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        positions,
        format: atoms
            .text(names::COORDINATES_FORMAT)
            .map_or(CoordinateFormat::Angstrom, CoordinateFormat::from_label),
    })
}

/// Coordinates from the input deck; SIESTA reads them as Bohr unless
/// `AtomicCoordinatesFormat` is given.
fn deck_coordinates(context: &MappingContext<'_>) -> Option<RawCoordinates> {
    let deck = context.deck?;
    let positions = deck.positions().filter(|positions| !positions.is_empty())?;
    Some(RawCoordinates {
        labels: deck.atom_labels().unwrap_or_default(),
        positions,
        format: deck.coordinates_format().unwrap_or(CoordinateFormat::Bohr),
    })
}

/// Converts to Angstrom where the format allows it. When it does not, the
/// positions are kept as printed and a warning is recorded.
fn to_angstrom(
    positions: Vec<Vector3>,
    format: &CoordinateFormat,
    lattice_vectors: Option<Matrix3>,
    context: &MappingContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<Vector3> {
    match format {
        CoordinateFormat::Angstrom => positions,
        CoordinateFormat::Bohr => scale_all(positions, BOHR_IN_ANGSTROM),
        CoordinateFormat::ScaledCartesian => {
            match context.deck.and_then(|deck| deck.explicit_lattice_constant()) {
                Some(scale) => scale_all(positions, scale),
                None => {
                    diagnostics.warn(
                        "SYSTEM.LATTICE_CONSTANT_MISSING",
                        "scaled coordinates found without a lattice constant; positions kept unscaled",
                    );
                    positions
                }
            }
        }
        CoordinateFormat::Fractional => match lattice_vectors {
            Some(vectors) => positions
                .iter()
                .map(|position| fractional_to_cartesian(position, &vectors))
                .collect(),
            None => {
                diagnostics.warn(
                    "SYSTEM.LATTICE_MISSING",
                    "fractional coordinates found without lattice vectors; positions kept unconverted",
                );
                positions
            }
        },
        CoordinateFormat::Unknown(label) => {
            diagnostics.warn(
                "SYSTEM.COORDINATE_FORMAT",
                format!(
                    "unsupported coordinate format '{}'; positions kept unconverted",
                    label
                ),
            );
            positions
        }
    }
}

fn scale_all(positions: Vec<Vector3>, scale: f64) -> Vec<Vector3> {
    positions
        .into_iter()
        .map(|position| position.map(|component| component * scale))
        .collect()
}

/// Row vector times the lattice matrix (one lattice vector per row).
pub(crate) fn fractional_to_cartesian(position: &Vector3, vectors: &Matrix3) -> Vector3 {
    let mut cartesian = [0.0; 3];
    for (weight, vector) in position.iter().zip(vectors) {
        for (target, component) in cartesian.iter_mut().zip(vector) {
            *target += weight * component;
        }
    }
    cartesian
}

pub(crate) fn to_vector(row: &[f64]) -> Option<Vector3> {
    match row {
        [x, y, z, ..] => Some([*x, *y, *z]),
        _ => None,
    }
}

pub(crate) fn to_matrix(rows: &[Vec<f64>]) -> Option<Matrix3> {
    if rows.len() != 3 {
        return None;
    }
    Some([
        to_vector(&rows[0])?,
        to_vector(&rows[1])?,
        to_vector(&rows[2])?,
    ])
}
