use crate::archive::{Dos, DosValues};
use crate::domain::{Diagnostics, Quantity, Unit};
use crate::modules::dos::{DosTable, DosTableError};
use std::path::Path;
use tracing::debug;

/// Density-of-states curves for the final calculation. A missing file is
/// not a problem; an unreadable or malformed one is a warning.
pub(super) fn read_dos_curves(
    path: &Path,
    nspin: i64,
    diagnostics: &mut Diagnostics,
) -> Vec<Dos> {
    if !path.is_file() {
        debug!(path = %path.display(), "no DOS file next to the log");
        return Vec::new();
    }
    match DosTable::read(path).and_then(|table| curves_from_table(&table, nspin)) {
        Ok(curves) => curves,
        Err(error) => {
            diagnostics.warn(
                "DOS.READ",
                format!("DOS file '{}' skipped: {}", path.display(), error),
            );
            Vec::new()
        }
    }
}

/// One unpolarized curve from `energy total`, or spin up, spin down and
/// total from `energy up down total` when the run has two spin components.
pub(crate) fn curves_from_table(table: &DosTable, nspin: i64) -> Result<Vec<Dos>, DosTableError> {
    let spin_polarized = nspin >= 2;
    let required = if spin_polarized { 4 } else { 2 };
    table.require_columns(required)?;

    let column = |index: usize| table.column(index).unwrap_or_default().to_vec();
    let curve = |spin_channel: Option<usize>, index: usize| Dos {
        spin_channel,
        spin_polarized,
        energies: Quantity::new(column(0), Unit::ElectronVolt),
        total: vec![DosValues {
            value: Quantity::new(column(index), Unit::PerElectronVolt),
        }],
    };

    Ok(if spin_polarized {
        vec![curve(Some(0), 1), curve(Some(1), 2), curve(None, 3)]
    } else {
        vec![curve(None, 1)]
    })
}
