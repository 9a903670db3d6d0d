use super::MappingContext;
use super::system::{to_matrix, to_vector};
use crate::archive::{
    Calculation, Energy, EnergyEntry, Forces, ForcesEntry, Multipoles, MultipolesEntry,
    ScfIteration, Stress, StressEntry,
};
use crate::domain::{Quantity, Unit};
use crate::modules::output::names;
use crate::modules::xc::energy_field;
use crate::text::{Extraction, Value};

const HARRIS_ENERGY_KIND: &str = "Harris";
const ELECTRIC_MULTIPOLE_KIND: &str = "electric";

pub(super) fn map_calculation(region: &Extraction, context: &MappingContext<'_>) -> Calculation {
    let energy = map_energy(region, context);
    Calculation {
        system_ref: None,
        energy: (!energy.is_empty()).then_some(energy),
        forces: map_forces(region),
        stress: map_stress(region),
        multipoles: map_dipole(region).into_iter().collect(),
        scf_iterations: map_scf_iterations(region),
        dos_electronic: Vec::new(),
    }
}

fn map_energy(region: &Extraction, context: &MappingContext<'_>) -> Energy {
    let mut energy = Energy::default();

    if let Some(decomposition) = region.record(names::ENERGY) {
        let unit = decomposition
            .unit_of(names::CONTRIBUTION)
            .unwrap_or(Unit::ElectronVolt);
        for (name, value) in decomposition
            .list(names::CONTRIBUTION)
            .iter()
            .filter_map(named_value)
        {
            let quantity = Quantity::new(value, unit);
            match energy_field(name) {
                Some(field) => energy.set(field, EnergyEntry::new(quantity)),
                None => energy.contributions.push(EnergyEntry::named(name, quantity)),
            }
        }
    }

    // E_KS is the reference total even when a decomposition printed one.
    if let Some(total) = region.quantity(names::ENERGY_TOTAL) {
        energy.total = Some(EnergyEntry::new(total));
    }

    energy.fermi = region
        .quantity(names::FERMI_ENERGY)
        .or_else(|| context.whole.quantity(names::FERMI_ENERGY));
    energy
}

/// `[name, number]` pairs produced by the contribution patterns.
fn named_value(item: &Value) -> Option<(&str, f64)> {
    match item.as_list()? {
        [name, value, ..] => Some((name.as_str()?, value.as_f64()?)),
        _ => None,
    }
}

fn map_forces(region: &Extraction) -> Option<Forces> {
    let forces = region.record(names::FORCES)?;
    let rows = forces
        .rows(names::ATOMIC)
        .filter(|rows| !rows.is_empty())?
        .iter()
        .map(|row| to_vector(row))
        .collect::<Option<Vec<_>>>()?;
    let unit = forces
        .unit_of(names::ATOMIC)
        .unwrap_or(Unit::ElectronVoltPerAngstrom);
    Some(Forces {
        total: ForcesEntry {
            value: Quantity::new(rows, unit),
        },
    })
}

fn map_stress(region: &Extraction) -> Option<Stress> {
    let tensor = to_matrix(&region.rows(names::STRESS_TENSOR)?)?;
    let unit = region.unit_of(names::STRESS_TENSOR)?;
    Some(Stress {
        total: StressEntry {
            value: Quantity::new(tensor, unit),
        },
    })
}

fn map_dipole(region: &Extraction) -> Option<Multipoles> {
    let dipole = to_vector(&region.array(names::ELECTRIC_DIPOLE)?)?;
    Some(Multipoles {
        kind: ELECTRIC_MULTIPOLE_KIND.to_string(),
        dipole: MultipolesEntry {
            total: Quantity::new(dipole, Unit::Debye),
        },
    })
}

/// SCF rows hold Eharris, E_KS, FreeEng, dDmax and Ef.
fn map_scf_iterations(region: &Extraction) -> Vec<ScfIteration> {
    let Some(scf) = region.record(names::SCF) else {
        return Vec::new();
    };
    let unit = scf.unit_of(names::STEP).unwrap_or(Unit::ElectronVolt);
    scf.list(names::STEP)
        .iter()
        .filter_map(Value::as_array)
        .filter_map(|step| match step.as_slice() {
            [harris, total, free, _, fermi, ..] => Some(ScfIteration {
                energy: Energy {
                    total: Some(EnergyEntry::new(Quantity::new(*total, unit))),
                    free: Some(EnergyEntry::new(Quantity::new(*free, unit))),
                    fermi: Some(Quantity::new(*fermi, unit)),
                    types: vec![EnergyEntry::named(
                        HARRIS_ENERGY_KIND,
                        Quantity::new(*harris, unit),
                    )],
                    ..Energy::default()
                },
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::map_calculation;
    use crate::domain::Unit;
    use crate::mapping::MappingContext;
    use crate::modules::output::extract_output;

    const CALCULATION_LOG: &str = "\
   scf: iscf   Eharris(eV)      E_KS(eV)   FreeEng(eV)   dDmax  Ef(eV) dHmax(eV)
   scf:    1     -215.5000     -215.6000     -215.6100  0.0010 -4.1000  0.0200
   scf:    2     -215.5500     -215.6030     -215.6130  0.0001 -4.1200  0.0020

siesta: E_KS(eV) =             -215.6038

siesta: Atomic forces (eV/Ang):
siesta:      1    0.000010   -0.000020    0.000030
siesta:      2   -0.000010    0.000020   -0.000030
siesta: ----------------------------------------
siesta:    Tot    0.000000    0.000000    0.000000

siesta: Program's energy decomposition (eV):
siesta: Ebs     =       -84.521063
siesta: Exc     =       -60.125000
siesta: Ion-ion =       -58.000000
siesta: Etot    =      -215.603000
siesta: FreeEng =      -215.613000

siesta: Fermi = -4.120000
siesta: Stress tensor (static) (eV/Ang**3):
siesta:    -0.001000    0.000000    0.000000
siesta:     0.000000   -0.001000    0.000000
siesta:     0.000000    0.000000   -0.001000

siesta: Electric dipole (Debye) =    0.100000    0.200000    0.300000
";

    #[test]
    fn calculation_fields_are_mapped_with_units() {
        let whole = extract_output(CALCULATION_LOG);
        let context = MappingContext { whole: &whole, deck: None };
        let calculation = map_calculation(&whole, &context);

        let energy = calculation.energy.expect("energy should be mapped");
        assert_eq!(energy.total.expect("total").value.value, -215.6038);
        assert_eq!(energy.free.expect("free").value.value, -215.613);
        assert_eq!(energy.xc.expect("xc").value.value, -60.125);
        assert_eq!(energy.nuclear_repulsion.expect("ion-ion").value.value, -58.0);
        assert_eq!(energy.fermi.expect("fermi").value, -4.12);
        assert_eq!(energy.contributions.len(), 1);
        assert_eq!(energy.contributions[0].kind.as_deref(), Some("Ebs"));

        let forces = calculation.forces.expect("forces should be mapped");
        assert_eq!(forces.total.value.unit, Unit::ElectronVoltPerAngstrom);
        assert_eq!(forces.total.value.value.len(), 2);

        let stress = calculation.stress.expect("stress should be mapped");
        assert_eq!(stress.total.value.unit, Unit::ElectronVoltPerAngstromCubed);
        assert_eq!(stress.total.value.value[2][2], -0.001);

        assert_eq!(calculation.multipoles[0].kind, "electric");
        assert_eq!(calculation.multipoles[0].dipole.total.value, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn scf_rows_become_iterations() {
        let whole = extract_output(CALCULATION_LOG);
        let context = MappingContext { whole: &whole, deck: None };
        let iterations = map_calculation(&whole, &context).scf_iterations;
        assert_eq!(iterations.len(), 2);
        let second = &iterations[1].energy;
        assert_eq!(second.total.as_ref().map(|e| e.value.value), Some(-215.603));
        assert_eq!(second.free.as_ref().map(|e| e.value.value), Some(-215.613));
        assert_eq!(second.fermi.as_ref().map(|q| q.value), Some(-4.12));
        assert_eq!(second.types[0].kind.as_deref(), Some("Harris"));
        assert_eq!(second.types[0].value.value, -215.55);
    }

    #[test]
    fn empty_region_maps_to_empty_calculation() {
        let whole = extract_output("nothing recognisable\n");
        let context = MappingContext { whole: &whole, deck: None };
        let calculation = map_calculation(&whole, &context);
        assert!(calculation.energy.is_none());
        assert!(calculation.forces.is_none());
        assert!(calculation.stress.is_none());
        assert!(calculation.multipoles.is_empty());
        assert!(calculation.scf_iterations.is_empty());
    }
}
