use super::names::*;
use crate::domain::Unit;
use crate::text::{
    Grammar, Pattern, RE_FLOAT as F, RE_NEWLINE as N, Transform, Value, parse_float_tokens,
    parse_fortran_f64,
};
use std::sync::LazyLock;

pub(super) static OUTPUT_GRAMMAR: LazyLock<Grammar> = LazyLock::new(output_grammar);

/// Patterns describing one calculation: used for a single-point region, for
/// each optimization step and for the whole file.
fn calculation_patterns() -> Vec<Pattern> {
    vec![
        Pattern::leaf(
            NUMBER_OF_ATOMS,
            r"initatomlists:\s+Number of atoms, orbitals, and projectors:\s+(\d+)",
        )
        .transform(Transform::Integer),
        Pattern::leaf(NSPIN, r"Number of spin components\s*=\s*(\d+)")
            .transform(Transform::Integer),
        Pattern::leaf(
            LATTICE_VECTORS,
            r"outcell: Unit cell vectors \(Ang\):\s+([\s\d.\-]+)",
        )
        .transform(Transform::Map(to_lattice_matrix))
        .unit(Unit::Angstrom),
        Pattern::composite(
            ATOMS,
            r"outcoor: Atomic coordinates(.+[\s\w.\-]+)",
            Grammar::new(vec![
                Pattern::leaf(COORDINATES_FORMAT, r"\((\S+)\)").transform(Transform::Text),
                Pattern::leaf(LABELS, r" +([A-Z][a-z]*)")
                    .repeats()
                    .transform(Transform::Text),
                Pattern::leaf(POSITIONS, &format!(r"({F} +{F} +{F})"))
                    .repeats()
                    .transform(Transform::FloatArray),
            ]),
        ),
        Pattern::composite(
            ENERGY,
            &format!(r"Program's energy decomposition \(eV\):([\s\S]+?){N} *{N}"),
            Grammar::new(vec![
                Pattern::leaf(CONTRIBUTION, &format!(r"siesta: +(\S+) *= *({F})"))
                    .repeats()
                    .unit(Unit::ElectronVolt),
            ]),
        ),
        Pattern::composite(
            SCF,
            &format!(r"scf: iscf +Eharris\(eV\).+([\s\S]+?){N} *{N}"),
            Grammar::new(vec![
                Pattern::leaf(
                    STEP,
                    &format!(r"scf: +\d+ +({F} +{F} +{F} +{F} +{F})"),
                )
                .repeats()
                .transform(Transform::FloatArray)
                .unit(Unit::ElectronVolt),
            ]),
        ),
        Pattern::leaf(ENERGY_TOTAL, &format!(r"siesta: E_KS\(eV\) = +({F})"))
            .transform(Transform::Float)
            .unit(Unit::ElectronVolt),
        Pattern::composite(
            ENERGY,
            r"Final energy \(eV\):([\s\S]+?Total.+)",
            Grammar::new(vec![
                Pattern::leaf(CONTRIBUTION, &format!(r"siesta: +([ \w.\-]+?) *= *({F})"))
                    .repeats()
                    .transform(Transform::Map(to_named_contribution))
                    .unit(Unit::ElectronVolt),
            ]),
        ),
        Pattern::composite(
            FORCES,
            r"siesta: Atomic forces \(eV/Ang\):([\s\S]+?Tot.+)",
            Grammar::new(vec![
                Pattern::leaf(ATOMIC, &format!(r"\d+ +({F} +{F} +{F})"))
                    .repeats()
                    .transform(Transform::FloatArray)
                    .unit(Unit::ElectronVoltPerAngstrom),
            ]),
        ),
        Pattern::leaf(FERMI_ENERGY, r"siesta:\s*Fermi\s*=\s*(-?\d+\.\d+)")
            .transform(Transform::Float)
            .unit(Unit::ElectronVolt),
        Pattern::leaf(
            STRESS_TENSOR,
            &format!(r"Stress-tensor-Voigt \(kbar\): +({F} +{F} +{F} +{F} +{F} +{F})"),
        )
        .transform(Transform::Map(voigt_to_tensor))
        .unit(Unit::Kilobar),
        Pattern::leaf(
            STRESS_TENSOR,
            &format!(r"Stress tensor \(static\) \(eV/Ang\*\*3\):([\s\S]+?){N} *{N}"),
        )
        .transform(Transform::Map(static_stress_rows))
        .unit(Unit::ElectronVoltPerAngstromCubed),
        Pattern::leaf(
            ELECTRIC_DIPOLE,
            &format!(r"Electric dipole \(Debye\) += +({F} +{F} +{F})"),
        )
        .transform(Transform::FloatArray)
        .unit(Unit::Debye),
    ]
}

fn output_grammar() -> Grammar {
    let header = Grammar::new(vec![
        Pattern::leaf(PROGRAM_VERSION, r"(?:Siesta Version\s*:|SIESTA) *(.+)")
            .transform(Transform::Text),
        Pattern::leaf(ARCH, r"Architecture *: +(.+)").transform(Transform::Text),
        Pattern::leaf(COMPILER_VERSION, r"Compiler version *: +(.+)")
            .transform(Transform::Text),
        Pattern::leaf(COMPILER_FLAGS, r"Compiler flags *: +(.+)").transform(Transform::Text),
        Pattern::leaf(PARALLEL, r"(PARALLEL) version").transform(Transform::Flag),
    ]);

    Grammar::new(vec![
        Pattern::composite(HEADER, r"(S[\s\S]+?)\*", header),
        Pattern::leaf(
            INPUT_DATA_FILE,
            r"Dump of input data file[^\n]*\n([\s\S]*?)\n[^\n]*End of input data file",
        )
        .transform(Transform::Text),
        Pattern::leaf(DUMPED_INPUT_FILE, r"reinit: Dumped input in +(\S+)")
            .transform(Transform::Text),
        Pattern::composite(
            SIMULATION_PARAMETERS,
            r"Simulation parameters.+([\s\S]+?)\*{10}",
            Grammar::new(vec![
                Pattern::leaf(REDATA, r"redata: (.+?= +\S+)")
                    .repeats()
                    .transform(Transform::Map(to_redata_pair)),
            ]),
        ),
        Pattern::leaf(N_NODES, r"Running on +(\d+) nodes").transform(Transform::Integer),
        Pattern::leaf(RUN_START, r"Start of run: +(\d+-[A-Za-z]+-\d+) +(\d+:\d+:\d+)")
            .transform(Transform::Text),
        Pattern::leaf(RUN_END, r"End of run: +(\d+-[A-Za-z]+-\d+) +(\d+:\d+:\d+)")
            .transform(Transform::Text),
        Pattern::composite(
            SINGLE_POINT,
            r"(Single-point calculation[\s\S]+?Target enthalpy.+)",
            Grammar::new(calculation_patterns()),
        ),
        Pattern::composite(
            GEOMETRY_OPTIMIZATION,
            r"={5}\s+(Begin[\s\S]+?)outcoor: Re",
            Grammar::new(vec![
                Pattern::composite(
                    STEP,
                    r"(Begin.+?opt\. move += +\d+[\s\S]+?Target enthalpy.+)",
                    Grammar::new(calculation_patterns()),
                )
                .repeats(),
            ]),
        ),
    ])
    .extend(calculation_patterns())
}

/// First nine numbers as a 3x3 matrix.
fn to_lattice_matrix(raw: &str) -> Option<Value> {
    let values = raw
        .split_whitespace()
        .take(9)
        .map(parse_fortran_f64)
        .collect::<Option<Vec<_>>>()?;
    if values.len() < 9 {
        return None;
    }
    Some(Value::Matrix(
        values[..9].chunks(3).map(<[f64]>::to_vec).collect(),
    ))
}

/// Voigt order as printed by SIESTA: xx yy zz xy yz xz.
fn voigt_to_tensor(raw: &str) -> Option<Value> {
    let v = parse_float_tokens(raw)?;
    if v.len() < 6 {
        return None;
    }
    Some(Value::Matrix(vec![
        vec![v[0], v[3], v[5]],
        vec![v[3], v[1], v[4]],
        vec![v[5], v[4], v[2]],
    ]))
}

/// Rows of `siesta: a b c`, keeping the three numbers after the prefix.
fn static_stress_rows(raw: &str) -> Option<Value> {
    let rows = raw
        .trim()
        .lines()
        .map(|line| {
            let row = line
                .split_whitespace()
                .skip(1)
                .take(3)
                .map(parse_fortran_f64)
                .collect::<Option<Vec<_>>>()?;
            (row.len() == 3).then_some(row)
        })
        .collect::<Option<Vec<_>>>()?;
    (rows.len() == 3).then_some(Value::Matrix(rows))
}

/// `Band Struct. -12.3` splits on the last space into a name and a number.
fn to_named_contribution(raw: &str) -> Option<Value> {
    let (name, number) = raw.trim().rsplit_once(' ')?;
    Some(Value::List(vec![
        Value::Text(name.trim().to_string()),
        Value::Float(parse_fortran_f64(number)?),
    ]))
}

fn to_redata_pair(raw: &str) -> Option<Value> {
    let (key, value) = raw.rsplit_once('=')?;
    Some(Value::List(vec![
        Value::Text(key.trim().to_string()),
        Value::Text(value.trim().to_string()),
    ]))
}
