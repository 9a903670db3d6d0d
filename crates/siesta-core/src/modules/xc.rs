//! Exchange-correlation labels and energy-term names.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// SIESTA `XC.authors` label to libxc-style functional names.
pub const XC_FUNCTIONALS: &[(&str, &[&str])] = &[
    ("ca", &["LDA_X", "LDA_C_PZ"]),
    ("pz", &["LDA_X", "LDA_C_PZ"]),
    ("pw92", &["LDA_X", "LDA_C_PW"]),
    ("pbe", &["GGA_X_PBE", "GGA_C_PBE"]),
    ("revpbe", &["GGA_X_PBE_R", "GGA_C_PBE"]),
    ("rpbe", &["GGA_X_RPBE", "GGA_C_PBE"]),
    ("am05", &["GGA_X_AM05", "GGA_C_AM05"]),
    ("pbesol", &["GGA_X_PBE_SOL", "GGA_C_PBE_SOL"]),
    ("blyp", &["GGA_X_B88", "GGA_C_LYP"]),
    ("df1", &["GGA_X_PBE_R", "VDW_C_DF1"]),
    ("drsll", &["GGA_X_PBE_R", "VDW_C_DF1"]),
    ("lmkll", &["GGA_X_RPW86", "VDW_C_DF2"]),
    ("df2", &["GGA_X_RPW86", "VDW_C_DF2"]),
    ("kbm", &["GGA_X_OPTB88_VDW", "VDW_C_DF1"]),
    ("c09", &["GGA_X_C09X", "VDW_C_DF1"]),
    ("bh", &["GGA_X_LV_RPW86", "VDW_C_DF1"]),
];

/// Author descriptions printed on `xc_check:` lines.
const XC_CHECK_AUTHORS: &[(&str, &str)] = &[
    ("ceperley-alder", "ca"),
    ("perdew-zunger", "pz"),
    ("perdew-wang-92", "pw92"),
    ("perdew, burke & ernzerhof", "pbe"),
    ("zhang & yang", "revpbe"),
    ("hammer, hansen & norskov", "rpbe"),
    ("armiento & mattsson", "am05"),
    ("perdew et al", "pbesol"),
    ("becke-lee-yang-parr", "blyp"),
    ("dion et al", "df1"),
    ("lee, murray et al", "df2"),
    ("klimes et al", "kbm"),
    ("cooper", "c09"),
    ("berland & hyldgaard", "bh"),
];

static XC_CHECK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"xc_check: +(?:GGA|LDA|VDW)?\s*(\w+)([^\n]*)")
        .unwrap_or_else(|error| panic!("xc_check expression: {error}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalKind {
    Exchange,
    Correlation,
    Hybrid,
    Contribution,
}

impl FunctionalKind {
    pub fn classify(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        if upper.contains("_X_") {
            Self::Exchange
        } else if upper.contains("_C_") {
            Self::Correlation
        } else if upper.contains("_HYB_") {
            Self::Hybrid
        } else {
            Self::Contribution
        }
    }
}

pub fn functionals_for_label(label: &str) -> Option<&'static [&'static str]> {
    let wanted = label.trim().to_ascii_lowercase();
    XC_FUNCTIONALS
        .iter()
        .find(|(known, _)| *known == wanted)
        .map(|(_, names)| *names)
}

/// Recovers an `XC.authors`-style label from the `xc_check:` lines of a log.
///
/// Author descriptions and literal labels are recognised; otherwise the
/// second matched word is returned as-is so the caller can report it.
pub fn scan_xc_label(text: &str) -> Option<String> {
    let mut words = Vec::new();
    for captures in XC_CHECK_LINE.captures_iter(text) {
        let word = captures.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
        let description = format!(
            "{}{}",
            word,
            captures.get(2).map_or("", |m| m.as_str()).to_ascii_lowercase()
        );
        if let Some((_, label)) = XC_CHECK_AUTHORS
            .iter()
            .find(|(authors, _)| description.contains(authors))
        {
            return Some((*label).to_string());
        }
        if functionals_for_label(&word).is_some() {
            return Some(word);
        }
        words.push(word);
    }
    words.into_iter().nth(1)
}

/// Archive energy fields addressable from SIESTA energy-term names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnergyField {
    Total,
    Free,
    Xc,
    Electrostatic,
    NuclearRepulsion,
}

pub const ENERGY_FIELDS: &[(&str, EnergyField)] = &[
    ("Etot", EnergyField::Total),
    ("FreeEng", EnergyField::Free),
    ("Exc", EnergyField::Xc),
    ("Hartree", EnergyField::Electrostatic),
    ("Exch.-corr.", EnergyField::Xc),
    ("Ion-ion", EnergyField::NuclearRepulsion),
    ("Total", EnergyField::Total),
];

pub fn energy_field(name: &str) -> Option<EnergyField> {
    ENERGY_FIELDS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, field)| *field)
}
