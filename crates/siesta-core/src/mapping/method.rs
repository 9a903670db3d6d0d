use crate::archive::{BasisSetContainer, Dft, Method, XcFunctional};
use crate::domain::Diagnostics;
use crate::modules::fdf::{FdfDeck, FdfValue};
use crate::modules::output::names;
use crate::modules::xc::{functionals_for_label, scan_xc_label};
use crate::text::Extraction;
use std::collections::BTreeMap;

const XC_AUTHORS_LABEL: &str = "xc.authors";
const XC_CHECK_LABEL: &str = "xc_check";

pub(super) fn map_method(
    extraction: &Extraction,
    deck: Option<&FdfDeck>,
    log_text: &str,
    diagnostics: &mut Diagnostics,
) -> Method {
    Method {
        input_parameters: deck.map(FdfDeck::parameter_map).unwrap_or_default(),
        simulation_parameters: simulation_parameters(extraction),
        dft: Dft {
            xc_functional: xc_functional(deck, log_text, diagnostics),
        },
        electrons_representation: vec![BasisSetContainer::numeric_atomic_orbitals()],
    }
}

fn simulation_parameters(extraction: &Extraction) -> BTreeMap<String, String> {
    let Some(section) = extraction.record(names::SIMULATION_PARAMETERS) else {
        return BTreeMap::new();
    };
    section
        .list(names::REDATA)
        .iter()
        .filter_map(|pair| {
            let pair = pair.as_list()?;
            Some((
                pair.first()?.as_str()?.to_string(),
                pair.get(1)?.as_str()?.to_string(),
            ))
        })
        .collect()
}

/// Deck `XC.authors`, then a deck `xc_check` entry, then the log's own
/// `xc_check:` lines.
pub(super) fn resolve_xc_label(deck: Option<&FdfDeck>, log_text: &str) -> Option<String> {
    let from_deck = |label: &str| {
        deck.and_then(|deck| deck.value(label))
            .and_then(FdfValue::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    from_deck(XC_AUTHORS_LABEL)
        .or_else(|| from_deck(XC_CHECK_LABEL))
        .or_else(|| scan_xc_label(log_text))
}

fn xc_functional(
    deck: Option<&FdfDeck>,
    log_text: &str,
    diagnostics: &mut Diagnostics,
) -> XcFunctional {
    let mut functional = XcFunctional::default();
    let Some(label) = resolve_xc_label(deck, log_text) else {
        diagnostics.warn(
            "XC.MISSING_LABEL",
            "no exchange-correlation label found in the input deck or the log",
        );
        return functional;
    };
    match functionals_for_label(&label) {
        Some(names) => names.iter().for_each(|name| functional.push(name)),
        None => diagnostics.warn(
            "XC.UNKNOWN_LABEL",
            format!("unrecognised exchange-correlation label '{}'", label),
        ),
    }
    functional
}
