use super::model::{FdfBlock, FdfDeck, FdfParameter, FdfValue};
use crate::text::{Grammar, Pattern, Transform, Value, coerce_token};
use regex::Regex;
use std::sync::LazyLock;

const BLOCK_EXPRESSION: &str =
    r"(?is)%block[ \t]+([A-Za-z][\w.\-]*)[^\n]*\n(.*?)%endblock[^\n]*";
const PARAMETER_EXPRESSION: &str =
    r"(?m)^[ \t]*([A-Za-z][\w.\-]*)(?:[ \t]+([^#\n]*?))?[ \t]*(?:#[^\n]*)?$";

static BLOCK_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(BLOCK_EXPRESSION).unwrap_or_else(|error| panic!("block expression: {error}"))
});

static BLOCK_GRAMMAR: LazyLock<Grammar> = LazyLock::new(|| {
    Grammar::new(vec![
        Pattern::leaf("block", BLOCK_EXPRESSION)
            .repeats()
            .transform(Transform::Map(to_block)),
    ])
});

static PARAMETER_GRAMMAR: LazyLock<Grammar> = LazyLock::new(|| {
    Grammar::new(vec![
        Pattern::leaf("parameter", PARAMETER_EXPRESSION)
            .repeats()
            .transform(Transform::Map(to_parameter)),
    ])
});

pub(super) fn parse_deck(source: &str) -> FdfDeck {
    let normalized = source.replace("\r\n", "\n").replace('\r', "\n");

    let blocks = BLOCK_GRAMMAR
        .extract(&normalized)
        .list("block")
        .iter()
        .filter_map(block_from_value)
        .collect();

    let without_blocks = BLOCK_REGION.replace_all(&normalized, "");
    let parameters = PARAMETER_GRAMMAR
        .extract(&without_blocks)
        .list("parameter")
        .iter()
        .filter_map(parameter_from_value)
        .collect();

    FdfDeck::new(parameters, blocks)
}

/// `key value [unit]` becomes `[key, value, unit?]`; a bare key is a logical
/// switch set to true.
fn to_parameter(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let (key, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((key, rest)) => (key, rest.trim()),
        None => (trimmed, ""),
    };
    if key.is_empty() {
        return None;
    }
    if rest.is_empty() {
        return Some(Value::List(vec![
            Value::Text(key.to_string()),
            Value::Bool(true),
        ]));
    }

    let mut tokens = rest.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    let mut items = vec![Value::Text(key.to_string())];
    match coerce_token(first) {
        number @ (Value::Int(_) | Value::Float(_)) => {
            items.push(number);
            if let Some(unit) = tokens.next() {
                items.push(Value::Text(unit.to_string()));
            }
        }
        _ if rest.eq_ignore_ascii_case("true") => items.push(Value::Bool(true)),
        _ if rest.eq_ignore_ascii_case("false") => items.push(Value::Bool(false)),
        _ => items.push(Value::Text(rest.to_string())),
    }
    Some(Value::List(items))
}

fn to_block(raw: &str) -> Option<Value> {
    let (name, body) = raw.trim().split_once(char::is_whitespace).unwrap_or((raw.trim(), ""));
    if name.is_empty() {
        return None;
    }
    let rows = body
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .map(|line| {
            line.split_whitespace()
                .map(|token| Value::Text(token.to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .map(Value::List)
        .collect();
    Some(Value::List(vec![Value::Text(name.to_string()), Value::List(rows)]))
}

fn parameter_from_value(value: &Value) -> Option<FdfParameter> {
    let items = value.as_list()?;
    let key = items.first()?.as_str()?.to_string();
    let value = match items.get(1)? {
        Value::Int(number) => FdfValue::Int(*number),
        Value::Float(number) => FdfValue::Float(*number),
        Value::Bool(flag) => FdfValue::Bool(*flag),
        Value::Text(text) => FdfValue::Text(text.clone()),
        _ => return None,
    };
    let unit = items.get(2).and_then(Value::as_str).map(str::to_string);
    Some(FdfParameter { key, value, unit })
}

fn block_from_value(value: &Value) -> Option<FdfBlock> {
    let items = value.as_list()?;
    let name = items.first()?.as_str()?.to_string();
    let rows = items
        .get(1)?
        .as_list()?
        .iter()
        .filter_map(|row| {
            row.as_list()?
                .iter()
                .map(|token| token.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .collect();
    Some(FdfBlock { name, rows })
}

#[cfg(test)]
mod tests {
    use super::{parse_deck, to_parameter};
    use crate::modules::fdf::FdfValue;
    use crate::text::Value;

    #[test]
    fn parameter_values_are_coerced() {
        let deck = parse_deck(
            "SystemName   bulk silicon   # comment\n\
             NumberOfAtoms 2\n\
             MeshCutoff 200.0 Ry\n\
             SpinPolarized .false.\n\
             WriteForces TRUE\n\
             UseSaveData false\n\
             DM.UseSaveDM\n",
        );

        assert_eq!(
            deck.value("SystemName"),
            Some(&FdfValue::Text("bulk silicon".into()))
        );
        assert_eq!(deck.value("NumberOfAtoms"), Some(&FdfValue::Int(2)));
        assert_eq!(deck.value("MeshCutoff"), Some(&FdfValue::Float(200.0)));
        assert_eq!(
            deck.parameter("MeshCutoff").and_then(|p| p.unit.as_deref()),
            Some("Ry")
        );
        assert_eq!(
            deck.value("SpinPolarized"),
            Some(&FdfValue::Text(".false.".into()))
        );
        assert_eq!(deck.value("WriteForces"), Some(&FdfValue::Bool(true)));
        assert_eq!(deck.value("UseSaveData"), Some(&FdfValue::Bool(false)));
        assert_eq!(deck.value("DM.UseSaveDM"), Some(&FdfValue::Bool(true)));
    }

    #[test]
    fn blocks_are_tokenized_and_hidden_from_parameters() {
        let deck = parse_deck(
            "%block ChemicalSpeciesLabel\n  1 14 Si  # silicon\n%endblock ChemicalSpeciesLabel\n\
             %BLOCK PAO.Basis\nSi 2\n n=3 0 2\n%ENDBLOCK PAO.Basis\n\
             LatticeConstant 5.43 Ang\n",
        );

        let species = deck.block("ChemicalSpeciesLabel").expect("species block");
        assert_eq!(species.rows, vec![vec!["1", "14", "Si"]]);
        assert_eq!(deck.block("pao.basis").map(|b| b.rows.len()), Some(2));
        assert!(deck.value("Si").is_none());
        assert!(deck.value("block").is_none());
        assert_eq!(deck.value("LatticeConstant"), Some(&FdfValue::Float(5.43)));
    }

    #[test]
    fn negative_numbers_keep_only_first_token() {
        assert_eq!(
            to_parameter("Efield -0.5 V/Ang"),
            Some(Value::List(vec![
                Value::Text("Efield".into()),
                Value::Float(-0.5),
                Value::Text("V/Ang".into()),
            ]))
        );
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let deck = parse_deck("NumberOfSpecies 1\r\nxc.authors PBE\r\n");
        assert_eq!(deck.value("NumberOfSpecies"), Some(&FdfValue::Int(1)));
        assert_eq!(deck.value("xc.authors"), Some(&FdfValue::Text("PBE".into())));
    }
}
