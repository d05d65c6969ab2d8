use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Context, Result};
use form_core::{Field, PreviewSession};
use serde_json::{Map, Value};
use shared::domain::{FieldId, FieldType, OptionId};

/// Fills a preview from a JSON object keyed by field id. Text and number
/// fields take a string (or a number); single choice fields take one option;
/// multiple choice fields take a list. Options may be given by id or label.
pub fn fill_from_json(session: &mut PreviewSession<'_>, raw: &str) -> Result<()> {
    let entries: Map<String, Value> =
        serde_json::from_str(raw).context("responses must be a JSON object")?;

    for (key, value) in entries {
        let field_id = FieldId(key);
        let field = session
            .form()
            .field(&field_id)
            .cloned()
            .ok_or_else(|| anyhow!("form has no field '{field_id}'"))?;

        match (field.field_type(), value) {
            (_, Value::Null) => session.clear(&field_id)?,
            (FieldType::Text | FieldType::Number, Value::String(text)) => {
                session.set_value(&field_id, text)?
            }
            (FieldType::Number, Value::Number(number)) => {
                session.set_value(&field_id, number.to_string())?
            }
            (FieldType::SingleSelect, Value::String(choice)) => {
                let option_id = resolve_option(&field, &choice)?;
                session.choose(&field_id, &option_id)?;
            }
            (FieldType::MultiSelect, Value::Array(items)) => {
                let mut selected = BTreeSet::new();
                for item in items {
                    let Value::String(choice) = item else {
                        bail!("field '{field_id}' expects a list of option names");
                    };
                    selected.insert(resolve_option(&field, &choice)?);
                }
                session.clear(&field_id)?;
                for option_id in &selected {
                    session.toggle(&field_id, option_id)?;
                }
            }
            (field_type, other) => {
                bail!("field '{field_id}' ({field_type}) cannot take {other}")
            }
        }
    }

    Ok(())
}

fn resolve_option(field: &Field, choice: &str) -> Result<OptionId> {
    let options = field
        .options()
        .ok_or_else(|| anyhow!("field '{}' has no options", field.id))?;
    let by_id = OptionId::from(choice);
    if options.contains_key(&by_id) {
        return Ok(by_id);
    }
    options
        .iter()
        .find(|(_, label)| label.as_str() == choice)
        .map(|(id, _)| id.clone())
        .ok_or_else(|| anyhow!("field '{}' has no option '{choice}'", field.id))
}

#[cfg(test)]
#[path = "tests/responses_tests.rs"]
mod tests;
