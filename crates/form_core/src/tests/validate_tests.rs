use shared::domain::FieldType;

use super::*;
use crate::state::FormState;

fn selection(ids: &[&str]) -> Response {
    Response::Selection(ids.iter().map(|id| OptionId::from(*id)).collect())
}

#[test]
fn required_text_with_empty_value_blocks_submission() {
    let mut form = FormState::new();
    let id1 = form.add_field(Field::text().with_required(true));

    let mut responses = Responses::new();
    responses.insert(id1.clone(), Response::Value(String::new()));
    let result = form.validate(&responses);

    assert!(!result.is_valid());
    assert_eq!(result.len(), 1);
    assert_eq!(result.get(&id1), Some(REQUIRED_MESSAGE));
    assert_eq!(REQUIRED_MESSAGE, "This field is required");
}

#[test]
fn required_number_without_response_is_reported() {
    let mut form = FormState::new();
    let id = form.add_field(Field::new(FieldType::Number).with_required(true));
    let result = form.validate(&Responses::new());
    assert_eq!(result.get(&id), Some("This field is required"));
}

#[test]
fn required_multi_select_needs_a_selection() {
    let mut form = FormState::new();
    let id = form.add_field(Field::new(FieldType::MultiSelect).with_required(true));
    let opt_a = form.add_option(&id, "A").expect("option");

    let mut responses = Responses::new();
    responses.insert(id.clone(), selection(&[]));
    assert_eq!(
        form.validate(&responses).get(&id),
        Some("Please select at least one option")
    );

    responses.insert(id.clone(), Response::Selection([opt_a].into_iter().collect()));
    assert!(form.validate(&responses).is_valid());
}

#[test]
fn required_single_select_needs_a_value() {
    let mut form = FormState::new();
    let id = form.add_field(Field::new(FieldType::SingleSelect).with_required(true));
    let option = form.add_option(&id, "Yes").expect("option");

    assert_eq!(
        form.validate(&Responses::new()).get(&id),
        Some("Please select an option")
    );

    let mut responses = Responses::new();
    responses.insert(id.clone(), Response::Value(option.to_string()));
    assert!(form.validate(&responses).is_valid());
}

#[test]
fn optional_fields_never_report_errors() {
    let mut form = FormState::new();
    let text = form.add_field(Field::text());
    let multi = form.add_field(Field::new(FieldType::MultiSelect));
    let single = form.add_field(Field::new(FieldType::SingleSelect));

    let mut responses = Responses::new();
    responses.insert(text.clone(), Response::Value(String::new()));
    responses.insert(multi.clone(), selection(&[]));

    let result = form.validate(&responses);
    assert!(result.is_valid());
    for id in [text, multi, single] {
        assert!(!result.contains(&id));
    }
}

#[test]
fn response_of_wrong_shape_counts_as_missing() {
    let mut form = FormState::new();
    let text = form.add_field(Field::text().with_required(true));
    let multi = form.add_field(Field::new(FieldType::MultiSelect).with_required(true));

    let mut responses = Responses::new();
    responses.insert(text.clone(), selection(&["0"]));
    responses.insert(multi.clone(), Response::Value("0".into()));

    let result = form.validate(&responses);
    assert_eq!(result.get(&text), Some(REQUIRED_MESSAGE));
    assert_eq!(result.get(&multi), Some(SELECT_AT_LEAST_ONE_MESSAGE));
}

#[test]
fn whitespace_counts_as_a_value() {
    let mut form = FormState::new();
    let id = form.add_field(Field::text().with_required(true));
    let mut responses = Responses::new();
    responses.insert(id, Response::Value(" ".into()));
    assert!(form.validate(&responses).is_valid());
}

#[test]
fn validation_is_repeatable_and_ignores_unknown_order_entries() {
    let mut form = FormState::new();
    let id = form.add_field(Field::text().with_required(true));
    let mut order = form.order().to_vec();
    order.push(FieldId::from("not-a-field"));

    let responses = Responses::new();
    let first = validate(form.fields(), &order, &responses);
    let second = validate(form.fields(), &order, &responses);

    assert_eq!(first, second);
    assert_eq!(first.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(), vec![id]);
}

#[test]
fn fixing_a_response_clears_the_error() {
    let mut form = FormState::new();
    let id = form.add_field(Field::text().with_required(true));
    let mut responses = Responses::new();
    assert!(!form.validate(&responses).is_valid());

    responses.insert(id, Response::Value("filled".into()));
    assert!(form.validate(&responses).is_empty());
}
