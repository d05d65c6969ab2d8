use super::*;

fn survey() -> (FormState, FieldId, FieldId, FieldId, Vec<OptionId>) {
    let mut form = FormState::new();
    let name = form.add_field(Field::text().with_required(true));
    let size = form.add_field(Field::new(FieldType::SingleSelect).with_required(true));
    let toppings = form.add_field(Field::new(FieldType::MultiSelect).with_required(true));
    let small = form.add_option(&size, "Small").expect("small");
    let cheese = form.add_option(&toppings, "Cheese").expect("cheese");
    let olives = form.add_option(&toppings, "Olives").expect("olives");
    (form, name, size, toppings, vec![small, cheese, olives])
}

#[test]
fn submit_is_blocked_until_required_fields_are_answered() {
    let (form, name, size, toppings, options) = survey();
    let mut preview = PreviewSession::new(&form);

    let errors = preview.submit().expect_err("blocked");
    assert_eq!(errors.len(), 3);
    assert_eq!(preview.errors(), &errors);

    preview.set_value(&name, "Ada").expect("name");
    preview.choose(&size, &options[0]).expect("size");
    preview.toggle(&toppings, &options[1]).expect("cheese");

    let submission = preview.submit().expect("valid");
    assert!(preview.errors().is_valid());
    assert_eq!(submission.responses.len(), 3);
    assert_eq!(
        submission.responses.get(&name),
        Some(&Response::Value("Ada".into()))
    );
}

#[test]
fn toggling_twice_empties_the_selection() {
    let (form, _, _, toppings, options) = survey();
    let mut preview = PreviewSession::new(&form);

    preview.toggle(&toppings, &options[2]).expect("on");
    preview.toggle(&toppings, &options[2]).expect("off");

    let errors = preview.submit().expect_err("blocked");
    assert_eq!(
        errors.get(&toppings),
        Some("Please select at least one option")
    );
}

#[test]
fn responses_must_match_field_type() {
    let (form, name, size, toppings, options) = survey();
    let mut preview = PreviewSession::new(&form);

    assert!(matches!(
        preview.set_value(&size, "Small"),
        Err(StateError::WrongResponseKind { .. })
    ));
    assert!(matches!(
        preview.toggle(&name, &options[0]),
        Err(StateError::WrongResponseKind { .. })
    ));
    assert!(matches!(
        preview.choose(&size, &options[1]),
        Err(StateError::UnknownOption { .. })
    ));
    assert!(matches!(
        preview.clear(&FieldId::from("missing")),
        Err(StateError::UnknownField(_))
    ));
    preview.toggle(&toppings, &options[1]).expect("valid toggle");
    assert_eq!(preview.responses().len(), 1);
}

#[test]
fn clearing_an_answer_brings_the_error_back() {
    let (form, name, size, toppings, options) = survey();
    let mut preview = PreviewSession::new(&form);
    preview.set_value(&name, "Ada").expect("name");
    preview.choose(&size, &options[0]).expect("size");
    preview.toggle(&toppings, &options[1]).expect("cheese");
    assert!(preview.submit().is_ok());

    preview.clear(&name).expect("clear");
    let errors = preview.submit().expect_err("blocked again");
    assert_eq!(errors.get(&name), Some("This field is required"));
    assert_eq!(errors.len(), 1);
}
