use shared::domain::FieldType;

use super::*;

#[test]
fn reducer_builds_a_form() {
    let mut state = FormState::new();

    let ActionOutcome::FieldAdded(colour) = state
        .apply(FormAction::AddField(Field::new(FieldType::SingleSelect)))
        .expect("add")
    else {
        panic!("expected a new field id");
    };
    let ActionOutcome::FieldAdded(name) = state
        .apply(FormAction::AddField(Field::text()))
        .expect("add")
    else {
        panic!("expected a new field id");
    };

    let ActionOutcome::OptionAdded(red) = state
        .apply(FormAction::AddOption {
            field_id: colour.clone(),
            label: "Red".into(),
        })
        .expect("option")
    else {
        panic!("expected a new option id");
    };

    let steps = vec![
        FormAction::SetTitle("Preferences".into()),
        FormAction::SetDescription("Short survey".into()),
        FormAction::UpdateField {
            id: name.clone(),
            patch: FieldPatch::default().label("Name").required(true),
        },
        FormAction::UpdateOption {
            field_id: colour.clone(),
            option_id: red.clone(),
            label: "Scarlet".into(),
        },
        FormAction::Reorder(vec![name.clone(), colour.clone()]),
    ];
    for step in steps {
        assert_eq!(state.apply(step).expect("step"), ActionOutcome::Applied);
    }

    assert_eq!(state.title(), "Preferences");
    assert_eq!(state.description(), "Short survey");
    assert_eq!(state.order(), &[name.clone(), colour.clone()]);
    assert_eq!(state.field(&name).expect("name").label, "Name");
    assert_eq!(
        state.field(&colour).expect("colour").option_labels().collect::<Vec<_>>(),
        vec!["Scarlet"]
    );

    state
        .apply(FormAction::RemoveOption {
            field_id: colour.clone(),
            option_id: red,
        })
        .expect("remove option");
    state
        .apply(FormAction::RemoveField(colour.clone()))
        .expect("remove field");
    assert_eq!(state.order(), &[name]);
}

#[test]
fn rejected_action_leaves_state_untouched() {
    let mut state = FormState::new();
    let id = state.add_default_field();
    let before = state.clone();

    let err = state
        .apply(FormAction::Reorder(vec![id.clone(), id]))
        .expect_err("duplicate");
    assert!(matches!(err, StateError::InvalidOrder(_)));
    assert_eq!(state, before);
}
