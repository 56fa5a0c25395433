use form_spec::spec::component::{NumberConfig, TextConfig};
use form_spec::{
    Component, ComponentKind, ConditionalLogic, ConditionalRule, FieldState, FormDefinition,
    ResponseMap, ResponseValue, RuleAction, RuleOperator, evaluate_conditional_logic,
    evaluate_rule, resolve_states,
};

fn rule(
    id: &str,
    field: &str,
    operator: RuleOperator,
    value: Option<ResponseValue>,
    action: RuleAction,
) -> ConditionalRule {
    ConditionalRule::new(id, field, operator, value, action)
}

fn discount(is_visible: bool) -> Component {
    let component = Component::new("discount", ComponentKind::Text(TextConfig::default()), 1)
        .with_logic(ConditionalLogic::all(vec![rule(
            "senior",
            "age",
            RuleOperator::GreaterThan,
            Some(ResponseValue::text("65")),
            RuleAction::Show,
        )]));
    if is_visible { component } else { component.hidden() }
}

#[test]
fn greater_than_shows_discount_for_seniors() {
    let responses = ResponseMap::new().with("age", 70.0);
    assert!(evaluate_conditional_logic(&discount(false), &responses).visible);
}

#[test]
fn non_numeric_answer_falls_back_to_static_default() {
    let responses = ResponseMap::new().with("age", "not-a-number");
    assert!(!evaluate_conditional_logic(&discount(false), &responses).visible);
    assert!(evaluate_conditional_logic(&discount(true), &responses).visible);
}

#[test]
fn components_without_logic_report_static_flags() {
    let component =
        Component::new("plain", ComponentKind::Number(NumberConfig::default()), 0).required();
    let answers = [
        ResponseMap::new(),
        ResponseMap::new().with("plain", 3.0),
        ResponseMap::new().with("other", "anything"),
    ];
    for responses in answers {
        assert_eq!(
            evaluate_conditional_logic(&component, &responses),
            FieldState {
                visible: true,
                required: true,
                enabled: true
            }
        );
    }
}

#[test]
fn empty_and_set_is_vacuously_triggered() {
    let component = Component::new("target", ComponentKind::Text(TextConfig::default()), 0)
        .with_logic(ConditionalLogic::all(vec![]));
    let state = evaluate_conditional_logic(&component, &ResponseMap::new());
    assert_eq!(state, FieldState::from_static(&component));
}

#[test]
fn and_requires_every_rule_or_requires_one() {
    let rules = vec![
        rule(
            "a",
            "country",
            RuleOperator::Equals,
            Some(ResponseValue::text("NL")),
            RuleAction::Show,
        ),
        rule(
            "b",
            "age",
            RuleOperator::LessThan,
            Some(ResponseValue::Number(30.0)),
            RuleAction::Show,
        ),
    ];
    let all = Component::new("all", ComponentKind::Text(TextConfig::default()), 0)
        .hidden()
        .with_logic(ConditionalLogic::all(rules.clone()));
    let any = Component::new("any", ComponentKind::Text(TextConfig::default()), 1)
        .hidden()
        .with_logic(ConditionalLogic::any(rules));

    let partial = ResponseMap::new().with("country", "NL").with("age", 40.0);
    assert!(!evaluate_conditional_logic(&all, &partial).visible);
    assert!(evaluate_conditional_logic(&any, &partial).visible);

    let both = ResponseMap::new().with("country", "NL").with("age", 20.0);
    assert!(evaluate_conditional_logic(&all, &both).visible);
}

#[test]
fn actions_override_each_flag_independently() {
    let component = Component::new("notes", ComponentKind::Text(TextConfig::default()), 0)
        .with_logic(ConditionalLogic::all(vec![
            rule("req", "plan", RuleOperator::IsNotEmpty, None, RuleAction::Require),
            rule("dis", "plan", RuleOperator::IsNotEmpty, None, RuleAction::Disable),
        ]));
    let idle = evaluate_conditional_logic(&component, &ResponseMap::new());
    assert_eq!(
        idle,
        FieldState {
            visible: true,
            required: false,
            enabled: true
        }
    );
    let triggered = evaluate_conditional_logic(&component, &ResponseMap::new().with("plan", "pro"));
    assert_eq!(
        triggered,
        FieldState {
            visible: true,
            required: true,
            enabled: false
        }
    );
}

#[test]
fn most_restrictive_action_wins_when_opposites_trigger_together() {
    let component = Component::new("extra", ComponentKind::Text(TextConfig::default()), 0)
        .required()
        .with_logic(ConditionalLogic::any(vec![
            rule("show", "flag", RuleOperator::IsNotEmpty, None, RuleAction::Show),
            rule("hide", "flag", RuleOperator::IsNotEmpty, None, RuleAction::Hide),
            rule("opt", "flag", RuleOperator::IsNotEmpty, None, RuleAction::Optional),
            rule("req", "flag", RuleOperator::IsNotEmpty, None, RuleAction::Require),
            rule("on", "flag", RuleOperator::IsNotEmpty, None, RuleAction::Enable),
            rule("off", "flag", RuleOperator::IsNotEmpty, None, RuleAction::Disable),
        ]));
    let state = evaluate_conditional_logic(&component, &ResponseMap::new().with("flag", true));
    assert_eq!(
        state,
        FieldState {
            visible: false,
            required: true,
            enabled: false
        }
    );
}

#[test]
fn show_overrides_a_hidden_static_flag() {
    let component = Component::new("follow_up", ComponentKind::Text(TextConfig::default()), 0)
        .hidden()
        .with_logic(ConditionalLogic::all(vec![rule(
            "unhappy",
            "score",
            RuleOperator::LessThan,
            Some(ResponseValue::Number(5.0)),
            RuleAction::Show,
        )]));
    assert!(evaluate_conditional_logic(&component, &ResponseMap::new().with("score", 2.0)).visible);
    assert!(!evaluate_conditional_logic(&component, &ResponseMap::new().with("score", 9.0)).visible);
}

#[test]
fn hidden_components_do_not_cascade() {
    let form = FormDefinition::from_value(serde_json::json!({
        "id": "cascade",
        "components": [
            { "id": "a", "kind": "text", "config": {}, "orderIndex": 0 },
            { "id": "b", "kind": "text", "config": {}, "orderIndex": 1,
              "conditionalLogic": { "operator": "AND", "rules": [
                  { "id": "hide-b", "fieldId": "a", "operator": "equals", "value": "x", "action": "hide" }
              ] } },
            { "id": "c", "kind": "text", "config": {}, "orderIndex": 2, "isVisible": false,
              "conditionalLogic": { "operator": "AND", "rules": [
                  { "id": "show-c", "fieldId": "b", "operator": "equals", "value": "y", "action": "show" }
              ] } }
        ]
    }))
    .expect("form");
    let responses = ResponseMap::new().with("a", "x").with("b", "y");
    let states = resolve_states(&form, &responses);
    assert!(!states["b"].visible);
    // `b` is hidden but its answer still drives `c`.
    assert!(states["c"].visible);
}

#[test]
fn not_contains_on_arrays_tests_membership() {
    let lacks_red = rule(
        "no-red",
        "colors",
        RuleOperator::NotContains,
        Some(ResponseValue::text("red")),
        RuleAction::Show,
    );
    let with_red = ResponseMap::new().with("colors", ResponseValue::list(["blue", "red"]));
    let reddish = ResponseMap::new().with("colors", ResponseValue::list(["darkred"]));
    assert!(!evaluate_rule(&lacks_red, &with_red));
    // Membership, not substring: "darkred" is not "red".
    assert!(evaluate_rule(&lacks_red, &reddish));
    assert!(evaluate_rule(&lacks_red, &ResponseMap::new().with("colors", ResponseValue::List(vec![]))));
    assert!(evaluate_rule(&lacks_red, &ResponseMap::new()));
}

#[test]
fn contains_on_numbers_uses_their_display_form() {
    let has_seven = rule(
        "sevens",
        "code",
        RuleOperator::Contains,
        Some(ResponseValue::text("7")),
        RuleAction::Show,
    );
    assert!(evaluate_rule(&has_seven, &ResponseMap::new().with("code", 1970.0)));
    assert!(!evaluate_rule(&has_seven, &ResponseMap::new().with("code", 2024.0)));
    // Whole numbers print without a fraction, so "0" does not match 12.
    let has_zero = rule(
        "zeros",
        "code",
        RuleOperator::Contains,
        Some(ResponseValue::text("0")),
        RuleAction::Show,
    );
    assert!(!evaluate_rule(&has_zero, &ResponseMap::new().with("code", 12.0)));
    assert!(evaluate_rule(&has_zero, &ResponseMap::new().with("code", 2.05)));
}
