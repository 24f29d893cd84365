use equity_compass::model::{ContributionType, Criterion};
use equity_compass::state::{
    clear_state, load_state, save_state, AppState, LoadOutcome, NewContribution, NewFounder,
    STATE_VERSION,
};

fn two_founders() -> AppState {
    let mut state = AppState::new();
    for (name, role) in [("Ada", "CTO"), ("Grace", "CEO")] {
        state
            .add_founder(NewFounder {
                name: name.to_string(),
                role: role.to_string(),
                ..Default::default()
            })
            .unwrap();
    }
    state
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");

    let mut state = two_founders();
    state.complete_milestone("initial").unwrap();
    let id = state.founders[0].id.clone();
    state
        .add_contribution(
            &id,
            NewContribution {
                kind: ContributionType::Time,
                amount: 40.0,
                description: "Prototype".to_string(),
            },
        )
        .unwrap();
    save_state(&path, &state).unwrap();

    match load_state(&path).unwrap() {
        LoadOutcome::Loaded(loaded) => assert_eq!(loaded, state),
        other => panic!("expected a loaded state, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = load_state(&dir.path().join("none.json")).unwrap();
    assert!(matches!(outcome, LoadOutcome::Fresh(_)));
    assert_eq!(outcome.into_state(), AppState::new());
}

#[test]
fn test_legacy_contribution_totals_are_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r##"{
            "founders": [{
                "id": "1700000000001",
                "name": "Ada",
                "role": "CTO",
                "email": "",
                "scores": {"role":5,"usefulness":5,"ideaContribution":5,"businessPlan":5,
                           "expertise":5,"commitment":5,"operations":5},
                "contributions": {"cash": 1000, "time": 0, "skills": 15},
                "equityPercentage": 100,
                "color": "#6366F1"
            }],
            "milestones": [
                {"id":"initial","name":"Initial Assessment","description":"","completed":false,"current":true}
            ],
            "currentMilestoneId": "initial",
            "history": []
        }"##,
    )
    .unwrap();

    let state = load_state(&path).unwrap().into_state();
    assert_eq!(state.version, STATE_VERSION);
    let founder = &state.founders[0];
    assert_eq!(founder.contributions.len(), 2);
    assert_eq!(founder.contributions[0].kind, ContributionType::Cash);
    assert_eq!(founder.contributions[0].amount, 1000.0);
    assert_eq!(founder.contributions[1].kind, ContributionType::Skills);
    assert_eq!(founder.contributions[0].description, "Migrated total");
    assert_eq!(founder.equity_percentage, 100.0);
}

#[test]
fn test_corrupt_file_recovers_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{\"founders\": [").unwrap();

    match load_state(&path).unwrap() {
        LoadOutcome::Recovered { state, reason } => {
            assert_eq!(state, AppState::new());
            assert!(!reason.is_empty());
        }
        other => panic!("expected recovery, got {:?}", other),
    }
}

#[test]
fn test_newer_version_recovers_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut record = serde_json::to_value(two_founders()).unwrap();
    record["version"] = serde_json::json!(STATE_VERSION + 1);
    std::fs::write(&path, record.to_string()).unwrap();

    assert!(matches!(
        load_state(&path).unwrap(),
        LoadOutcome::Recovered { .. }
    ));
}

#[test]
fn test_negative_stored_weight_recovers_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut state = two_founders();
    let id = state.founders[0].id.clone();
    state
        .add_contribution(
            &id,
            NewContribution {
                kind: ContributionType::Cash,
                amount: 100.0,
                description: String::new(),
            },
        )
        .unwrap();
    let mut record = serde_json::to_value(&state).unwrap();
    record["contributionWeights"]["cash"] = serde_json::json!(-1.0);
    std::fs::write(&path, record.to_string()).unwrap();

    match load_state(&path).unwrap() {
        LoadOutcome::Recovered { state, reason } => {
            assert_eq!(state, AppState::new());
            assert!(reason.contains("cash weight"));
        }
        other => panic!("expected recovery, got {:?}", other),
    }
}

#[test]
fn test_history_survives_later_edits_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut state = two_founders();
    state.complete_milestone("initial").unwrap();
    let id = state.founders[0].id.clone();
    state.set_score(&id, Criterion::Role, 10).unwrap();
    state.founders[0].name.clear();
    save_state(&path, &state).unwrap();

    let loaded = load_state(&path).unwrap().into_state();
    let snapshot = &loaded.history[0];
    assert_eq!(snapshot.milestone_id, "initial");
    assert_eq!(snapshot.founders[0].name, "Ada");
    assert_eq!(snapshot.founders[0].equity_percentage, 50.0);
    assert!((loaded.founders[0].equity_percentage - 53.333333).abs() < 1e-4);
}

#[test]
fn test_out_of_order_completion_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut state = two_founders();
    state.complete_milestone("expansion").unwrap();
    save_state(&path, &state).unwrap();

    let loaded = load_state(&path).unwrap().into_state();
    assert_eq!(loaded, state);
    assert_eq!(loaded.current_milestone_id, "initial");
}

#[test]
fn test_clear_state_then_load_is_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    save_state(&path, &two_founders()).unwrap();

    clear_state(&path).unwrap();
    clear_state(&path).unwrap();
    assert!(matches!(load_state(&path).unwrap(), LoadOutcome::Fresh(_)));
}
