use hookstore_hooks::OperationPhase;
use proptest::prelude::*;

proptest! {
    #[test]
    fn name_round_trips(idx in 0usize..10) {
        let phase = OperationPhase::ALL[idx];
        prop_assert_eq!(phase.as_str().parse::<OperationPhase>().unwrap(), phase);
        prop_assert_eq!(phase.to_string(), phase.as_str());
    }

    #[test]
    fn serde_matches_display(idx in 0usize..10) {
        let phase = OperationPhase::ALL[idx];
        let json = serde_json::to_string(&phase).unwrap();
        prop_assert_eq!(json, format!("\"{phase}\""));
    }
}

#[test]
fn canonical_names() {
    let names: Vec<&str> = OperationPhase::ALL.iter().map(OperationPhase::as_str).collect();
    assert_eq!(
        names,
        vec![
            "beforeInsert",
            "afterInsert",
            "beforeUpdate",
            "afterUpdate",
            "beforeDelete",
            "afterDelete",
            "beforeUpsert",
            "afterUpsert",
            "beforeFind",
            "afterFind",
        ]
    );
}
