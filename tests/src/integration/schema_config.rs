//! # Schema & Configuration Flows
//!
//! The registry surfaces a front-end builds on: the schema document that
//! travels with a proof root, configuration parsing with preserved
//! unknown keys, and the typo-correction path.

#[cfg(test)]
mod tests {
    use af_01_schema::suggest::{
        suggest_epistemic_state, suggest_inference, suggest_node_kind, suggest_severity,
        suggest_target,
    };
    use af_01_schema::{
        ChallengeSeverity, ChallengeTarget, EpistemicState, InferenceKind, NodeKind, Schema,
    };
    use af_05_coordination::{ConfigError, Coordinator, MetaConfig};

    #[test]
    fn test_schema_document_travels_with_a_root() {
        let dir = tempfile::tempdir().unwrap();
        // A front-end writes the schema beside the ledger at init time.
        let schema = Schema::current();
        let schema_path = dir.path().join("schema.json");
        std::fs::write(&schema_path, schema.to_json().unwrap()).unwrap();

        // A later process loads and trusts it.
        let raw = std::fs::read_to_string(&schema_path).unwrap();
        let loaded = Schema::from_json(&raw).unwrap();
        assert_eq!(loaded, schema);
        assert!(loaded.permits_epistemic_state(EpistemicState::NeedsRefinement));
        assert!(loaded.permits_inference(InferenceKind::ExistsElim));
    }

    #[test]
    fn test_config_drives_coordinator_limits() {
        let dir = tempfile::tempdir().unwrap();
        let config = MetaConfig::from_json(
            r#"{
                "version": "1.0",
                "lock_timeout": 60,
                "max_depth": 3,
                "max_children": 4,
                "team": "group-theory"
            }"#,
        )
        .unwrap();
        assert_eq!(config.extra["team"], "group-theory");

        let coordinator = Coordinator::open(dir.path(), "prover", config).unwrap();
        coordinator.init("c").unwrap();
        let lock = coordinator.claim(&"1".parse().unwrap(), None).unwrap();
        // The configured default timeout governs the claim deadline.
        let lifetime = lock
            .expires_at()
            .as_datetime()
            .signed_duration_since(lock.acquired_at().as_datetime());
        assert!(lifetime.num_seconds() >= 59 && lifetime.num_seconds() <= 61);
    }

    #[test]
    fn test_bad_config_refuses_to_open() {
        assert!(matches!(
            MetaConfig::from_json(r#"{"version":"1.0","max_depth":0}"#),
            Err(ConfigError::OutOfRange { key: "max_depth", .. })
        ));
        assert!(matches!(
            MetaConfig::from_json(r#"{"version":"0.9"}"#),
            Err(ConfigError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_typo_correction_across_registries() {
        assert_eq!(
            suggest_epistemic_state("need_refinement"),
            Some(EpistemicState::NeedsRefinement)
        );
        assert_eq!(suggest_node_kind("local_asume"), Some(NodeKind::LocalAssume));
        assert_eq!(
            suggest_inference("forall_intro "),
            Some(InferenceKind::ForallIntro)
        );
        assert_eq!(suggest_target("dependancies"), Some(ChallengeTarget::Dependencies));
        assert_eq!(suggest_severity("MAJOR"), Some(ChallengeSeverity::Major));

        // Nonsense stays unmatched rather than landing on a random value.
        assert_eq!(suggest_epistemic_state("finished"), None);
        assert_eq!(suggest_target("vibes"), None);
    }

    #[test]
    fn test_registry_wire_values_are_stable() {
        // These strings are the on-disk vocabulary of every ledger; a
        // rename is a breaking format change.
        let states: Vec<&str> = EpistemicState::all().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            states,
            vec![
                "pending",
                "validated",
                "admitted",
                "refuted",
                "archived",
                "needs_refinement"
            ]
        );
        let kinds: Vec<&str> = NodeKind::all().iter().map(|k| k.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["claim", "local_assume", "local_discharge", "case", "qed"]
        );
        let targets: Vec<&str> = ChallengeTarget::all().iter().map(|t| t.as_str()).collect();
        assert_eq!(
            targets,
            vec![
                "statement",
                "inference",
                "context",
                "dependencies",
                "scope",
                "gap",
                "type_error",
                "domain",
                "completeness"
            ]
        );
    }
}
