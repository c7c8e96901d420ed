//! # State Machine Tables
//!
//! Exhaustive checks over both transition tables: the validators accept
//! exactly the allowed pairs, terminal states have no way out, and taint
//! introduction is unique to `admitted`.

#[cfg(test)]
mod tests {
    use af_01_schema::{
        validate_epistemic_transition, validate_workflow_transition, ChallengeSeverity,
        EpistemicState, WorkflowState,
    };

    #[test]
    fn test_epistemic_validator_matches_table_exactly() {
        for from in EpistemicState::all() {
            for to in EpistemicState::all() {
                let allowed = from.allowed_transitions().contains(to);
                assert_eq!(
                    validate_epistemic_transition(*from, *to).is_ok(),
                    allowed,
                    "validator and table disagree on {} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_workflow_validator_matches_table_exactly() {
        for from in WorkflowState::all() {
            for to in WorkflowState::all() {
                let allowed = from.allowed_transitions().contains(to);
                assert_eq!(
                    validate_workflow_transition(*from, *to).is_ok(),
                    allowed,
                    "validator and table disagree on {} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_no_same_state_transition_anywhere() {
        for state in EpistemicState::all() {
            assert!(validate_epistemic_transition(*state, *state).is_err());
        }
        for state in WorkflowState::all() {
            assert!(validate_workflow_transition(*state, *state).is_err());
        }
    }

    #[test]
    fn test_final_means_no_outgoing() {
        for state in EpistemicState::all() {
            let has_exit = EpistemicState::all()
                .iter()
                .any(|to| validate_epistemic_transition(*state, *to).is_ok());
            assert_eq!(
                state.is_final(),
                !has_exit,
                "is_final inconsistent for {}",
                state
            );
        }
    }

    #[test]
    fn test_taint_is_unique_to_admitted() {
        let tainting: Vec<_> = EpistemicState::all()
            .iter()
            .filter(|s| s.introduces_taint())
            .collect();
        assert_eq!(tainting, vec![&EpistemicState::Admitted]);
    }

    #[test]
    fn test_every_non_final_state_has_an_exit() {
        for state in EpistemicState::all() {
            if !state.is_final() {
                assert!(
                    !state.allowed_transitions().is_empty(),
                    "{} is non-final but dead-ended",
                    state
                );
            }
        }
    }

    #[test]
    fn test_blocking_severities_are_exactly_critical_and_major() {
        let blocking: Vec<_> = ChallengeSeverity::all()
            .iter()
            .filter(|s| s.blocks_acceptance())
            .collect();
        assert_eq!(
            blocking,
            vec![&ChallengeSeverity::Critical, &ChallengeSeverity::Major]
        );
    }

    #[test]
    fn test_claims_only_from_available() {
        let claimable: Vec<_> = WorkflowState::all()
            .iter()
            .filter(|s| s.permits_claim())
            .collect();
        assert_eq!(claimable, vec![&WorkflowState::Available]);
    }
}
