//! # Identifier Algebra Laws

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use shared_types::NodeId;

    fn segments() -> impl Strategy<Value = Vec<u64>> {
        proptest::collection::vec(1u64..=10_000, 1..8)
    }

    proptest! {
        /// parse(to_string(a)) = a
        #[test]
        fn prop_parse_display_round_trip(segs in segments()) {
            let id = NodeId::from_segments(segs).unwrap();
            let parsed: NodeId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);
        }

        /// child(parent(a), last(a)) = a for depth >= 2
        #[test]
        fn prop_parent_child_inverse(segs in proptest::collection::vec(1u64..=10_000, 2..8)) {
            let id = NodeId::from_segments(segs).unwrap();
            let parent = id.parent().unwrap();
            prop_assert_eq!(parent.child(id.last_segment()).unwrap(), id);
        }

        /// is_ancestor_of is exactly the strict-prefix relation.
        #[test]
        fn prop_ancestor_is_strict_prefix(a in segments(), b in segments()) {
            let ida = NodeId::from_segments(a.clone()).unwrap();
            let idb = NodeId::from_segments(b.clone()).unwrap();
            let strict_prefix = a.len() < b.len() && b[..a.len()] == a[..];
            prop_assert_eq!(ida.is_ancestor_of(&idb), strict_prefix);
        }

        /// An ancestor always sorts before its descendants.
        #[test]
        fn prop_ancestor_sorts_first(segs in segments(), extra in 1u64..=100) {
            let id = NodeId::from_segments(segs).unwrap();
            let child = id.child(extra).unwrap();
            prop_assert!(id < child);
            prop_assert!(id.is_ancestor_of(&child));
        }

        /// Depth is the segment count and never zero.
        #[test]
        fn prop_depth_counts_segments(segs in segments()) {
            let depth = segs.len();
            let id = NodeId::from_segments(segs).unwrap();
            prop_assert_eq!(id.depth(), depth);
            prop_assert!(id.depth() >= 1);
        }

        /// Serde round-trips through the string wire form.
        #[test]
        fn prop_serde_round_trip(segs in segments()) {
            let id = NodeId::from_segments(segs).unwrap();
            let json = serde_json::to_string(&id).unwrap();
            let back: NodeId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, id);
        }
    }

    proptest! {
        /// Garbage never parses into an id silently: whatever parses must
        /// re-render into an equivalent id.
        #[test]
        fn prop_parse_is_sound(raw in "[0-9.]{0,12}") {
            if let Ok(id) = raw.parse::<NodeId>() {
                let rendered = id.to_string();
                let reparsed: NodeId = rendered.parse().unwrap();
                prop_assert_eq!(reparsed, id);
            }
        }
    }
}
