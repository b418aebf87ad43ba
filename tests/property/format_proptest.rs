//! Property-based tests for name rendering and truncation

use proptest::prelude::*;
use tracksync::shared::{truncate, NameTemplate, Track};

proptest! {
    #[test]
    fn test_truncate_is_idempotent(value in ".{0,80}", max in 1usize..70, ellipsis in any::<bool>()) {
        let once = truncate(&value, max, ellipsis);
        let twice = truncate(&once, max, ellipsis);
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn test_truncate_respects_limit(value in ".{0,80}", max in 1usize..70, ellipsis in any::<bool>()) {
        let out = truncate(&value, max, ellipsis);
        prop_assert!(out.chars().count() <= max);
        if !ellipsis || value.chars().count() <= max {
            prop_assert!(value.starts_with(&out));
        }
    }

    #[test]
    fn test_plain_text_renders_verbatim(text in "[^{}]{0,40}") {
        let track = Track::new("id", "Title", vec!["Artist".to_string()]);
        prop_assert_eq!(NameTemplate::parse(&text).render(&track), text);
    }

    #[test]
    fn test_rendering_never_fails(template in ".{0,40}", title in ".{0,20}", artists in prop::collection::vec(".{0,10}", 0..3)) {
        let track = Track::new("id", title, artists);
        let rendered = NameTemplate::parse(&template).render(&track);
        // Deterministic
        prop_assert_eq!(rendered, NameTemplate::parse(&template).render(&track));
    }
}
