use agency::search::{HashEmbedder, dot_similarity};
use agency::selection::SkillSelector;
use proptest::prelude::*;

use crate::strategies::{arb_config, arb_registry};

proptest! {
    #[test]
    fn hash_embedding_is_deterministic(text in ".*") {
        let embedder = HashEmbedder::new(64);
        prop_assert_eq!(embedder.embed_text(&text), embedder.embed_text(&text));
    }

    #[test]
    fn hash_embedding_has_requested_length(text in ".*", dim in 1usize..256usize) {
        let embedder = HashEmbedder::new(dim);
        prop_assert_eq!(embedder.embed_text(&text).len(), dim);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
        let embedder = HashEmbedder::new(32);
        let (va, vb) = (embedder.embed_text(&a), embedder.embed_text(&b));
        let ab = dot_similarity(&va, &vb);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!((ab - dot_similarity(&vb, &va)).abs() < 1e-12);
    }

    #[test]
    fn selection_is_deterministic(config in arb_config(), registry in arb_registry(true)) {
        let embedder = HashEmbedder::new(32);
        let run = || {
            SkillSelector::new(&config, &registry)
                .with_embeddings(&embedder)
                .generated_at("2026-01-01T00:00:00.000000")
                .run()
        };
        let (first, second) = (run(), run());
        prop_assert_eq!(&first.selected, &second.selected);
        prop_assert_eq!(first.manifest, second.manifest);
    }
}
