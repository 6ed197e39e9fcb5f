//! Property tests for version label arithmetic.

use proptest::prelude::*;
use studio_model::{next_label, Configuration, VersioningEngine};

proptest! {
    /// N saves from "1.0.0" produce 1.1, 1.2, ... strictly increasing.
    #[test]
    fn saves_are_strictly_increasing(saves in 1usize..60) {
        let engine = VersioningEngine::new("prop");
        let mut config = Configuration::create_default("Prop Bot");
        let mut previous = 1.0_f64;

        for n in 1..=saves {
            engine.save(&mut config, "");
            let expected = format!("{:.1}", 1.0 + n as f64 * 0.1);
            prop_assert_eq!(&config.current_version, &expected);

            let value: f64 = config.current_version.parse().unwrap();
            prop_assert!(value > previous);
            previous = value;
        }
        prop_assert_eq!(config.versions.len(), saves + 1);
    }

    /// Any one-decimal label advances by exactly one tenth.
    #[test]
    fn next_label_adds_one_tenth(whole in 0u32..500, tenth in 0u32..10) {
        let label = format!("{whole}.{tenth}");
        let next: f64 = next_label(&label).parse().unwrap();
        let current: f64 = label.parse().unwrap();
        prop_assert!((next - current - 0.1).abs() < 1e-9);
    }
}
