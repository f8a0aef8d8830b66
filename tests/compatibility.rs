use llama_module::bridge::{self, Operation};
use llama_module::compat::{predict, CompatibilityFeatures, FEATURE_KEYS};
use llama_module::BridgeError;

#[test]
fn test_predict_from_plugin_payload() {
    let payload = r#"{
        "Adventure": 1, "Anime": 0, "Creative": 1, "Fantasy": 0, "Tech": 1,
        "agreeableness": 4.2, "conscientiousness": 3.8, "extraversion": 3.1,
        "neuroticism": 2.0, "openness": 4.5, "same_location": 1
    }"#;

    let p = bridge::predict_compatibility(Some(payload)).unwrap();

    let interest = 3.0 / 5.0;
    let personality = (4.2 * 0.25 + 3.8 * 0.2 + 3.1 * 0.2 + 4.5 * 0.2 + 3.0 * 0.15) / 5.0;
    let score: f64 = interest * 0.3 + personality * 0.6 + 0.1;
    let expected = 1.0 / (1.0 + (-(score.clamp(0.0, 1.0) - 0.5) * 6.0).exp());
    assert!((p - expected).abs() < 1e-9, "got {}, expected {}", p, expected);
}

#[test]
fn test_probability_stays_in_open_interval() {
    let extremes = [
        CompatibilityFeatures::default(),
        CompatibilityFeatures {
            neuroticism: 100.0,
            ..Default::default()
        },
        CompatibilityFeatures {
            adventure: 1e9,
            openness: 1e9,
            same_location: 1e9,
            ..Default::default()
        },
    ];
    for features in extremes {
        let p = predict(&features);
        assert!(p > 0.0 && p < 1.0, "{} out of range for {:?}", p, features);
    }
}

#[test]
fn test_empty_object_uses_defaults() {
    let p = bridge::predict_compatibility(Some("{}")).unwrap();
    assert_eq!(p, predict(&CompatibilityFeatures::default()));
}

#[test]
fn test_bad_payload_maps_to_plugin_message() {
    let err = bridge::predict_compatibility(Some("not json")).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidFeatures(_)));
    assert_eq!(err.java_exception_class(), "java/lang/IllegalArgumentException");
    assert_eq!(Operation::PredictCompatibility.failure_message(&err), "Bad features");
}

#[test]
fn test_every_key_is_read() {
    for (i, key) in FEATURE_KEYS.iter().enumerate() {
        let features = CompatibilityFeatures::from_json(&format!(r#"{{"{}": 3.0}}"#, key)).unwrap();
        let vector = features.to_vector();
        assert_eq!(vector[i], 3.0, "feature {} not mapped", key);
        assert_eq!(vector.iter().filter(|v| **v != 0.0).count(), 1);
    }
}
