use splice_synth::{SynthConfig, UnboundedPolicy, DEFAULT_SEARCH_BUDGET};

#[test]
fn empty_document_yields_defaults() {
    let config: SynthConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config, SynthConfig::default());
    assert_eq!(config.max_string_len, 50);
    assert_eq!(config.bitvec_width, 32);
    assert_eq!(config.search_budget, DEFAULT_SEARCH_BUDGET);
    assert_eq!(config.unbounded, UnboundedPolicy::Reflag);
    assert_eq!(config.alphabet().unwrap().len(), 52);
    config.validate().unwrap();
}

#[test]
fn partial_document_overrides_fields() {
    let yaml = "alphabet: \"cbaCBA\"\nmax_string_len: 8\nunbounded: reject\n";
    let config: SynthConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.max_string_len, 8);
    assert_eq!(config.unbounded, UnboundedPolicy::Reject);
    let alphabet = config.alphabet().unwrap();
    assert_eq!(alphabet.as_string(), "ABCabc");
    assert_eq!(alphabet.first(), 'A');
    assert_eq!(alphabet.last(), 'c');
}

#[test]
fn validation_reports_the_offending_field() {
    let mut config = SynthConfig::default();
    config.alphabet.clear();
    assert_eq!(config.validate().unwrap_err().info().code, "invalid-alphabet");

    let mut config = SynthConfig::default();
    config.max_string_len = 0;
    assert_eq!(config.validate().unwrap_err().info().code, "invalid-max-length");

    let mut config = SynthConfig::default();
    config.bitvec_width = 0;
    assert_eq!(config.validate().unwrap_err().info().code, "invalid-bitvec-width");

    let mut config = SynthConfig::default();
    config.search_budget = 0;
    assert_eq!(config.validate().unwrap_err().info().code, "invalid-search-budget");
}

#[test]
fn config_roundtrips_through_yaml() {
    let config = SynthConfig {
        search_budget: 1234,
        unbounded: UnboundedPolicy::Reject,
        ..SynthConfig::default()
    };
    let text = serde_yaml::to_string(&config).unwrap();
    assert!(text.contains("unbounded: reject"));
    let back: SynthConfig = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, config);
}
