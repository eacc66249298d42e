use nmt_core::config::NmtConfig;

#[test]
fn default_config_has_384_dimensions() {
    let config = NmtConfig::default();
    assert_eq!(config.embedding.dimensions, 384);
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let toml_str = r#"
        [storage]
        data_dir = "/tmp/nmt-data"
    "#;
    let config = NmtConfig::from_toml(toml_str).expect("valid toml");
    assert_eq!(config.storage.data_dir, "/tmp/nmt-data");
    // Untouched sections fall back to their defaults.
    assert_eq!(config.hnsw.m, 16);
    assert_eq!(config.graph.hebbian_rate, 0.05);
}

#[test]
fn keyword_weight_bands_match_spec_thresholds() {
    let config = NmtConfig::default().retrieval;
    assert_eq!(config.keyword_weight_for(2), 0.15);
    assert_eq!(config.keyword_weight_for(3), 0.15);
    assert_eq!(config.keyword_weight_for(4), 0.25);
    assert_eq!(config.keyword_weight_for(7), 0.25);
    assert_eq!(config.keyword_weight_for(8), 0.35);
}
