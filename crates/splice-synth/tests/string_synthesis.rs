use splice_core::CustomHash;
use splice_synth::{Alphabet, Domain, SymbolicHash, SynthConfig, Synthesizer, Value};

fn text(s: &str) -> Value {
    Value::Str(s.to_string())
}

fn letters() -> Synthesizer {
    Synthesizer::for_type::<String>(&SynthConfig::default()).unwrap()
}

fn solved(synth: &Synthesizer) -> Option<String> {
    match synth.solve().unwrap() {
        Some(Value::Str(s)) => Some(s),
        None => None,
        other => panic!("expected a string, got {other:?}"),
    }
}

fn less(bound: &str) -> Option<String> {
    let mut synth = letters();
    synth.less_than(&text(bound)).unwrap();
    solved(&synth)
}

fn greater(bound: &str) -> Option<String> {
    let mut synth = letters();
    synth.greater_than(&text(bound)).unwrap();
    solved(&synth)
}

#[test]
fn less_than_examples() {
    assert_eq!(less("Jack").as_deref(), Some("I"));
    assert_eq!(less("Adam").as_deref(), Some("Ac"));
    assert_eq!(less("AA").as_deref(), Some("A"));
    assert_eq!(less("A").as_deref(), Some(""));
    assert_eq!(less(""), None);
}

#[test]
fn greater_than_examples() {
    assert_eq!(greater("Jack").as_deref(), Some("K"));
    assert_eq!(greater("z").as_deref(), Some("zA"));
    assert_eq!(greater("zza").as_deref(), Some("zzb"));
    assert_eq!(greater("").as_deref(), Some("A"));
}

#[test]
fn inclusive_relations_admit_the_bound() {
    let mut synth = letters();
    synth.less_or_equal(&text("")).unwrap();
    assert_eq!(solved(&synth).as_deref(), Some(""));

    synth.reset();
    synth.less_or_equal(&text("A")).unwrap();
    assert_eq!(solved(&synth).as_deref(), Some(""));

    synth.reset();
    synth.greater_or_equal(&text("zza")).unwrap();
    assert_eq!(solved(&synth).as_deref(), Some("zzb"));
}

#[test]
fn bounded_examples() {
    let mut synth = letters();
    let value = synth
        .bounded_synthesis(Some(&text("zzzB")), Some(&text("zzz")))
        .unwrap();
    assert_eq!(value, Some(text("zzzA")));

    synth.reset();
    let value = synth
        .bounded_synthesis(Some(&text("Luke")), Some(&text("Blair")))
        .unwrap();
    assert_eq!(value, Some(text("G")));

    synth.reset();
    let value = synth
        .bounded_synthesis(Some(&text("B")), Some(&text("Az")))
        .unwrap();
    assert_eq!(value, Some(text("AzA")));
}

#[test]
fn bounded_with_nothing_between_is_unsat() {
    let mut synth = letters();
    let value = synth
        .bounded_synthesis(Some(&text("AA")), Some(&text("A")))
        .unwrap();
    assert_eq!(value, None);
}

#[test]
fn independent_relations_intersect() {
    let mut synth = letters();
    synth
        .less_than(&text("M"))
        .unwrap()
        .greater_than(&text("K"))
        .unwrap();
    assert_eq!(solved(&synth).as_deref(), Some("L"));
}

#[test]
fn product_search_finds_shortest_survivor() {
    let mut synth = letters();
    synth
        .less_than(&text("C"))
        .unwrap()
        .greater_than(&text("B"))
        .unwrap()
        .not_equal(&text("BA"))
        .unwrap();
    assert_eq!(solved(&synth).as_deref(), Some("BB"));
}

#[test]
fn length_limit_is_honoured() {
    let config = SynthConfig {
        max_string_len: 2,
        ..SynthConfig::default()
    };
    let mut synth = Synthesizer::for_type::<String>(&config).unwrap();
    synth.greater_than(&text("zz")).unwrap();
    assert_eq!(solved(&synth), None);
}

#[test]
fn printable_alphabet_orders_punctuation() {
    let mut synth = Synthesizer::new(Domain::string(Alphabet::printable_ascii(), 50));
    synth.less_than(&text("A")).unwrap();
    assert_eq!(solved(&synth).as_deref(), Some("@"));
}

#[test]
fn hash_preserving_string() {
    let original = "Luke".to_string();
    let mut synth = letters();
    synth
        .equals_under(String::hash_term, i128::from(original.custom_hash()))
        .unwrap()
        .not_equal(&text(&original))
        .unwrap();
    let value = solved(&synth).unwrap();
    assert_ne!(value, original);
    assert_eq!(value.custom_hash(), original.custom_hash());
    assert_eq!(value, "AAxx");
}

#[test]
fn hash_and_order_together() {
    let original = "Jack".to_string();
    let mut synth = letters();
    synth
        .equals_under(String::hash_term, i128::from(original.custom_hash()))
        .unwrap()
        .greater_than(&text("a"))
        .unwrap();
    let value = solved(&synth).unwrap();
    assert!(value.as_str() > "a");
    assert_eq!(value.custom_hash(), original.custom_hash());
}

#[test]
fn foreign_characters_are_rejected() {
    let mut synth = letters();
    let err = synth.less_than(&text("Jo hn")).unwrap_err();
    assert_eq!(err.info().code, "alphabet-violation");
    let err = synth
        .bounded(Some(&text("A")), Some(&text("B")))
        .unwrap_err();
    assert_eq!(err.info().code, "inverted-bounds");
    let err = synth.equals_under(|s| s.char_at(50), 0).unwrap_err();
    assert_eq!(err.info().code, "unsupported-operator");
}
