use rand::Rng;
use splice_core::RngHandle;
use splice_synth::{Alphabet, Domain, SynthConfig, Synthesizer, Value};

const PAIRS: usize = 1000;

fn ordered<T: Ord>(a: T, b: T) -> (T, T) {
    if a < b {
        (b, a)
    } else {
        (a, b)
    }
}

#[test]
fn integers_stay_strictly_inside() {
    let mut rng = RngHandle::substream(2024, 1);
    let mut synth = Synthesizer::new(Domain::Int);
    let mut pairs = 0;
    while pairs < PAIRS {
        let a: i64 = rng.gen_range(-1_000_000..1_000_000);
        let b: i64 = if rng.gen_bool(0.1) { a + 1 } else { rng.gen() };
        if a == b {
            continue;
        }
        pairs += 1;
        let (upper, lower) = ordered(a, b);
        synth.reset();
        let value = synth
            .bounded_synthesis(Some(&Value::Int(upper)), Some(&Value::Int(lower)))
            .unwrap();
        let gap = i128::from(upper) - i128::from(lower);
        match value {
            Some(Value::Int(v)) => assert!(lower < v && v < upper, "{lower} < {v} < {upper}"),
            Some(other) => panic!("wrong domain {other:?}"),
            None => assert_eq!(gap, 1, "({lower}, {upper}) has room"),
        }
    }
}

#[test]
fn bit_vectors_stay_strictly_inside() {
    let mut rng = RngHandle::substream(2024, 2);
    let mut synth = Synthesizer::new(Domain::bitvec(32).unwrap());
    let mut pairs = 0;
    while pairs < PAIRS {
        let a = u64::from(rng.gen::<u32>());
        let b = if rng.gen_bool(0.1) {
            a.saturating_add(1).min(u64::from(u32::MAX))
        } else {
            u64::from(rng.gen::<u32>())
        };
        if a == b {
            continue;
        }
        pairs += 1;
        let (upper, lower) = ordered(a, b);
        synth.reset();
        let value = synth
            .bounded_synthesis(Some(&Value::Bits(upper)), Some(&Value::Bits(lower)))
            .unwrap();
        match value {
            Some(Value::Bits(v)) => assert!(lower < v && v < upper),
            Some(other) => panic!("wrong domain {other:?}"),
            None => assert_eq!(upper - lower, 1),
        }
    }
}

fn random_word(rng: &mut RngHandle, alphabet: &Alphabet) -> String {
    let len = rng.gen_range(0..8);
    (0..len)
        .map(|_| alphabet.char_at(rng.gen_range(0..alphabet.len())))
        .collect()
}

#[test]
fn strings_stay_strictly_inside() {
    let config = SynthConfig::default();
    let alphabet = config.alphabet().unwrap();
    let mut rng = RngHandle::substream(2024, 3);
    let mut synth = Synthesizer::for_type::<String>(&config).unwrap();
    let mut pairs = 0;
    let mut found = 0;
    while pairs < PAIRS {
        let a = random_word(&mut rng, &alphabet);
        let b = if rng.gen_bool(0.2) {
            let mut b = a.clone();
            b.push(alphabet.char_at(rng.gen_range(0..alphabet.len())));
            b
        } else {
            random_word(&mut rng, &alphabet)
        };
        if a == b {
            continue;
        }
        pairs += 1;
        let (upper, lower) = ordered(a, b);
        synth.reset();
        let value = synth
            .bounded_synthesis(Some(&Value::Str(upper.clone())), Some(&Value::Str(lower.clone())))
            .unwrap();
        match value {
            Some(Value::Str(v)) => {
                found += 1;
                assert!(lower < v && v < upper, "{lower:?} < {v:?} < {upper:?}");
                assert!(v.chars().all(|ch| alphabet.contains(ch)));
            }
            Some(other) => panic!("wrong domain {other:?}"),
            None => {
                // Only an immediate successor leaves no room: upper == lower + "A".
                let mut successor = lower.clone();
                successor.push(alphabet.first());
                assert_eq!(upper, successor);
            }
        }
    }
    assert!(found > PAIRS / 2);
}
