use feedforward::{Error, Network, UnitId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn trained(seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nn = Network::with_rng(&[3, 5, 4, 2], &mut rng).unwrap();
    let inputs: Vec<Vec<f64>> = (0..8)
        .map(|_| (0..3).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect();
    let targets: Vec<Vec<f64>> = (0..8)
        .map(|_| (0..2).map(|_| rng.random::<f64>()).collect())
        .collect();
    nn.train_with_rng(&inputs, &targets, 2_000, 0.7, &mut rng)
        .unwrap();
    nn
}

#[test]
fn reloaded_network_propagates_bit_exactly() {
    let mut original = trained(1);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.json");

    original.save_to_file(&path).unwrap();
    let mut restored = Network::from_file(&path).unwrap();

    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..100 {
        let input: Vec<f64> = (0..3).map(|_| rng.random_range(-5.0..5.0)).collect();
        let expected = original.propagate(&input).unwrap();
        let actual = restored.propagate(&input).unwrap();
        assert_eq!(
            expected.iter().map(|y| y.to_bits()).collect::<Vec<_>>(),
            actual.iter().map(|y| y.to_bits()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn reloaded_graph_mirrors_original_adjacency() {
    let original = trained(3);
    let mut buffer = Vec::new();
    original.save(&mut buffer).unwrap();
    let restored = Network::load(buffer.as_slice()).unwrap();

    assert_eq!(restored.layer_sizes(), original.layer_sizes());
    assert_eq!(restored.connections(), original.connections());
    assert_eq!(restored.snapshot(), original.snapshot());

    for (layer, sizes) in original.layer_sizes().iter().enumerate() {
        for index in 0..*sizes {
            let id = UnitId::new(layer, index);
            let (a, b) = (original.unit(id).unwrap(), restored.unit(id).unwrap());
            assert_eq!(a.incoming(), b.incoming());
            assert_eq!(a.outgoing(), b.outgoing());
            assert_eq!(a.bias().to_bits(), b.bias().to_bits());
        }
    }
}

#[test]
fn reloaded_network_keeps_training_identically() {
    let mut original = trained(4);
    let mut buffer = Vec::new();
    original.save(&mut buffer).unwrap();
    let mut restored = Network::load(buffer.as_slice()).unwrap();

    let inputs = [[0.1, 0.2, 0.3], [0.9, -0.4, 0.0]];
    let targets = [[1.0, 0.0], [0.0, 1.0]];
    original
        .train_with_rng(&inputs, &targets, 300, 0.4, &mut StdRng::seed_from_u64(5))
        .unwrap();
    restored
        .train_with_rng(&inputs, &targets, 300, 0.4, &mut StdRng::seed_from_u64(5))
        .unwrap();

    assert_eq!(original.snapshot(), restored.snapshot());
}

#[test]
fn truncated_stream_is_rejected() {
    let mut buffer = Vec::new();
    trained(6).save(&mut buffer).unwrap();
    buffer.truncate(buffer.len() / 2);

    assert!(matches!(
        Network::load(buffer.as_slice()),
        Err(Error::Corrupt(_))
    ));
}
