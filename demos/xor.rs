use feedforward::Network;
use tracing_subscriber::EnvFilter;

fn main() -> feedforward::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Create a network with 2 inputs, one hidden layer of 4 units, and 1 output
    let mut nn = Network::new(&[2, 4, 1])?;

    // Training data for XOR
    let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let targets = [[0.0], [1.0], [1.0], [0.0]];

    println!(
        "Untrained MSE = {:.6}",
        nn.mean_squared_error(&inputs, &targets)?
    );

    // Train the network
    nn.train(&inputs, &targets, 400_000, 0.3)?;

    // Test the network
    for (input, expected) in inputs.iter().zip(&targets) {
        let output = nn.propagate(input)?;
        println!(
            "Input: {:?}, Expected: {:?}, Got: {:.4}",
            input, expected[0], output[0]
        );
    }

    println!(
        "Trained MSE = {:.6}",
        nn.mean_squared_error(&inputs, &targets)?
    );

    Ok(())
}
