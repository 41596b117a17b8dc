use feedforward::Network;
use tracing_subscriber::EnvFilter;

fn normalize(x: f64, min: f64, max: f64) -> f64 {
    (x - min) / (max - min)
}

fn denormalize(x: f64, min: f64, max: f64) -> f64 {
    x * (max - min) + min
}

fn main() -> feedforward::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Create a network with 1 input, one hidden layer of 10 units, and 1 output
    let mut nn = Network::new(&[1, 10, 1])?;

    // Generate training data: f(x) = x^2 for x in [-1, 1]
    let (inputs, targets): (Vec<Vec<f64>>, Vec<Vec<f64>>) = (-100..=100)
        .map(|i| {
            let x = i as f64 / 100.0;
            let y = x * x;
            (vec![normalize(x, -1.0, 1.0)], vec![normalize(y, 0.0, 1.0)])
        })
        .unzip();

    // Train the network
    println!("Training...");
    for block in 0..50 {
        nn.train(&inputs, &targets, 20_000, 0.1)?;

        if block % 5 == 0 {
            println!(
                "Iteration {}: MSE = {:.6}",
                (block + 1) * 20_000,
                nn.mean_squared_error(&inputs, &targets)?
            );
        }
    }

    // Test the network
    println!("\nTesting...");
    for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        let output = nn.propagate(&[normalize(x, -1.0, 1.0)])?;
        let predicted = denormalize(output[0], 0.0, 1.0);
        println!(
            "x = {:.3}, x^2 = {:.3}, predicted = {:.3}, error = {:.3}",
            x,
            x * x,
            predicted,
            ((x * x) - predicted).abs()
        );
    }

    Ok(())
}
