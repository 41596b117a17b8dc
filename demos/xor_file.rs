use feedforward::Network;
use tracing_subscriber::EnvFilter;

fn main() -> feedforward::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let file_path = "xor_model.json";

    // Try to load the network from a file, or create a new one if that fails
    let mut nn = match Network::from_file(file_path) {
        Ok(nn) => {
            println!("Loaded network from file.");
            nn
        }
        Err(err) => {
            println!("Creating a new network ({err}).");
            Network::new(&[2, 4, 1])?
        }
    };

    // Training data for XOR
    let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let targets = [[0.0], [1.0], [1.0], [0.0]];

    // Train the network
    nn.train(&inputs, &targets, 100_000, 0.3)?;

    // Test the network
    for (input, expected) in inputs.iter().zip(&targets) {
        let output = nn.propagate(input)?;
        println!(
            "Input: {:?}, Expected: {:?}, Got: {:.4}",
            input, expected[0], output[0]
        );
    }

    // Save the trained network to a file
    match nn.save_to_file(file_path) {
        Ok(()) => println!("Network saved to file."),
        Err(err) => eprintln!("Failed to save network to file: {err}"),
    }

    Ok(())
}
