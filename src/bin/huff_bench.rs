use std::process::ExitCode;

use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use huffman_rust::{compress, decompress, utils::timer::PhaseTimer};

#[derive(Parser, Debug)]
#[command(about = "Measure compression and decompression throughput on random data")]
struct Args {
    /// Number of input bytes
    #[arg(short, long, default_value_t = 1 << 20)]
    size: usize,
    /// Number of distinct byte values, between 1 and 256
    #[arg(short, long, default_value_t = 256, value_parser = clap::value_parser!(u16).range(1..=256))]
    alphabet: u16,
    /// Exponent applied to uniform samples: higher values skew the data towards low bytes
    #[arg(long, default_value_t = 3.0)]
    skew: f64,
    /// Number of repetitions
    #[arg(short, long, default_value_t = 5)]
    rounds: usize,
    /// Seed of the generator, random if absent
    #[arg(long)]
    seed: Option<u64>,
}

fn gen_data(rng: &mut StdRng, size: usize, alphabet: u16, skew: f64) -> Vec<u8> {
    (0..size)
        .map(|_| {
            let r: f64 = rng.gen();
            ((r.powf(skew) * alphabet as f64) as u16).min(alphabet - 1) as u8
        })
        .collect()
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let data = gen_data(&mut rng, args.size, args.alphabet, args.skew);

    let mut timer = PhaseTimer::new();
    let mut compressed_len = 0;

    for _ in 0..args.rounds {
        timer.start("compress");
        let compressed = compress(&data);
        timer.start("decompress");
        let decompressed = decompress(&compressed);
        timer.stop();

        match decompressed {
            Ok(output) if output == data => {}
            Ok(_) => {
                eprintln!("huff_bench: decompressed data differs from the input");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("huff_bench: {}", e);
                return ExitCode::FAILURE;
            }
        }
        compressed_len = compressed.len();
    }

    let megabytes = (data.len() * args.rounds) as f64 / (1 << 20) as f64;
    let seconds = |nanos: u128| nanos as f64 / 1e9;

    println!("input {} bytes, output {} bytes ({:.4} ratio)", data.len(), compressed_len, compressed_len as f64 / data.len().max(1) as f64);
    println!("compress   {:>10.2} MiB/s", megabytes / seconds(timer.get("compress")));
    println!("decompress {:>10.2} MiB/s", megabytes / seconds(timer.get("decompress")));

    ExitCode::SUCCESS
}
