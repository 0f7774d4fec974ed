use std::{fs::{self, File}, io::{self, BufReader, Read, Write}, process::ExitCode, time::Instant};

use clap::Parser;
use huffman_rust::{BitBuffer, HuffmanDecoder, Properties, Result};

#[derive(Parser, Debug)]
#[command(about = "Decompress a file produced by huff_compress")]
struct Args {
    /// The compressed file, `-` for standard input
    #[arg(default_value = "-")]
    source_name: String,
    /// The destination file, `-` for standard output
    #[arg(default_value = "-")]
    dest_name: String,
    /// Check the stream against a .properties file written at compression time
    #[arg(short, long)]
    properties: Option<String>,
}

fn run(args: &Args) -> Result<()> {
    let input = if args.source_name == "-" {
        let mut input = Vec::new();
        io::stdin().lock().read_to_end(&mut input)?;
        input
    } else {
        fs::read(&args.source_name)?
    };

    let decomp_time = Instant::now();
    let mut stream = BitBuffer::from_bytes(&input);
    let decoder = HuffmanDecoder::read_header(&mut stream)?;

    if let Some(path) = args.properties.as_ref() {
        let props = Properties::read(BufReader::new(File::open(path)?))?;
        props.check(decoder.header())?;
        log::info!("header matches {}", path);
    }

    let output = decoder.decode_all(&mut stream)?;
    log::info!(
        "decompressed {} bytes into {} in {}ns",
        input.len(), output.len(), decomp_time.elapsed().as_nanos()
    );

    if args.dest_name == "-" {
        let mut out = io::stdout().lock();
        out.write_all(&output)?;
        out.flush()?;
    } else {
        fs::write(&args.dest_name, &output)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("huff_decompress: {}", e);
            ExitCode::FAILURE
        }
    }
}
