use std::{fs, io::{self, Read, Write}, process::ExitCode, time::Instant};

use clap::{Parser, ValueEnum};
use huffman_rust::{huffman::report::CodeReport, HuffmanEncoder, Properties, Result};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(about = "Compress a file with a byte-oriented canonical Huffman code")]
struct Args {
    /// The source file, `-` for standard input
    #[arg(default_value = "-")]
    source_name: String,
    /// The destination file, `-` for standard output
    #[arg(default_value = "-")]
    dest_name: String,
    /// Also write <DEST_NAME>.properties
    #[arg(short, long, default_value_t = false)]
    properties: bool,
    /// Print the code table to standard error
    #[arg(short, long, value_enum)]
    report: Option<ReportFormat>,
}

fn read_input(source_name: &str) -> io::Result<Vec<u8>> {
    if source_name == "-" {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        Ok(data)
    } else {
        fs::read(source_name)
    }
}

fn write_output(dest_name: &str, data: &[u8]) -> io::Result<()> {
    if dest_name == "-" {
        let mut out = io::stdout().lock();
        out.write_all(data)?;
        out.flush()
    } else {
        fs::write(dest_name, data)
    }
}

fn run(args: &Args) -> Result<()> {
    if args.properties && args.dest_name == "-" {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "--properties needs a destination file").into());
    }

    let data = read_input(&args.source_name)?;
    log::info!("read {} 8-bit symbols from {}", data.len(), args.source_name);

    let comp_time = Instant::now();
    let encoder = HuffmanEncoder::new(&data);
    let compressed = encoder.compress(&data);
    log::info!(
        "compressed {} bytes into {} in {}ns",
        data.len(), compressed.len(), comp_time.elapsed().as_nanos()
    );

    match args.report {
        Some(ReportFormat::Text) => eprint!("{}", CodeReport::new(&encoder)),
        Some(ReportFormat::Json) => {
            let json = CodeReport::new(&encoder).to_json().map_err(io::Error::from)?;
            eprintln!("{}", json);
        }
        None => {}
    }

    write_output(&args.dest_name, &compressed)?;

    if args.properties {
        let props: String = Properties::from(&encoder).into();
        fs::write(format!("{}.properties", args.dest_name), props)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("huff_compress: {}", e);
            ExitCode::FAILURE
        }
    }
}
