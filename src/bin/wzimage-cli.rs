//! wzimage-cli - Command-line interface for wzimage
//!
//! A command-line tool for decoding WZ canvas requests into PNG images.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use wzimage::crypto::{blocks, is_zlib_header};
use wzimage::pipeline::significant_len;
use wzimage::{
    parse_batch, DecodeOptions, DecodeRequest, DecodeResponse, PixelFormat, WzDecoder,
    WzKeyVariant,
};

#[derive(Parser)]
#[command(name = "wzimage-cli")]
#[command(about = "A CLI tool for decoding WZ canvas images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Archive key variant
    #[arg(long, value_enum, global = true, default_value_t = CliKeyVariant::Gms)]
    variant: CliKeyVariant,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one request to a PNG file
    Decode {
        /// Request JSON file
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Decode a batch of requests (JSON array or JSON lines) to responses
    Batch {
        /// Request file, or - for stdin
        input: PathBuf,

        /// Response file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Get information about a request payload
    Info {
        /// Request JSON file
        input: PathBuf,
    },

    /// Print keystream bytes as hex
    Keystream {
        /// Number of bytes to print
        #[arg(short, long, default_value_t = 64)]
        length: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliKeyVariant {
    /// Global releases (IV 4D 23 C7 2B) - Default
    Gms,
    /// Korean releases (IV B9 7D 63 E9)
    Kms,
    /// Unencrypted archives (zero IV)
    Classic,
}

impl From<CliKeyVariant> for WzKeyVariant {
    fn from(variant: CliKeyVariant) -> Self {
        match variant {
            CliKeyVariant::Gms => WzKeyVariant::Gms,
            CliKeyVariant::Kms => WzKeyVariant::Kms,
            CliKeyVariant::Classic => WzKeyVariant::Classic,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let options = DecodeOptions::new().with_key_variant(cli.variant.into());

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            force,
        } => decode_file(&input, &output, options, force, cli.verbose, cli.quiet),
        Commands::Batch { input, output } => {
            decode_batch(&input, output.as_deref(), options, cli.verbose, cli.quiet)
        }
        Commands::Info { input } => show_request_info(&input, options, cli.verbose),
        Commands::Keystream { length } => {
            show_keystream(options.with_keystream_len(length), cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn read_request(input: &Path) -> Result<DecodeRequest, Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }
    Ok(DecodeRequest::from_json(&fs::read_to_string(input)?)?)
}

fn decode_file(
    input: &Path,
    output: &Path,
    options: DecodeOptions,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(input)?;

    // Check if output file exists and force flag
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    if verbose {
        println!("Decoding '{}' to '{}'", input.display(), output.display());
        println!(
            "Size: {}x{}, declared format: {:?}",
            request.width, request.height, request.wzrawformat
        );
    }

    let start_time = Instant::now();

    let asset = request.to_asset()?;
    let decoder = WzDecoder::new(options);
    let decoded = decoder
        .decode(&asset)
        .map_err(|e| format!("Decoding failed: {}", e))?;
    let image = decoded.to_png()?;

    fs::write(output, &image.png)?;

    if !quiet {
        println!("✓ Decoding successful!");
        println!("  Size:    {}x{}", image.width, image.height);
        println!("  Format:  {}", decoded.format);
        println!("  Payload: {} bytes", asset.payload.len());
        println!("  PNG:     {} bytes", image.png.len());
        println!("  Time:    {:.2?}", start_time.elapsed());
    }

    Ok(())
}

fn decode_batch(
    input: &Path,
    output: Option<&Path>,
    options: DecodeOptions,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        if !input.exists() {
            return Err(format!("Input file '{}' does not exist", input.display()).into());
        }
        fs::read_to_string(input)?
    };

    let requests = parse_batch(&text)?;
    let total = requests.len();
    if verbose {
        eprintln!("Decoding {} requests", total);
    }

    // Show progress bar for larger batches
    let progress = if !quiet && total > 1 {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb.set_message("Decoding...");
        Some(pb)
    } else {
        None
    };

    let start_time = Instant::now();
    let decoder = WzDecoder::new(options);
    let mut responses = Vec::with_capacity(total);
    for request in requests {
        let response = decoder.handle(request);
        if verbose {
            if let DecodeResponse::Error { id, error } = &response {
                eprintln!("  {}: {}", id, error);
            }
        }
        responses.push(response);
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(ref pb) = progress {
        pb.finish_with_message("Decoding complete");
    }

    let json = serde_json::to_string_pretty(&responses)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }

    if !quiet {
        let failed = responses.iter().filter(|r| r.is_error()).count();
        eprintln!(
            "✓ Decoded {} of {} requests in {:.2?}",
            total - failed,
            total,
            start_time.elapsed()
        );
    }

    Ok(())
}

fn show_request_info(
    input: &Path,
    options: DecodeOptions,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(input)?;
    let asset = request.to_asset()?;
    wzimage::common::validate_dimensions(asset.width, asset.height)?;
    let decoder = WzDecoder::new(options);

    println!("WZ Canvas Information:");
    println!("  File: {}", input.display());
    println!("  Id: {}", request.id);
    println!("  Size: {}x{}", asset.width, asset.height);
    println!("  Payload: {} bytes", asset.payload.len());

    if verbose && asset.payload.len() >= 4 {
        println!(
            "  Header bytes: {:02x} {:02x} {:02x} {:02x}",
            asset.payload[0], asset.payload[1], asset.payload[2], asset.payload[3]
        );
    }

    if is_zlib_header(&asset.payload) {
        println!("  Container: plain zlib stream");
    } else {
        let mut container = blocks(&asset.payload);
        let count = container.by_ref().count();
        println!("  Container: encrypted blocks ({} blocks)", count);
        if let Some(stop) = container.stop_reason() {
            println!(
                "  Note: block walk stopped at offset {}: {}",
                container.offset(),
                stop
            );
        }
    }

    let (format, raw, how) = match asset.declared_format {
        Some(tag) => {
            let format = PixelFormat::from_raw(tag);
            let expected_size = format.raw_size(asset.width, asset.height)?;
            let raw = decoder.inflate_payload(&asset.payload, expected_size);
            let how = if format.raw() == tag {
                "declared"
            } else {
                "fallback"
            };
            (format, raw, how)
        }
        None => {
            let (format, raw) = decoder.infer_format(&asset.payload, asset.width, asset.height)?;
            (format, raw, "inferred")
        }
    };

    println!("  Format: {} ({})", format, how);
    println!("  Data: {} of {} inflated bytes used", significant_len(&raw), raw.len());

    Ok(())
}

fn show_keystream(options: DecodeOptions, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = WzDecoder::new(options);
    let keystream = decoder.keystream();

    if verbose {
        let iv = keystream.iv();
        println!(
            "IV: {:02x} {:02x} {:02x} {:02x}, {} bytes",
            iv[0],
            iv[1],
            iv[2],
            iv[3],
            keystream.len()
        );
    }

    print!("{}", hex_dump(keystream.as_bytes()));
    Ok(())
}

fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        out.push_str(&format!("{:08x}  {}\n", row * 16, hex.join(" ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::fs;
    use tempfile::tempdir;

    /// zlib stream holding one stored block with a single BGRA8888 pixel
    fn request_json(id: u32) -> String {
        let payload = [0x78, 0x01, 0x01, 0x04, 0x00, 0xFB, 0xFF, 0x10, 0x20, 0x30, 0x40];
        format!(
            r#"{{"id": {}, "basedata": "{}", "width": 1, "height": 1, "wzrawformat": 2}}"#,
            id,
            STANDARD.encode(payload)
        )
    }

    #[test]
    fn test_decode_to_png() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input_path = dir.path().join("request.json");
        let output_path = dir.path().join("canvas.png");
        fs::write(&input_path, request_json(1))?;

        decode_file(
            &input_path,
            &output_path,
            DecodeOptions::new(),
            false,
            false,
            true,
        )?;

        let png = fs::read(&output_path)?;
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        // Refuses to overwrite without --force
        assert!(decode_file(
            &input_path,
            &output_path,
            DecodeOptions::new(),
            false,
            false,
            true
        )
        .is_err());
        decode_file(
            &input_path,
            &output_path,
            DecodeOptions::new(),
            true,
            false,
            true,
        )?;

        Ok(())
    }

    #[test]
    fn test_batch() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input_path = dir.path().join("requests.jsonl");
        let output_path = dir.path().join("responses.json");
        let bad = r#"{"id": 3, "basedata": "!!", "width": 1, "height": 1}"#;
        fs::write(
            &input_path,
            format!("{}\n{}\n{}\n", request_json(1), request_json(2), bad),
        )?;

        decode_batch(
            &input_path,
            Some(output_path.as_path()),
            DecodeOptions::new(),
            false,
            true,
        )?;

        let responses: Vec<DecodeResponse> =
            serde_json::from_str(&fs::read_to_string(&output_path)?)?;
        assert_eq!(responses.len(), 3);
        assert!(!responses[0].is_error());
        assert!(!responses[1].is_error());
        assert!(responses[2].is_error());

        Ok(())
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(show_request_info(&missing, DecodeOptions::new(), false).is_err());
    }

    #[test]
    fn test_hex_dump() {
        let dump = hex_dump(&(0..18u8).collect::<Vec<_>>());
        assert_eq!(
            dump,
            "00000000  00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f\n\
             00000010  10 11\n"
        );
    }
}
