//! Command line front-end for the decoder.
//!
//! Takes exactly one positional argument, the path to a baseline
//! JPEG file, decodes it and writes the raster next to the input as
//! a binary PPM. Exits zero on success and non-zero on any decode
//! failure.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Arg, Command};
use log::{error, info};
use lumo_core::options::DecoderOptions;
use lumo_jpeg::JpegDecoder;
use memmap2::Mmap;

fn main() -> ExitCode
{
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("could not install the logger");

    let matches = Command::new("lumo")
        .about("Decode a baseline JPEG file to a PPM image")
        .arg(
            Arg::new("input")
                .required(true)
                .help("Path to the JPEG file to decode")
        )
        .get_matches();

    let input: &String = matches.get_one("input").unwrap();

    match decode_to_ppm(Path::new(input))
    {
        Ok(output) =>
        {
            info!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(reason) =>
        {
            error!("Could not decode {input}: {reason}");
            ExitCode::FAILURE
        }
    }
}

/// Decode `input` and write the pixels as a binary PPM next to it.
fn decode_to_ppm(input: &Path) -> Result<PathBuf, Box<dyn Error>>
{
    let file = File::open(input)?;
    // Safety contract of the map is that the file is not truncated
    // while we read it; decoding is short lived so take the risk the
    // same way other file tools do.
    let mmap = unsafe { Mmap::map(&file)? };

    let mut decoder = JpegDecoder::new_with_options(DecoderOptions::default(), &mmap);

    let pixels = decoder.decode()?;
    let (width, height) = decoder
        .output_dimensions()
        .ok_or("decoder produced no dimensions")?;

    info!(
        "Decoded {}x{} image ({}x{} declared)",
        width,
        height,
        decoder.width(),
        decoder.height()
    );

    let output = input.with_extension("ppm");
    let mut writer = BufWriter::new(File::create(&output)?);

    write!(writer, "P6\n{width} {height}\n255\n")?;
    writer.write_all(&pixels)?;
    writer.flush()?;

    Ok(output)
}
