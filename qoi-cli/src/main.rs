use argh::FromArgs;
use image::{ImageFormat, RgbImage, RgbaImage};
use qoi_core::decode::DecodeContext;
use qoi_core::encode::EncodeContext;
use qoi_core::{Channels, DeltaBias, Pixel, Stats};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::num::NonZeroU32;
use std::str::FromStr;

/// QOI (Quite OK Image) cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    EncodeRaw(EncodeRaw),
    Decode(Decode),
    DecodeRaw(DecodeRaw),
}

#[derive(Debug)]
enum Format {
    Png,
    Jpg,
    Bmp,
    Tiff,
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(Format::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(Format::Jpg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(Format::Bmp))
               .or_else(|| s.eq_ignore_ascii_case("tiff").then_some(Format::Tiff))
        else { return Err("invalid string"); };

        Ok(format)
    }
}

impl From<&Format> for ImageFormat {
    fn from(f: &Format) -> Self {
        match f {
            Format::Png => ImageFormat::Png,
            Format::Jpg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
            Format::Tiff => ImageFormat::Tiff,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let Cli { command } = argh::from_env();

    match command {
        Command::Encode(options) => encode(options),
        Command::EncodeRaw(options) => encode_raw(options),
        Command::Decode(options) => decode(options),
        Command::DecodeRaw(options) => decode_raw(options),
    }
}

fn resolve_channels(rgb: bool, rgba: bool) -> Channels {
    match (rgb, rgba) {
        (true, true) => {
            log::warn!("both --rgb and --rgba given, using --rgba");
            Channels::Rgba
        }
        (true, false) => Channels::Rgb,
        _ => Channels::Rgba,
    }
}

fn resolve_bias(twos_complement: bool) -> DeltaBias {
    if twos_complement {
        log::warn!(
            "--twos-complement produces a non-standard stream that no other QOI decoder can read"
        );
        DeltaBias::TwosComplement
    } else {
        DeltaBias::Standard
    }
}

/// Encodes an image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// input format, optional (png, jpg, bmp, tiff)
    #[argh(option)]
    format: Option<Format>,
    /// force RGB-only mode (no alpha channel in the output stream)
    #[argh(switch)]
    rgb: bool,
    /// force RGBA mode (default)
    #[argh(switch)]
    rgba: bool,
    /// use the non-standard two's-complement delta bias instead of the published bias scheme
    #[argh(switch)]
    twos_complement: bool,
    /// print per-opcode emission counts after encoding
    #[argh(switch)]
    stats: bool,

    /// the input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode { format, rgb, rgba, twos_complement, stats, input, output } = options;
    let channels = resolve_channels(rgb, rgba);
    let bias = resolve_bias(twos_complement);

    let reader = match &format {
        Some(f) => image::io::Reader::with_format(
            BufReader::new(File::open(&input)?),
            ImageFormat::from(f),
        ),
        None => image::io::Reader::open(&input)?.with_guessed_format()?,
    };
    let image = reader.decode()?;
    let width = image.width();
    let height = image.height();
    log::info!("encoding {width}x{height} image as {channels:?}");

    let pixels: Vec<Pixel> = match channels {
        Channels::Rgb => image
            .into_rgb8()
            .pixels()
            .map(|p| Pixel::rgb(p[0], p[1], p[2]))
            .collect(),
        Channels::Rgba => image
            .into_rgba8()
            .pixels()
            .map(|p| Pixel::rgba(p[0], p[1], p[2], p[3]))
            .collect(),
    };

    let mut stat_sink = stats.then(Stats::new);
    let out_file = BufWriter::new(File::create(&output)?);
    EncodeContext::new().encode_with_state(
        width,
        height,
        &pixels,
        channels,
        bias,
        stat_sink.as_mut(),
        out_file,
    )?;

    if let Some(s) = stat_sink {
        log::info!("opcode stats: {s}");
    }
    println!("written QOI image to `{output}`");
    Ok(())
}

/// Encodes a raw RGB8/RGBA8 pixel buffer as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode-raw")]
struct EncodeRaw {
    /// image width
    #[argh(option)]
    width: NonZeroU32,
    /// image height
    #[argh(option)]
    height: NonZeroU32,
    /// force RGB-only mode (input is 3 bytes/pixel instead of 4)
    #[argh(switch)]
    rgb: bool,
    /// force RGBA mode (default, 4 bytes/pixel)
    #[argh(switch)]
    rgba: bool,
    /// use the non-standard two's-complement delta bias instead of the published bias scheme
    #[argh(switch)]
    twos_complement: bool,
    /// print per-opcode emission counts after encoding
    #[argh(switch)]
    stats: bool,

    /// the input file: tightly packed RGB8 or RGBA8 pixels, row-major
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode_raw(options: EncodeRaw) -> Result<(), Box<dyn std::error::Error>> {
    let EncodeRaw { width, height, rgb, rgba, twos_complement, stats, input, output } = options;
    let channels = resolve_channels(rgb, rgba);
    let bias = resolve_bias(twos_complement);
    let bytes_per_pixel = if channels == Channels::Rgb { 3 } else { 4 };

    let raw = std::fs::read(input)?;
    let expected_len = width.get() as usize * height.get() as usize * bytes_per_pixel;
    if raw.len() != expected_len {
        return Err(format!(
            "input file size is not correct, expected {expected_len} bytes, got {}",
            raw.len()
        )
        .into());
    }

    let pixels: Vec<Pixel> = raw
        .chunks_exact(bytes_per_pixel)
        .map(|c| match channels {
            Channels::Rgb => Pixel::rgb(c[0], c[1], c[2]),
            Channels::Rgba => Pixel::rgba(c[0], c[1], c[2], c[3]),
        })
        .collect();

    let mut stat_sink = stats.then(Stats::new);
    let out_file = BufWriter::new(File::create(&output)?);
    EncodeContext::new().encode_with_state(
        width.get(),
        height.get(),
        &pixels,
        channels,
        bias,
        stat_sink.as_mut(),
        out_file,
    )?;

    if let Some(s) = stat_sink {
        log::info!("opcode stats: {s}");
    }
    println!("written QOI image to `{output}`");
    Ok(())
}

/// Decodes a QOI image into a PNG/JPG/BMP/TIFF.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// output format (png, jpg, bmp, tiff)
    #[argh(option)]
    format: Format,
    /// use the non-standard two's-complement delta bias instead of the published bias scheme
    #[argh(switch)]
    twos_complement: bool,

    /// the input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode { format, twos_complement, input, output } = options;
    let bias = resolve_bias(twos_complement);

    let data = std::fs::read(&input)?;
    log::info!("decoding `{input}`");

    let mut pixels = Vec::with_capacity(1024 * 1024);
    let header = DecodeContext::decode_to_vec(&data, bias, &mut pixels)?;

    match header.channels {
        Channels::Rgb => {
            let mut raw = Vec::with_capacity(pixels.len() * 3);
            for p in &pixels {
                raw.extend_from_slice(&[p.r, p.g, p.b]);
            }
            RgbImage::from_vec(header.width, header.height, raw)
                .ok_or("failed to reconstruct image buffer")?
                .save_with_format(&output, ImageFormat::from(&format))?;
        }
        Channels::Rgba => {
            let mut raw = Vec::with_capacity(pixels.len() * 4);
            for p in &pixels {
                raw.extend_from_slice(&[p.r, p.g, p.b, p.a]);
            }
            RgbaImage::from_vec(header.width, header.height, raw)
                .ok_or("failed to reconstruct image buffer")?
                .save_with_format(&output, ImageFormat::from(&format))?;
        }
    }

    println!("written {}x{} image to `{output}`", header.width, header.height);
    Ok(())
}

/// Decodes a QOI image into a raw RGB8/RGBA8 pixel buffer.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode-raw")]
struct DecodeRaw {
    /// use the non-standard two's-complement delta bias instead of the published bias scheme
    #[argh(switch)]
    twos_complement: bool,

    /// the input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn decode_raw(options: DecodeRaw) -> Result<(), Box<dyn std::error::Error>> {
    let DecodeRaw { twos_complement, input, output } = options;
    let bias = resolve_bias(twos_complement);

    let data = std::fs::read(&input)?;
    log::info!("decoding `{input}`");

    let mut pixels = Vec::with_capacity(1024 * 1024);
    let header = DecodeContext::decode_to_vec(&data, bias, &mut pixels)?;

    let bytes_per_pixel = if header.channels == Channels::Rgb { 3 } else { 4 };
    let mut raw = Vec::with_capacity(pixels.len() * bytes_per_pixel);
    for p in &pixels {
        raw.push(p.r);
        raw.push(p.g);
        raw.push(p.b);
        if header.channels == Channels::Rgba {
            raw.push(p.a);
        }
    }
    std::fs::write(&output, raw)?;

    println!("written {}x{} image to `{output}`", header.width, header.height);
    Ok(())
}
