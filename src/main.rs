use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bmpgray::{BitmapError, Conversion, FileHeader, InfoHeader, Limits, Unstoppable};
use clap::Parser;

#[derive(Parser, Default)]
#[command(version, about = "Convert a 24-bit uncompressed BMP image to grayscale")]
struct Args {
    /// Path to the input bitmap; asked for on stdin when omitted
    input: Option<PathBuf>,

    /// Output path [default: <INPUT>.grayscale.bmp]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject images wider than this many pixels
    #[arg(long)]
    max_width: Option<u64>,

    /// Reject images taller than this many pixels
    #[arg(long)]
    max_height: Option<u64>,

    /// Reject images with more pixels than this
    #[arg(long)]
    max_pixels: Option<u64>,

    /// Don't render the progress line
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn limits(&self) -> Limits {
        Limits {
            max_width: self.max_width,
            max_height: self.max_height,
            max_pixels: self.max_pixels,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let input = match args.input.clone() {
        Some(path) => path,
        None => match prompt_path() {
            Ok(path) => path,
            Err(e) => {
                log::error!("cannot read image path: {e}");
                return ExitCode::from(exit_code(&e.into()));
            }
        },
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&input));

    match run(&input, &output, &args) {
        Ok(samples) => {
            log::info!("wrote {} ({samples} pixels)", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}: {e}", input.display());
            ExitCode::from(exit_code(&e))
        }
    }
}

fn prompt_path() -> io::Result<PathBuf> {
    println!("Image path: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let path = line.trim();
    if path.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no path given"));
    }
    Ok(PathBuf::from(path))
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".grayscale.bmp");
    PathBuf::from(name)
}

fn exit_code(err: &BitmapError) -> u8 {
    match err {
        BitmapError::Format(_) => 2,
        BitmapError::TruncatedData { .. } | BitmapError::UnexpectedEof => 3,
        BitmapError::Io(_) => 4,
        _ => 1,
    }
}

fn log_header(file: &FileHeader, info: &InfoHeader) {
    log::info!("File size: {}", file.total_size);
    log::info!("Image size: {}x{}", info.width, info.height);
    log::info!("Surface count: {}", info.color_planes);
    log::info!("Color depth: {}", info.color_depth);
    log::info!("Compression: RGB");
    log::info!("Bitmap size: {}", info.bitmap_size);
    log::info!(
        "Resolution: {}x{} px/m",
        info.x_resolution,
        info.y_resolution
    );
}

/// Convert `input` into `output`. A partially written output is removed.
fn run(input: &Path, output: &Path, args: &Args) -> Result<u64, BitmapError> {
    let reader = BufReader::new(File::open(input)?);
    let limits = args.limits();
    let conversion = Conversion::open(reader, Some(&limits))?;
    let (file, info) = conversion.input_headers();
    log_header(file, info);

    let writer = BufWriter::new(File::create(output)?);
    let result = write_output(conversion, writer, args.quiet);
    if result.is_err() {
        if let Err(e) = fs::remove_file(output) {
            log::warn!("could not remove partial output {}: {e}", output.display());
        }
    }
    result
}

fn write_output<R: Read>(
    conversion: Conversion<R>,
    writer: impl Write,
    quiet: bool,
) -> Result<u64, BitmapError> {
    let (_, info) = conversion.input_headers();
    // Re-render only every max(width, height) pixels.
    let render_every = u64::from(info.width.max(info.height)).max(1);
    let mut render = |done: u64, total: u64| {
        if done % render_every == 0 {
            eprint!("\rProgress: {:.3}%", done as f64 / total as f64 * 100.0);
        }
    };
    let progress: Option<&mut dyn FnMut(u64, u64)> =
        if quiet { None } else { Some(&mut render) };

    let samples = conversion.write_to(writer, Unstoppable, progress)?;
    if !quiet {
        eprintln!();
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmp(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
        let size = 3 * width * height;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&(54 + size).to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&54u32.to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(pixels);
        out
    }

    fn quiet_args() -> Args {
        Args {
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn default_output_appends_suffix() {
        assert_eq!(
            default_output_path(Path::new("dir/photo.bmp")),
            PathBuf::from("dir/photo.bmp.grayscale.bmp")
        );
    }

    #[test]
    fn exit_codes_differ_by_kind() {
        let format: BitmapError = bmpgray::FormatError::BadMagic.into();
        let truncated = BitmapError::TruncatedData {
            expected: 4,
            actual: 1,
        };
        let io: BitmapError = io::Error::other("disk gone").into();
        let limit = BitmapError::LimitExceeded("too wide".into());
        assert_eq!(exit_code(&format), 2);
        assert_eq!(exit_code(&truncated), 3);
        assert_eq!(exit_code(&io), 4);
        assert_eq!(exit_code(&limit), 1);
    }

    #[test]
    fn run_writes_grayscale_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bmp");
        let output = default_output_path(&input);
        fs::write(&input, bmp(1, 2, &[0, 0, 255, 0, 255, 0])).unwrap();

        let samples = run(&input, &output, &quiet_args()).unwrap();
        assert_eq!(samples, 2);

        let written = fs::read(&output).unwrap();
        assert_eq!(written.len(), 60);
        assert_eq!(&written[54..], &[25, 25, 25, 153, 153, 153]);
    }

    #[test]
    fn run_removes_partial_output_on_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("short.bmp");
        let output = dir.path().join("short.out.bmp");
        fs::write(&input, bmp(2, 2, &[1, 2, 3, 4, 5, 6])).unwrap();

        let err = run(&input, &output, &quiet_args()).unwrap_err();
        assert!(matches!(err, BitmapError::TruncatedData { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn run_rejects_before_creating_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.bmp");
        let output = dir.path().join("big.out.bmp");
        fs::write(&input, bmp(2, 2, &[0; 12])).unwrap();

        let args = Args {
            max_pixels: Some(3),
            ..quiet_args()
        };
        let err = run(&input, &output, &args).unwrap_err();
        assert!(matches!(err, BitmapError::LimitExceeded(_)));
        assert!(!output.exists());
    }

    #[test]
    fn progress_output_matches_library_conversion() {
        let pixels: Vec<u8> = (0..3 * 4 * 3).map(|i| (i * 11) as u8).collect();
        let input = bmp(3, 4, &pixels);
        let conversion = Conversion::open(&input[..], None).unwrap();
        let mut out = Vec::new();
        let samples = write_output(conversion, &mut out, false).unwrap();
        assert_eq!(samples, 12);
        assert_eq!(out, bmpgray::convert_bytes(&input, Unstoppable).unwrap());
    }

    #[test]
    fn args_parse_limits() {
        let args = Args::parse_from(["bmpgray", "a.bmp", "--max-pixels", "10", "-q"]);
        assert_eq!(args.input, Some(PathBuf::from("a.bmp")));
        assert_eq!(args.limits().max_pixels, Some(10));
        assert!(args.quiet);
    }
}
