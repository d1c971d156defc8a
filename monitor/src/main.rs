//! Print every MIDI message found in raw MIDI captures.
//!
//! Usage: `monitor [--capacity <n>] [FILE]...`
//!
//! Each file is decoded with its own decoder, all of them in parallel, and their transcripts are
//! printed in command line order. With no files, standard input is decoded as it arrives.
//! Timestamps are byte offsets into the input. Set `RUST_LOG` (eg. `RUST_LOG=midirx=debug`) to
//! watch the decoder resynchronize.

use midirx::{handler, Decoder, DecodeError, HeapBuffer, LiveEvent};
use rayon::prelude::*;
use std::{
    env,
    error::Error,
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn Error + Send + Sync>;

struct Args {
    capacity: usize,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        capacity: HeapBuffer::DEFAULT_CAPACITY,
        files: Vec::new(),
    };
    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--capacity" => {
                let n = raw.next().ok_or("--capacity expects a byte count")?;
                args.capacity = n
                    .parse()
                    .map_err(|err| format!("invalid capacity \"{}\": {}", n, err))?;
            }
            "-h" | "--help" => {
                return Err("usage: monitor [--capacity <n>] [FILE]...".to_string());
            }
            _ => args.files.push(arg.into()),
        }
    }
    Ok(args)
}

fn format_line(ev: Result<LiveEvent, DecodeError>, offset: usize) -> String {
    match ev {
        Ok(ev) => format!("{:>8} {}", offset, ev),
        Err(err) => format!("{:>8} error: {}", offset, err),
    }
}

/// Decode a whole capture file into its transcript.
fn transcript(data: &[u8], capacity: usize) -> Result<Vec<String>, BoxError> {
    let mut lines = Vec::new();
    let mut decoder = Decoder::new(
        HeapBuffer::with_capacity(capacity),
        handler::from_fn(|ev, offset: usize| lines.push(format_line(ev, offset))),
    )?;
    for (offset, &byte) in data.iter().enumerate() {
        decoder.feed(byte, offset);
    }
    if decoder.sysex_in_progress() {
        info!("capture ends in the middle of a sysex message");
    }
    drop(decoder);
    Ok(lines)
}

fn monitor_files(args: &Args) -> bool {
    let transcripts = args
        .files
        .par_iter()
        .map(|path| -> Result<Vec<String>, BoxError> {
            let data = fs::read(path)?;
            info!(path = %path.display(), len = data.len(), "decoding capture");
            transcript(&data, args.capacity)
        })
        .collect::<Vec<_>>();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ok = true;
    for (path, transcript) in args.files.iter().zip(transcripts) {
        match transcript {
            Ok(lines) => {
                let _ = writeln!(out, "{}:", path.display());
                for line in lines {
                    let _ = writeln!(out, "{}", line);
                }
            }
            Err(err) => {
                error!(path = %path.display(), %err, "failed to decode capture");
                ok = false;
            }
        }
    }
    ok
}

fn monitor_stdin(capacity: usize) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut decoder = Decoder::new(
        HeapBuffer::with_capacity(capacity),
        handler::from_fn(|ev, offset: usize| {
            let _ = writeln!(out, "{}", format_line(ev, offset));
        }),
    )?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut chunk = [0; 256];
    let mut offset = 0;
    loop {
        let read = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        for &byte in &chunk[..read] {
            decoder.feed(byte, offset);
            offset += 1;
        }
    }
    decoder.teardown();
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(2);
        }
    };

    if args.files.is_empty() {
        if let Err(err) = monitor_stdin(args.capacity) {
            error!(%err, "failed to decode standard input");
            process::exit(1);
        }
    } else if !monitor_files(&args) {
        process::exit(1);
    }
}
