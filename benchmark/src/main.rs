use midirx::{handler, Decoder, HeapBuffer};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Instant,
};

const DUMP_DIR: &str = "../test-asset";

const DUMP_EXT: &[&str] = &["syx", "raw", "bin"];

/// Name used to benchmark a generated stream instead of the dump files.
const SYNTHETIC: &str = "synthetic";

const DECODERS: &[(&str, fn(&[u8]) -> usize)] = &[
    (&"midirx", decode_midirx),
    (&"midirx-slice", decode_midirx_slice),
    (&"midly", decode_midly),
];

fn decode_midirx(data: &[u8]) -> usize {
    let mut count = 0;
    let mut decoder = Decoder::new(
        HeapBuffer::default(),
        handler::from_fn(|ev, _ts: ()| {
            if ev.is_ok() {
                count += 1;
            }
        }),
    )
    .expect("default buffer has room");
    decoder.feed_all(data, ());
    drop(decoder);
    count
}

fn decode_midirx_slice(data: &[u8]) -> usize {
    let mut storage = [0; 4096];
    let mut count = 0;
    let mut decoder = Decoder::new(
        midirx::SliceBuffer::new(&mut storage),
        handler::from_fn(|ev, _ts: ()| {
            if ev.is_ok() {
                count += 1;
            }
        }),
    )
    .expect("slice buffer has room");
    decoder.feed_all(data, ());
    drop(decoder);
    count
}

fn decode_midly(data: &[u8]) -> usize {
    let mut count = 0;
    let mut stream = midly::stream::MidiStream::new();
    stream.feed(data, |_ev| count += 1);
    stream.flush(|_ev| count += 1);
    count
}

/// A few megabytes of typical live traffic: notes, controllers and clocks using running status,
/// with the occasional patch dump.
fn synthetic_stream() -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..200_000u32 {
        let key = (i % 88 + 21) as u8;
        data.extend_from_slice(&[0x90, key, 0x64, key, 0x00]);
        data.extend_from_slice(&[0xB0, 0x07, (i % 128) as u8, 0xF8]);
        data.extend_from_slice(&[0xE3, (i % 128) as u8, 0x40]);
        if i % 1000 == 0 {
            data.push(0xF0);
            data.extend((0..512).map(|j| (j % 128) as u8));
            data.push(0xF7);
        }
    }
    data
}

fn list_dumps(dir: &Path) -> Vec<PathBuf> {
    let mut dumps = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return dumps,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if DUMP_EXT
            .iter()
            .any(|ext| path.extension() == Some(ext.as_ref()))
        {
            dumps.push(path);
        }
    }
    dumps
}

fn use_decoder(decode: fn(&[u8]) -> usize, data: &[u8]) {
    let round = |num: f64| (num * 100.0).round() / 100.0;

    let runtime = || {
        let start = Instant::now();
        let out = decode(data);
        let time = round((start.elapsed().as_micros() as f64) / 1000.0);
        (out, time)
    };

    let (event_count, cold_time) = runtime();
    let runtime = || {
        let (out, time) = runtime();
        assert_eq!(
            out, event_count,
            "decoder is not consistent with event counts"
        );
        time
    };

    let iters = (2000.0 / cold_time.max(0.01)).floor() as u64 + 1;
    let mut total_time = 0.0;
    let mut max_time = cold_time;
    let mut min_time = cold_time;
    for _ in 0..iters {
        let time = runtime();
        total_time += time;
        max_time = max_time.max(time);
        min_time = min_time.min(time);
    }
    let avg_time = round(total_time / (iters as f64));

    eprintln!(
        "{} events in {} iters / min {} / avg {} / max {}",
        event_count, iters, min_time, avg_time, max_time
    );
}

fn main() {
    let dump_filter = env::args().nth(1).unwrap_or_default().to_lowercase();
    let decoder_filter = env::args().nth(2).unwrap_or_default().to_lowercase();
    let dump_dir = env::args().nth(3).unwrap_or(DUMP_DIR.to_string());

    let decoders = DECODERS
        .iter()
        .filter(|(name, _)| name.contains(&decoder_filter))
        .collect::<Vec<_>>();
    if decoders.is_empty() {
        eprintln!("no decoders match the pattern \"{}\"", decoder_filter);
        eprint!("available decoders: ");
        for (i, (name, _)) in DECODERS.iter().enumerate() {
            if i > 0 {
                eprint!(", ");
            }
            eprint!("{}", name);
        }
        eprintln!();
        return;
    }

    let mut inputs = Vec::new();
    if SYNTHETIC.contains(&dump_filter) {
        inputs.push((SYNTHETIC.to_string(), synthetic_stream()));
    }
    let unfiltered_dumps = list_dumps(dump_dir.as_ref());
    for dump in unfiltered_dumps.iter() {
        let name = dump.file_name().unwrap_or_default().to_string_lossy();
        if !name.to_lowercase().contains(&dump_filter) {
            continue;
        }
        match fs::read(dump) {
            Ok(data) => inputs.push((dump.display().to_string(), data)),
            Err(err) => eprintln!("failed to read \"{}\": {}", dump.display(), err),
        }
    }

    if inputs.is_empty() {
        eprintln!("no raw midi dumps match the pattern \"{}\"", dump_filter);
        eprintln!("available raw midi dumps:");
        eprintln!("  {}", SYNTHETIC);
        for file in unfiltered_dumps.iter() {
            eprintln!("  {}", file.display());
        }
        return;
    }

    for (name, data) in inputs.iter() {
        eprintln!("decoding \"{}\" ({} KB)", name, data.len() / 1024);
        for &(decoder, decode) in decoders.iter() {
            eprint!("  {}: ", decoder);
            use_decoder(*decode, data);
        }
        eprintln!();
    }
}
