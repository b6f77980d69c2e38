/*
 * SPDX-FileCopyrightText: 2025 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! `pdt`: builds, serializes and benchmarks the succinct string
//! dictionaries of this crate.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dsi_progress_logger::prelude::*;
use epserde::deser::DeserializeInner;
use epserde::prelude::*;
use log::info;
use path_decomposed_tries::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "pdt",
    about = "Builds, serializes and benchmarks succinct string dictionaries.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Builds a dictionary from a file of sorted strings, reports its
    /// size, and serializes it.
    Prepare {
        benchmark: Benchmark,
        /// A file with one key per line, in strictly increasing order.
        strings: PathBuf,
        /// Where to write the serialized dictionary (for `sample`, the
        /// sampled query file).
        output: PathBuf,
    },
    /// Memory-maps a serialized dictionary and measures random queries.
    Measure {
        benchmark: Benchmark,
        /// A dictionary serialized by `prepare`.
        blob: PathBuf,
        /// A query file produced by `prepare sample`.
        sample: PathBuf,
    },
    /// Compresses a file with approximate Re-Pair, writing the dictionary
    /// to `<file>.D` and the code stream to `<file>.C`.
    Repair {
        file: PathBuf,
        /// Do not form rules spanning zero bytes.
        #[arg(short = 'z')]
        preserve_zeros: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[clap(rename_all = "snake_case")]
enum Benchmark {
    /// Reservoir-samples 10⁶ input lines into a shuffled query file.
    Sample,
    HollowGamma,
    HollowElias,
    HollowVector,
    Centroid,
    CentroidRepair,
    Lex,
    LexRepair,
}

/// Rank queries, implemented by every dictionary and by its ε-copy
/// deserialized form.
trait QueryIndex {
    fn index(&self, key: &[u8]) -> Option<usize>;
    fn len(&self) -> usize;
}

impl<S: IntSeq, B: AsRef<[usize]>> QueryIndex for HollowTrie<S, B> {
    fn index(&self, key: &[u8]) -> Option<usize> {
        HollowTrie::index(self, key)
    }
    fn len(&self) -> usize {
        HollowTrie::len(self)
    }
}

impl<G: IntSeq, B: AsRef<[usize]>> QueryIndex for CentroidHollowTrie<G, B> {
    fn index(&self, key: &[u8]) -> Option<usize> {
        CentroidHollowTrie::index(self, key)
    }
    fn len(&self) -> usize {
        CentroidHollowTrie::len(self)
    }
}

impl<P: StringPool, B: AsRef<[usize]>, C: AsRef<[u8]>, const LEX: bool> QueryIndex
    for PathDecomposedTrie<P, B, C, LEX>
{
    fn index(&self, key: &[u8]) -> Option<usize> {
        PathDecomposedTrie::index(self, key)
    }
    fn len(&self) -> usize {
        PathDecomposedTrie::len(self)
    }
}

/// Reverse lookup, for the dictionaries that support it.
trait QueryAccess: QueryIndex {
    fn get(&self, index: usize) -> Vec<u8>;
}

impl<P: StringPool, B: AsRef<[usize]>, C: AsRef<[u8]>, const LEX: bool> QueryAccess
    for PathDecomposedTrie<P, B, C, LEX>
{
    fn get(&self, index: usize) -> Vec<u8> {
        PathDecomposedTrie::get(self, index)
    }
}

fn prepare<T: Serialize + QueryIndex>(
    build: impl FnOnce(&[Vec<u8>]) -> std::result::Result<T, Error>,
    strings_path: &Path,
    output: &Path,
) -> Result<()> {
    let strings = read_lines(strings_path)
        .with_context(|| format!("Could not read {}", strings_path.display()))?;

    let mut pl = ProgressLogger::default();
    pl.item_name("string");
    pl.expected_updates(Some(strings.len()));
    pl.start("Building the dictionary...");
    let trie = build(&strings)?;
    pl.done_with_count(strings.len());

    trie.store(output)
        .with_context(|| format!("Could not serialize to {}", output.display()))?;
    let bytes = std::fs::metadata(output)?.len();
    info!(
        "{} strings, {} bytes, {:.3} bits per string",
        trie.len(),
        bytes,
        bytes as f64 * 8.0 / trie.len() as f64
    );
    Ok(())
}

fn measure_index(trie: &impl QueryIndex, queries: &[Vec<u8>]) {
    let mut pl = ProgressLogger::default();
    pl.item_name("query");
    pl.start("Measuring random index queries...");
    let mut found = 0usize;
    for (i, key) in queries.iter().enumerate() {
        if i + 1 < queries.len() {
            prefetch_index(&queries[i + 1], 0);
        }
        found += usize::from(trie.index(key).is_some());
    }
    pl.done_with_count(queries.len());
    info!("{}/{} keys found", found, queries.len());
}

fn measure<T>(blob: &Path, sample: &Path) -> Result<()>
where
    T: Deserialize,
    for<'a> <T as DeserializeInner>::DeserType<'a>: QueryIndex,
{
    let trie = T::mmap(blob, Flags::RANDOM_ACCESS)
        .with_context(|| format!("Could not map {}", blob.display()))?;
    let queries =
        read_lines(sample).with_context(|| format!("Could not read {}", sample.display()))?;
    measure_index(&*trie, &queries);
    Ok(())
}

fn measure_2way<T>(blob: &Path, sample: &Path) -> Result<()>
where
    T: Deserialize,
    for<'a> <T as DeserializeInner>::DeserType<'a>: QueryAccess,
{
    let trie = T::mmap(blob, Flags::RANDOM_ACCESS)
        .with_context(|| format!("Could not map {}", blob.display()))?;
    let queries =
        read_lines(sample).with_context(|| format!("Could not read {}", sample.display()))?;
    measure_index(&*trie, &queries);

    let mut rng = SmallRng::seed_from_u64(42);
    let indices: Vec<usize> = (0..queries.len())
        .map(|_| rng.random_range(0..trie.len()))
        .collect();

    let mut pl = ProgressLogger::default();
    pl.item_name("query");
    pl.start("Measuring random reverse lookups...");
    let mut total = 0usize;
    for &index in &indices {
        total += trie.get(index).len();
    }
    pl.done_with_count(indices.len());
    info!(
        "average key length {:.2}",
        total as f64 / indices.len() as f64
    );
    Ok(())
}

fn sample(strings_path: &Path, output: &Path) -> Result<()> {
    const SAMPLE_SIZE: usize = 1_000_000;
    let mut rng = SmallRng::seed_from_u64(42);

    let file = std::fs::File::open(strings_path)
        .with_context(|| format!("Could not open {}", strings_path.display()))?;
    let mut pl = ProgressLogger::default();
    pl.item_name("string");
    pl.start("Sampling input...");
    let mut reservoir: Vec<Vec<u8>> = Vec::with_capacity(SAMPLE_SIZE);
    let mut seen = 0usize;
    for line in std::io::BufReader::new(file).split(b'\n') {
        let line = line?;
        seen += 1;
        if reservoir.len() < SAMPLE_SIZE {
            reservoir.push(line);
        } else {
            let slot = rng.random_range(0..seen);
            if slot < SAMPLE_SIZE {
                reservoir[slot] = line;
            }
        }
        pl.light_update();
    }
    pl.done();
    info!("{} strings seen, {} sampled", seen, reservoir.len());

    reservoir.shuffle(&mut rng);
    let mut out = BufWriter::new(
        std::fs::File::create(output)
            .with_context(|| format!("Could not create {}", output.display()))?,
    );
    for line in &reservoir {
        out.write_all(line)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn repair_file(file: &Path, preserve_zeros: bool) -> Result<()> {
    let input =
        std::fs::read(file).with_context(|| format!("Could not read {}", file.display()))?;
    let chars: Vec<u16> = input.iter().map(|&b| u16::from(b)).collect();

    let mut pl = ProgressLogger::default();
    pl.item_name("byte");
    pl.expected_updates(Some(chars.len()));
    pl.start("Compressing...");
    let (codes, dict) = approximate_repair(&chars, preserve_zeros)?;
    pl.done_with_count(chars.len());
    info!(
        "{} bytes compressed to {} codes, {} dictionary entries",
        chars.len(),
        codes.len(),
        dict.len()
    );

    let dict_path = PathBuf::from(format!("{}.D", file.display()));
    let codes_path = PathBuf::from(format!("{}.C", file.display()));

    // <file>.D: for each word, its 32-bit LE length followed by its bytes.
    let mut dict_out = BufWriter::new(std::fs::File::create(&dict_path)?);
    for word in &dict {
        dict_out.write_all(&(word.len() as u32).to_le_bytes())?;
        for &c in word {
            debug_assert!(c < 256);
            dict_out.write_all(&[c as u8])?;
        }
    }
    // <file>.C: the code stream as packed 16-bit LE codes.
    let mut codes_out = BufWriter::new(std::fs::File::create(&codes_path)?);
    for &code in &codes {
        codes_out.write_all(&code.to_le_bytes())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;

    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(1);
    });

    match cli.command {
        Command::Prepare {
            benchmark,
            strings,
            output,
        } => match benchmark {
            Benchmark::Sample => sample(&strings, &output),
            Benchmark::HollowGamma => {
                prepare(|s| HollowTrie::<GammaVec>::new(s.iter()), &strings, &output)
            }
            Benchmark::HollowElias => prepare(
                |s| HollowTrie::<EliasFanoList>::new(s.iter()),
                &strings,
                &output,
            ),
            Benchmark::HollowVector => {
                prepare(|s| HollowTrie::<FixedVec>::new(s.iter()), &strings, &output)
            }
            Benchmark::Centroid => prepare(
                |s| CentroidTrie::<VByteStringPool>::new(s.iter()),
                &strings,
                &output,
            ),
            Benchmark::CentroidRepair => prepare(
                |s| CentroidTrie::<CompressedStringPool>::new(s.iter()),
                &strings,
                &output,
            ),
            Benchmark::Lex => prepare(
                |s| LexTrie::<VByteStringPool>::new(s.iter()),
                &strings,
                &output,
            ),
            Benchmark::LexRepair => prepare(
                |s| LexTrie::<CompressedStringPool>::new(s.iter()),
                &strings,
                &output,
            ),
        },
        Command::Measure {
            benchmark,
            blob,
            sample,
        } => match benchmark {
            Benchmark::Sample => bail!("No 'measure' on 'sample'"),
            Benchmark::HollowGamma => measure::<HollowTrie<GammaVec>>(&blob, &sample),
            Benchmark::HollowElias => measure::<HollowTrie<EliasFanoList>>(&blob, &sample),
            Benchmark::HollowVector => measure::<HollowTrie<FixedVec>>(&blob, &sample),
            Benchmark::Centroid => measure_2way::<CentroidTrie<VByteStringPool>>(&blob, &sample),
            Benchmark::CentroidRepair => {
                measure_2way::<CentroidTrie<CompressedStringPool>>(&blob, &sample)
            }
            Benchmark::Lex => measure_2way::<LexTrie<VByteStringPool>>(&blob, &sample),
            Benchmark::LexRepair => measure_2way::<LexTrie<CompressedStringPool>>(&blob, &sample),
        },
        Command::Repair {
            file,
            preserve_zeros,
        } => repair_file(&file, preserve_zeros),
    }
}
