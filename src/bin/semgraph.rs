#[macro_use]
extern crate semgraph;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

use std::fs::File;
use std::io::{self as std_io, BufReader};
use std::path::PathBuf;

use semgraph::app::prelude::*;
use semgraph::io::prelude::*;
use semgraph::io::{Format, Reader, Serializer};
use semgraph::syntax::decode::{self, TableScorer};
use semgraph::syntax::graph::DependencyGraph;
use semgraph::syntax::transition::{Linearization, Linearizer, PriorOrder, StepInput};
use semgraph::syntax::DEFAULT_CAPACITY;
use slog::Logger;

#[derive(StructOpt, Debug)]
#[structopt(name = "semgraph")]
struct Args {
    #[structopt(flatten)]
    common: CommonArgs,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    #[structopt(name = "linearize", about = "Writes the gold transition sequence of each graph")]
    Linearize(Linearize),
    #[structopt(name = "decode", about = "Decodes graphs from precomputed scores")]
    Decode(Decode),
}

#[derive(StructOpt, Debug)]
struct Linearize {
    /// Graphs in enhanced notation, one sentence per line
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: PathBuf,
    /// Reorders the heads of each word before linearizing
    #[structopt(long = "order")]
    order: Option<PriorOrder>,
    /// Maximum number of heads per word
    #[structopt(long = "capacity", default_value = "17")]
    capacity: usize,
}

#[derive(StructOpt, Debug)]
struct Decode {
    /// Score tables as JSON lines, one sentence per line
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: PathBuf,
    /// Beam width
    #[structopt(long = "beam", default_value = "1")]
    beam: usize,
    /// Maximum number of heads per word
    #[structopt(long = "capacity", default_value = "17")]
    capacity: usize,
    /// Constrains the order in which the heads of a word are emitted
    #[structopt(long = "ordered")]
    ordered: bool,
    #[structopt(long = "order", default_value = "deep_first")]
    order: PriorOrder,
    /// Fails instead of retrying without the order constraint
    #[structopt(long = "no-relax")]
    no_relax: bool,
    /// Sentences longer than this are rejected
    #[structopt(long = "max-length")]
    max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Record<T> {
    index: usize,
    #[serde(flatten)]
    value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> Record<T> {
    fn from_result<E: ToString>(index: usize, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Record {
                index,
                value: Some(value),
                error: None,
            },
            Err(e) => Record {
                index,
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct LinearizeOutput {
    #[serde(flatten)]
    linearization: Linearization<String>,
    inputs: Vec<StepInput>,
}

#[derive(Debug, Serialize)]
struct DecodeOutput {
    deps: Vec<String>,
    score: f32,
    steps: usize,
    relaxed: bool,
}

fn linearize(args: &Linearize, logger: &Logger) -> MainResult {
    let mut graphs: Vec<DependencyGraph> = vec![];
    Reader::open(&args.input)?.read(&mut graphs)?;
    info!(logger, "read {} sentences from {}", graphs.len(), args.input.display());

    let linearizer = Linearizer::new(args.capacity);
    let records: Vec<_> = graphs
        .iter()
        .enumerate()
        .map(|(index, graph)| {
            let result = match args.order {
                Some(order) => linearizer.linearize(&graph.arrange(order)),
                None => linearizer.linearize(graph),
            };
            if let Err(ref e) = result {
                warn!(logger, "failed to linearize a sentence"; "sentence" => index, "error" => %e);
            }
            Record::from_result(
                index,
                result.map(|linearization| LinearizeOutput {
                    inputs: linearization.inputs(),
                    linearization,
                }),
            )
        })
        .collect();

    let stdout = std_io::stdout();
    let mut writer = Serializer::new(stdout.lock(), Format::Json);
    writer.write(&records)?;
    writer.flush()?;
    Ok(())
}

fn decode(args: &Decode, logger: &Logger) -> MainResult {
    let mut scorers: Vec<TableScorer> = vec![];
    Serializer::new(BufReader::new(File::open(&args.input)?), Format::Json).read(&mut scorers)?;
    info!(logger, "read {} sentences from {}", scorers.len(), args.input.display());

    let config = decode::Config {
        beam: args.beam,
        capacity: if args.capacity > 0 {
            args.capacity
        } else {
            DEFAULT_CAPACITY
        },
        ordered: args.ordered,
        order: args.order,
        relax_on_exhaustion: !args.no_relax,
        max_length: args.max_length,
    };
    config.validate()?;
    debug!(logger, "{:?}", config);

    let results = decode::decode_batch(&scorers, config, logger);
    let num_failures = results.iter().filter(|r| r.is_err()).count();
    let records: Vec<_> = results
        .into_iter()
        .zip(&scorers)
        .enumerate()
        .map(|(index, (result, scorer))| {
            Record::from_result(
                index,
                result.map(|derivation| {
                    let graph = derivation.graph.map_labels(|&label| {
                        scorer
                            .label_name(label)
                            .map(|name| name.to_string())
                            .unwrap_or_else(|| label.to_string())
                    });
                    DecodeOutput {
                        deps: graph.to_deps_fields(),
                        score: derivation.score,
                        steps: derivation.steps,
                        relaxed: derivation.relaxed,
                    }
                }),
            )
        })
        .collect();
    info!(logger, "decoded {} sentences ({} failed)", records.len(), num_failures);

    let stdout = std_io::stdout();
    let mut writer = Serializer::new(stdout.lock(), Format::Json);
    writer.write(&records)?;
    writer.flush()?;
    Ok(())
}

main!(|args: Args, context: Context| match args.command {
    Command::Linearize(ref c) => linearize(c, &context.logger),
    Command::Decode(ref c) => decode(c, &context.logger),
});
