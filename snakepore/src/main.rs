// `error_chain!` can recurse deeply.
#![recursion_limit = "1024"]

// We are using `error-chain`.
#[macro_use]
extern crate error_chain;

// We are using the `clap` crate for command line argument parsing.
#[macro_use]
extern crate clap;

// We are using the `slog` crate for logging.
#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;

extern crate lib_workflow;
extern crate lib_wrappers;

use std::result;
use std::sync::atomic::Ordering;
use std::sync::{atomic, Arc};

use clap::{App, ArgMatches};

use slog::Drain;

use lib_workflow::{Workflow, WorkflowOptions};
use lib_wrappers::bamqc::BamqcOptions;
use lib_wrappers::concat_fastq::ConcatFastqOptions;
use lib_wrappers::count_merge::SalmonMergeOptions;
use lib_wrappers::fastqc::FastqcOptions;
use lib_wrappers::genomecov::GenomecovOptions;
use lib_wrappers::minimap2::{Minimap2AlignOptions, Minimap2IndexOptions};
use lib_wrappers::nanopolish::{NanopolishCallOptions, NanopolishIndexOptions};
use lib_wrappers::salmon::SalmonCountOptions;
use lib_wrappers::samtools_filter::SamtoolsFilterOptions;
use lib_wrappers::sniffles::SnifflesOptions;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain!{}
}

pub use errors::*;

/// Custom `slog` Drain logic
struct RuntimeLevelFilter<D> {
    drain: D,
    log_level: Arc<atomic::AtomicIsize>,
}

impl<D> Drain for RuntimeLevelFilter<D>
where
    D: Drain,
{
    type Ok = Option<D::Ok>;
    type Err = Option<D::Err>;

    fn log(
        &self,
        record: &slog::Record,
        values: &slog::OwnedKVList,
    ) -> result::Result<Self::Ok, Self::Err> {
        let current_level = match self.log_level.load(Ordering::Relaxed) {
            0 => slog::Level::Warning,
            1 => slog::Level::Info,
            _ => slog::Level::Trace,
        };

        if record.level().is_at_least(current_level) {
            self.drain.log(record, values).map(Some).map_err(Some)
        } else {
            Ok(None)
        }
    }
}

/// Dispatch a wrapper subcommand.
fn run_wrapper(logger: &mut slog::Logger, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("concat-fastq", Some(m)) => {
            lib_wrappers::concat_fastq::run(logger, &ConcatFastqOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper concat-fastq'")?
        }
        ("fastqc", Some(m)) => lib_wrappers::fastqc::run(logger, &FastqcOptions::new(&m))
            .chain_err(|| "Could not execute 'wrapper fastqc'")?,
        ("minimap2-index", Some(m)) => {
            lib_wrappers::minimap2::run_index(logger, &Minimap2IndexOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper minimap2-index'")?
        }
        ("minimap2-align", Some(m)) => {
            lib_wrappers::minimap2::run_align(logger, &Minimap2AlignOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper minimap2-align'")?
        }
        ("bamqc", Some(m)) => lib_wrappers::bamqc::run(logger, &BamqcOptions::new(&m))
            .chain_err(|| "Could not execute 'wrapper bamqc'")?,
        ("samtools-filter", Some(m)) => {
            lib_wrappers::samtools_filter::run(logger, &SamtoolsFilterOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper samtools-filter'")?
        }
        ("genomecov", Some(m)) => {
            lib_wrappers::genomecov::run(logger, &GenomecovOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper genomecov'")?
        }
        ("nanopolish-index", Some(m)) => {
            lib_wrappers::nanopolish::run_index(logger, &NanopolishIndexOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper nanopolish-index'")?
        }
        ("nanopolish-call-methylation", Some(m)) => {
            lib_wrappers::nanopolish::run_call(logger, &NanopolishCallOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper nanopolish-call-methylation'")?
        }
        ("sniffles", Some(m)) => lib_wrappers::sniffles::run(logger, &SnifflesOptions::new(&m))
            .chain_err(|| "Could not execute 'wrapper sniffles'")?,
        ("salmon-count", Some(m)) => {
            lib_wrappers::salmon::run(logger, &SalmonCountOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper salmon-count'")?
        }
        ("salmon-merge", Some(m)) => {
            lib_wrappers::count_merge::run(logger, &SalmonMergeOptions::new(&m))
                .chain_err(|| "Could not execute 'wrapper salmon-merge'")?
        }
        _ => bail!("Invalid command: {}", matches.subcommand().0),
    }

    Ok(())
}

fn run(matches: ArgMatches) -> Result<()> {
    // Logging setup ------------------------------------------------------------------------------

    // Atomic variable controlling logging level
    let log_level = Arc::new(atomic::AtomicIsize::new(1));

    // Perform slog setup
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build();
    let drain = RuntimeLevelFilter {
        drain: drain,
        log_level: log_level.clone(),
    }.fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let mut logger = slog::Logger::root(drain, o!());

    // Switch log level
    if matches.is_present("quiet") {
        log_level.store(0, Ordering::Relaxed);
    } else {
        log_level.store(
            1 + matches.occurrences_of("verbose") as isize,
            Ordering::Relaxed,
        );
    };

    // Dispatch commands from command line.
    match matches.subcommand() {
        ("dna", Some(m)) => {
            lib_workflow::run(&mut logger, Workflow::Dna, &WorkflowOptions::new(&m))
                .chain_err(|| "Could not execute 'dna'")?
        }
        ("rna", Some(m)) => {
            lib_workflow::run(&mut logger, Workflow::Rna, &WorkflowOptions::new(&m))
                .chain_err(|| "Could not execute 'rna'")?
        }
        ("wrapper", Some(m)) => run_wrapper(&mut logger, &m)?,
        _ => bail!("Invalid command: {}", matches.subcommand().0),
    }

    Ok(())
}

fn main() {
    let yaml = load_yaml!("cli.yaml");
    let matches = App::from_yaml(yaml)
        .version(crate_version!())
        .get_matches();

    if let Err(ref e) = run(matches) {
        eprintln!("error: {}", e);

        for e in e.iter().skip(1) {
            eprintln!("caused by: {}", e);
        }

        // The backtrace is not always generated. Try to run this example
        // with `RUST_BACKTRACE=1`.
        if let Some(backtrace) = e.backtrace() {
            eprintln!("backtrace: {:?}", backtrace);
        }

        ::std::process::exit(1);
    }
}
