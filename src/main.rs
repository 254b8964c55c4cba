// gpfam: Pfam domain sequences and assembly statistics from annotated genomes.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use clap::CommandFactory;
use clap::Parser;

use gpfam::db::Database;
use gpfam::import::ImportConfig;
use gpfam::import::REPORT_FILE;
use gpfam::import::REPORT_FILE_SAMPLE;

mod cli;

type E = Box<dyn std::error::Error>;

/// Number of files imported with `--test`.
const TEST_SAMPLE: usize = 10;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize, timestamps: bool) {
    let res = stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(if timestamps { stderrlog::Timestamp::Second } else { stderrlog::Timestamp::Off })
    .init();
    if let Err(e) = res {
        eprintln!("Could not initialize logging: {}", e);
    }
}

fn run(cli: &cli::Cli) -> Result<(), E> {
    match &cli.command {
        // Import
        Some(cli::Commands::Import {
            input_dir,
            database,
            sample,
            test,
            report,
            reference_prefix,
            verbose,
        }) => {
            init_log(if *verbose { 3 } else { 2 }, true);
            log::info!("Program started. Database: {}", database.display());

            let sample = if *test { Some(TEST_SAMPLE) } else { *sample };
            let default_report = if sample.is_some() { REPORT_FILE_SAMPLE } else { REPORT_FILE };

            let mut config = ImportConfig::new(input_dir, database);
            config.sample = sample;
            config.report = report.clone().unwrap_or(PathBuf::from(default_report));
            config.reference_prefix = reference_prefix.clone();

            let summary = gpfam::import::run_import(&config)?;
            log::info!("Program finished: {} contigs from {}/{} genomes imported",
                       summary.n_contigs, summary.n_files - summary.not_imported.len(), summary.n_files);
        },

        // Stats
        Some(cli::Commands::Stats {
            database,
            verbose,
        }) => {
            init_log(if *verbose { 3 } else { 2 }, true);

            let db = Database::open(database)?;
            let hosts = db.hosts_with_contigs()?;
            for host_id in hosts.iter() {
                let stats = db.update_host_statistics(*host_id)?;
                log::debug!("host {}: {} contigs, L50 {}", host_id, stats.number_of_contigs, stats.l50);
            }
            log::info!("Updated statistics for {} hosts", hosts.len());
        },

        // Domains
        Some(cli::Commands::Domains {
            input_files,
            cds,
            no_header,
            verbose,
        }) => {
            init_log(if *verbose { 3 } else { 1 }, false);

            let stdout = std::io::stdout();
            let mut conn_out = BufWriter::new(stdout.lock());
            let mut header = !*no_header;
            for file in input_files {
                for contig in gpfam::genbank::open_genbank(file)? {
                    let record = gpfam::resolver::distill_contig(&contig?);
                    if *cds {
                        gpfam::printer::format_cds(&record.cds, header, &mut conn_out)?;
                    } else {
                        gpfam::printer::format_domains(&record.domains, header, &mut conn_out)?;
                    }
                    header = false;
                }
            }
            conn_out.flush()?;
        },

        None => {
            cli::Cli::command().print_help()?;
        },
    }
    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
