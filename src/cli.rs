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
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Import a directory of GenBank files into a database
    Import {
        // Directory with .gbk files
        #[arg(required = true, help = "Directory containing GenBank files")]
        input_dir: PathBuf,

        // SQLite database
        #[arg(long = "db", default_value = "database.db", help = "SQLite database, created if missing")]
        database: PathBuf,

        // Reduced sample
        #[arg(long = "sample", help = "Only import the first N files")]
        sample: Option<usize>,

        // Reduced sample with 10 files
        #[arg(long = "test", default_value_t = false, help = "Only import the first 10 files, overrides --sample")]
        test: bool,

        // Failure report path
        #[arg(long = "report", required = false, help = "File listing the inputs that were not imported")]
        report: Option<PathBuf>,

        // Hosts with this description prefix are references
        #[arg(long = "reference-prefix", default_value = "Streptomyces")]
        reference_prefix: String,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Recompute number of contigs and L50 for all hosts
    Stats {
        // SQLite database
        #[arg(long = "db", default_value = "database.db")]
        database: PathBuf,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Print the resolved domain sequence of GenBank files
    Domains {
        // Input files
        #[arg(group = "input", required = true, help = "Input GenBank file(s)")]
        input_files: Vec<PathBuf>,

        // Print coding sequences instead
        #[arg(long = "cds", default_value_t = false)]
        cds: bool,

        // Omit the header line
        #[arg(long = "no-header", default_value_t = false)]
        no_header: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
