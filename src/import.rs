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

//! Import a directory of GenBank files into a [Database].
//!
//! Files are processed one at a time in path order. Every contig of a file is
//! [distilled](crate::resolver::distill_contig) and stored in its own
//! transaction. After the last contig of a file, the assembly statistics of
//! each host that appeared in the file are recomputed.
//!
//! A file that cannot be read or stored is logged, added to the list of
//! files that were not imported, and the batch continues with the next file.
//! Contigs of that file that were stored before the failure are kept. The
//! list is written to a report file at the end of the batch.
//!
//! A contig id may appear only once per file. A repeated id fails the file
//! with [DuplicateContig], since storing it again would move the contig to
//! another host and could leave a host of the same file without contigs.
//!
//! The exception is [EmptyAssembly]: it means statistics were requested for a
//! host without contigs, which is a bug rather than bad input, so the batch
//! stops.
//!
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexSet;

use crate::db::Database;
use crate::genbank::is_genbank_path;
use crate::genbank::open_genbank;
use crate::host::classify_host;
use crate::host::DEFAULT_REFERENCE_PREFIX;
use crate::resolver::distill_contig;
use crate::stats::EmptyAssembly;

type E = Box<dyn std::error::Error>;

/// Report a progress line every this many files.
pub const PROGRESS_INTERVAL: usize = 20;

pub const REPORT_FILE: &str = "results/not_imported_genome_files.txt";
pub const REPORT_FILE_SAMPLE: &str = "results/not_imported_genome_files_test.txt";

#[derive(Debug, Clone)]
pub struct EmptyInput;

impl std::fmt::Display for EmptyInput {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "input contains no GenBank records")
    }
}

impl std::error::Error for EmptyInput {}

#[derive(Debug, Clone)]
pub struct DuplicateContig {
    pub contig_id: String,
}

impl std::fmt::Display for DuplicateContig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "contig {} appears more than once in the input", self.contig_id)
    }
}

impl std::error::Error for DuplicateContig {}

/// Options for [run_import].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Directory containing the GenBank files.
    pub input_dir: PathBuf,
    /// SQLite database, created if it doesn't exist.
    pub database: PathBuf,
    /// Only import the first `sample` files.
    pub sample: Option<usize>,
    /// Where to write the list of files that were not imported.
    pub report: PathBuf,
    /// Description prefix of reference hosts.
    pub reference_prefix: String,
}

impl ImportConfig {
    pub fn new(
        input_dir: &Path,
        database: &Path,
    ) -> Self {
        ImportConfig {
            input_dir: input_dir.to_path_buf(),
            database: database.to_path_buf(),
            sample: None,
            report: PathBuf::from(REPORT_FILE),
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
        }
    }
}

/// Contigs and hosts stored from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub n_contigs: usize,
    /// Host ids in the order they first appeared in the file.
    pub hosts: IndexSet<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub n_files: usize,
    pub n_contigs: usize,
    pub not_imported: Vec<PathBuf>,
}

/// GenBank files directly under `dir`, sorted by path.
pub fn collect_genbank_files(
    dir: &Path,
) -> Result<Vec<PathBuf>, E> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_genbank_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Import every contig in a GenBank file and update its hosts' statistics.
pub fn import_file(
    db: &mut Database,
    path: &Path,
    reference_prefix: &str,
) -> Result<FileSummary, E> {
    let mut summary = FileSummary::default();
    let mut contig_ids: IndexSet<String> = IndexSet::new();

    for contig in open_genbank(path)? {
        let contig = contig?;
        if !contig_ids.insert(contig.accession.clone()) {
            return Err(Box::new(DuplicateContig { contig_id: contig.accession }))
        }
        let record = distill_contig(&contig);
        let host_type = classify_host(&record.description, reference_prefix);
        let host_id = db.insert_contig(&record, host_type)?;
        summary.hosts.insert(host_id);
        summary.n_contigs += 1;
    }

    if summary.n_contigs == 0 {
        return Err(Box::new(EmptyInput))
    }

    for host_id in summary.hosts.iter() {
        let stats = db.update_host_statistics(*host_id)?;
        log::debug!("host {}: {} contigs, L50 {}", host_id, stats.number_of_contigs, stats.l50);
    }

    Ok(summary)
}

/// Import `paths` in order, recording the ones that fail.
///
/// ## Errors
///
/// Returns an error only if a file fails with [EmptyAssembly].
///
pub fn import_paths(
    db: &mut Database,
    paths: &[PathBuf],
    reference_prefix: &str,
) -> Result<ImportSummary, E> {
    let mut summary = ImportSummary { n_files: paths.len(), ..Default::default() };

    for (idx, path) in paths.iter().enumerate() {
        match import_file(db, path, reference_prefix) {
            Ok(file_summary) => summary.n_contigs += file_summary.n_contigs,
            Err(e) if e.is::<EmptyAssembly>() => return Err(e),
            Err(e) => {
                log_error_chain(path, e.as_ref());
                log::error!("Following file could not be imported to the database: {}", path.display());
                summary.not_imported.push(path.clone());
            },
        }

        if (idx + 1) % PROGRESS_INTERVAL == 0 || idx + 1 == paths.len() {
            log::info!("{}/{} genomes done", idx + 1, paths.len());
        }
    }

    Ok(summary)
}

fn log_error_chain(
    path: &Path,
    e: &dyn std::error::Error,
) {
    log::error!("{}: {}", path.display(), e);
    let mut source = e.source();
    while let Some(cause) = source {
        log::error!("  caused by: {}", cause);
        source = cause.source();
    }
}

/// Write the files that were not imported, one per line.
///
/// Creates the parent directory of `path` if needed. The report is written
/// even if `not_imported` is empty.
pub fn write_failure_report(
    path: &Path,
    not_imported: &[PathBuf],
) -> Result<(), E> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = BufWriter::new(File::create(path)?);
    for file in not_imported {
        writeln!(conn, "{}", file.display())?;
    }
    conn.flush()?;
    Ok(())
}

/// Import a directory as configured in `config`
///
/// Writes the failure report to `config.report` after all files are done.
///
pub fn run_import(
    config: &ImportConfig,
) -> Result<ImportSummary, E> {
    let mut paths = collect_genbank_files(&config.input_dir)?;
    if let Some(n) = config.sample {
        paths.truncate(n);
    }
    log::info!("Importing {} genomes into the database '{}'.", paths.len(), config.database.display());

    let mut db = Database::open(&config.database)?;
    let summary = import_paths(&mut db, &paths, &config.reference_prefix)?;

    write_failure_report(&config.report, &summary.not_imported)?;
    if !summary.not_imported.is_empty() {
        log::warn!("{} genomes were not imported, see {}", summary.not_imported.len(), config.report.display());
    }

    Ok(summary)
}

// Tests
#[cfg(test)]
mod tests {
    use std::path::Path;

    fn write_inputs(dir: &Path) {
        use crate::genbank::testdata::TWO_CONTIGS;

        std::fs::write(dir.join("a_T1.gbk"), TWO_CONTIGS).unwrap();
        std::fs::write(dir.join("b_broken.gbk"), "this is not a GenBank file\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored\n").unwrap();
    }

    #[test]
    fn collect_only_genbank_files() {
        use super::collect_genbank_files;

        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path());

        let got = collect_genbank_files(dir.path()).unwrap();
        assert_eq!(got, vec![dir.path().join("a_T1.gbk"), dir.path().join("b_broken.gbk")]);
    }

    #[test]
    fn import_directory_and_report_failures() {
        use super::{run_import, ImportConfig};
        use crate::db::Database;
        use crate::HostType;

        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path());
        let out = tempfile::tempdir().unwrap();

        let mut config = ImportConfig::new(dir.path(), &out.path().join("genomes.db"));
        config.report = out.path().join("results").join("not_imported.txt");

        let summary = run_import(&config).unwrap();
        assert_eq!(summary.n_files, 2);
        assert_eq!(summary.n_contigs, 2);
        assert_eq!(summary.not_imported, vec![dir.path().join("b_broken.gbk")]);

        let report = std::fs::read_to_string(&config.report).unwrap();
        assert_eq!(report, format!("{}\n", dir.path().join("b_broken.gbk").display()));

        let db = Database::open(&config.database).unwrap();
        let host_id = db.host_id("Streptomyces testensis strain T1").unwrap().unwrap();
        let host = db.host(host_id).unwrap().unwrap();
        assert_eq!(host.host_type, HostType::Reference);
        assert_eq!(host.number_of_contigs, Some(2));
        assert_eq!(host.l50, Some(1));

        let domains = db.domains("NC_TEST01.1").unwrap();
        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].family_number, 1);
        assert_eq!(db.coding_sequences("NC_TEST01.1").unwrap().len(), 1);
    }

    #[test]
    fn import_is_repeatable() {
        use super::{run_import, ImportConfig};
        use crate::db::Database;

        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path());
        let out = tempfile::tempdir().unwrap();

        let mut config = ImportConfig::new(dir.path(), &out.path().join("genomes.db"));
        config.report = out.path().join("not_imported.txt");

        run_import(&config).unwrap();
        run_import(&config).unwrap();

        let db = Database::open(&config.database).unwrap();
        let host_id = db.host_id("Streptomyces testensis strain T1").unwrap().unwrap();
        assert_eq!(db.contig_lengths(host_id).unwrap(), vec![120, 60]);
        assert_eq!(db.host(host_id).unwrap().unwrap().number_of_contigs, Some(2));
        assert_eq!(db.domains("NC_TEST02.1").unwrap().len(), 1);
    }

    #[test]
    fn repeated_contig_fails_only_its_file() {
        use super::{run_import, ImportConfig};
        use crate::db::Database;
        use crate::genbank::testdata::TWO_CONTIGS;

        // NC_TEST02 renamed to an id of the same width, stored under two hosts
        let second = TWO_CONTIGS.split("//\n").nth(1).unwrap().replace("NC_TEST02", "NC_DUP001");
        let duplicated = format!(
            "{}//\n{}//\n",
            second.replace("Streptomyces testensis strain T1", "Host A"),
            second.replace("Streptomyces testensis strain T1", "Host B"),
        );

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_dup.gbk"), duplicated).unwrap();
        std::fs::write(dir.path().join("b_ok.gbk"), TWO_CONTIGS).unwrap();
        let out = tempfile::tempdir().unwrap();

        let mut config = ImportConfig::new(dir.path(), &out.path().join("genomes.db"));
        config.report = out.path().join("not_imported.txt");

        let summary = run_import(&config).unwrap();
        assert_eq!(summary.not_imported, vec![dir.path().join("a_dup.gbk")]);
        assert_eq!(summary.n_contigs, 2);

        let report = std::fs::read_to_string(&config.report).unwrap();
        assert_eq!(report, format!("{}\n", dir.path().join("a_dup.gbk").display()));

        let db = Database::open(&config.database).unwrap();
        let host_id = db.host_id("Streptomyces testensis strain T1").unwrap().unwrap();
        assert_eq!(db.host(host_id).unwrap().unwrap().number_of_contigs, Some(2));
        assert_eq!(db.host_id("Host B").unwrap(), None);
    }

    #[test]
    fn sample_mode_takes_first_files() {
        use super::{run_import, ImportConfig};

        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path());
        let out = tempfile::tempdir().unwrap();

        let mut config = ImportConfig::new(dir.path(), &out.path().join("genomes.db"));
        config.report = out.path().join("not_imported.txt");
        config.sample = Some(1);

        let summary = run_import(&config).unwrap();
        assert_eq!(summary.n_files, 1);
        assert!(summary.not_imported.is_empty());
        assert_eq!(std::fs::read_to_string(&config.report).unwrap(), "");
    }

    #[test]
    fn write_report_creates_parent() {
        use super::write_failure_report;
        use std::path::PathBuf;

        let out = tempfile::tempdir().unwrap();
        let path = out.path().join("nested").join("report.txt");
        write_failure_report(&path, &[PathBuf::from("x.gbk"), PathBuf::from("y.gbk")]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x.gbk\ny.gbk\n");
    }
}
