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

//! gpfam is a library and a command-line client for:
//!
//!   - Extracting coding sequences and Pfam domain annotations from annotated
//!     GenBank records (eg. [antiSMASH](https://antismash.secondarymetabolites.org/) output).
//!   - Resolving overlapping Pfam domains into a conflict-free domain sequence
//!     per contig.
//!   - Computing assembly statistics (number of contigs and L50) per host genome.
//!   - Storing all of the above in an SQLite database.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The gpfam CLI supports the following subcommands:
//!   - `gpfam import` import a directory of GenBank files into a database.
//!   - `gpfam stats` recompute the number of contigs and L50 of every host in a database.
//!   - `gpfam domains` print the resolved domain sequence of GenBank files.
//!
//! ### Rust API
//!
//! The core operations work on in-memory records and do not depend on the
//! input format or the database:
//!
//!   - [distill_contig](resolver::distill_contig): takes a [ContigInput] and
//!     returns a [ContigRecord] with the coding sequences and the resolved
//!     domain sequence.
//!   - [resolve_domains](resolver::domain::resolve_domains): the overlap
//!     resolution on its own.
//!   - [AssemblyStats](stats::AssemblyStats): number of contigs and L50 from a
//!     set of contig lengths.
//!   - [classify_host](host::classify_host): reference or query host.
//!
//! Reading GenBank files is handled by [genbank] and storing the results by
//! [db]. The [import] module ties these together into a batch run over a
//! directory.
//!
//! ## Domain overlap resolution
//!
//! Pfam domains are scanned left to right. When a domain overlaps the
//! previously accepted domain by more than half the length of either of
//! them, only the domain with the smaller Pfam number is kept. Shorter
//! overlaps are tolerated. Strand is ignored so that inversions do not hide
//! overlaps.
//!
//! ```rust
//! use gpfam::{ContigInput, DomainFeature, GenomicFeature, Strand};
//! use gpfam::resolver::distill_contig;
//!
//! let domain = |locus: &str, id: &str, start: i64, end: i64| {
//!     GenomicFeature::Domain(DomainFeature {
//!         locus_tag: Some(locus.to_string()),
//!         domain_id: Some(id.to_string()),
//!         location: Some((start, end)),
//!         strand: Strand::Forward,
//!     })
//! };
//!
//! let contig = ContigInput {
//!     description: "Streptomyces coelicolor A3(2)".to_string(),
//!     accession: "NC_003888.3".to_string(),
//!     sequence_length: 1000,
//!     features: vec![
//!         domain("SCO0001", "PF00050.20", 0, 100),
//!         domain("SCO0001", "PF00005.27", 10, 110),   // overlaps the first, smaller number
//!         domain("SCO0002", "PF00109.26", 105, 300),  // 5 bp overlap is tolerated
//!     ],
//! };
//!
//! let record = distill_contig(&contig);
//! let numbers: Vec<u32> = record.domains.iter().map(|d| d.family_number).collect();
//! assert_eq!(numbers, vec![5, 109]);
//! ```
//!

use std::fmt;

pub mod db;
pub mod genbank;
pub mod host;
pub mod import;
pub mod printer;
pub mod resolver;
pub mod stats;

pub use host::HostType;

/// Strand of a feature on the contig.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    /// +1, -1, or None as stored in the database.
    pub fn to_i8(&self) -> Option<i8> {
        match self {
            Strand::Forward => Some(1),
            Strand::Reverse => Some(-1),
            Strand::Unknown => None,
        }
    }

    pub fn from_i8(val: Option<i8>) -> Self {
        match val {
            Some(1) => Strand::Forward,
            Some(-1) => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "1"),
            Strand::Reverse => write!(f, "-1"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// A coding sequence feature as read from the input.
///
/// Qualifiers are stored as Option because annotated files routinely contain
/// CDS features without a product or translation. Use
/// [validate_cds](resolver::cds::validate_cds) to obtain a [CdsRecord].
///
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CdsFeature {
    pub locus_tag: Option<String>,
    pub product: Option<String>,
    pub translation: Option<String>,
    /// Zero-based half-open (start, end).
    pub location: Option<(i64, i64)>,
}

/// A Pfam domain annotation as read from the input.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DomainFeature {
    pub locus_tag: Option<String>,
    /// Identifier containing the Pfam accession, eg. `PF00005.27`.
    pub domain_id: Option<String>,
    /// Zero-based half-open (start, end).
    pub location: Option<(i64, i64)>,
    pub strand: Strand,
}

/// A feature of a contig, in the order it appears in the input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GenomicFeature {
    Cds(CdsFeature),
    Domain(DomainFeature),
}

/// One contig read from an annotated genome file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContigInput {
    /// Description of the host organism, shared by all contigs of a genome.
    pub description: String,
    /// Contig accession.
    pub accession: String,
    pub sequence_length: u64,
    /// Features ordered by their start coordinate.
    pub features: Vec<GenomicFeature>,
}

/// A validated coding sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CdsRecord {
    pub contig_id: String,
    pub locus_tag: String,
    pub product: String,
    pub translation: String,
    pub start: i64,
    pub end: i64,
}

/// A Pfam domain that survived overlap resolution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DomainRecord {
    pub locus_tag: String,
    /// Numeric part of the Pfam accession, eg. 5 for PF00005.
    pub family_number: u32,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub contig_id: String,
}

impl DomainRecord {
    /// Length of the domain in bases.
    pub fn length(&self) -> i64 {
        self.end - self.start
    }
}

/// The distilled contents of one contig.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContigRecord {
    pub contig_id: String,
    /// Host description, resolved to a host id when stored.
    pub description: String,
    pub sequence_length: u64,
    pub cds: Vec<CdsRecord>,
    pub domains: Vec<DomainRecord>,
}

/// A host genome as stored in the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostRecord {
    pub host_id: i64,
    pub description: String,
    pub host_type: HostType,
    /// Filled in by [update_host_statistics](db::Database::update_host_statistics).
    pub number_of_contigs: Option<u64>,
    pub l50: Option<u64>,
}
