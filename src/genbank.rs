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

//! Read annotated GenBank files into [ContigInput] records.
//!
//! Parsing is done by [gb_io]. Each GenBank record becomes one
//! [ContigInput]:
//!
//!   - `description` is the DEFINITION line without its final period.
//!   - `accession` is the VERSION, or the ACCESSION or LOCUS name if VERSION is absent.
//!   - `sequence_length` is the length on the LOCUS line, or the length of the sequence.
//!
//! Only `CDS` and `PFAM_domain` features are kept. `CDS` features supply the
//! `locus_tag`, `product`, and `translation` qualifiers, and `PFAM_domain`
//! features the `locus_tag` and the first `db_xref`. Missing qualifiers are
//! left as None for the [resolver](crate::resolver) to deal with.
//!
//! Files ending in `.gz` are decompressed on the fly.
//!
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use gb_io::reader::SeqReader;
use gb_io::seq::Feature;
use gb_io::seq::Location;
use gb_io::seq::Seq;

use crate::CdsFeature;
use crate::ContigInput;
use crate::DomainFeature;
use crate::GenomicFeature;
use crate::Strand;

type E = Box<dyn std::error::Error>;

/// File extensions recognized as GenBank, with or without `.gz`.
pub const GENBANK_EXTENSIONS: [&str; 4] = ["gbk", "gb", "genbank", "gbff"];

#[derive(Debug, Clone)]
pub struct MissingAccession;

impl std::fmt::Display for MissingAccession {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "GenBank record has no VERSION, ACCESSION, or LOCUS name")
    }
}

impl std::error::Error for MissingAccession {}

/// Iterator over the contigs in a GenBank file.
pub struct GenbankReader<R: Read> {
    records: SeqReader<R>,
}

impl<R: Read> GenbankReader<R> {
    pub fn new(
        conn: R,
    ) -> Self {
        GenbankReader { records: SeqReader::new(conn) }
    }
}

impl<R: Read> Iterator for GenbankReader<R> {
    type Item = Result<ContigInput, E>;

    fn next(
        &mut self,
    ) -> Option<Result<ContigInput, E>> {
        let record = self.records.next()?;
        Some(record.map_err(|e| e.into()).and_then(contig_from_seq))
    }
}

/// True if `path` has one of the [GENBANK_EXTENSIONS], optionally followed by `.gz`.
pub fn is_genbank_path(
    path: &Path,
) -> bool {
    let stem_path = if has_extension(path, "gz") {
        match path.file_stem() {
            Some(stem) => Path::new(stem),
            None => return false,
        }
    } else {
        path
    };
    GENBANK_EXTENSIONS.iter().any(|ext| has_extension(stem_path, ext))
}

fn has_extension(
    path: &Path,
    ext: &str,
) -> bool {
    path.extension().is_some_and(|x| x.eq_ignore_ascii_case(ext))
}

/// Open a GenBank file for reading, decompressing it if the name ends in `.gz`.
pub fn open_genbank(
    path: &Path,
) -> Result<GenbankReader<Box<dyn Read>>, E> {
    let file = File::open(path)?;
    let conn: Box<dyn Read> = if has_extension(path, "gz") {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(GenbankReader::new(conn))
}

/// Convert a parsed GenBank record into a [ContigInput].
pub fn contig_from_seq(
    seq: Seq,
) -> Result<ContigInput, E> {
    let accession = seq.version.clone()
        .or_else(|| seq.accession.clone())
        .or_else(|| seq.name.clone())
        .ok_or(MissingAccession)?;
    let description = seq.definition.as_deref()
        .map(|x| x.strip_suffix('.').unwrap_or(x).to_string())
        .unwrap_or_default();
    let sequence_length = seq.len.unwrap_or(seq.seq.len()) as u64;

    let features = seq.features.iter().filter_map(genomic_feature).collect();

    Ok(ContigInput { description, accession, sequence_length, features })
}

/// Convert a `CDS` or `PFAM_domain` feature, None for other kinds.
pub fn genomic_feature(
    feature: &Feature,
) -> Option<GenomicFeature> {
    let location = feature.location.find_bounds().ok();
    match feature.kind.to_string().as_str() {
        "CDS" => Some(GenomicFeature::Cds(CdsFeature {
            locus_tag: first_qualifier(feature, "locus_tag"),
            product: first_qualifier(feature, "product"),
            translation: first_qualifier(feature, "translation"),
            location,
        })),
        "PFAM_domain" => Some(GenomicFeature::Domain(DomainFeature {
            locus_tag: first_qualifier(feature, "locus_tag"),
            domain_id: first_qualifier(feature, "db_xref"),
            location,
            strand: strand_of(&feature.location),
        })),
        _ => None,
    }
}

fn first_qualifier(
    feature: &Feature,
    key: &str,
) -> Option<String> {
    feature.qualifier_values(key.into()).next().map(|value| value.to_string())
}

/// Strand of a location.
///
/// Joined locations have a strand only if all parts agree.
pub fn strand_of(
    location: &Location,
) -> Strand {
    match location {
        Location::Complement(inner) => match strand_of(inner) {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            _ => Strand::Unknown,
        },
        Location::Join(parts) => {
            let mut strands = parts.iter().map(strand_of);
            let first = strands.next().unwrap_or(Strand::Unknown);
            if strands.all(|x| x == first) { first } else { Strand::Unknown }
        },
        Location::Range(..) | Location::Between(..) => Strand::Forward,
        _ => Strand::Unknown,
    }
}


// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn is_genbank_path_extensions() {
        use super::is_genbank_path;
        use std::path::Path;

        assert!(is_genbank_path(Path::new("genomes/NC_003888.gbk")));
        assert!(is_genbank_path(Path::new("genomes/NC_003888.GBK")));
        assert!(is_genbank_path(Path::new("NC_003888.gbff.gz")));
        assert!(is_genbank_path(Path::new("NC_003888.gb")));
        assert!(!is_genbank_path(Path::new("NC_003888.fasta")));
        assert!(!is_genbank_path(Path::new("NC_003888.gz")));
        assert!(!is_genbank_path(Path::new("gbk")));
    }

    #[test]
    fn read_two_contigs() {
        use super::GenbankReader;
        use super::testdata::TWO_CONTIGS;
        use crate::{ContigInput, GenomicFeature, Strand};
        use std::io::Cursor;

        let reader = GenbankReader::new(Cursor::new(TWO_CONTIGS.as_bytes().to_vec()));
        let got: Vec<ContigInput> = reader.map(|x| x.unwrap()).collect();

        assert_eq!(got.len(), 2);

        assert_eq!(got[0].accession, "NC_TEST01.1");
        assert_eq!(got[0].description, "Streptomyces testensis strain T1");
        assert_eq!(got[0].sequence_length, 120);
        // `source` is dropped
        assert_eq!(got[0].features.len(), 4);

        match &got[0].features[0] {
            GenomicFeature::Cds(cds) => {
                assert_eq!(cds.locus_tag.as_deref(), Some("T1_0001"));
                assert_eq!(cds.product.as_deref(), Some("hypothetical protein"));
                assert_eq!(cds.translation.as_deref(), Some("MKLVAAGGTTSSRRQQPP"));
                assert_eq!(cds.location, Some((0, 60)));
            },
            other => panic!("expected CDS, got {:?}", other),
        }
        match &got[0].features[1] {
            GenomicFeature::Domain(domain) => {
                assert_eq!(domain.domain_id.as_deref(), Some("PF00005.27"));
                assert_eq!(domain.location, Some((3, 45)));
                assert_eq!(domain.strand, Strand::Forward);
            },
            other => panic!("expected PFAM_domain, got {:?}", other),
        }
        match &got[0].features[3] {
            GenomicFeature::Domain(domain) => {
                assert_eq!(domain.location, Some((69, 110)));
                assert_eq!(domain.strand, Strand::Reverse);
            },
            other => panic!("expected PFAM_domain, got {:?}", other),
        }

        assert_eq!(got[1].accession, "NC_TEST02.1");
        assert_eq!(got[1].sequence_length, 60);
        assert_eq!(got[1].features.len(), 1);
    }

    #[test]
    fn definition_period_is_dropped() {
        use super::GenbankReader;
        use super::testdata::TWO_CONTIGS;
        use std::io::Cursor;

        let data = TWO_CONTIGS.replacen("strain T1\n", "strain T1.\n", 1);
        let got: Vec<String> = GenbankReader::new(Cursor::new(data.into_bytes()))
            .map(|x| x.unwrap().description)
            .collect();

        assert_eq!(got, vec!["Streptomyces testensis strain T1".to_string(); 2]);
    }

    #[test]
    fn read_gzipped_file() {
        use super::open_genbank;
        use super::testdata::TWO_CONTIGS;
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T1.gbk.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(TWO_CONTIGS.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let accessions: Vec<String> = open_genbank(&path).unwrap().map(|x| x.unwrap().accession).collect();
        assert_eq!(accessions, vec!["NC_TEST01.1".to_string(), "NC_TEST02.1".to_string()]);
    }

    #[test]
    fn distill_parsed_contig() {
        use super::GenbankReader;
        use super::testdata::TWO_CONTIGS;
        use crate::resolver::distill_contig;
        use std::io::Cursor;

        let mut reader = GenbankReader::new(Cursor::new(TWO_CONTIGS.as_bytes().to_vec()));
        let contig = reader.next().unwrap().unwrap();
        let got = distill_contig(&contig);

        assert_eq!(got.cds.len(), 1);
        // PF00001 replaces PF00005, the third domain has no accession
        assert_eq!(got.domains.len(), 1);
        assert_eq!(got.domains[0].family_number, 1);
        assert_eq!((got.domains[0].start, got.domains[0].end), (9, 57));
    }
}
