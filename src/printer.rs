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

//! Tab-separated output of [DomainRecord] and [CdsRecord] data.
//!
//! Domain lines have the columns
//!
//!   contig_id  locus_tag  family  start  end  strand
//!
//! where `family` is the Pfam accession without version (eg. `PF00005`) and
//! `strand` is `1`, `-1`, or `.`.
//!
//! Coding sequence lines have the columns
//!
//!   contig_id  locus_tag  start  end  product  translation
//!
use std::io::Write;

use crate::CdsRecord;
use crate::DomainRecord;

type E = Box<dyn std::error::Error>;

pub const DOMAIN_HEADER: &str = "contig_id\tlocus_tag\tfamily\tstart\tend\tstrand\n";
pub const CDS_HEADER: &str = "contig_id\tlocus_tag\tstart\tend\tproduct\ttranslation\n";

/// Format a single domain as a tab-separated line
pub fn format_domain_line<W: Write>(
    domain: &DomainRecord,
    conn: &mut W,
) -> Result<(), E> {
    let formatted = format!("{}\t{}\tPF{:05}\t{}\t{}\t{}\n",
                            domain.contig_id, domain.locus_tag, domain.family_number,
                            domain.start, domain.end, domain.strand);
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Format a domain sequence, preceded by [DOMAIN_HEADER] if `header` is true
pub fn format_domains<W: Write>(
    domains: &[DomainRecord],
    header: bool,
    conn: &mut W,
) -> Result<(), E> {
    if header {
        conn.write_all(DOMAIN_HEADER.as_bytes())?;
    }
    for domain in domains {
        format_domain_line(domain, conn)?;
    }
    conn.flush()?;
    Ok(())
}

/// Format a single coding sequence as a tab-separated line
///
/// Tabs and newlines in the product are replaced with spaces.
///
pub fn format_cds_line<W: Write>(
    cds: &CdsRecord,
    conn: &mut W,
) -> Result<(), E> {
    let product = cds.product.replace(['\t', '\n'], " ");
    let formatted = format!("{}\t{}\t{}\t{}\t{}\t{}\n",
                            cds.contig_id, cds.locus_tag, cds.start, cds.end,
                            product, cds.translation);
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Format coding sequences, preceded by [CDS_HEADER] if `header` is true
pub fn format_cds<W: Write>(
    cds: &[CdsRecord],
    header: bool,
    conn: &mut W,
) -> Result<(), E> {
    if header {
        conn.write_all(CDS_HEADER.as_bytes())?;
    }
    for record in cds {
        format_cds_line(record, conn)?;
    }
    conn.flush()?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_domain_line() {
        use super::format_domain_line;
        use crate::{DomainRecord, Strand};

        let domain = DomainRecord {
            locus_tag: "SCO0001".to_string(),
            family_number: 5,
            start: 10,
            end: 110,
            strand: Strand::Reverse,
            contig_id: "NC_003888.3".to_string(),
        };

        let mut got: Vec<u8> = Vec::new();
        format_domain_line(&domain, &mut got).unwrap();

        assert_eq!(got, b"NC_003888.3\tSCO0001\tPF00005\t10\t110\t-1\n".to_vec());
    }

    #[test]
    fn format_domains_with_header() {
        use super::{format_domains, DOMAIN_HEADER};
        use crate::{DomainRecord, Strand};

        let domains = vec![
            DomainRecord { locus_tag: "a".to_string(), family_number: 13561, start: 0, end: 9, strand: Strand::Forward, contig_id: "c".to_string() },
            DomainRecord { locus_tag: "b".to_string(), family_number: 72, start: 30, end: 60, strand: Strand::Unknown, contig_id: "c".to_string() },
        ];

        let mut got: Vec<u8> = Vec::new();
        format_domains(&domains, true, &mut got).unwrap();

        let mut expected: Vec<u8> = DOMAIN_HEADER.as_bytes().to_vec();
        expected.append(&mut b"c\ta\tPF13561\t0\t9\t1\n".to_vec());
        expected.append(&mut b"c\tb\tPF00072\t30\t60\t.\n".to_vec());

        assert_eq!(got, expected);
    }

    #[test]
    fn format_cds_line_escapes_product() {
        use super::format_cds_line;
        use crate::CdsRecord;

        let cds = CdsRecord {
            contig_id: "c".to_string(),
            locus_tag: "a".to_string(),
            product: "ABC\ttransporter".to_string(),
            translation: "MKLV".to_string(),
            start: 0,
            end: 12,
        };

        let mut got: Vec<u8> = Vec::new();
        format_cds_line(&cds, &mut got).unwrap();

        assert_eq!(got, b"c\ta\t0\t12\tABC transporter\tMKLV\n".to_vec());
    }
}
