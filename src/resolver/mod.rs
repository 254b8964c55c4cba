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

//! Distill the features of a contig into coding sequences and a domain sequence.
//!
//! Each feature is first validated into a record with
//! [validate_cds](cds::validate_cds) or
//! [validate_domain](domain::validate_domain). Features that fail validation
//! are dropped and do not affect the rest of the contig.
//!
//! Validated domains are then passed through
//! [resolve_domains](domain::resolve_domains), which removes domains that
//! overlap a domain with a smaller Pfam number.
//!

pub mod cds;
pub mod domain;

use crate::ContigInput;
use crate::ContigRecord;
use crate::GenomicFeature;

use cds::validate_cds;
use domain::resolve_domains;

/// Reasons for dropping a feature.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    /// A required qualifier is absent.
    MissingQualifier(&'static str),
    /// The domain identifier contains no Pfam accession.
    MalformedDomainId(String),
    /// The feature has no location or its end precedes its start.
    InvalidLocation,
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FeatureError::MissingQualifier(key) => write!(f, "missing qualifier /{}", key),
            FeatureError::MalformedDomainId(id) => write!(f, "no Pfam accession in '{}'", id),
            FeatureError::InvalidLocation => write!(f, "invalid feature location"),
        }
    }
}

impl std::error::Error for FeatureError {}

/// Extract the coding sequences and the resolved domain sequence of a contig.
///
/// The features in `contig` must be ordered by their start coordinate. See
/// [resolve_domains] for what happens otherwise.
///
pub fn distill_contig(
    contig: &ContigInput,
) -> ContigRecord {
    let mut cds = Vec::new();
    let mut n_skipped_cds = 0_usize;
    for feature in contig.features.iter() {
        if let GenomicFeature::Cds(feature) = feature {
            match validate_cds(feature, &contig.accession) {
                Ok(record) => cds.push(record),
                Err(e) => {
                    log::debug!("{}: skipping CDS: {}", contig.accession, e);
                    n_skipped_cds += 1;
                },
            }
        }
    }

    let domain_features = contig.features.iter().filter_map(|feature| {
        match feature {
            GenomicFeature::Domain(domain) => Some(domain),
            _ => None,
        }
    });
    let domains = resolve_domains(domain_features, &contig.accession);

    log::debug!("{}: {} CDS ({} skipped), {} domains",
                contig.accession, cds.len(), n_skipped_cds, domains.len());

    ContigRecord {
        contig_id: contig.accession.clone(),
        description: contig.description.clone(),
        sequence_length: contig.sequence_length,
        cds,
        domains,
    }
}
