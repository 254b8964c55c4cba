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
use std::sync::OnceLock;

use regex::Regex;

use crate::DomainFeature;
use crate::DomainRecord;
use crate::resolver::FeatureError;

fn pfam_accession() -> &'static Regex {
    static PFAM: OnceLock<Regex> = OnceLock::new();
    PFAM.get_or_init(|| Regex::new(r"PF(\d{5})(?:\D|$)").expect("valid Pfam accession pattern"))
}

/// Outcome of offering a domain to [push_resolved].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No conflict with the previous domain.
    Accepted,
    /// Won a conflict, the returned domain was removed.
    Replaced(DomainRecord),
    /// Lost a conflict and was not added.
    Rejected,
}

/// Extract the Pfam number from a domain identifier
///
/// Finds the first `PF` followed by exactly five digits, eg. `PF00005.27` or
/// `Pfam:PF13561`, and returns the digits as a number.
///
pub fn parse_family_number(
    domain_id: &str,
) -> Result<u32, FeatureError> {
    let digits = pfam_accession()
        .captures(domain_id)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| FeatureError::MalformedDomainId(domain_id.to_string()))?;
    digits.as_str().parse::<u32>().map_err(|_| FeatureError::MalformedDomainId(domain_id.to_string()))
}

/// Validate a Pfam domain feature
///
/// Requires a parseable `domain_id`, a `locus_tag`, and a location.
///
pub fn validate_domain(
    feature: &DomainFeature,
    contig_id: &str,
) -> Result<DomainRecord, FeatureError> {
    let domain_id = feature.domain_id.as_ref().ok_or(FeatureError::MissingQualifier("db_xref"))?;
    let family_number = parse_family_number(domain_id)?;
    let locus_tag = feature.locus_tag.as_ref().ok_or(FeatureError::MissingQualifier("locus_tag"))?;
    let (start, end) = feature.location.ok_or(FeatureError::InvalidLocation)?;
    if end < start {
        return Err(FeatureError::InvalidLocation)
    }

    Ok(DomainRecord {
        locus_tag: locus_tag.clone(),
        family_number,
        start, end,
        strand: feature.strand,
        contig_id: contig_id.to_string(),
    })
}

/// True if `candidate` overlaps `last` by more than half the length of either.
///
/// Only the leftmost coordinate of `candidate` is used, so the strands of the
/// two domains do not matter.
pub fn conflicts(
    last: &DomainRecord,
    candidate: &DomainRecord,
) -> bool {
    let overlap = last.end - candidate.start;
    2 * overlap > candidate.length() || 2 * overlap > last.length()
}

/// Add `candidate` to a resolved domain sequence
///
/// The candidate is compared against the last domain in `accepted` only. If
/// the two overlap by more than half the length of either (see [conflicts]),
/// the domain with the smaller Pfam number is kept. On equal numbers the
/// domain already in `accepted` is kept.
///
pub fn push_resolved(
    accepted: &mut Vec<DomainRecord>,
    candidate: DomainRecord,
) -> Resolution {
    let resolution = match accepted.last() {
        Some(last) if conflicts(last, &candidate) => {
            if candidate.family_number >= last.family_number {
                return Resolution::Rejected
            }
            // `last` exists so pop always returns Some
            accepted.pop().map_or(Resolution::Accepted, Resolution::Replaced)
        },
        _ => Resolution::Accepted,
    };
    accepted.push(candidate);
    resolution
}

/// Resolve overlapping Pfam domains into a domain sequence
///
/// Scans `features` once from left to right. Features that fail
/// [validate_domain] are skipped and leave the scan unaffected. The rest are
/// offered to [push_resolved] in input order.
///
/// ## Precondition
///
/// `features` must be ordered by their start coordinate, as they are in
/// GenBank files. The input is not re-sorted or checked. Since each domain is
/// only compared with the last accepted one, unordered input can leave
/// overlapping domains in the output.
///
/// ## Usage
///
/// ```rust
/// use gpfam::{DomainFeature, Strand};
/// use gpfam::resolver::domain::resolve_domains;
///
/// let features = vec![
///     DomainFeature { locus_tag: Some("g1".to_string()), domain_id: Some("PF00050.1".to_string()), location: Some((0, 100)), strand: Strand::Forward },
///     DomainFeature { locus_tag: Some("g1".to_string()), domain_id: Some("PF00005.1".to_string()), location: Some((20, 120)), strand: Strand::Reverse },
/// ];
///
/// let got = resolve_domains(&features, "contig_1");
///
/// assert_eq!(got.len(), 1);
/// assert_eq!(got[0].family_number, 5);
/// ```
///
pub fn resolve_domains<'a, I>(
    features: I,
    contig_id: &str,
) -> Vec<DomainRecord>
where I: IntoIterator<Item = &'a DomainFeature> {
    features.into_iter().fold(Vec::new(), |mut accepted, feature| {
        match validate_domain(feature, contig_id) {
            Ok(candidate) => {
                if let Resolution::Replaced(removed) = push_resolved(&mut accepted, candidate) {
                    log::trace!("{}: PF{:05} at {}..{} replaced", contig_id, removed.family_number, removed.start, removed.end);
                }
            },
            Err(e) => log::debug!("{}: skipping PFAM_domain: {}", contig_id, e),
        }
        accepted
    })
}
