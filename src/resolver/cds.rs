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
use crate::CdsFeature;
use crate::CdsRecord;
use crate::resolver::FeatureError;

/// Validate a coding sequence feature
///
/// Requires the `locus_tag`, `product`, and `translation` qualifiers and a
/// location. Returns the [FeatureError] for the first missing one.
///
pub fn validate_cds(
    feature: &CdsFeature,
    contig_id: &str,
) -> Result<CdsRecord, FeatureError> {
    let locus_tag = feature.locus_tag.as_ref().ok_or(FeatureError::MissingQualifier("locus_tag"))?;
    let product = feature.product.as_ref().ok_or(FeatureError::MissingQualifier("product"))?;
    let translation = feature.translation.as_ref().ok_or(FeatureError::MissingQualifier("translation"))?;
    let (start, end) = feature.location.ok_or(FeatureError::InvalidLocation)?;
    if end < start {
        return Err(FeatureError::InvalidLocation)
    }

    Ok(CdsRecord {
        contig_id: contig_id.to_string(),
        locus_tag: locus_tag.clone(),
        product: product.clone(),
        translation: translation.clone(),
        start, end,
    })
}
