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

/// Organism name that marks a host as a reference genome.
pub const DEFAULT_REFERENCE_PREFIX: &str = "Streptomyces";

/// Role of a host genome in comparative analyses.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HostType {
    Reference,
    #[default]
    Query,
}

#[derive(Debug, Clone)]
pub struct UnknownHostType(String);

impl std::fmt::Display for UnknownHostType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "'{}' is not a valid HostType", self.0)
    }
}

impl std::error::Error for UnknownHostType {}

impl HostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostType::Reference => "reference",
            HostType::Query => "query",
        }
    }
}

impl std::fmt::Display for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HostType {
    type Err = UnknownHostType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(HostType::Reference),
            "query" => Ok(HostType::Query),
            _ => Err(UnknownHostType(s.to_string())),
        }
    }
}

/// Classify a host by its description
///
/// Hosts whose description starts with `reference_prefix` are
/// [references](HostType::Reference), everything else is a
/// [query](HostType::Query). The comparison is case sensitive.
///
pub fn classify_host(
    description: &str,
    reference_prefix: &str,
) -> HostType {
    if description.starts_with(reference_prefix) {
        HostType::Reference
    } else {
        HostType::Query
    }
}
