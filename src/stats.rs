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

//! Assembly statistics of a host genome.
//!
//! L50 is the smallest number of contigs whose combined length is more than
//! half of the assembly length, when the contigs are taken from longest to
//! shortest.
//!
//! ```rust
//! use gpfam::stats::AssemblyStats;
//!
//! let stats = AssemblyStats::from_lengths(&[80, 5, 100, 5, 90]).unwrap();
//!
//! assert_eq!(stats.number_of_contigs, 5);
//! assert_eq!(stats.l50, 2);
//! ```
//!

/// Statistics were requested for a host without contigs.
///
/// This means the statistics were computed before any contig of the host was
/// stored, which is a bug in the caller and not a problem with the input data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyAssembly;

impl std::fmt::Display for EmptyAssembly {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "assembly statistics requested for a host with no contigs")
    }
}

impl std::error::Error for EmptyAssembly {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyStats {
    pub number_of_contigs: u64,
    pub l50: u64,
}

impl AssemblyStats {
    /// Compute the statistics from the lengths of all contigs of a host.
    ///
    /// The order of `lengths` does not matter.
    pub fn from_lengths(
        lengths: &[u64],
    ) -> Result<Self, EmptyAssembly> {
        let l50 = l50(lengths).ok_or(EmptyAssembly)?;
        Ok(AssemblyStats { number_of_contigs: lengths.len() as u64, l50 })
    }
}

/// L50 of `lengths`, or None if `lengths` is empty.
pub fn l50(
    lengths: &[u64],
) -> Option<u64> {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let total: u128 = sorted.iter().map(|x| *x as u128).sum();
    let mut running: u128 = 0;
    for (rank, length) in sorted.iter().enumerate() {
        running += *length as u128;
        if 2 * running > total {
            return Some(rank as u64 + 1)
        }
    }

    // Empty input, or only zero-length contigs
    if sorted.is_empty() { None } else { Some(sorted.len() as u64) }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn l50_example() {
        use super::l50;

        assert_eq!(l50(&[100, 90, 80, 5, 5]), Some(2));
    }

    #[test]
    fn l50_unsorted_input() {
        use super::l50;

        assert_eq!(l50(&[5, 80, 5, 90, 100]), Some(2));
    }

    #[test]
    fn l50_single_contig() {
        use super::AssemblyStats;

        let got = AssemblyStats::from_lengths(&[1000]).unwrap();
        assert_eq!(got, AssemblyStats { number_of_contigs: 1, l50: 1 });
    }

    #[test]
    fn l50_exactly_half_is_not_enough() {
        use super::l50;

        // 100 is exactly half of 200
        assert_eq!(l50(&[100, 50, 50]), Some(2));
        assert_eq!(l50(&[10, 10]), Some(2));
    }

    #[test]
    fn l50_dominant_contig() {
        use super::l50;

        assert_eq!(l50(&[9_000_000, 10, 10, 10]), Some(1));
    }

    #[test]
    fn l50_equal_lengths() {
        use super::l50;

        assert_eq!(l50(&[100, 100, 100, 100, 100]), Some(3));
    }

    #[test]
    fn empty_assembly_is_an_error() {
        use super::{AssemblyStats, EmptyAssembly};

        assert_eq!(AssemblyStats::from_lengths(&[]), Err(EmptyAssembly));
    }

    #[test]
    fn l50_is_idempotent() {
        use super::AssemblyStats;

        let lengths = vec![3_500_000, 1_200_000, 800_000, 45_000, 45_000, 1_000];
        let first = AssemblyStats::from_lengths(&lengths).unwrap();
        let second = AssemblyStats::from_lengths(&lengths).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.l50, 1);
    }
}
