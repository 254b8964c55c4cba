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

//! SQLite storage for hosts, contigs, coding sequences, and domains.
//!
//! ## Schema
//!
//! - `hosts`: one row per distinct host description, with the host type and
//!   the assembly statistics.
//! - `contigs`: one row per contig accession, pointing to its host.
//! - `coding_sequences`: the validated CDS features of each contig.
//! - `domains`: the resolved domain sequence of each contig, in scan order.
//!
//! A contig is always written in a single transaction together with its host,
//! coding sequences, and domains. Writing a contig that is already in the
//! database replaces the old rows.
//!
use std::path::Path;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::CdsRecord;
use crate::ContigRecord;
use crate::DomainRecord;
use crate::HostRecord;
use crate::HostType;
use crate::Strand;
use crate::stats::AssemblyStats;

type E = Box<dyn std::error::Error>;

pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS hosts (
    host_id INTEGER PRIMARY KEY,
    description TEXT NOT NULL UNIQUE,
    host_type TEXT NOT NULL,
    number_of_contigs INTEGER,
    l50 INTEGER
);

CREATE TABLE IF NOT EXISTS contigs (
    contig_id TEXT PRIMARY KEY,
    host_id INTEGER NOT NULL REFERENCES hosts(host_id),
    sequence_length INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS coding_sequences (
    contig_id TEXT NOT NULL REFERENCES contigs(contig_id),
    locus_tag TEXT NOT NULL,
    product TEXT NOT NULL,
    translation TEXT NOT NULL,
    cds_start INTEGER NOT NULL,
    cds_end INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS domains (
    contig_id TEXT NOT NULL REFERENCES contigs(contig_id),
    locus_tag TEXT NOT NULL,
    family_number INTEGER NOT NULL,
    domain_start INTEGER NOT NULL,
    domain_end INTEGER NOT NULL,
    strand INTEGER
);

CREATE INDEX IF NOT EXISTS contigs_host ON contigs(host_id);
CREATE INDEX IF NOT EXISTS coding_sequences_contig ON coding_sequences(contig_id);
CREATE INDEX IF NOT EXISTS domains_contig ON domains(contig_id);
";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database in `path`.
    pub fn open<P: AsRef<Path>>(
        path: P,
    ) -> Result<Self, E> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, E> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Wrap an open connection, creating the tables if they don't exist.
    pub fn from_connection(
        conn: Connection,
    ) -> Result<Self, E> {
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Store a distilled contig
    ///
    /// Creates the host identified by `record.description` with `host_type`
    /// unless it already exists, in which case the existing host type is kept.
    /// Any previous rows for the contig are replaced.
    ///
    /// Everything is written in a single transaction, if any insert fails
    /// nothing from `record` is stored.
    ///
    /// Returns the id of the host.
    ///
    pub fn insert_contig(
        &mut self,
        record: &ContigRecord,
        host_type: HostType,
    ) -> Result<i64, E> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO hosts (description, host_type) VALUES (?1, ?2)",
            params![record.description, host_type.as_str()],
        )?;
        let host_id: i64 = tx.query_row(
            "SELECT host_id FROM hosts WHERE description = ?1",
            params![record.description],
            |row| row.get(0),
        )?;

        tx.execute("DELETE FROM domains WHERE contig_id = ?1", params![record.contig_id])?;
        tx.execute("DELETE FROM coding_sequences WHERE contig_id = ?1", params![record.contig_id])?;
        tx.execute("DELETE FROM contigs WHERE contig_id = ?1", params![record.contig_id])?;

        tx.execute(
            "INSERT INTO contigs (contig_id, host_id, sequence_length) VALUES (?1, ?2, ?3)",
            params![record.contig_id, host_id, record.sequence_length as i64],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO coding_sequences (contig_id, locus_tag, product, translation, cds_start, cds_end)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            )?;
            for cds in record.cds.iter() {
                insert.execute(params![cds.contig_id, cds.locus_tag, cds.product, cds.translation, cds.start, cds.end])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO domains (contig_id, locus_tag, family_number, domain_start, domain_end, strand)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            )?;
            for domain in record.domains.iter() {
                insert.execute(params![domain.contig_id, domain.locus_tag, domain.family_number, domain.start, domain.end, domain.strand.to_i8()])?;
            }
        }

        tx.commit()?;
        Ok(host_id)
    }

    /// Sequence lengths of all contigs of a host, longest first.
    pub fn contig_lengths(
        &self,
        host_id: i64,
    ) -> Result<Vec<u64>, E> {
        let mut stmt = self.conn.prepare(
            "SELECT sequence_length FROM contigs WHERE host_id = ?1 ORDER BY sequence_length DESC"
        )?;
        let lengths = stmt.query_map(params![host_id], |row| row.get::<_, i64>(0))?
            .map(|length| length.map(|x| x as u64))
            .collect::<Result<Vec<u64>, _>>()?;
        Ok(lengths)
    }

    /// Recompute and store the number of contigs and L50 of a host
    ///
    /// Uses all contigs currently stored for the host, so running this again
    /// gives the same result.
    ///
    /// ## Errors
    ///
    /// Returns [EmptyAssembly](crate::stats::EmptyAssembly) if the host has no
    /// contigs.
    ///
    pub fn update_host_statistics(
        &self,
        host_id: i64,
    ) -> Result<AssemblyStats, E> {
        let lengths = self.contig_lengths(host_id)?;
        let stats = AssemblyStats::from_lengths(&lengths)?;
        self.conn.execute(
            "UPDATE hosts SET number_of_contigs = ?1, l50 = ?2 WHERE host_id = ?3",
            params![stats.number_of_contigs as i64, stats.l50 as i64, host_id],
        )?;
        Ok(stats)
    }

    /// Ids of all hosts that have at least one contig.
    pub fn hosts_with_contigs(
        &self,
    ) -> Result<Vec<i64>, E> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT host_id FROM contigs ORDER BY host_id"
        )?;
        let ids = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    pub fn host(
        &self,
        host_id: i64,
    ) -> Result<Option<HostRecord>, E> {
        let row = self.conn.query_row(
            "SELECT description, host_type, number_of_contigs, l50 FROM hosts WHERE host_id = ?1",
            params![host_id],
            |row| Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
            )),
        ).optional()?;

        match row {
            Some((description, host_type, number_of_contigs, l50)) => Ok(Some(HostRecord {
                host_id,
                description,
                host_type: host_type.parse::<HostType>()?,
                number_of_contigs: number_of_contigs.map(|x| x as u64),
                l50: l50.map(|x| x as u64),
            })),
            None => Ok(None),
        }
    }

    pub fn host_id(
        &self,
        description: &str,
    ) -> Result<Option<i64>, E> {
        let id = self.conn.query_row(
            "SELECT host_id FROM hosts WHERE description = ?1",
            params![description],
            |row| row.get(0),
        ).optional()?;
        Ok(id)
    }

    /// Coding sequences of a contig in insertion order.
    pub fn coding_sequences(
        &self,
        contig_id: &str,
    ) -> Result<Vec<CdsRecord>, E> {
        let mut stmt = self.conn.prepare(
            "SELECT contig_id, locus_tag, product, translation, cds_start, cds_end
             FROM coding_sequences WHERE contig_id = ?1 ORDER BY rowid"
        )?;
        let records = stmt.query_map(params![contig_id], |row| {
            Ok(CdsRecord {
                contig_id: row.get(0)?,
                locus_tag: row.get(1)?,
                product: row.get(2)?,
                translation: row.get(3)?,
                start: row.get(4)?,
                end: row.get(5)?,
            })
        })?.collect::<Result<Vec<CdsRecord>, _>>()?;
        Ok(records)
    }

    /// Domain sequence of a contig in scan order.
    pub fn domains(
        &self,
        contig_id: &str,
    ) -> Result<Vec<DomainRecord>, E> {
        let mut stmt = self.conn.prepare(
            "SELECT locus_tag, family_number, domain_start, domain_end, strand, contig_id
             FROM domains WHERE contig_id = ?1 ORDER BY rowid"
        )?;
        let records = stmt.query_map(params![contig_id], |row| {
            Ok(DomainRecord {
                locus_tag: row.get(0)?,
                family_number: row.get(1)?,
                start: row.get(2)?,
                end: row.get(3)?,
                strand: Strand::from_i8(row.get(4)?),
                contig_id: row.get(5)?,
            })
        })?.collect::<Result<Vec<DomainRecord>, _>>()?;
        Ok(records)
    }
}
