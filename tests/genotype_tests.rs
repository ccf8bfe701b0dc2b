//! End-to-end genotyping tests against the library API
//!
//! VCF fixtures are written to temporary directories, plain and gzipped, and
//! run through the same batch pipeline the CLI uses.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use tblg::batch::{process_batch, BatchOptions, SkipReason};
use tblg::core::types::{Level, ReferenceEntry, VariantRecord};
use tblg::matching::LevelMatcher;
use tblg::{process_files, validate_input_file, BarcodeTable};

const HEADER: &str = "##fileformat=VCFv4.2
##contig=<ID=NC_000962.3,length=4411532>
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT";

/// One VCF data line with a GT column per sample
fn site(pos: u32, ref_allele: &str, alt: &str, genotypes: &[&str]) -> String {
    format!(
        "NC_000962.3\t{pos}\t.\t{ref_allele}\t{alt}\t60\tPASS\t.\tGT\t{}",
        genotypes.join("\t")
    )
}

fn vcf_text(samples: &[&str], sites: &[String]) -> String {
    let mut text = format!("{HEADER}\t{}\n", samples.join("\t"));
    for line in sites {
        text.push_str(line);
        text.push('\n');
    }
    text
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

fn write_gz(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("Failed to create fixture");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(contents.as_bytes())
        .expect("Failed to compress fixture");
    encoder.finish().expect("Failed to finish gzip stream");
    path
}

/// Samples from lineages 1, 2 and 4 plus a reference-like sample, typed
/// against the bundled barcode.
///
/// Strains outside lineage 4 carry the `L4` and `L4.9` sites as ALT; the
/// reference-like sample calls REF everywhere.
fn cohort_vcf() -> String {
    vcf_text(
        &["lin4", "lin2", "lin1", "h37rv"],
        &[
            // Level 1
            site(615938, "G", "A", &["0", "0", "1", "0"]),
            site(3426795, "C", "T", &["0", "0", "1", "0"]),
            site(497491, "G", "A", &["0", "1", "0", "0"]),
            site(1834177, "A", "C", &["0", "1", "0", "0"]),
            site(931123, "T", "C", &["0", "1", "1", "0"]),
            site(62657, "A", "G", &["0", "1", "1", "0"]),
            site(514245, "T", "C", &["0", "1", "1", "0"]),
            // Level 2
            site(4404247, "G", "A", &["0", "0", "1", "0"]),
            site(2622402, "C", "T", &["0", "0", "1", "0"]),
            site(1849, "C", "A", &["0", "1", "0", "0"]),
            site(2505085, "G", "A", &["0", "1", "0", "0"]),
            site(3062858, "T", "C", &["1", "0", "0", "0"]),
            site(2076021, "C", "T", &["1", "0", "0", "0"]),
            site(1206171, "C", "T", &["0", "1", "1", "0"]),
            site(2875883, "G", "A", &["0", "1", "1", "0"]),
            // Levels 3 to 5
            site(1759252, "T", "G", &["0", "0", "1", "0"]),
            site(409697, "C", "T", &["1", "0", "0", "0"]),
            site(3373397, "G", "A", &["0", "1", "0", "0"]),
            site(4404105, "C", "T", &["0", "1", "0", "0"]),
            site(3010102, "C", "T", &["0", "1", "0", "0"]),
            // Not a barcode position
            site(1000, "A", "T", &["1", "1", "1", "1"]),
        ],
    )
}

#[test]
fn test_cohort_lineages() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "cohort.vcf", &cohort_vcf());
    let table = BarcodeTable::load_embedded().unwrap();

    let result = process_files(&[path], &table);
    let rows: Vec<[&str; 6]> = result.iter().map(|r| r.to_row()).collect();

    assert_eq!(
        rows,
        vec![
            ["lin1", "L1", "L1.1", "L1.1.1", "", ""],
            [
                "lin2",
                "L2",
                "L2.2 (modern)",
                "L2.2.1",
                "L2.2.1.1",
                "L2.2.1.1.1"
            ],
            ["lin4", "L4", "L4.1", "L4.1.1", "", ""],
            ["h37rv", "L4", "L4.9", "", "", ""],
        ]
    );
}

#[test]
fn test_non_lineage_4_markers_rule_out_lineage_4() {
    let dir = TempDir::new().unwrap();
    let table = BarcodeTable::load_embedded().unwrap();
    let level_1 = Level::ALL[0];
    let level_2 = Level::ALL[1];

    // A lineage 2 strain: every L2 site plus every L4 and L4.9 site
    let sites: Vec<String> = table
        .entries(level_1)
        .iter()
        .chain(table.entries(level_2))
        .filter(|e| ["L2", "L4", "L4.9", "L2.2 (modern)"].contains(&e.lineage.as_str()))
        .map(|e| site(e.position, &e.ref_allele, &e.alt_allele, &["1"]))
        .collect();
    let path = write_file(dir.path(), "lin2.vcf", &vcf_text(&["S1"], &sites));

    let result = process_files(&[path], &table);
    let row = &result.rows()[0];

    assert_eq!(row.level_1, "L2");
    assert_eq!(row.level_2, "L2.2 (modern)");
    assert!(!row.level_1.contains("L4"));
    assert!(!row.level_2.contains("L4.9"));
}

#[test]
fn test_gzipped_input_matches_plain() {
    let dir = TempDir::new().unwrap();
    let plain = write_file(dir.path(), "cohort.vcf", &cohort_vcf());
    let gzipped = write_gz(dir.path(), "cohort.vcf.gz", &cohort_vcf());
    let table = BarcodeTable::load_embedded().unwrap();

    assert!(validate_input_file(&gzipped));
    assert_eq!(
        process_files(&[plain], &table),
        process_files(&[gzipped], &table)
    );
}

#[test]
fn test_single_site_scenario() {
    let table = BarcodeTable::from_tsv("level\tPOS\tREF\tALT\tlineage\n1\t100\tA\tT\tL1\n").unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "s1.vcf",
        &vcf_text(&["S1"], &[site(100, "A", "T", &["0/1"])]),
    );

    let result = process_files(&[path], &table);

    assert_eq!(result.len(), 1);
    let row = &result.rows()[0];
    assert_eq!(row.sample, "S1");
    assert_eq!(row.level_1, "L1*, L4");
    assert_eq!(row.level_2, "L4.9");
    assert_eq!(row.level_3, "");
    assert_eq!(row.level_4, "");
    assert_eq!(row.level_5, "");
}

#[test]
fn test_batch_skips_bad_files_and_keeps_going() {
    let dir = TempDir::new().unwrap();
    let table = BarcodeTable::load_embedded().unwrap();

    let wrong_extension = write_file(dir.path(), "cohort.txt", &cohort_vcf());
    let truncated = write_file(
        dir.path(),
        "truncated.vcf",
        &format!("{HEADER}\tS1\nNC_000962.3\t615938\t.\n"),
    );
    let uninformative = write_file(
        dir.path(),
        "uninformative.vcf",
        &vcf_text(&["S1"], &[site(1000, "A", "T", &["1"])]),
    );
    let good = write_file(dir.path(), "cohort.vcf", &cohort_vcf());

    let paths = vec![wrong_extension, truncated, good, uninformative];
    let options = BatchOptions {
        threads: Some(2),
        ..BatchOptions::default()
    };
    let report = process_batch(&paths, &table, &options, &()).unwrap();

    assert_eq!(report.files_genotyped, 1);
    assert_eq!(report.result.len(), 4);

    let skipped: Vec<(&Path, &SkipReason)> = report
        .skipped
        .iter()
        .map(|s| (s.path.as_path(), &s.reason))
        .collect();
    assert_eq!(skipped.len(), 3);
    assert_eq!(skipped[0].0, paths[0].as_path());
    assert!(matches!(skipped[0].1, SkipReason::InvalidInputFile(_)));
    assert!(report.skipped[0]
        .notice()
        .ends_with("cohort.txt does not end with .vcf or .vcf.gz. Skipping..."));
    assert_eq!(skipped[1].0, paths[1].as_path());
    assert!(matches!(skipped[1].1, SkipReason::InvalidInputFile(_)));
    assert!(report.skipped[1]
        .notice()
        .ends_with("truncated.vcf does not have typical VCF structure. Skipping..."));
    assert_eq!(skipped[2].0, paths[3].as_path());
    assert_eq!(skipped[2].1, &SkipReason::EmptyResultFile);
}

#[test]
fn test_no_valid_inputs_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let table = BarcodeTable::load_embedded().unwrap();
    let paths = vec![
        write_file(dir.path(), "a.csv", "not a vcf"),
        write_file(dir.path(), "empty.vcf", &format!("{HEADER}\tS1\n")),
    ];

    let report = process_batch(&paths, &table, &BatchOptions::default(), &()).unwrap();

    assert!(report.no_valid_inputs());
    assert!(report.result.is_empty());
    assert_eq!(report.skipped.len(), 2);
}

#[test]
fn test_repeated_sample_across_files_is_not_deduplicated() {
    let dir = TempDir::new().unwrap();
    let table = BarcodeTable::load_embedded().unwrap();
    let first = write_file(dir.path(), "first.vcf", &cohort_vcf());
    let second = write_file(dir.path(), "second.vcf", &cohort_vcf());

    let result = process_files(&[first, second], &table);

    let samples: Vec<&str> = result.iter().map(|r| r.sample.as_str()).collect();
    assert_eq!(
        samples,
        vec!["lin1", "lin1", "lin2", "lin2", "lin4", "lin4", "h37rv", "h37rv"]
    );
}

#[test]
fn test_double_run_is_identical() {
    let dir = TempDir::new().unwrap();
    let table = BarcodeTable::load_embedded().unwrap();
    let paths: Vec<PathBuf> = (0..6)
        .map(|i| {
            if i % 2 == 0 {
                write_file(dir.path(), &format!("batch{i}.vcf"), &cohort_vcf())
            } else {
                write_gz(dir.path(), &format!("batch{i}.vcf.gz"), &cohort_vcf())
            }
        })
        .collect();

    let first = process_files(&paths, &table);
    let second = process_files(&paths, &table);

    assert_eq!(first.len(), 24);
    assert_eq!(first, second);
}

#[test]
fn test_position_filter_drops_unlisted_sites() {
    // Position 200 is in the table at level 7, which is never matched
    let table = BarcodeTable::from_tsv(
        "level\tPOS\tREF\tALT\tlineage\n1\t100\tA\tT\tL1\n7\t200\tC\tG\tL9\n",
    )
    .unwrap();
    assert!(table.is_valid_position(200));

    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "s.vcf",
        &vcf_text(
            &["S1"],
            &[site(200, "C", "G", &["1"]), site(300, "A", "T", &["1"])],
        ),
    );

    let result = process_files(&[path], &table);

    assert_eq!(result.len(), 1);
    assert_eq!(result.rows()[0].levels(), ["L4", "L4.9", "", "", ""]);
}

/// Raw labels are exactly the lineages of entries sharing an observed site
#[test]
fn test_exact_match_property() {
    const ALLELES: [&str; 4] = ["A", "C", "G", "T"];
    let mut rng = StdRng::seed_from_u64(0x7b1c);

    for _ in 0..50 {
        let mut table = BarcodeTable::new();
        for i in 0..rng.gen_range(1..40) {
            let level = Level::ALL[rng.gen_range(0..Level::ALL.len())];
            table.add_entry(ReferenceEntry::new(
                level,
                rng.gen_range(1..30),
                ALLELES[rng.gen_range(0..4)],
                ALLELES[rng.gen_range(0..4)],
                format!("lin{i}"),
            ));
        }

        let records: Vec<VariantRecord> = (0..rng.gen_range(0..60))
            .map(|_| VariantRecord {
                sample: format!("S{}", rng.gen_range(0..4)),
                position: rng.gen_range(1..30),
                ref_allele: ALLELES[rng.gen_range(0..4)].to_string(),
                called_allele: if rng.gen_bool(0.9) {
                    Some(ALLELES[rng.gen_range(0..4)].to_string())
                } else {
                    None
                },
            })
            .collect();

        let raw = LevelMatcher::new(&table).match_records(&records);

        for level in Level::ALL {
            let mut expected: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
            for record in &records {
                expected.entry(record.sample.as_str()).or_default();
                let Some(called) = &record.called_allele else {
                    continue;
                };
                for entry in table.entries(level) {
                    if entry.position == record.position
                        && entry.ref_allele == record.ref_allele
                        && &entry.alt_allele == called
                    {
                        expected
                            .entry(record.sample.as_str())
                            .or_default()
                            .insert(entry.lineage.as_str());
                    }
                }
            }

            for (sample, lineages) in &expected {
                let observed: BTreeSet<&str> =
                    raw.calls(sample, level).iter().map(String::as_str).collect();
                assert_eq!(&observed, lineages, "sample {sample}, {level}");
            }
            assert_eq!(raw.len(), expected.len());
        }
    }
}
