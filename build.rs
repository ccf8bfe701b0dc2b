use std::path::Path;

const REQUIRED_COLUMNS: [&str; 5] = ["level", "POS", "REF", "ALT", "lineage"];

fn main() {
    let barcode_path = Path::new("data/levels.tsv");
    validate_barcode_file(barcode_path);
    set_build_dependencies();
}

fn validate_barcode_file(barcode_path: &Path) {
    // Ensure the barcode table exists at build time
    assert!(
        barcode_path.exists(),
        "\n\nBARCODE BUILD ERROR: File not found\n\
         Path: {}\n\
         The lineage barcode table is embedded into the binary.\n",
        barcode_path.display()
    );

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(barcode_path)
        .unwrap_or_else(|e| {
            panic!(
                "\n\nBARCODE BUILD ERROR: Failed to read file\n\
                 Path: {}\n\
                 Error: {e}\n",
                barcode_path.display()
            );
        });

    let headers = reader.headers().cloned().unwrap_or_else(|e| {
        panic!("\n\nBARCODE BUILD ERROR: Unreadable header line\nError: {e}\n");
    });

    let columns: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            headers.iter().position(|h| h == *name).unwrap_or_else(|| {
                panic!(
                    "\n\nBARCODE BUILD ERROR: Missing '{name}' column\n\
                     Found columns: {headers:?}\n"
                );
            })
        })
        .collect();

    let rows = validate_barcode_rows(&mut reader, &columns);

    println!("cargo:warning=Validated barcode table: {rows} diagnostic sites");
}

fn validate_barcode_rows(reader: &mut csv::Reader<std::fs::File>, columns: &[usize]) -> usize {
    let mut rows = 0;

    for (i, result) in reader.records().enumerate() {
        // Header is line 1
        let line = i + 2;
        let record = result.unwrap_or_else(|e| {
            panic!("\n\nBARCODE BUILD ERROR: Malformed row on line {line}\nError: {e}\n");
        });

        let level = record.get(columns[0]).unwrap_or_default();
        assert!(
            level.trim().parse::<u8>().is_ok(),
            "\n\nBARCODE BUILD ERROR: Non-integer level '{level}' on line {line}\n"
        );

        let pos = record.get(columns[1]).unwrap_or_default();
        assert!(
            pos.trim().parse::<u32>().is_ok(),
            "\n\nBARCODE BUILD ERROR: Non-integer POS '{pos}' on line {line}\n"
        );

        rows += 1;
    }

    assert!(rows > 0, "\n\nBARCODE BUILD ERROR: Table has no rows\n");
    rows
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the barcode table changes
    println!("cargo:rerun-if-changed=data/levels.tsv");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
