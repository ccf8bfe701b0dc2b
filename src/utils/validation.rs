//! Centralized validation and helper functions.

use std::path::Path;

/// Minimum number of tab-separated fields in a VCF data line
pub const MIN_VCF_FIELDS: usize = 8;

/// Extensions accepted for VCF input
pub const VCF_EXTENSIONS: [&str; 2] = [".vcf", ".vcf.gz"];

/// Check that a path names a plain or gzip-compressed VCF file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tblg::utils::validation::is_vcf_path;
///
/// assert!(is_vcf_path(Path::new("calls.vcf")));
/// assert!(is_vcf_path(Path::new("calls.VCF.GZ")));
/// assert!(!is_vcf_path(Path::new("calls.bcf")));
/// ```
#[must_use]
pub fn is_vcf_path(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    VCF_EXTENSIONS.iter().any(|ext| path_str.ends_with(ext))
}

/// Check if the path is a gzipped file
#[must_use]
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

/// Field delimiter for a result file, chosen by extension.
///
/// `.csv` is comma-separated, `.tsv` and `.txt` are tab-separated.
/// Returns `None` for any other extension.
#[must_use]
pub fn output_delimiter(path: &Path) -> Option<u8> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("csv") => Some(b','),
        Some("tsv" | "txt") => Some(b'\t'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_vcf_path() {
        assert!(is_vcf_path(Path::new("a.vcf")));
        assert!(is_vcf_path(Path::new("dir/a.vcf.gz")));
        assert!(!is_vcf_path(Path::new("a.vcf.bz2")));
        assert!(!is_vcf_path(Path::new("a.txt")));
        assert!(!is_vcf_path(Path::new("vcf")));
    }

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("a.vcf.gz")));
        assert!(is_gzipped(Path::new("a.VCF.GZ")));
        assert!(!is_gzipped(Path::new("a.vcf")));
    }

    #[test]
    fn test_output_delimiter() {
        assert_eq!(output_delimiter(Path::new("out.csv")), Some(b','));
        assert_eq!(output_delimiter(Path::new("out.tsv")), Some(b'\t'));
        assert_eq!(output_delimiter(Path::new("out/res.TXT")), Some(b'\t'));
        assert_eq!(output_delimiter(Path::new("out.xlsx")), None);
        assert_eq!(output_delimiter(Path::new("out")), None);
    }
}
