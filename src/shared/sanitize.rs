use lazy_static::lazy_static;
use regex::Regex;

/// Name used when nothing printable survives sanitizing
pub const FALLBACK_FILENAME: &str = "unnamed";

/// Maximum length (in chars) of a persisted display filename
pub const MAX_FILENAME_LEN: usize = 255;

lazy_static! {
    /// Markup tags, e.g. `<script>` or `</b>`
    static ref HTML_TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();

    /// Anything that is not a letter, digit, space or one of `._()-+,`
    static ref UNSAFE_CHAR_REGEX: Regex = Regex::new(r"[^\p{L}\p{N} ._()\-+,]").unwrap();

    /// Runs of whitespace
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();

    /// Extensions carried over to the storage filename
    static ref EXTENSION_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]{1,16}$").unwrap();
}

/// Last path component of a client-supplied name, accepting both separators
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Sanitize a user-supplied filename for display.
///
/// Markup is stripped, directory components are dropped and characters outside
/// a conservative set are replaced with `-`. The result is never empty and never
/// starts with a dot.
pub fn sanitize_filename(name: &str) -> String {
    let without_tags = HTML_TAG_REGEX.replace_all(name, "");
    let base = base_name(&without_tags);

    let visible: String = base.chars().filter(|c| !c.is_control()).collect();
    let replaced = UNSAFE_CHAR_REGEX.replace_all(&visible, "-");
    let collapsed = WHITESPACE_REGEX.replace_all(&replaced, " ");

    let trimmed = collapsed.trim().trim_start_matches('.').trim_start();
    let truncated: String = trimmed.chars().take(MAX_FILENAME_LEN).collect();
    let truncated = truncated.trim_end();

    if truncated.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        truncated.to_string()
    }
}

/// Extension (with leading dot) to append to a generated storage filename.
///
/// Only short alphanumeric extensions survive; anything else yields an empty string.
pub fn storage_extension(original_name: &str) -> String {
    let base = base_name(original_name);
    match base.rfind('.') {
        Some(idx) if EXTENSION_REGEX.is_match(&base[idx + 1..]) => base[idx..].to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("notes.txt"), "notes.txt");
        assert_eq!(sanitize_filename("my report (1).pdf"), "my report (1).pdf");
        assert_eq!(sanitize_filename("laporan-akhir_v2.docx"), "laporan-akhir_v2.docx");
        assert_eq!(sanitize_filename("résumé.pdf"), "résumé.pdf");
    }

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(sanitize_filename("<b>report</b>.pdf"), "report.pdf");
        assert_eq!(
            sanitize_filename("<script>alert(1)</script>x.txt"),
            "alert(1)x.txt"
        );
        assert_eq!(sanitize_filename("a\"b'c.txt"), "a-b-c.txt");
    }

    #[test]
    fn test_sanitize_drops_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(sanitize_filename(".."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_sanitize_never_empty() {
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("   "), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("<br/>"), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("a\r\nb.txt"), "ab.txt");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "a".repeat(400);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_FILENAME_LEN);
    }

    #[test]
    fn test_storage_extension() {
        assert_eq!(storage_extension("notes.txt"), ".txt");
        assert_eq!(storage_extension("archive.tar.gz"), ".gz");
        assert_eq!(storage_extension("README"), "");
        assert_eq!(storage_extension("dir.d/README"), "");
        assert_eq!(storage_extension("evil.<script>"), "");
        assert_eq!(storage_extension("x./../y"), "");
        assert_eq!(storage_extension("trailing."), "");
    }
}
