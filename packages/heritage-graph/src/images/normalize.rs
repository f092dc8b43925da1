//! Image URL normalization.

/// Local placeholder returned when no stage finds an image.
pub const PLACEHOLDER_IMAGE: &str = "/images/no-img.png";

/// Width forced on redirect URLs; makes the media repository render TIFFs.
pub const REDIRECT_WIDTH: u32 = 800;

const REDIRECT_BASE: &str = "https://commons.wikimedia.org/w/index.php?title=Special:Redirect/file/";
const FILE_PAGE_MARKER: &str = "/wiki/File:";

/// Rewrite image references browsers cannot display directly.
///
/// - TIFF references (`.tif`/`.tiff`, any case) become a redirect URL built
///   from the text after the last `/`.
/// - File description pages (`/wiki/File:...`) become a redirect URL built
///   from the text after `File:`.
/// - Anything else passes through unchanged.
pub fn normalize_image_url(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();

    let filename = if lower.ends_with(".tif") || lower.ends_with(".tiff") {
        url.rsplit('/').next()
    } else if url.contains(FILE_PAGE_MARKER) {
        url.rfind("File:").map(|i| &url[i + "File:".len()..])
    } else {
        None
    };

    match filename.filter(|f| !f.is_empty()) {
        Some(file) => format!("{REDIRECT_BASE}{file}&width={REDIRECT_WIDTH}"),
        None => url.to_string(),
    }
}

/// Whether a URL is the local placeholder.
pub fn is_placeholder(url: &str) -> bool {
    url == PLACEHOLDER_IMAGE
}
