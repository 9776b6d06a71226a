//! User-facing text returned in place of chord content.

pub const NOT_FOUND: &str =
    "Could not extract chord content from this page. The site structure may have changed.";

pub const TOOK_TOO_LONG: &str = "Page took too long to load. Please try again or use manual entry.";

pub const PROTECTED: &str = "Error loading chord content. The page may have additional protection or the content structure has changed.";

pub const LISTING_PAGE: &str = "This is a search results page, not a chord sheet.\n\n\
To import chords:\n\
1. Open the link in your browser\n\
2. Click on a specific song result\n\
3. Copy the URL of that song's page\n\
4. Paste it here to extract the chords\n\n\
Or copy the chords from the page and paste them into the song editor.";

pub const CHORDIFY: &str = "Chordify shows chords as an overlay on top of a video, so there is no chord sheet to extract.\n\n\
To import chords:\n\
1. Open the Chordify page in your browser\n\
2. Play along and note the chord progression\n\
3. Paste the chords into the song editor\n\n\
Or search Ultimate Guitar or AMDM.ru for a text version of the song.";

pub const INVALID_URL: &str = "Invalid URL. Please paste the full address of a song page.";

/// Guidance for a domain with no adapter.
pub fn unsupported(supported: &[&str]) -> String {
    let list = if supported.is_empty() {
        "none configured".to_string()
    } else {
        supported.join(" and ")
    };
    format!(
        "Chord extraction is not available for this site.\n\n\
         Currently supported: {list}.\n\n\
         Copy the chords from the page and paste them into the song editor instead."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_names_sources() {
        let text = unsupported(&["Ultimate Guitar", "AMDM.ru"]);
        assert!(text.contains("Ultimate Guitar and AMDM.ru"));
    }
}
