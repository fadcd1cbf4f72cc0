//! Current-song extraction from Icecast `status.xsl` mount pages.
//!
//! The page lists each mount as a table of `<tr><td>Label:</td><td>value</td></tr>`
//! rows. We only care about the row labelled `Current Song:`.

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

/// Opening of the row up to the start of the title cell.
const ROW_HEAD: &str = r"<(?i:tr)\b[^>]*>\s*<(?i:td)\b[^>]*>\s*Current Song:\s*</(?i:td)\s*>\s*<(?i:td)\b[^>]*>";
const CELL_END: &str = r"</(?i:td)\s*>";
/// The title cell must be the last one in the row.
const ROW_END: &str = r"^\s*</(?i:tr)\s*>";

struct RowPatterns {
    head: Regex,
    cell_end: Regex,
    row_end: Regex,
}

fn patterns() -> &'static RowPatterns {
    static ROW: OnceLock<RowPatterns> = OnceLock::new();
    ROW.get_or_init(|| RowPatterns {
        head: Regex::new(ROW_HEAD).expect("row head pattern compiles"),
        cell_end: Regex::new(CELL_END).expect("cell end pattern compiles"),
        row_end: Regex::new(ROW_END).expect("row end pattern compiles"),
    })
}

/// Pull the current song title out of a status page body.
///
/// Returns an empty string when the page has no two-cell `Current Song:`
/// row; an unexpected payload is "no data", not an error. Entities are
/// decoded and any markup inside the title cell is dropped.
pub fn extract_title(body: &str) -> String {
    let rows = patterns();
    for head in rows.head.find_iter(body) {
        let rest = &body[head.end()..];
        // The title never extends past its own cell
        let Some(cell_end) = rows.cell_end.find(rest) else {
            continue;
        };
        if rows.row_end.is_match(&rest[cell_end.end()..]) {
            return decode_cell(&rest[..cell_end.start()]);
        }
    }
    String::new()
}

fn decode_cell(raw: &str) -> String {
    if !raw.contains(['&', '<']) {
        return raw.trim().to_string();
    }
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICECAST_PAGE: &str = r#"<html><body>
<div class="roundcont">
<table border="0" cellpadding="4">
<tr><td>Stream Title:</td><td class="streamdata">Dark Electro</td></tr>
<tr><td>Content Type:</td><td class="streamdata">audio/mpeg</td></tr>
<tr><td>Current Listeners:</td><td class="streamdata">42</td></tr>
<tr><td>Current Song:</td><td class="streamdata">Covenant - Call the Ships to Port</td></tr>
</table>
</div>
</body></html>"#;

    #[test]
    fn test_icecast_mount_page() {
        assert_eq!(extract_title(ICECAST_PAGE), "Covenant - Call the Ships to Port");
    }

    #[test]
    fn test_entities_are_decoded() {
        let body = r#"<tr><td>Current Song:</td><td class="streamdata">Simon &amp; Garfunkel - Mrs. Robinson&#39;s &quot;Theme&quot;</td></tr>"#;
        assert_eq!(extract_title(body), r#"Simon & Garfunkel - Mrs. Robinson's "Theme""#);
    }

    #[test]
    fn test_whitespace_and_markup_around_cells() {
        let body = "<TR class=\"row\">\n   <td class=\"label\">  Current Song:  </td>\n\t<TD class=\"streamdata\">\n  <b>Nightwish</b> - Storytime \n</TD>\n</tr>";
        assert_eq!(extract_title(body), "Nightwish - Storytime");
    }

    #[test]
    fn test_cell_without_attributes() {
        let body = "<tr><td>Current Song:</td><td>Plain</td></tr>";
        assert_eq!(extract_title(body), "Plain");
    }

    #[test]
    fn test_first_row_wins() {
        let body = "<tr><td>Current Song:</td><td class=\"s\">One</td></tr>\
                    <tr><td>Current Song:</td><td class=\"s\">Two</td></tr>";
        assert_eq!(extract_title(body), "One");
    }

    #[test]
    fn test_missing_row_is_empty() {
        assert_eq!(extract_title(""), "");
        assert_eq!(extract_title("<html><body>Mount not found</body></html>"), "");
        assert_eq!(
            extract_title("<tr><td>Stream Title:</td><td class=\"s\">Only a title</td></tr>"),
            ""
        );
        // Label present but the row is cut off
        assert_eq!(extract_title("<tr><td>Current Song:</td><td class=\"s\">Trunc"), "");
    }

    #[test]
    fn test_play_history_row_is_ignored() {
        let body = "<tr><td>12:01:02</td><td>Old Song</td><td><b>Current Song</b></td></tr>";
        assert_eq!(extract_title(body), "");
    }

    #[test]
    fn test_extra_cell_is_not_a_title_row() {
        let body = "<tr><td>Current Song:</td><td class=\"s\">X</td><td>extra</td></tr>";
        assert_eq!(extract_title(body), "");
    }

    #[test]
    fn test_title_stops_at_its_own_cell() {
        // A broken row end must not pull the next row into the title
        let body = "<tr><td>Current Song:</td><td class=\"s\">Real</td></tr-broken>\n\
                    <tr><td>Listeners:</td><td>42</td></tr>";
        assert_eq!(extract_title(body), "");

        let body = "<tr><td>Current Song:</td><td class=\"s\">X</td><td>extra</td></tr>\n\
                    <tr><td>Current Song:</td><td class=\"s\">Second</td></tr>";
        assert_eq!(extract_title(body), "Second");
    }

    #[test]
    fn test_empty_title_cell() {
        let body = "<tr><td>Current Song:</td><td class=\"streamdata\"></td></tr>";
        assert_eq!(extract_title(body), "");
    }
}
