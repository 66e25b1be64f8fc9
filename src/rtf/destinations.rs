//! Static tables of control words with a fixed meaning to the extractor.

/// Destinations whose content is metadata, never displayable text.
///
/// A group containing one of these words (and every group nested inside it)
/// is skipped. `{\*\...}` groups are skipped as well, whatever their name.
pub const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "listtable",
    "listoverridetable",
    "revtbl",
    "rsidtbl",
    "info",
    "fldinst",
    "object",
    "objdata",
    "objclass",
    "pict",
    "shppict",
    "nonshppict",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
    "xmlnstbl",
    "generator",
    "filetbl",
    "private",
];

pub fn is_skipped_destination(name: &str) -> bool {
    SKIPPED_DESTINATIONS.contains(&name)
}

/// Text produced by a control word, if it stands for a character.
pub fn special_character(name: &str) -> Option<&'static str> {
    let text = match name {
        "par" | "line" | "sect" | "page" | "row" => "\n",
        "tab" | "cell" | "nestcell" => "\t",
        "emdash" => "\u{2014}",
        "endash" => "\u{2013}",
        "bullet" => "\u{2022}",
        "lquote" => "\u{2018}",
        "rquote" => "\u{2019}",
        "ldblquote" => "\u{201c}",
        "rdblquote" => "\u{201d}",
        "emspace" => "\u{2003}",
        "enspace" => "\u{2002}",
        "qmspace" => "\u{2005}",
        _ => return None,
    };
    Some(text)
}

/// Text produced by a control symbol.
pub fn symbol_character(symbol: char) -> Option<&'static str> {
    let text = match symbol {
        '~' => "\u{00a0}",
        '-' => "-",
        '_' => "\u{2011}",
        '\n' | '\r' => "\n",
        _ => return None,
    };
    Some(text)
}

/// Code page implied by a charset control word in the header.
pub fn charset_code_page(name: &str) -> Option<u16> {
    match name {
        "ansi" => Some(1252),
        "mac" => Some(10000),
        "pc" => Some(437),
        "pca" => Some(850),
        _ => None,
    }
}
