//! Code page mapping for `\'hh` escapes.
//!
//! Windows and CJK pages decode through encoding_rs. The DOS pages selected by
//! `\pc` and `\pca` are not part of the WHATWG set, so they use oem_cp tables.

use encoding_rs::Encoding;
use oem_cp::code_table::{DECODING_TABLE_CP437, DECODING_TABLE_CP850};

/// Code page assumed when the header declares none.
pub const DEFAULT_CODE_PAGE: u16 = 1252;

/// Resolve a Windows code page number to a decoder.
///
/// Returns `None` for pages encoding_rs does not cover. [`decode`] still
/// handles the OEM pages from [`oem_table`].
pub fn encoding_for(code_page: u16) -> Option<&'static Encoding> {
    let encoding = match code_page {
        874 => encoding_rs::WINDOWS_874,
        866 => encoding_rs::IBM866,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        10000 => encoding_rs::MACINTOSH,
        20866 => encoding_rs::KOI8_R,
        28591 => encoding_rs::WINDOWS_1252,
        28592 => encoding_rs::ISO_8859_2,
        65001 => encoding_rs::UTF_8,
        _ => return None,
    };
    Some(encoding)
}

/// Full 128-entry upper half of an OEM code page.
pub fn oem_table(code_page: u16) -> Option<&'static [char; 128]> {
    match code_page {
        437 => Some(&DECODING_TABLE_CP437),
        850 => Some(&DECODING_TABLE_CP850),
        _ => None,
    }
}

/// Decode a run of escaped bytes. Unmappable input yields `None`.
pub fn decode(code_page: u16, bytes: &[u8]) -> Option<String> {
    if let Some(table) = oem_table(code_page) {
        return Some(oem_cp::decode_string_complete_table(bytes, table));
    }
    let encoding = encoding_for(code_page)?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return None;
    }
    Some(text.into_owned())
}
