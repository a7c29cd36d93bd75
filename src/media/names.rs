use encoding_rs::GBK;

/// Upper half of IBM code page 437, the historical ZIP filename encoding.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Outcome of recovering an archive entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedName {
    /// The name survived the CP437 -> GBK round trip.
    Recovered(String),
    /// The round trip did not apply; the name is kept as the archive reported it.
    Kept(String),
}

impl DecodedName {
    pub fn into_string(self) -> String {
        match self {
            DecodedName::Recovered(name) | DecodedName::Kept(name) => name,
        }
    }
}

/// Undo the mojibake produced when GBK-encoded names are read as CP437.
///
/// Archive libraries hand back names without the UTF-8 flag decoded as CP437,
/// which mangles names written by Chinese Windows tools. Re-encoding as CP437
/// restores the original bytes, which are then read as GBK. Names that use
/// characters outside CP437, or whose bytes are not valid GBK, are kept.
pub fn decode_entry_name(shown: &str) -> DecodedName {
    let Some(bytes) = encode_cp437(shown) else {
        return DecodedName::Kept(shown.to_string());
    };
    match GBK.decode_without_bom_handling_and_without_replacement(&bytes) {
        Some(decoded) => DecodedName::Recovered(decoded.into_owned()),
        None => {
            log::debug!("name '{shown}' is not GBK after CP437 round trip, keeping it");
            DecodedName::Kept(shown.to_string())
        }
    }
}

/// Recovered name, or the original when recovery does not apply.
pub fn display_name(shown: &str) -> String {
    decode_entry_name(shown).into_string()
}

fn encode_cp437(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|c| {
            if c.is_ascii() {
                Some(c as u8)
            } else {
                CP437_HIGH
                    .iter()
                    .position(|&high| high == c)
                    .map(|pos| 0x80 + pos as u8)
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn decode_cp437(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                CP437_HIGH[(b - 0x80) as usize]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mangle(original: &str) -> String {
        let (bytes, _, had_errors) = GBK.encode(original);
        assert!(!had_errors);
        decode_cp437(&bytes)
    }

    #[test]
    fn test_recovers_gbk_name_read_as_cp437() {
        let shown = mangle("权力的游戏.S01E01.简体&英文.ass");
        assert_ne!(shown, "权力的游戏.S01E01.简体&英文.ass");

        let decoded = decode_entry_name(&shown);
        assert_eq!(
            decoded,
            DecodedName::Recovered("权力的游戏.S01E01.简体&英文.ass".to_string())
        );
    }

    #[test]
    fn test_ascii_name_is_unchanged() {
        let decoded = decode_entry_name("Show.S01E03.chs.srt");
        assert_eq!(decoded.into_string(), "Show.S01E03.chs.srt");
    }

    #[test]
    fn test_correct_unicode_name_is_kept() {
        // Already-correct names contain characters CP437 cannot encode.
        let decoded = decode_entry_name("双语字幕/Show.S01E03.srt");
        assert_eq!(
            decoded,
            DecodedName::Kept("双语字幕/Show.S01E03.srt".to_string())
        );
    }

    #[test]
    fn test_invalid_gbk_bytes_are_kept() {
        // 0x82 alone is a truncated GBK lead byte.
        let decoded = decode_entry_name("caf\u{e9}.srt");
        assert_eq!(decoded, DecodedName::Kept("café.srt".to_string()));
    }

    #[test]
    fn test_cp437_round_trip_covers_high_half() {
        let all: Vec<u8> = (0x80..=0xff).collect();
        let text = decode_cp437(&all);
        assert_eq!(encode_cp437(&text), Some(all));
    }
}
