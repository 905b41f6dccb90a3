//! Friendly names for ID3v2.3 frame identifiers.

// Sorted by id for binary search.
static FRAME_NAMES: &[(&str, &str)] = &[
    ("AENC", "Audio encryption"),
    ("APIC", "Attached picture"),
    ("CHAP", "Chapter"),
    ("COMM", "Comments"),
    ("COMR", "Commercial frame"),
    ("ENCR", "Encryption method registration"),
    ("EQUA", "Equalization"),
    ("ETCO", "Event timing codes"),
    ("GEOB", "General encapsulated object"),
    ("GRID", "Group identification registration"),
    ("IPLS", "Involved people list"),
    ("LINK", "Linked information"),
    ("MCDI", "Music CD identifier"),
    ("MLLT", "MPEG location lookup table"),
    ("OWNE", "Ownership frame"),
    ("PCNT", "Play counter"),
    ("POPM", "Popularimeter"),
    ("POSS", "Position synchronisation frame"),
    ("PRIV", "Private frame"),
    ("RBUF", "Recommended buffer size"),
    ("RVAD", "Relative volume adjustment"),
    ("RVRB", "Reverb"),
    ("SYLT", "Synchronized lyric/text"),
    ("SYTC", "Synchronized tempo codes"),
    ("TALB", "Album/Movie/Show title"),
    ("TBPM", "BPM (beats per minute)"),
    ("TCOM", "Composer"),
    ("TCON", "Content type"),
    ("TCOP", "Copyright message"),
    ("TDAT", "Date"),
    ("TDLY", "Playlist delay"),
    ("TENC", "Encoded by"),
    ("TEXT", "Lyricist/Text writer"),
    ("TFLT", "File type"),
    ("TIME", "Time"),
    ("TIT1", "Content group description"),
    ("TIT2", "Title/songname/content description"),
    ("TIT3", "Subtitle/Description refinement"),
    ("TKEY", "Initial key"),
    ("TLAN", "Language(s)"),
    ("TLEN", "Length"),
    ("TMED", "Media type"),
    ("TOAL", "Original album/movie/show title"),
    ("TOFN", "Original filename"),
    ("TOLY", "Original lyricist(s)/text writer(s)"),
    ("TOPE", "Original artist(s)/performer(s)"),
    ("TORY", "Original release year"),
    ("TOWN", "File owner/licensee"),
    ("TPE1", "Lead performer(s)/Soloist(s)"),
    ("TPE2", "Band/orchestra/accompaniment"),
    ("TPE3", "Conductor/performer refinement"),
    ("TPE4", "Interpreted, remixed, or otherwise modified by"),
    ("TPOS", "Part of a set"),
    ("TPUB", "Publisher"),
    ("TRCK", "Track number/Position in set"),
    ("TRDA", "Recording dates"),
    ("TRSN", "Internet radio station name"),
    ("TRSO", "Internet radio station owner"),
    ("TSIZ", "Size"),
    ("TSRC", "ISRC (international standard recording code)"),
    ("TSSE", "Software/Hardware and settings used for encoding"),
    ("TXXX", "User defined text information frame"),
    ("TYER", "Year"),
    ("UFID", "Unique file identifier"),
    ("USER", "Terms of use"),
    ("USLT", "Unsychronized lyric/text transcription"),
    ("WCOM", "Commercial information"),
    ("WCOP", "Copyright/Legal information"),
    ("WOAF", "Official audio file webpage"),
    ("WOAR", "Official artist/performer webpage"),
    ("WOAS", "Official audio source webpage"),
    ("WORS", "Official internet radio station homepage"),
    ("WPAY", "Payment"),
    ("WPUB", "Publishers official webpage"),
    ("WXXX", "User defined URL link frame"),
];

/// Look up the human-readable description of a frame id.
pub fn frame_name(id: &str) -> Option<&'static str> {
    FRAME_NAMES
        .binary_search_by_key(&id, |&(key, _)| key)
        .ok()
        .map(|index| FRAME_NAMES[index].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(FRAME_NAMES.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(frame_name("TIT2"), Some("Title/songname/content description"));
        assert_eq!(frame_name("CHAP"), Some("Chapter"));
        assert_eq!(frame_name("PRIV"), Some("Private frame"));
        assert_eq!(frame_name("ZZZZ"), None);
    }
}
