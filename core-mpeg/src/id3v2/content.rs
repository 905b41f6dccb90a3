//! Tag-frame content decoders.
//!
//! Each decoder receives the frame body (the `size` octets following the
//! 10-octet frame header) and never fails: when the body is too short to hold
//! every field, the fields that could be read are returned and the rest are
//! left as `None`.

use serde::{Deserialize, Serialize};

use super::read_tag_frame;
use super::TagFrame;
use crate::buffer::{locate_terminator, read_str, read_terminated_str, read_u32_be, TextEncoding};

/// Parsed body of an ID3v2 tag frame, selected by the frame id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameContent {
    /// `T***` text-information frame.
    Text {
        encoding: TextEncoding,
        value: String,
    },
    /// `TXXX` user-defined text-information frame.
    UserText {
        encoding: TextEncoding,
        description: Option<String>,
        value: Option<String>,
    },
    /// `W***` URL-link frame. Always ISO-8859-1.
    Url { value: String },
    /// `WXXX` user-defined URL-link frame.
    UserUrl {
        encoding: TextEncoding,
        description: Option<String>,
        value: Option<String>,
    },
    /// `COMM` comment or `USLT` unsynchronised lyrics frame.
    Comment {
        encoding: TextEncoding,
        language: Option<String>,
        description: Option<String>,
        text: Option<String>,
    },
    /// `UFID` unique file identifier.
    UniqueFileId {
        owner_identifier: String,
        identifier: Vec<u8>,
    },
    /// `IPLS` involved people list, read as a flat list of strings.
    InvolvedPeople {
        encoding: TextEncoding,
        values: Vec<String>,
    },
    /// `USER` terms of use.
    TermsOfUse {
        encoding: TextEncoding,
        language: Option<String>,
        text: Option<String>,
    },
    /// `PRIV` private frame.
    Private {
        owner_identifier: String,
        data: Vec<u8>,
    },
    /// `PCNT` play counter. Only 4-octet counters are read.
    PlayCounter { counter: Option<u32> },
    /// `POPM` popularimeter.
    Popularimeter {
        email: String,
        rating: Option<u8>,
        counter: Option<u32>,
    },
    /// `APIC` attached picture.
    Picture {
        encoding: TextEncoding,
        mime_type: Option<String>,
        picture_type: Option<u8>,
        description: Option<String>,
        data: Option<Vec<u8>>,
    },
    /// `CHAP` chapter, with nested sub-frames.
    Chapter {
        element_id: Option<String>,
        start_time: Option<u32>,
        end_time: Option<u32>,
        start_offset: Option<u32>,
        end_offset: Option<u32>,
        frames: Vec<TagFrame>,
    },
    /// Any frame without a dedicated decoder.
    Opaque(Vec<u8>),
}

impl FrameContent {
    /// Decode `body` according to the content schema selected by `id`.
    pub(crate) fn read(id: &str, body: &[u8]) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        let content = match id {
            "TXXX" => read_user_text(body),
            _ if id.starts_with('T') => read_text(body),
            "WXXX" => read_user_url(body),
            _ if id.starts_with('W') => Self::Url {
                value: read_str(TextEncoding::Latin1, body),
            },
            "COMM" | "USLT" => read_comment(body),
            "UFID" => {
                let (owner_identifier, identifier) = read_owned_data(body);
                Self::UniqueFileId {
                    owner_identifier,
                    identifier,
                }
            }
            "PRIV" => {
                let (owner_identifier, data) = read_owned_data(body);
                Self::Private {
                    owner_identifier,
                    data,
                }
            }
            "IPLS" => read_involved_people(body),
            "USER" => read_terms_of_use(body),
            "PCNT" => Self::PlayCounter {
                counter: read_u32_be(body, 0),
            },
            "POPM" => read_popularimeter(body),
            "APIC" => read_picture(body),
            "CHAP" => read_chapter(body),
            _ => Self::Opaque(body.to_vec()),
        };

        Some(content)
    }

    /// Values of a `T***` frame, split at the in-string terminators.
    pub fn text_values(&self) -> Option<Vec<&str>> {
        match self {
            Self::Text { value, .. } => Some(value.split('\0').collect()),
            _ => None,
        }
    }
}

/// Split `data` at the first terminator: `(before, after)`. `None` if absent.
fn split_terminated(encoding: TextEncoding, data: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = locate_terminator(encoding, data)?;
    let head = data.get(..end)?;
    let tail = data.get(end + encoding.terminator_len()..).unwrap_or(&[]);
    Some((head, tail))
}

/// The whole body is kept: v2.3 packs several values into one frame
/// separated by terminators. Trailing terminators are dropped.
fn read_text(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    let value = read_str(encoding, &body[1..]);
    FrameContent::Text {
        encoding,
        value: value.trim_end_matches('\0').to_string(),
    }
}

fn read_user_text(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    let fields = (body.len() >= 2)
        .then(|| split_terminated(encoding, &body[1..]))
        .flatten();

    FrameContent::UserText {
        encoding,
        description: fields.map(|(description, _)| read_str(encoding, description)),
        value: fields.map(|(_, value)| read_str(encoding, value)),
    }
}

fn read_user_url(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    let fields = (body.len() >= 2)
        .then(|| split_terminated(encoding, &body[1..]))
        .flatten();

    FrameContent::UserUrl {
        encoding,
        description: fields.map(|(description, _)| read_str(encoding, description)),
        value: fields.map(|(_, value)| read_str(TextEncoding::Latin1, value)),
    }
}

fn read_language(body: &[u8]) -> String {
    read_terminated_str(TextEncoding::Latin1, &body[1..4])
}

fn read_comment(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    if body.len() < 5 {
        return FrameContent::Comment {
            encoding,
            language: None,
            description: None,
            text: None,
        };
    }

    let fields = split_terminated(encoding, &body[4..]);
    FrameContent::Comment {
        encoding,
        language: Some(read_language(body)),
        description: fields.map(|(description, _)| read_str(encoding, description)),
        text: fields.map(|(_, text)| read_str(encoding, text)),
    }
}

fn read_terms_of_use(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    if body.len() < 5 {
        return FrameContent::TermsOfUse {
            encoding,
            language: None,
            text: None,
        };
    }

    FrameContent::TermsOfUse {
        encoding,
        language: Some(read_language(body)),
        text: Some(read_str(encoding, &body[4..])),
    }
}

/// Owner identifier (ISO-8859-1, terminated) followed by raw data.
fn read_owned_data(body: &[u8]) -> (String, Vec<u8>) {
    match split_terminated(TextEncoding::Latin1, body) {
        Some((owner, data)) => (read_str(TextEncoding::Latin1, owner), data.to_vec()),
        None => (read_str(TextEncoding::Latin1, body), Vec::new()),
    }
}

fn read_involved_people(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    let mut values = Vec::new();
    let mut rest = &body[1..];

    while !rest.is_empty() {
        match split_terminated(encoding, rest) {
            Some((value, tail)) => {
                values.push(read_str(encoding, value));
                rest = tail;
            }
            None => {
                values.push(read_str(encoding, rest));
                break;
            }
        }
    }

    FrameContent::InvolvedPeople { encoding, values }
}

fn read_popularimeter(body: &[u8]) -> FrameContent {
    let email_end = locate_terminator(TextEncoding::Latin1, body).unwrap_or(body.len());
    let email = read_str(TextEncoding::Latin1, &body[..email_end]);

    if body.len() < 6 {
        return FrameContent::Popularimeter {
            email,
            rating: None,
            counter: None,
        };
    }

    FrameContent::Popularimeter {
        email,
        rating: body.get(email_end + 1).copied(),
        counter: read_u32_be(body, email_end + 2),
    }
}

fn read_picture(body: &[u8]) -> FrameContent {
    let encoding = TextEncoding::from_octet(body[0]);
    let mut mime_type = None;
    let mut picture_type = None;
    let mut description = None;
    let mut data = None;

    if body.len() >= 4 {
        if let Some((mime, rest)) = split_terminated(TextEncoding::Latin1, &body[1..]) {
            mime_type = Some(read_str(TextEncoding::Latin1, mime));

            if let Some((&kind, rest)) = rest.split_first() {
                picture_type = Some(kind);

                if let Some((text, picture)) = split_terminated(encoding, rest) {
                    description = Some(read_str(encoding, text));
                    data = Some(picture.to_vec());
                }
            }
        }
    }

    FrameContent::Picture {
        encoding,
        mime_type,
        picture_type,
        description,
        data,
    }
}

fn read_chapter(body: &[u8]) -> FrameContent {
    let Some(id_end) = locate_terminator(TextEncoding::Latin1, body) else {
        return FrameContent::Chapter {
            element_id: None,
            start_time: None,
            end_time: None,
            start_offset: None,
            end_offset: None,
            frames: Vec::new(),
        };
    };

    let times = id_end + 1;
    let mut frames = Vec::new();
    let mut offset = times + 16;

    // Sub-frames are read from the chapter body only, so each level of
    // nesting works on a strictly smaller slice.
    while offset < body.len() {
        if read_u32_be(body, offset).map_or(true, |id| id == 0) {
            break;
        }
        let Some(frame) = read_tag_frame(body, offset) else {
            break;
        };
        offset += frame.total_length();
        frames.push(frame);
    }

    FrameContent::Chapter {
        element_id: Some(read_str(TextEncoding::Latin1, &body[..id_end])),
        start_time: read_u32_be(body, times),
        end_time: read_u32_be(body, times + 4),
        start_offset: read_u32_be(body, times + 8),
        end_offset: read_u32_be(body, times + 12),
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latin1(s: &str) -> Vec<u8> {
        s.bytes().collect()
    }

    #[test]
    fn test_text_frame() {
        let mut body = vec![0];
        body.extend(latin1("Artist\0"));
        assert_eq!(
            FrameContent::read("TPE1", &body),
            Some(FrameContent::Text {
                encoding: TextEncoding::Latin1,
                value: "Artist".into(),
            })
        );
    }

    #[test]
    fn test_multi_value_text_frame() {
        let mut body = vec![0];
        body.extend(latin1("Rock\0Pop\0"));
        let content = FrameContent::read("TCON", &body).unwrap();

        assert_eq!(
            content,
            FrameContent::Text {
                encoding: TextEncoding::Latin1,
                value: "Rock\0Pop".into(),
            }
        );
        assert_eq!(content.text_values(), Some(vec!["Rock", "Pop"]));

        let ucs2 = [1, 0xFF, 0xFE, b'A', 0, 0, 0, b'B', 0, 0, 0];
        let content = FrameContent::read("TPE1", &ucs2).unwrap();
        assert_eq!(content.text_values(), Some(vec!["A", "B"]));
        assert_eq!(FrameContent::Opaque(vec![1]).text_values(), None);
    }

    #[test]
    fn test_ucs2_text_frame() {
        let body = [1, 0xFF, 0xFE, b'h', 0, b'i', 0];
        assert_eq!(
            FrameContent::read("TIT2", &body),
            Some(FrameContent::Text {
                encoding: TextEncoding::Ucs2,
                value: "hi".into(),
            })
        );
    }

    #[test]
    fn test_user_text_frame() {
        let mut body = vec![0];
        body.extend(latin1("key\0value"));
        assert_eq!(
            FrameContent::read("TXXX", &body),
            Some(FrameContent::UserText {
                encoding: TextEncoding::Latin1,
                description: Some("key".into()),
                value: Some("value".into()),
            })
        );
    }

    #[test]
    fn test_user_text_partial() {
        assert_eq!(
            FrameContent::read("TXXX", &[0]),
            Some(FrameContent::UserText {
                encoding: TextEncoding::Latin1,
                description: None,
                value: None,
            })
        );

        // No terminator between description and value
        let mut body = vec![0];
        body.extend(latin1("novalue"));
        let content = FrameContent::read("TXXX", &body).unwrap();
        assert!(matches!(content, FrameContent::UserText { description: None, .. }));
    }

    #[test]
    fn test_url_frames() {
        assert_eq!(
            FrameContent::read("WOAR", b"http://a.example"),
            Some(FrameContent::Url {
                value: "http://a.example".into()
            })
        );

        let mut body = vec![1, b'd', 0, 0, 0];
        body.extend(latin1("http://b.example"));
        assert_eq!(
            FrameContent::read("WXXX", &body),
            Some(FrameContent::UserUrl {
                encoding: TextEncoding::Ucs2,
                description: Some("d".into()),
                value: Some("http://b.example".into()),
            })
        );
    }

    #[test]
    fn test_comment_frame() {
        let mut body = vec![0];
        body.extend(latin1("engshort\0long text"));
        let expected = FrameContent::Comment {
            encoding: TextEncoding::Latin1,
            language: Some("eng".into()),
            description: Some("short".into()),
            text: Some("long text".into()),
        };
        assert_eq!(FrameContent::read("COMM", &body), Some(expected.clone()));
        assert_eq!(FrameContent::read("USLT", &body), Some(expected));
    }

    #[test]
    fn test_comment_too_short() {
        assert_eq!(
            FrameContent::read("COMM", &[0, b'e', b'n', b'g']),
            Some(FrameContent::Comment {
                encoding: TextEncoding::Latin1,
                language: None,
                description: None,
                text: None,
            })
        );
    }

    #[test]
    fn test_owner_identified_frames() {
        let mut body = latin1("owner\0");
        body.extend([1, 2, 3]);

        assert_eq!(
            FrameContent::read("UFID", &body),
            Some(FrameContent::UniqueFileId {
                owner_identifier: "owner".into(),
                identifier: vec![1, 2, 3],
            })
        );
        assert_eq!(
            FrameContent::read("PRIV", &body),
            Some(FrameContent::Private {
                owner_identifier: "owner".into(),
                data: vec![1, 2, 3],
            })
        );
    }

    #[test]
    fn test_involved_people() {
        let mut body = vec![0];
        body.extend(latin1("producer\0Jane\0mixing\0Joe"));
        assert_eq!(
            FrameContent::read("IPLS", &body),
            Some(FrameContent::InvolvedPeople {
                encoding: TextEncoding::Latin1,
                values: vec![
                    "producer".into(),
                    "Jane".into(),
                    "mixing".into(),
                    "Joe".into()
                ],
            })
        );
    }

    #[test]
    fn test_terms_of_use() {
        let mut body = vec![0];
        body.extend(latin1("engAll rights"));
        assert_eq!(
            FrameContent::read("USER", &body),
            Some(FrameContent::TermsOfUse {
                encoding: TextEncoding::Latin1,
                language: Some("eng".into()),
                text: Some("All rights".into()),
            })
        );
    }

    #[test]
    fn test_play_counter() {
        assert_eq!(
            FrameContent::read("PCNT", &[0, 0, 1, 0]),
            Some(FrameContent::PlayCounter { counter: Some(256) })
        );
        assert_eq!(
            FrameContent::read("PCNT", &[0, 1]),
            Some(FrameContent::PlayCounter { counter: None })
        );
    }

    #[test]
    fn test_popularimeter() {
        let mut body = latin1("a@b\0");
        body.extend([200, 0, 0, 0, 7]);
        assert_eq!(
            FrameContent::read("POPM", &body),
            Some(FrameContent::Popularimeter {
                email: "a@b".into(),
                rating: Some(200),
                counter: Some(7),
            })
        );

        assert_eq!(
            FrameContent::read("POPM", &latin1("x\0")),
            Some(FrameContent::Popularimeter {
                email: "x".into(),
                rating: None,
                counter: None,
            })
        );
    }

    #[test]
    fn test_picture() {
        let mut body = vec![0];
        body.extend(latin1("image/png\0"));
        body.push(3);
        body.extend(latin1("cover\0"));
        body.extend([0x89, b'P', b'N', b'G']);

        assert_eq!(
            FrameContent::read("APIC", &body),
            Some(FrameContent::Picture {
                encoding: TextEncoding::Latin1,
                mime_type: Some("image/png".into()),
                picture_type: Some(3),
                description: Some("cover".into()),
                data: Some(vec![0x89, b'P', b'N', b'G']),
            })
        );
    }

    #[test]
    fn test_picture_partial() {
        let mut body = vec![0];
        body.extend(latin1("image/jpeg"));
        let content = FrameContent::read("APIC", &body).unwrap();
        assert!(matches!(
            content,
            FrameContent::Picture {
                mime_type: None,
                data: None,
                ..
            }
        ));
    }

    #[test]
    fn test_chapter_with_sub_frames() {
        let mut title = latin1("TIT2");
        title.extend(5u32.to_be_bytes());
        title.extend([0, 0]);
        title.push(0);
        title.extend(latin1("Intr"));

        let mut body = latin1("ch1\0");
        body.extend(0u32.to_be_bytes());
        body.extend(5000u32.to_be_bytes());
        body.extend(u32::MAX.to_be_bytes());
        body.extend(u32::MAX.to_be_bytes());
        body.extend(&title);

        let Some(FrameContent::Chapter {
            element_id,
            start_time,
            end_time,
            start_offset,
            frames,
            ..
        }) = FrameContent::read("CHAP", &body)
        else {
            panic!("expected chapter content");
        };

        assert_eq!(element_id.as_deref(), Some("ch1"));
        assert_eq!(start_time, Some(0));
        assert_eq!(end_time, Some(5000));
        assert_eq!(start_offset, Some(u32::MAX));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id, "TIT2");
        assert_eq!(
            frames[0].content,
            Some(FrameContent::Text {
                encoding: TextEncoding::Latin1,
                value: "Intr".into(),
            })
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            FrameContent::read("ZZZZ", &[1, 2]),
            Some(FrameContent::Opaque(vec![1, 2]))
        );
        assert_eq!(FrameContent::read("TIT2", &[]), None);
    }
}
