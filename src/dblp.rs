//! Streaming reader for DBLP-style bibliographic XML.
//!
//! Every record whose tag is in [`RECORD_TAGS`] becomes one basket holding the
//! text of its [`TRIGGER_TAGS`] children.

use std::{fs::File, io::BufRead, io::BufReader, path::Path};

use quick_xml::{events::Event, Reader};

use crate::{baskets::BasketStore, error::Error};

pub const RECORD_TAGS: [&str; 7] = [
    "article",
    "incollection",
    "book",
    "proceedings",
    "inproceedings",
    "phdthesis",
    "mastersthesis",
];

// "editor" could be added here to count editorships as well.
pub const TRIGGER_TAGS: [&str; 1] = ["author"];

const PREDEFINED_ENTITIES: [(&str, &str); 5] = [
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
];

/// ISO Latin-1 entities (U+00A0 to U+00FF), as declared by the DBLP DTD.
const LATIN1_ENTITIES: [(&str, &str); 96] = [
    ("nbsp", "\u{a0}"),
    ("iexcl", "¡"),
    ("cent", "¢"),
    ("pound", "£"),
    ("curren", "¤"),
    ("yen", "¥"),
    ("brvbar", "¦"),
    ("sect", "§"),
    ("uml", "¨"),
    ("copy", "©"),
    ("ordf", "ª"),
    ("laquo", "«"),
    ("not", "¬"),
    ("shy", "\u{ad}"),
    ("reg", "®"),
    ("macr", "¯"),
    ("deg", "°"),
    ("plusmn", "±"),
    ("sup2", "²"),
    ("sup3", "³"),
    ("acute", "´"),
    ("micro", "µ"),
    ("para", "¶"),
    ("middot", "·"),
    ("cedil", "¸"),
    ("sup1", "¹"),
    ("ordm", "º"),
    ("raquo", "»"),
    ("frac14", "¼"),
    ("frac12", "½"),
    ("frac34", "¾"),
    ("iquest", "¿"),
    ("Agrave", "À"),
    ("Aacute", "Á"),
    ("Acirc", "Â"),
    ("Atilde", "Ã"),
    ("Auml", "Ä"),
    ("Aring", "Å"),
    ("AElig", "Æ"),
    ("Ccedil", "Ç"),
    ("Egrave", "È"),
    ("Eacute", "É"),
    ("Ecirc", "Ê"),
    ("Euml", "Ë"),
    ("Igrave", "Ì"),
    ("Iacute", "Í"),
    ("Icirc", "Î"),
    ("Iuml", "Ï"),
    ("ETH", "Ð"),
    ("Ntilde", "Ñ"),
    ("Ograve", "Ò"),
    ("Oacute", "Ó"),
    ("Ocirc", "Ô"),
    ("Otilde", "Õ"),
    ("Ouml", "Ö"),
    ("times", "×"),
    ("Oslash", "Ø"),
    ("Ugrave", "Ù"),
    ("Uacute", "Ú"),
    ("Ucirc", "Û"),
    ("Uuml", "Ü"),
    ("Yacute", "Ý"),
    ("THORN", "Þ"),
    ("szlig", "ß"),
    ("agrave", "à"),
    ("aacute", "á"),
    ("acirc", "â"),
    ("atilde", "ã"),
    ("auml", "ä"),
    ("aring", "å"),
    ("aelig", "æ"),
    ("ccedil", "ç"),
    ("egrave", "è"),
    ("eacute", "é"),
    ("ecirc", "ê"),
    ("euml", "ë"),
    ("igrave", "ì"),
    ("iacute", "í"),
    ("icirc", "î"),
    ("iuml", "ï"),
    ("eth", "ð"),
    ("ntilde", "ñ"),
    ("ograve", "ò"),
    ("oacute", "ó"),
    ("ocirc", "ô"),
    ("otilde", "õ"),
    ("ouml", "ö"),
    ("divide", "÷"),
    ("oslash", "ø"),
    ("ugrave", "ù"),
    ("uacute", "ú"),
    ("ucirc", "û"),
    ("uuml", "ü"),
    ("yacute", "ý"),
    ("thorn", "þ"),
    ("yuml", "ÿ"),
];

fn resolve_entity(name: &str) -> Option<&'static str> {
    PREDEFINED_ENTITIES
        .iter()
        .chain(LATIN1_ENTITIES.iter())
        .find(|(entity, _)| *entity == name)
        .map(|(_, value)| *value)
}

/// Appends the replacement of the reference `&name;` to `out`. Returns `false`
/// and appends nothing if the reference is unknown.
fn push_reference(out: &mut String, name: &str) -> bool {
    if let Some(code) = name.strip_prefix('#') {
        let code = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return match code.and_then(char::from_u32) {
            Some(c) => {
                out.push(c);
                true
            }
            None => false,
        };
    }
    match resolve_entity(name) {
        Some(value) => {
            out.push_str(value);
            true
        }
        None => false,
    }
}

/// Resolves entity and character references in raw author text. Each
/// reference that cannot be resolved is kept as written.
fn unescape_author(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[1..].find(';') {
            Some(end) if push_reference(&mut out, &tail[1..end + 1]) => {
                rest = &tail[end + 2..];
            }
            _ => {
                ftlog::debug!("Keeping unresolved reference in {:?}", raw);
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_record(tag: &[u8]) -> bool {
    RECORD_TAGS.iter().any(|record| record.as_bytes() == tag)
}

fn is_trigger(tag: &[u8]) -> bool {
    TRIGGER_TAGS.iter().any(|trigger| trigger.as_bytes() == tag)
}

impl BasketStore {
    /// Builds a store from a bibliographic XML stream.
    pub fn from_dblp<R: BufRead>(source: R) -> Result<Self, Error> {
        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();

        let mut store = Self::new();
        let mut authors_of_basket: Vec<String> = Vec::new();
        let mut author = String::new();
        let mut reading_author = false;
        let mut num_records = 0_usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) => {
                    let name = element.name();
                    if is_trigger(name.as_ref()) {
                        reading_author = true;
                        author.clear();
                    } else if is_record(name.as_ref()) {
                        authors_of_basket.clear();
                    }
                }
                Event::Text(text) if reading_author => {
                    let raw = reader.decoder().decode(&text)?;
                    author.push_str(&unescape_author(&raw));
                }
                Event::CData(data) if reading_author => {
                    author.push_str(&String::from_utf8_lossy(&data));
                }
                Event::End(element) => {
                    let name = element.name();
                    if is_trigger(name.as_ref()) {
                        reading_author = false;
                        if !author.is_empty() {
                            authors_of_basket.push(std::mem::take(&mut author));
                        }
                        author.clear();
                    } else if is_record(name.as_ref()) {
                        num_records += 1;
                        if !store.push(authors_of_basket.drain(..)) {
                            ftlog::debug!(
                                "Record {} ended without authors near byte {}",
                                num_records,
                                reader.buffer_position()
                            );
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        ftlog::info!(
            "Parsed {} records into {} baskets over {} authors",
            num_records,
            store.len(),
            store.inventory().len()
        );
        store.log_summary();
        Ok(store)
    }

    pub fn read_dblp<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        ftlog::info!("Parsing bibliography {}", path.as_ref().display());
        let file = File::open(path)?;
        Self::from_dblp(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use maplit::hashset;
    use std::collections::HashSet;
    use test_case::test_case;

    fn baskets_as_names(store: &BasketStore) -> Vec<HashSet<String>> {
        store
            .baskets()
            .iter()
            .map(|basket| store.names(basket).into_iter().collect())
            .collect()
    }

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!DOCTYPE dblp SYSTEM "dblp.dtd">
<dblp>
<article key="journals/a/1">
<author>Frank Neven</author>
<author>Stijn Vansummeren</author>
<title>Something</title>
<year>2020</year>
</article>
<www key="homepages/x">
<author>Frank Neven</author>
<title>Home Page</title>
</www>
<inproceedings key="conf/b/2">
<author>Dilay &Ccedil;elebi</author>
<author>Frank Neven</author>
<editor>Yu Zhang</editor>
</inproceedings>
<proceedings key="conf/c">
<editor>Yu Zhang</editor>
<title>Proceedings without authors</title>
</proceedings>
<phdthesis key="phd/d">
<author orcid="0000">Brecht Vandevoort</author>
</phdthesis>
</dblp>
"#;

    #[test]
    fn only_allowed_records_become_baskets() {
        let store = BasketStore::from_dblp(SAMPLE.as_bytes()).unwrap();

        assert_eq!(
            baskets_as_names(&store),
            vec![
                hashset! {"Frank Neven".to_owned(), "Stijn Vansummeren".to_owned()},
                hashset! {"Dilay Çelebi".to_owned(), "Frank Neven".to_owned()},
                hashset! {"Brecht Vandevoort".to_owned()},
            ]
        );
    }

    #[test]
    fn editors_are_not_counted() {
        let store = BasketStore::from_dblp(SAMPLE.as_bytes()).unwrap();
        assert_eq!(store.id_of("Yu Zhang"), None);
    }

    #[test]
    fn unknown_entities_are_kept_verbatim() {
        let xml = "<dblp><book><author>A &foo; B</author></book></dblp>";
        let store = BasketStore::from_dblp(xml.as_bytes()).unwrap();
        assert_eq!(store.names(&store.baskets()[0]), vec!["A &foo; B".to_owned()]);
    }

    #[test]
    fn unknown_entity_does_not_block_its_neighbours() {
        let xml = "<dblp><book><author>A&Ccedil; &amp; &foo;</author></book></dblp>";
        let store = BasketStore::from_dblp(xml.as_bytes()).unwrap();
        assert_eq!(store.names(&store.baskets()[0]), vec!["AÇ & &foo;".to_owned()]);
    }

    #[test_case("Dilay &Ccedil;elebi", "Dilay Çelebi" ; "latin1")]
    #[test_case("&Yacute;ld&yuml;z &THORN;&ograve;r", "Ýldÿz Þòr" ; "rare latin1")]
    #[test_case("&AElig;sa &eth;&ETH;", "Æsa ðÐ" ; "ligature and eth")]
    #[test_case("J&#252;rgen &#xE9;", "Jürgen é" ; "character references")]
    #[test_case("A & B", "A & B" ; "bare ampersand")]
    #[test_case("&bogus &amp;", "&bogus &" ; "unterminated reference")]
    #[test_case("&#xZZ; &nope;", "&#xZZ; &nope;" ; "unresolvable kept")]
    fn references_are_resolved_one_by_one(raw: &str, expected: &str) {
        assert_eq!(unescape_author(raw), expected);
    }

    #[test]
    fn latin1_table_covers_the_whole_block() {
        let values: HashSet<char> = LATIN1_ENTITIES
            .iter()
            .filter_map(|(_, value)| value.chars().next())
            .collect();
        assert_eq!(values.len(), 96);
        assert!((0xA0..=0xFF_u32).all(|code| values.contains(&char::from_u32(code).unwrap())));
    }

    #[test]
    fn predefined_entities_are_resolved() {
        let xml = "<dblp><book><author>Smith &amp; Sons</author></book></dblp>";
        let store = BasketStore::from_dblp(xml.as_bytes()).unwrap();
        assert!(store.id_of("Smith & Sons").is_some());
    }

    #[test]
    fn mismatched_tags_are_fatal() {
        let xml = "<dblp><article><author>A</title></article></dblp>";
        let err = BasketStore::from_dblp(xml.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Xml);
    }
}
