use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use itertools::Itertools;

use crate::{
    error::Error,
    types::{Basket, Inventory, ItemId, ReverseLookup},
};

/// Separator between members of one basket in the flat store.
pub const DELIMITER: char = ';';

const APPROX_NUM_UNIQUE_AUTHORS: usize = 1024; // arbitrary
const NUM_TOP_AUTHORS_LOGGED: usize = 5;

/// Ordered collection of baskets, one per publication.
///
/// Author names are interned into dense ids on the way in. Identical baskets
/// are kept as separate entries.
#[derive(Debug, Clone)]
pub struct BasketStore {
    baskets: Vec<Basket>,
    inventory: Inventory,
    reverse_lookup: ReverseLookup,
}

impl Default for BasketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BasketStore {
    pub fn new() -> Self {
        Self {
            baskets: Vec::new(),
            inventory: Vec::with_capacity(APPROX_NUM_UNIQUE_AUTHORS),
            reverse_lookup: ReverseLookup::with_capacity(APPROX_NUM_UNIQUE_AUTHORS),
        }
    }

    /// Appends a basket. Members are interned exactly as given, empty members
    /// dropped and duplicates collapsed. Returns `false` and stores nothing if
    /// no member is left.
    pub fn push<I, S>(&mut self, authors: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut basket: Basket = Vec::new();
        for author in authors {
            let author = author.as_ref();
            if author.is_empty() {
                continue;
            }
            basket.push(self.intern(author));
        }

        if basket.is_empty() {
            return false;
        }

        basket.sort_unstable();
        basket.dedup();
        self.baskets.push(basket);
        true
    }

    fn intern(&mut self, author: &str) -> ItemId {
        if let Some(&item_id) = self.reverse_lookup.get(author) {
            return item_id;
        }
        let item_id = self.inventory.len();
        self.inventory.push(author.to_owned());
        self.reverse_lookup.insert(author.to_owned(), item_id);
        item_id
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }

    pub fn baskets(&self) -> &[Basket] {
        &self.baskets
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn name_of(&self, item_id: ItemId) -> Option<&str> {
        self.inventory.get(item_id).map(String::as_str)
    }

    pub fn id_of(&self, author: &str) -> Option<ItemId> {
        self.reverse_lookup.get(author).copied()
    }

    /// Member names of an itemset, sorted by name. Unknown ids are skipped.
    pub fn names(&self, itemset: &[ItemId]) -> Vec<String> {
        itemset
            .iter()
            .filter_map(|&item_id| self.name_of(item_id))
            .map(str::to_owned)
            .sorted()
            .collect()
    }

    pub fn largest_basket(&self) -> usize {
        self.baskets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The `n` authors appearing in the most baskets, ties broken by name.
    pub fn top_authors(&self, n: usize) -> Vec<(&str, u32)> {
        let mut counts = vec![0_u32; self.inventory.len()];
        for basket in &self.baskets {
            for &item_id in basket {
                counts[item_id] += 1;
            }
        }
        self.inventory
            .iter()
            .map(String::as_str)
            .zip(counts)
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .collect()
    }

    pub(crate) fn log_summary(&self) {
        ftlog::debug!(
            "{} baskets loaded, top authors: {:?}",
            self.len(),
            self.top_authors(NUM_TOP_AUTHORS_LOGGED)
        );
    }

    /// Splits one line of the flat store into its members.
    pub fn parse_line(line: &str) -> Result<Vec<&str>, Error> {
        let members: Vec<&str> = line
            .trim_end_matches(['\n', '\r'])
            .split(DELIMITER)
            .filter(|member| !member.is_empty())
            .collect();

        if members.is_empty() {
            return Err(Error::malformed_basket(format!("no author in line {line:?}")));
        }
        Ok(members)
    }

    /// Loads one basket per line. Malformed lines are logged and skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut store = Self::new();
        let mut skipped = 0_usize;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            match Self::parse_line(&line) {
                Ok(members) => {
                    store.push(members);
                }
                Err(err) => {
                    ftlog::warn!("Skipping line {}: {}", line_number + 1, err);
                    skipped += 1;
                }
            }
        }

        ftlog::info!(
            "Loaded {} baskets over {} authors ({} skipped)",
            store.len(),
            store.inventory.len(),
            skipped
        );
        store.log_summary();
        Ok(store)
    }

    pub fn read_flat<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        ftlog::info!("Reading baskets from {}", path.as_ref().display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Writes one line per basket, members joined by [`DELIMITER`].
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        for basket in &self.baskets {
            let line = basket
                .iter()
                .filter_map(|&item_id| self.name_of(item_id))
                .join(&DELIMITER.to_string());
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_flat<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        ftlog::info!(
            "Writing {} baskets to {}",
            self.len(),
            path.as_ref().display()
        );
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;
    use tempdir::TempDir;
    use test_case::test_case;

    fn name_sets(store: &BasketStore) -> Vec<HashSet<String>> {
        store
            .baskets()
            .iter()
            .map(|basket| store.names(basket).into_iter().collect())
            .collect()
    }

    #[test]
    fn push_interns_and_sorts() {
        let mut store = BasketStore::new();
        assert!(store.push(["Bob", "Alice"]));
        assert!(store.push(["Alice", "Carol"]));

        assert_eq!(store.len(), 2);
        assert_eq!(store.inventory().len(), 3);
        let alice = store.id_of("Alice").unwrap();
        let bob = store.id_of("Bob").unwrap();
        assert_eq!(store.baskets()[0], {
            let mut v = vec![alice, bob];
            v.sort_unstable();
            v
        });
        assert_eq!(store.name_of(alice), Some("Alice"));
    }

    #[test]
    fn push_collapses_repeated_members() {
        let mut store = BasketStore::new();
        assert!(store.push(["Alice", "Alice", "Bob"]));
        assert_eq!(store.baskets()[0].len(), 2);
    }

    #[test]
    fn names_are_not_normalised() {
        let mut store = BasketStore::new();
        assert!(store.push(["Alice", " Alice", "Alice "]));

        assert_eq!(store.baskets()[0].len(), 3);
        assert_eq!(store.inventory().len(), 3);
        assert_ne!(store.id_of("Alice"), store.id_of(" Alice"));
        assert_ne!(store.id_of("Alice"), store.id_of("Alice "));
    }

    #[test]
    fn reader_keeps_padded_names_apart() {
        let store = BasketStore::from_reader("Alice;B\n Alice ;C\n".as_bytes()).unwrap();

        assert_eq!(store.inventory().len(), 4);
        assert!(store.id_of(" Alice ").is_some());
        assert_ne!(store.id_of("Alice"), store.id_of(" Alice "));
    }

    #[test]
    fn push_rejects_empty_baskets() {
        let mut store = BasketStore::new();
        assert!(!store.push(Vec::<&str>::new()));
        assert!(!store.push(["", ""]));
        assert!(store.is_empty());
        assert_eq!(store.largest_basket(), 0);
    }

    #[test]
    fn top_authors_by_basket_count() {
        let mut store = BasketStore::new();
        store.push(["Cy", "Ann"]);
        store.push(["Bo", "Cy"]);
        store.push(["Ann", "Bo", "Cy"]);
        store.push(["Di"]);

        assert_eq!(store.top_authors(3), vec![("Cy", 3), ("Ann", 2), ("Bo", 2)]);
        assert_eq!(store.top_authors(10).len(), 4);
        assert!(BasketStore::new().top_authors(5).is_empty());
    }

    #[test]
    fn identical_baskets_are_kept() {
        let mut store = BasketStore::new();
        store.push(["A", "B"]);
        store.push(["B", "A"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.baskets()[0], store.baskets()[1]);
    }

    #[test_case("A;B;C", &["A", "B", "C"] ; "plain")]
    #[test_case("A;B\r\n", &["A", "B"] ; "line ending")]
    #[test_case("A;;B;", &["A", "B"] ; "blank members")]
    #[test_case("Zoë Ng", &["Zoë Ng"] ; "single author")]
    #[test_case(" Ann ; Bo", &[" Ann ", " Bo"] ; "padding kept")]
    fn parse_line_splits_on_delimiter(line: &str, expected: &[&str]) {
        assert_eq!(BasketStore::parse_line(line).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case(";;" ; "only delimiters")]
    fn parse_line_rejects_empty(line: &str) {
        let err = BasketStore::parse_line(line).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedBasket);
    }

    #[test]
    fn reader_skips_malformed_lines() {
        let input = "A;B\n\nB;C;D\n;\nA\n";
        let store = BasketStore::from_reader(input.as_bytes()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.largest_basket(), 3);
    }

    #[test]
    fn flat_round_trip() {
        let mut store = BasketStore::new();
        store.push(["Frank Neven", "Stijn Vansummeren"]);
        store.push(["Yu Zhang"]);
        store.push(["Dilay Çelebi", "Frank Neven", "Brecht Vandevoort"]);
        store.push(["Stijn Vansummeren", "Frank Neven"]);

        let tmp = TempDir::new("baskets_round_trip").unwrap();
        let path = tmp.path().join("authors.txt");
        store.write_flat(&path).unwrap();
        let reloaded = BasketStore::read_flat(&path).unwrap();

        assert_eq!(name_sets(&store), name_sets(&reloaded));
    }

    #[test]
    fn write_joins_with_delimiter() {
        let mut store = BasketStore::new();
        store.push(["A", "B"]);
        store.push(["C"]);
        let mut out = Vec::new();
        store.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A;B\nC\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new("baskets_missing").unwrap();
        let err = BasketStore::read_flat(tmp.path().join("nope.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
