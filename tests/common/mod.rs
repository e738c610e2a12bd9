use xstore::dom::{DocumentId, DocumentRegistry, Gid, LevelTable, Match, NodeRef, NodeSet};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three books under one root, each with a title, an author and a year.
///
/// ```text
/// 1 library
/// ├── 2 book   5 title  6 author  7 year
/// ├── 3 book   8 title  9 author 10 year
/// └── 4 book  11 title 12 author 13 year
/// ```
pub struct Library {
    pub store: DocumentRegistry,
    pub doc: DocumentId,
}

pub const BOOKS: [Gid; 3] = [2, 3, 4];
pub const TITLES: [Gid; 3] = [5, 8, 11];
pub const YEARS: [Gid; 3] = [7, 10, 13];

impl Library {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let doc = DocumentId::new(1);
        let mut store = DocumentRegistry::new();
        store.insert_document(doc, LevelTable::from_orders(&[1, 3, 3])?);

        let rows = [
            ("Dune", "Herbert", "1965"),
            ("Hyperion", "Simmons", "unknown"),
            ("Anathem", "Stephenson", "2008"),
        ];
        for (i, (title, author, year)) in rows.into_iter().enumerate() {
            store.set_value(doc, TITLES[i], title);
            store.set_value(doc, TITLES[i] + 1, author);
            store.set_value(doc, YEARS[i], year);
        }
        Ok(Self { store, doc })
    }

    pub fn nodes(&self, gids: &[Gid]) -> NodeSet {
        gids.iter().map(|&gid| NodeRef::new(self.doc, gid)).collect()
    }

    /// Year elements as an index lookup would return them, each annotated
    /// with the matched term.
    pub fn year_index(&self) -> NodeSet {
        YEARS
            .iter()
            .map(|&gid| NodeRef::new(self.doc, gid).with_match(Match::new("year", 0, 4)))
            .collect()
    }
}

pub fn gids(nodes: &NodeSet) -> Vec<Gid> {
    nodes.iter().map(|node| node.gid).collect()
}
