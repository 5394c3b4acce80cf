use super::{Backend, BackendError, BackendId, load_plaintext};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::path::Path;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `/Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Last-resort rebuild: keeps the pages, drops everything else.
///
/// Pages are re-hung in order under a fresh flat page tree and catalog, with
/// inherited attributes copied down so nothing visible changes. Streams are
/// written as found. This is the safety net of the chain, so it only needs
/// the file to parse, not to be well-behaved.
#[derive(Default)]
pub struct PageRewrite;

impl Backend for PageRewrite {
    fn id(&self) -> BackendId {
        BackendId::Rewrite
    }

    fn name(&self) -> &str {
        "page-rewrite"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn attempt(&self, input: &Path, output: &Path) -> Result<(), BackendError> {
        let mut doc = load_plaintext(input)?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(BackendError::NoPages);
        }

        let tree_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());
        for &page in &pages {
            let inherited = inherited_attributes(&doc, page);
            let dict = doc.get_object_mut(page).and_then(Object::as_dict_mut)?;
            for (key, value) in inherited {
                dict.set(key, value);
            }
            dict.set("Parent", Object::Reference(tree_id));
            kids.push(Object::Reference(page));
        }

        doc.objects.insert(
            tree_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(tree_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc.prune_objects();
        doc.renumber_objects();
        doc.save(output)?;
        Ok(())
    }
}

/// Attributes missing on the page itself but set on an ancestor; nearest
/// ancestor wins.
fn inherited_attributes(doc: &Document, page: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
    let Ok(page_dict) = doc.get_dictionary(page) else {
        return found;
    };

    let mut parent = parent_of(page_dict);
    let mut depth = 0;
    while let Some(id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        for key in INHERITABLE {
            if page_dict.has(key) || found.iter().any(|(k, _)| k.as_slice() == key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key.to_vec(), value.clone()));
            }
        }
        parent = parent_of(node);
    }
    found
}

fn parent_of(dict: &Dictionary) -> Option<ObjectId> {
    dict.get(b"Parent").and_then(Object::as_reference).ok()
}
