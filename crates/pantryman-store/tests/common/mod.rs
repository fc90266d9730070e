#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const MANIFEST: &str = "version: 1\nitems:\n  - ingredient: Salt\n    quantity: 1.0\n    quantity_type: kg\n    last_updated: 2024-01-02\n";

/// Write `body` at `root/rel`, creating parents
pub fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

/// A small valid dataset: manifest, two ingredient records and one recipe
pub fn seed_dataset(root: &Path) {
    write(root, "pantry.yaml", MANIFEST);
    write(
        root,
        "ingredients/salt.yaml",
        "name: Salt\ncategory: Spices\nkb: null\ntags: [basic]\n",
    );
    write(
        root,
        "ingredients/olive_oil.yaml",
        "name: Olive Oil\ncategory: Oils\ntags: []\n",
    );
    write(root, "recipes/soup.md", "---\nTitle: Soup\n---\nBoil.\n");
}

/// Names of the files directly inside `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
