#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    /// Temporary file holding `content`, removed when dropped
    pub fn create_temp_file(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("rpcgate_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_file(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_file(content, "json")
    }

    /// Write `content` to `dir/name` and return the path
    pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Names of the entries in `dir`, sorted
    pub fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

pub mod fixtures {
    use super::temp_files::write_file;
    use std::path::{Path, PathBuf};

    /// Interface definition used across the integration tests
    pub const SHOP_IDL: &str = r#"
package: shop
services:
  - name: Items
    operations:
      - name: get
        params:
          - { name: id, type: long }
          - { name: verbose, type: bool }
        returns: Item
      - name: list
        params:
          - { name: tags, type: "list<string>" }
          - { name: limit, type: u32 }
      - name: create
        params:
          - { name: name, type: string }
          - { name: price, type: double }
          - { name: trace, type: string }
          - { name: session, type: string }
      - name: remove
        params:
          - { name: id, type: long }
  - name: Health
    operations:
      - name: ping
"#;

    /// Manifest exercising every parameter source
    pub const SHOP_MANIFEST: &str = r#"
definitions:
  - shop.idl.yaml
routes:
  - name: ping
    method: GET
    path: /
    operation: shop.Health.ping
    formats: [application/json, text/plain]
  - name: get_item
    method: GET
    path: /item/{id}
    operation: shop.Items.get
    params:
      - { name: verbose, source: query, key: v, optional: true }
  - name: list_items
    method: GET
    path: /item/list
    operation: shop.Items.list
    params:
      - { name: tags, source: query, optional: true }
      - { name: limit, source: query, optional: true }
  - name: remove_item
    method: DELETE
    path: /item/{id}
    operation: shop.Items.remove
  - name: create_item
    method: POST
    path: /items
    operation: shop.Items.create
    formats: [application/json, application/x-www-form-urlencoded]
    params:
      - { name: name, source: body }
      - { name: price, source: body }
      - { name: trace, source: header, key: X-Trace-Id }
      - { name: session, source: cookie, key: sid, optional: true }
"#;

    /// Write the shop manifest and its interface definition into `dir`
    pub fn write_shop(dir: &Path) -> PathBuf {
        write_file(dir, "shop.idl.yaml", SHOP_IDL);
        write_file(dir, "routes.yaml", SHOP_MANIFEST)
    }
}
