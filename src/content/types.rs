//! Type declaration synthesis.
//!
//! Renders the collection map into the entry map of the declarations
//! template and writes `<cache>/types.d.ts`. The file is regenerated in full
//! on every run.
//!
//! # Template markers
//!
//! | Marker                       | Replaced with                          |
//! |------------------------------|----------------------------------------|
//! | `// @@ENTRY_MAP@@`           | One block per collection and entry     |
//! | `'@@CONTENT_CONFIG_TYPE@@'`  | `typeof import("…")` or `never`        |

use super::{
    entry_types::{EntryTypeRegistry, extname},
    paths::{ContentPaths, relative_path, to_slash},
    store::CollectionMap,
};
use crate::config::ContentConfig;
use anyhow::{Context, Result};
use std::{fs, path::Path};

const ENTRY_MAP_MARKER: &str = "// @@ENTRY_MAP@@";
const CONFIG_TYPE_MARKER: &str = "'@@CONTENT_CONFIG_TYPE@@'";

/// Built-in declarations template.
pub const DEFAULT_TYPES_TEMPLATE: &str = include_str!("../../templates/types.d.ts");

/// Quote a raw name as a JSON string literal, safe to embed in generated code.
pub fn quote(raw: &str) -> String {
    serde_json::Value::from(raw).to_string()
}

/// Render the entry map body, collections and entries in key order.
///
/// `config` is the loaded collection config, if any; collections with a
/// schema get `InferEntrySchema<…>` as their data type, others `any`.
pub fn render_entry_map(map: &CollectionMap, config: Option<&ContentConfig>) -> String {
    let mut out = String::new();

    for (collection, entries) in map.collections() {
        let collection_key = quote(collection);
        let data_type = if config.is_some_and(|c| c.has_schema(collection)) {
            format!("InferEntrySchema<{collection_key}>")
        } else {
            "any".to_owned()
        };

        out.push_str(&format!("{collection_key}: {{\n"));
        for (id, metadata) in entries {
            let entry_key = quote(id);
            let slug = quote(&metadata.slug);
            let render_ext = quote(&extname(Path::new(id)));

            out.push_str(&format!(
                "{entry_key}: {{\n  id: {entry_key},\n  slug: {slug},\n  body: string,\n  \
                 collection: {collection_key},\n  data: {data_type}\n}} & \
                 {{ render(): Render[{render_ext}] }},\n"
            ));
        }
        out.push_str("},\n");
    }

    out
}

/// Import path of the collection config as seen from the cache directory.
///
/// Always relative (`./` or `../` prefixed), `/`-separated and without the
/// config file's extension so the reference does not depend on it.
pub fn config_import_path(cache_dir: &Path, config: &Path) -> String {
    let mut rel = to_slash(&relative_path(cache_dir, config));
    if !rel.starts_with("./") && !rel.starts_with("../") {
        rel = format!("./{rel}");
    }

    let ext = extname(config);
    if !ext.is_empty()
        && let Some(stripped) = rel.strip_suffix(ext.as_str())
    {
        return stripped.to_owned();
    }
    rel
}

/// Substitute both markers in `template`.
///
/// Declaration fragments contributed by entry types are prepended first,
/// each on its own line; later fragments end up above earlier ones.
pub fn fill_template<'a>(
    template: &str,
    fragments: impl IntoIterator<Item = &'a str>,
    entry_map: &str,
    config_type: &str,
) -> String {
    let mut text = template.to_owned();
    for fragment in fragments {
        text = format!("{fragment}\n{text}");
    }

    text.replacen(ENTRY_MAP_MARKER, entry_map, 1)
        .replacen(CONFIG_TYPE_MARKER, config_type, 1)
}

/// Render the complete declarations file.
pub fn render_content_types(
    template: &str,
    paths: &ContentPaths,
    registry: &EntryTypeRegistry,
    map: &CollectionMap,
    config: Option<&ContentConfig>,
) -> String {
    let entry_map = render_entry_map(map, config);
    let config_type = match config {
        Some(_) => format!(
            "typeof import({})",
            quote(&config_import_path(&paths.cache_dir, &paths.config))
        ),
        None => "never".to_owned(),
    };
    let fragments = registry.types().filter_map(|t| t.module_types.as_deref());

    fill_template(template, fragments, &entry_map, &config_type)
}

/// Write the declarations file, creating the cache directory if needed.
pub fn write_content_types(paths: &ContentPaths, text: &str) -> Result<()> {
    fs::create_dir_all(&paths.cache_dir)
        .with_context(|| format!("Failed to create {}", paths.cache_dir.display()))?;

    let file = paths.types_file();
    fs::write(&file, text).with_context(|| format!("Failed to write {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{entry_types::ContentEntryType, store::EntryMetadata};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn paths(root: &Path) -> ContentPaths {
        ContentPaths {
            root: root.to_path_buf(),
            content_dir: root.join("src/content"),
            data_dir: root.join("src/content"),
            cache_dir: root.join(".contentmap"),
            config: root.join("src/content/config.toml"),
            types_template: None,
            virtual_mod_template: None,
        }
    }

    fn config_with_schema(name: &str) -> ContentConfig {
        ContentConfig::from_str(
            &format!("[collections.{name}]\nschema = {{ title = \"string\" }}\n"),
            Path::new("config.toml"),
        )
        .unwrap()
    }

    #[test]
    fn test_render_single_entry() {
        let mut map = CollectionMap::new();
        map.add_collection("blog");
        map.set_entry("blog", "post-1.md", EntryMetadata::new("post-1"));

        let out = render_entry_map(&map, None);
        assert_eq!(
            out,
            "\"blog\": {\n\"post-1.md\": {\n  id: \"post-1.md\",\n  slug: \"post-1\",\n  \
             body: string,\n  collection: \"blog\",\n  data: any\n} & \
             { render(): Render[\".md\"] },\n},\n"
        );
    }

    #[test]
    fn test_render_sorted_regardless_of_insertion() {
        let mut map = CollectionMap::new();
        map.add_collection("docs");
        map.add_collection("blog");
        map.set_entry("blog", "z.md", EntryMetadata::new("z"));
        map.set_entry("blog", "a.md", EntryMetadata::new("a"));

        let out = render_entry_map(&map, None);
        let blog = out.find("\"blog\"").unwrap();
        let docs = out.find("\"docs\"").unwrap();
        let a = out.find("\"a.md\"").unwrap();
        let z = out.find("\"z.md\"").unwrap();
        assert!(blog < docs);
        assert!(a < z);
    }

    #[test]
    fn test_render_schema_type() {
        let mut map = CollectionMap::new();
        map.add_collection("blog");
        map.add_collection("notes");
        map.set_entry("blog", "a.md", EntryMetadata::new("a"));
        map.set_entry("notes", "b.md", EntryMetadata::new("b"));

        let out = render_entry_map(&map, Some(&config_with_schema("blog")));
        assert!(out.contains("data: InferEntrySchema<\"blog\">"));
        assert!(out.contains("collection: \"notes\",\n  data: any"));
    }

    #[test]
    fn test_render_escapes_names() {
        let mut map = CollectionMap::new();
        map.add_collection("we\"ird");
        map.set_entry("we\"ird", "a\\b.md", EntryMetadata::new("x\ny"));

        let out = render_entry_map(&map, None);
        assert!(out.contains(r#""we\"ird": {"#));
        assert!(out.contains(r#"id: "a\\b.md""#));
        assert!(out.contains(r#"slug: "x\ny""#));
    }

    #[test]
    fn test_config_import_path() {
        assert_eq!(
            config_import_path(
                Path::new("/p/.contentmap"),
                Path::new("/p/src/content/config.toml")
            ),
            "../src/content/config"
        );
        assert_eq!(
            config_import_path(Path::new("/p"), Path::new("/p/config.ts")),
            "./config"
        );
        assert_eq!(
            config_import_path(Path::new("/p"), Path::new("/p/content/config")),
            "./content/config"
        );
    }

    #[test]
    fn test_fill_template() {
        let template = "head\n// @@ENTRY_MAP@@\ntype C = '@@CONTENT_CONFIG_TYPE@@';\n";
        let out = fill_template(template, ["first", "second"], "MAP", "never");
        assert_eq!(out, "second\nfirst\nhead\nMAP\ntype C = never;\n");
    }

    #[test]
    fn test_render_content_types_config_reference() {
        let paths = paths(Path::new("/p"));
        let registry = EntryTypeRegistry::default();
        let map = CollectionMap::new();

        let without = render_content_types(DEFAULT_TYPES_TEMPLATE, &paths, &registry, &map, None);
        assert!(without.contains("type ContentConfig = never;"));
        assert!(!without.contains("@@"));

        let config = ContentConfig::default();
        let with =
            render_content_types(DEFAULT_TYPES_TEMPLATE, &paths, &registry, &map, Some(&config));
        assert!(with.contains("typeof import(\"../src/content/config\")"));
    }

    #[test]
    fn test_render_content_types_prepends_module_types() {
        let paths = paths(Path::new("/p"));
        let mut registry = EntryTypeRegistry::default();
        registry.register(ContentEntryType {
            extensions: vec![".mdoc".into()],
            module_types: Some("declare module 'markdoc' {}".into()),
        });

        let out = render_content_types(
            DEFAULT_TYPES_TEMPLATE,
            &paths,
            &registry,
            &CollectionMap::new(),
            None,
        );
        assert!(out.starts_with("declare module 'markdoc' {}\n"));
    }

    #[test]
    fn test_write_creates_cache_dir() {
        let dir = TempDir::new().unwrap();
        let paths = paths(dir.path());

        write_content_types(&paths, "declare const x: 1;").unwrap();
        let written = fs::read_to_string(dir.path().join(".contentmap/types.d.ts")).unwrap();
        assert_eq!(written, "declare const x: 1;");

        // Overwrites on the next run
        write_content_types(&paths, "next").unwrap();
        assert_eq!(fs::read_to_string(paths.types_file()).unwrap(), "next");
        assert_eq!(paths.types_file(), PathBuf::from(dir.path()).join(".contentmap/types.d.ts"));
    }
}
