//! Per-file type resolution.
//!
//! Type tokens written in documentation only mean something relative to the
//! file they appear in: `User` may be `App\Model\User` through a `use`
//! import, or `App\Http\User` through the file's namespace. A
//! [`FileTypeMapper`] hands out one [`TypeMap`] per file holding every token
//! it could resolve there.
//!
//! Two implementations are provided:
//!
//! - [`InMemoryTypeMapper`]: maps supplied up front (tests, manifests).
//! - [`SourceTypeMapper`]: reads the source file, collects every type token
//!   used in its doc comments and resolves them against the file's
//!   `namespace` and `use` imports.
//!
//! # Token grammar
//!
//! A type token is a run of [`TYPE_TOKEN_PATTERN`] characters. Within that
//! run the mapper understands `?T`, `T[]`, `A|B`, `array<V>`, `array<K,V>`,
//! `Name<Args>`, keywords and (qualified) class names. Tokens that match the
//! pattern but not the grammar (`array<int`, `int|`) are left out of the map.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

use crate::types::{PhpType, TypeMap};

/// Characters a type token may consist of.
pub const TYPE_TOKEN_PATTERN: &str = r"[A-Za-z0-9_\\\[\]|?<>,]+";

/// Source of per-file type maps.
pub trait FileTypeMapper {
    /// The type map for `file`. Unknown files yield an empty map.
    fn type_map(&self, file: &Path) -> Arc<TypeMap>;
}

impl<M: FileTypeMapper + ?Sized> FileTypeMapper for Arc<M> {
    fn type_map(&self, file: &Path) -> Arc<TypeMap> {
        (**self).type_map(file)
    }
}

impl<M: FileTypeMapper + ?Sized> FileTypeMapper for &M {
    fn type_map(&self, file: &Path) -> Arc<TypeMap> {
        (**self).type_map(file)
    }
}

// ============================================================================
// Name Context
// ============================================================================

/// Namespace and imports of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameContext {
    /// Current namespace without leading or trailing `\`; empty for global.
    pub namespace: String,
    /// Lowercased alias -> fully-qualified name.
    imports: HashMap<String, String>,
}

static NAMESPACE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*namespace\s+([A-Za-z0-9_\\]+)\s*[;{]").expect("namespace pattern is valid")
});

static USE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*use\s+([^;]+);").expect("use pattern is valid"));

static FIRST_CLASS_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s")
        .expect("class-like pattern is valid")
});

static DOC_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*.*?\*/").expect("doc block pattern is valid"));

static DOC_TYPE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"@(?:var|param|return|property(?:-read|-write)?)\s+({})",
        TYPE_TOKEN_PATTERN
    ))
    .expect("doc type tag pattern is valid")
});

impl NameContext {
    /// Context for code in the given namespace, with no imports.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().trim_matches('\\').to_string(),
            imports: HashMap::new(),
        }
    }

    /// Add an import: `use <target> as <alias>;`.
    pub fn with_import(mut self, alias: &str, target: &str) -> Self {
        self.add_import(alias, target);
        self
    }

    fn add_import(&mut self, alias: &str, target: &str) {
        self.imports.insert(
            alias.to_ascii_lowercase(),
            target.trim_start_matches('\\').to_string(),
        );
    }

    /// Extract the namespace and class imports from source text.
    ///
    /// Only `use` statements before the first class-like declaration count;
    /// later ones are trait uses inside class bodies.
    pub fn from_source(source: &str) -> Self {
        let header_end = FIRST_CLASS_LIKE
            .find(source)
            .map(|m| m.start())
            .unwrap_or(source.len());
        let header = &source[..header_end];

        let namespace = NAMESPACE_DECL
            .captures(header)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();
        let mut ctx = NameContext::new(namespace);

        for caps in USE_DECL.captures_iter(header) {
            let clause = caps[1].trim();
            if clause.starts_with("function ") || clause.starts_with("const ") {
                continue;
            }
            ctx.add_use_clause(clause);
        }
        ctx
    }

    fn add_use_clause(&mut self, clause: &str) {
        // use Prefix\{A, B as C};
        if let Some((prefix, rest)) = clause.split_once('{') {
            let prefix = prefix.trim().trim_end_matches('\\');
            for item in rest.trim_end_matches('}').split(',') {
                let item = item.trim();
                if !item.is_empty() {
                    self.add_use_item(&format!("{}\\{}", prefix, item));
                }
            }
            return;
        }
        for item in clause.split(',') {
            self.add_use_item(item.trim());
        }
    }

    fn add_use_item(&mut self, item: &str) {
        let mut parts = item.split_whitespace();
        let Some(target) = parts.next() else {
            return;
        };
        let alias = match (parts.next(), parts.next()) {
            (Some(kw), Some(alias)) if kw.eq_ignore_ascii_case("as") => alias.to_string(),
            _ => target.rsplit('\\').next().unwrap_or(target).to_string(),
        };
        self.add_import(&alias, target);
    }

    /// Resolve a class name to its fully-qualified form (no leading `\`).
    pub fn qualify(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }
        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(target) = self.imports.get(&first.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{}\\{}", target, rest),
                None => target.clone(),
            };
        }
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", self.namespace, name)
        }
    }

    /// Resolve a type token in this context.
    ///
    /// Returns `None` when the token does not follow the type grammar.
    pub fn resolve(&self, token: &str) -> Option<PhpType> {
        let members = split_top_level(token, '|')?;
        let resolved = members
            .into_iter()
            .map(|member| self.resolve_single(member))
            .collect::<Option<Vec<_>>>()?;
        Some(PhpType::union(resolved))
    }

    fn resolve_single(&self, token: &str) -> Option<PhpType> {
        if token.is_empty() {
            return None;
        }
        if let Some(inner) = token.strip_prefix('?') {
            return Some(PhpType::nullable(self.resolve_single(inner)?));
        }
        if let Some(element) = token.strip_suffix("[]") {
            return Some(PhpType::array_of(self.resolve_single(element)?));
        }
        if let Some(open) = token.find('<') {
            let inner = token[open + 1..].strip_suffix('>')?;
            let args = split_top_level(inner, ',')?
                .into_iter()
                .map(|arg| self.resolve(arg))
                .collect::<Option<Vec<_>>>()?;
            return self.resolve_generic(&token[..open], args);
        }
        if let Some(keyword) = keyword_type(token) {
            return Some(keyword);
        }
        if !is_class_name(token) {
            return None;
        }
        Some(PhpType::class(self.qualify(token)))
    }

    fn resolve_generic(&self, name: &str, mut args: Vec<PhpType>) -> Option<PhpType> {
        match name.to_ascii_lowercase().as_str() {
            "array" | "list" => match args.len() {
                1 => Some(PhpType::array_of(args.remove(0))),
                2 => {
                    let value = args.remove(1);
                    let key = args.remove(0);
                    Some(PhpType::Array {
                        key: Some(Box::new(key)),
                        value: Some(Box::new(value)),
                    })
                }
                _ => None,
            },
            "iterable" => Some(PhpType::Iterable),
            _ if is_class_name(name) && !args.is_empty() => {
                Some(PhpType::class_with_args(self.qualify(name), args))
            }
            _ => None,
        }
    }
}

fn keyword_type(token: &str) -> Option<PhpType> {
    let ty = match token.to_ascii_lowercase().as_str() {
        "int" | "integer" => PhpType::Int,
        "float" | "double" => PhpType::Float,
        "string" => PhpType::String,
        "bool" | "boolean" | "true" | "false" => PhpType::Bool,
        "null" => PhpType::Null,
        "mixed" => PhpType::Mixed,
        "void" => PhpType::Void,
        "callable" => PhpType::Callable,
        "iterable" => PhpType::Iterable,
        "object" => PhpType::Object,
        "resource" => PhpType::Resource,
        "array" => PhpType::plain_array(),
        "self" => PhpType::SelfRef,
        "static" => PhpType::StaticRef,
        _ => return None,
    };
    Some(ty)
}

/// `Foo`, `\Foo\Bar`, `Foo\Bar_Baz2`.
fn is_class_name(name: &str) -> bool {
    let name = name.strip_prefix('\\').unwrap_or(name);
    !name.is_empty()
        && name.split('\\').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Split on `sep` outside of `<...>`. `None` on unbalanced brackets or an
/// empty piece.
fn split_top_level(text: &str, sep: char) -> Option<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            c if c == sep && depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    pieces.push(&text[start..]);
    if pieces.iter().any(|piece| piece.is_empty()) {
        return None;
    }
    Some(pieces)
}

/// Build the type map for a source file's text.
///
/// Every type token found in a doc-comment tag (`@var`, `@param`, `@return`,
/// `@property*`) that resolves in the file's name context gets an entry.
pub fn type_map_for_source(source: &str) -> TypeMap {
    let ctx = NameContext::from_source(source);
    let mut map = TypeMap::new();
    for block in DOC_BLOCK.find_iter(source) {
        for caps in DOC_TYPE_TAG.captures_iter(block.as_str()) {
            let token = &caps[1];
            if map.contains(token) {
                continue;
            }
            if let Some(ty) = ctx.resolve(token) {
                map.insert(token, ty);
            }
        }
    }
    map
}

// ============================================================================
// In-Memory Mapper
// ============================================================================

/// Type maps supplied up front, keyed by file path.
#[derive(Debug, Default)]
pub struct InMemoryTypeMapper {
    maps: HashMap<PathBuf, Arc<TypeMap>>,
    empty: Arc<TypeMap>,
}

impl InMemoryTypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_map(mut self, file: impl Into<PathBuf>, map: TypeMap) -> Self {
        self.insert(file, map);
        self
    }

    pub fn insert(&mut self, file: impl Into<PathBuf>, map: TypeMap) {
        self.maps.insert(file.into(), Arc::new(map));
    }
}

impl FileTypeMapper for InMemoryTypeMapper {
    fn type_map(&self, file: &Path) -> Arc<TypeMap> {
        self.maps
            .get(file)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.empty))
    }
}

// ============================================================================
// Source Mapper
// ============================================================================

/// Builds type maps by reading source files under a root directory.
///
/// Maps are computed on first request and cached for the mapper's lifetime.
/// Files that cannot be read produce an empty map. Explicit maps registered
/// with [`preload`](Self::preload) take the place of reading the file.
#[derive(Debug)]
pub struct SourceTypeMapper {
    root: PathBuf,
    cache: RwLock<HashMap<PathBuf, Arc<TypeMap>>>,
}

impl SourceTypeMapper {
    /// Relative file paths are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Use `map` for `file` instead of reading it.
    pub fn preload(&self, file: impl Into<PathBuf>, map: TypeMap) {
        self.cache
            .write()
            .expect("type map cache RwLock poisoned")
            .insert(file.into(), Arc::new(map));
    }

    /// Number of files with a cached map.
    pub fn cached_files(&self) -> usize {
        self.cache
            .read()
            .expect("type map cache RwLock poisoned")
            .len()
    }

    fn build(&self, file: &Path) -> TypeMap {
        let full_path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.root.join(file)
        };
        match fs::read_to_string(&full_path) {
            Ok(source) => {
                let map = type_map_for_source(&source);
                tracing::debug!(
                    "Built type map for {} ({} tokens)",
                    full_path.display(),
                    map.len()
                );
                map
            }
            Err(e) => {
                tracing::debug!("Cannot read {}: {}, using empty type map", full_path.display(), e);
                TypeMap::new()
            }
        }
    }
}

impl FileTypeMapper for SourceTypeMapper {
    fn type_map(&self, file: &Path) -> Arc<TypeMap> {
        if let Some(map) = self
            .cache
            .read()
            .expect("type map cache RwLock poisoned")
            .get(file)
        {
            return Arc::clone(map);
        }

        let map = Arc::new(self.build(file));
        let mut cache = self.cache.write().expect("type map cache RwLock poisoned");
        Arc::clone(cache.entry(file.to_path_buf()).or_insert(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_ctx() -> NameContext {
        NameContext::new("App\\Model")
            .with_import("Carbon", "Carbon\\Carbon")
            .with_import("Col", "\\Illuminate\\Support\\Collection")
    }

    #[test]
    fn test_resolve_keywords_case_insensitive() {
        let ctx = NameContext::default();
        assert_eq!(ctx.resolve("int"), Some(PhpType::Int));
        assert_eq!(ctx.resolve("Integer"), Some(PhpType::Int));
        assert_eq!(ctx.resolve("double"), Some(PhpType::Float));
        assert_eq!(ctx.resolve("false"), Some(PhpType::Bool));
        assert_eq!(ctx.resolve("self"), Some(PhpType::SelfRef));
        assert_eq!(ctx.resolve("static"), Some(PhpType::StaticRef));
    }

    #[test]
    fn test_resolve_class_names() {
        let ctx = app_ctx();
        assert_eq!(ctx.resolve("User"), Some(PhpType::class("App\\Model\\User")));
        assert_eq!(ctx.resolve("\\User"), Some(PhpType::class("User")));
        assert_eq!(ctx.resolve("Carbon"), Some(PhpType::class("Carbon\\Carbon")));
        assert_eq!(ctx.resolve("carbon"), Some(PhpType::class("Carbon\\Carbon")));
        assert_eq!(
            ctx.resolve("Col\\Arr"),
            Some(PhpType::class("Illuminate\\Support\\Collection\\Arr"))
        );
    }

    #[test]
    fn test_resolve_composites() {
        let ctx = app_ctx();
        assert_eq!(
            ctx.resolve("?Carbon"),
            Some(PhpType::nullable(PhpType::class("Carbon\\Carbon")))
        );
        assert_eq!(
            ctx.resolve("int[]|null"),
            Some(PhpType::union(vec![
                PhpType::array_of(PhpType::Int),
                PhpType::Null
            ]))
        );
        assert_eq!(
            ctx.resolve("array<string,User>"),
            Some(PhpType::Array {
                key: Some(Box::new(PhpType::String)),
                value: Some(Box::new(PhpType::class("App\\Model\\User"))),
            })
        );
        assert_eq!(
            ctx.resolve("Col<int|string>"),
            Some(PhpType::class_with_args(
                "Illuminate\\Support\\Collection",
                vec![PhpType::union(vec![PhpType::Int, PhpType::String])]
            ))
        );
    }

    #[test]
    fn test_resolve_rejects_malformed_tokens() {
        let ctx = app_ctx();
        assert_eq!(ctx.resolve("array<int"), None);
        assert_eq!(ctx.resolve("int>"), None);
        assert_eq!(ctx.resolve("int|"), None);
        assert_eq!(ctx.resolve("|int"), None);
        assert_eq!(ctx.resolve("array<int,string,bool>"), None);
        assert_eq!(ctx.resolve("9Lives"), None);
        assert_eq!(ctx.resolve("?"), None);
        assert_eq!(ctx.resolve(""), None);
    }

    #[test]
    fn test_name_context_from_source() {
        let source = r#"<?php
namespace App\Http;

use App\Model\User;
use Carbon\Carbon as Date, Psr\Log\LoggerInterface;
use App\Support\{Arr, Str as Text};
use function strlen;

class Controller
{
    use SomeTrait;
}
"#;
        let ctx = NameContext::from_source(source);
        assert_eq!(ctx.namespace, "App\\Http");
        assert_eq!(ctx.qualify("User"), "App\\Model\\User");
        assert_eq!(ctx.qualify("Date"), "Carbon\\Carbon");
        assert_eq!(ctx.qualify("LoggerInterface"), "Psr\\Log\\LoggerInterface");
        assert_eq!(ctx.qualify("Arr"), "App\\Support\\Arr");
        assert_eq!(ctx.qualify("Text"), "App\\Support\\Str");
        // Trait use in the class body is not an import.
        assert_eq!(ctx.qualify("SomeTrait"), "App\\Http\\SomeTrait");
        assert_eq!(ctx.qualify("strlen"), "App\\Http\\strlen");
    }

    #[test]
    fn test_type_map_for_source_collects_doc_tokens() {
        let source = r#"<?php
namespace App;

use Carbon\Carbon;

/**
 * @property int $id
 * @property-read Carbon $created
 * @property array<int $broken
 */
class Post
{
    /** @var string|null */
    private $title;

    /**
     * @param User[] $users
     * @return static
     */
    public function with($users) {}
}
"#;
        let map = type_map_for_source(source);
        assert_eq!(map.get("int"), Some(&PhpType::Int));
        assert_eq!(map.get("Carbon"), Some(&PhpType::class("Carbon\\Carbon")));
        assert_eq!(
            map.get("string|null"),
            Some(&PhpType::union(vec![PhpType::String, PhpType::Null]))
        );
        assert_eq!(
            map.get("User[]"),
            Some(&PhpType::array_of(PhpType::class("App\\User")))
        );
        assert_eq!(map.get("static"), Some(&PhpType::StaticRef));
        assert!(!map.contains("array<int"));
    }

    #[test]
    fn test_in_memory_mapper() {
        let mapper = InMemoryTypeMapper::new().with_map(
            "src/A.php",
            [("int", PhpType::Int)].into_iter().collect(),
        );
        assert!(mapper.type_map(Path::new("src/A.php")).contains("int"));
        assert!(mapper.type_map(Path::new("src/B.php")).is_empty());
    }

    #[test]
    fn test_source_mapper_reads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Post.php"),
            "<?php\nnamespace App;\n/** @property Tag[] $tags */\nclass Post {}\n",
        )
        .unwrap();

        let mapper = SourceTypeMapper::new(dir.path());
        let map = mapper.type_map(Path::new("Post.php"));
        assert_eq!(
            map.get("Tag[]"),
            Some(&PhpType::array_of(PhpType::class("App\\Tag")))
        );
        assert_eq!(mapper.cached_files(), 1);

        let again = mapper.type_map(Path::new("Post.php"));
        assert!(Arc::ptr_eq(&map, &again));
    }

    #[test]
    fn test_source_mapper_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mapper = SourceTypeMapper::new(dir.path());
        assert!(mapper.type_map(Path::new("Missing.php")).is_empty());
    }

    #[test]
    fn test_source_mapper_preload_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mapper = SourceTypeMapper::new(dir.path());
        mapper.preload("Virtual.php", [("Foo", PhpType::Int)].into_iter().collect());
        assert_eq!(
            mapper.type_map(Path::new("Virtual.php")).get("Foo"),
            Some(&PhpType::Int)
        );
    }
}
