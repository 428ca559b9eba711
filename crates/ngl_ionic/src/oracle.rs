//! The attribute type oracle.
//!
//! [`AttributeTypeOracle::type_map`] builds the tag → attribute → type map
//! on first use and keeps it for the life of the oracle. Building reads
//! `components.d.ts`, crawls the relative export graph once to learn where
//! every type name is declared, and resolves aliases on demand. Raw file
//! contents and scanned modules sit in bounded caches; resolved names and the
//! final map are never evicted.
//!
//! Declaration files are assumed not to change while the oracle lives.

use crate::cache::{BoundedCache, CacheStats};
use crate::dts::{self, DtsModule};
use crate::error::OracleError;
use crate::kind::{classify_type, AttributeType, Resolution, ResolveType, ValueKind};
use crate::naming::{camel_case, tag_name};
use ngl_source::fs::resolve_relative;
use ngl_source::FileSystem;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Tag name → attribute (property) name → classified type.
pub type AttributeTypeMap = BTreeMap<String, BTreeMap<String, AttributeType>>;

/// Default capacity of the raw caches.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Counters for the oracle's cache layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OracleCacheStats {
    /// File content cache.
    pub contents: CacheStats,
    /// Scanned module cache.
    pub modules: CacheStats,
    /// Number of type names with a known declaring file.
    pub type_locations: usize,
    /// Number of resolved type names.
    pub aliases: usize,
}

struct DeclarationCaches {
    contents: BoundedCache<PathBuf, Arc<str>>,
    modules: BoundedCache<PathBuf, Arc<DtsModule>>,
    type_locations: Option<HashMap<String, PathBuf>>,
    aliases: HashMap<String, Resolution>,
}

/// Answers which value kind an Ionic component attribute expects.
///
/// Shared between rules through an `Arc`; all state is behind a mutex or a
/// `OnceLock`, so lookups take `&self`.
pub struct AttributeTypeOracle {
    components_dts: PathBuf,
    fs: Arc<dyn FileSystem>,
    caches: Mutex<DeclarationCaches>,
    map: OnceLock<AttributeTypeMap>,
}

impl std::fmt::Debug for AttributeTypeOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeTypeOracle")
            .field("components_dts", &self.components_dts)
            .field("built", &self.map.get().is_some())
            .finish()
    }
}

impl AttributeTypeOracle {
    /// Creates an oracle over the given `components.d.ts`. Nothing is read
    /// until the first lookup.
    pub fn new(components_dts: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, cache_capacity: usize) -> Self {
        Self {
            components_dts: components_dts.into(),
            fs,
            caches: Mutex::new(DeclarationCaches {
                contents: BoundedCache::new(cache_capacity),
                modules: BoundedCache::new(cache_capacity),
                type_locations: None,
                aliases: HashMap::new(),
            }),
            map: OnceLock::new(),
        }
    }

    /// The declaration file this oracle reads.
    pub fn components_dts(&self) -> &Path {
        &self.components_dts
    }

    /// The full map, built on first call.
    pub fn type_map(&self) -> &AttributeTypeMap {
        self.map.get_or_init(|| match self.build() {
            Ok(map) => {
                tracing::debug!(
                    path = %self.components_dts.display(),
                    components = map.len(),
                    "built attribute type map"
                );
                map
            }
            Err(err) => {
                tracing::warn!(error = %err, "ionic attribute types unavailable");
                AttributeTypeMap::new()
            }
        })
    }

    /// Looks up an attribute of a tag. Dash-case attribute names are tried
    /// as written and in camel case.
    pub fn lookup(&self, tag: &str, attribute: &str) -> Option<&AttributeType> {
        let attrs = self.type_map().get(&tag.to_ascii_lowercase())?;
        attrs
            .get(attribute)
            .or_else(|| attrs.get(&camel_case(attribute)))
    }

    /// The value kind of an attribute; [`ValueKind::Unknown`] if not declared.
    pub fn kind(&self, tag: &str, attribute: &str) -> ValueKind {
        self.lookup(tag, attribute)
            .map_or(ValueKind::Unknown, |ty| ty.kind)
    }

    /// The permitted literal values of a restricted string attribute.
    pub fn allowed_values(&self, tag: &str, attribute: &str) -> Option<&[String]> {
        self.lookup(tag, attribute)
            .filter(|ty| ty.kind == ValueKind::String && !ty.values.is_empty())
            .map(|ty| ty.values.as_slice())
    }

    /// Returns `true` if the tag is a known component.
    pub fn is_component(&self, tag: &str) -> bool {
        self.type_map().contains_key(&tag.to_ascii_lowercase())
    }

    /// Current cache counters.
    pub fn cache_stats(&self) -> OracleCacheStats {
        let caches = self.lock();
        OracleCacheStats {
            contents: caches.contents.stats(),
            modules: caches.modules.stats(),
            type_locations: caches.type_locations.as_ref().map_or(0, HashMap::len),
            aliases: caches.aliases.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DeclarationCaches> {
        self.caches.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn build(&self) -> Result<AttributeTypeMap, OracleError> {
        let text = {
            let mut caches = self.lock();
            self.content(&mut caches, &self.components_dts)?
        };
        let interfaces =
            dts::scan_components(&text).ok_or_else(|| OracleError::MissingNamespace {
                path: self.components_dts.clone(),
            })?;

        let resolver = CrawlResolver { oracle: self };
        let mut map = AttributeTypeMap::new();
        for interface in interfaces {
            let Some(tag) = tag_name(&interface.name) else {
                continue;
            };
            let attrs = map.entry(tag).or_default();
            for prop in interface.props {
                let ty = classify_type(&prop.type_text, &resolver);
                tracing::trace!(prop = %prop.name, kind = %ty.kind, "classified");
                attrs.insert(prop.name, ty);
            }
        }
        Ok(map)
    }

    fn content(&self, caches: &mut DeclarationCaches, path: &Path) -> Result<Arc<str>, OracleError> {
        if let Some(text) = caches.contents.get(&path.to_path_buf()) {
            return Ok(Arc::clone(text));
        }
        let text: Arc<str> = self
            .fs
            .read_to_string(path)
            .map_err(|source| OracleError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .into();
        caches.contents.insert(path.to_path_buf(), Arc::clone(&text));
        Ok(text)
    }

    fn module(&self, caches: &mut DeclarationCaches, path: &Path) -> Result<Arc<DtsModule>, OracleError> {
        if let Some(module) = caches.modules.get(&path.to_path_buf()) {
            return Ok(Arc::clone(module));
        }
        let text = self.content(caches, path)?;
        let module = Arc::new(dts::scan_module(&text));
        caches.modules.insert(path.to_path_buf(), Arc::clone(&module));
        Ok(module)
    }

    /// Walks relative module references from `components.d.ts`, recording
    /// the first file that declares each type name.
    fn crawl(&self, caches: &mut DeclarationCaches) -> HashMap<String, PathBuf> {
        let mut locations = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([self.components_dts.clone()]);
        while let Some(path) = queue.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }
            let module = match self.module(caches, &path) {
                Ok(module) => module,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping declaration file");
                    continue;
                }
            };
            for name in module.aliases.keys().chain(module.declarations.iter()) {
                locations
                    .entry(name.clone())
                    .or_insert_with(|| path.clone());
            }
            for reference in &module.references {
                if !reference.starts_with('.') {
                    continue;
                }
                match self.resolve_module(&path, reference) {
                    Some(target) => queue.push_back(target),
                    None => tracing::trace!(from = %path.display(), reference = %reference, "unresolved module"),
                }
            }
        }
        tracing::debug!(files = visited.len(), names = locations.len(), "crawled declarations");
        locations
    }

    fn resolve_module(&self, from: &Path, reference: &str) -> Option<PathBuf> {
        let base = resolve_relative(from, reference);
        if reference.ends_with(".d.ts") {
            return self.fs.is_file(&base).then_some(base);
        }
        let stem = match reference.strip_suffix(".js") {
            Some(stem) => resolve_relative(from, stem),
            None => base.clone(),
        };
        let mut with_ext = stem.clone().into_os_string();
        with_ext.push(".d.ts");
        [PathBuf::from(with_ext), stem.join("index.d.ts")]
            .into_iter()
            .find(|candidate| self.fs.is_file(candidate))
    }

    fn resolve_name(&self, name: &str) -> Resolution {
        let mut caches = self.lock();
        if let Some(hit) = caches.aliases.get(name) {
            return hit.clone();
        }
        if caches.type_locations.is_none() {
            let locations = self.crawl(&mut caches);
            caches.type_locations = Some(locations);
        }
        let location = caches
            .type_locations
            .as_ref()
            .and_then(|locations| locations.get(name))
            .cloned();
        let resolution = match location {
            None => Resolution::Unresolved,
            Some(path) => match self.module(&mut caches, &path) {
                Ok(module) => match module.aliases.get(name) {
                    Some(rhs) => Resolution::Alias(Arc::from(rhs.as_str())),
                    None if module.declarations.contains(name) => Resolution::Declared,
                    None => Resolution::Unresolved,
                },
                Err(err) => {
                    tracing::warn!(error = %err, name, "type declaration unreadable");
                    Resolution::Unresolved
                }
            },
        };
        caches.aliases.insert(name.to_string(), resolution.clone());
        resolution
    }
}

struct CrawlResolver<'a> {
    oracle: &'a AttributeTypeOracle,
}

impl ResolveType for CrawlResolver<'_> {
    fn resolve(&self, name: &str) -> Resolution {
        self.oracle.resolve_name(name)
    }
}
