//! Document loading and the cross-reference machinery.
//!
//! [`Document::load`] locates the newest cross-reference section via the
//! trailing `startxref`, follows `/Prev` and hybrid `/XRefStm` pointers, and
//! merges the sections newest-first. Files without a usable table are
//! repaired by scanning for object headers.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::filters::decode_chain;
use crate::lexer::{Token, is_delimiter, is_whitespace};
use crate::object::{Dict, Object, StreamObject};
use crate::parser::{ObjectParser, parse_indirect_at};

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
const OBJSTM_CACHE_CAPACITY: usize = 32;
const MAX_RESOLVE_DEPTH: usize = 32;
/// How far back from EOF the `startxref` keyword is searched for.
const STARTXREF_WINDOW: usize = 1024;

struct ObjectCache {
    capacity: usize,
    map: IndexMap<u32, Arc<Object>>,
}

impl ObjectCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: IndexMap::new(),
        }
    }

    fn get(&mut self, id: u32) -> Option<Arc<Object>> {
        if self.capacity == 0 {
            return None;
        }
        let index = self.map.get_index_of(&id)?;
        let value = Arc::clone(self.map.get_index(index)?.1);
        if index + 1 != self.map.len() {
            self.map.move_index(index, self.map.len() - 1);
        }
        Some(value)
    }

    fn insert(&mut self, id: u32, value: Arc<Object>) {
        if self.capacity == 0 {
            return;
        }
        if self.map.contains_key(&id) {
            self.map.shift_remove(&id);
        }
        self.map.insert(id, value);
        if self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
    }
}

/// A decoded `/ObjStm` container: header pairs plus the object data.
struct ObjStm {
    first: usize,
    index: Vec<(u32, usize)>,
    data: Vec<u8>,
}

struct ObjStmCache {
    capacity: usize,
    map: IndexMap<u32, Arc<ObjStm>>,
}

impl ObjStmCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: IndexMap::new(),
        }
    }

    fn get(&mut self, id: u32) -> Option<Arc<ObjStm>> {
        let index = self.map.get_index_of(&id)?;
        let value = Arc::clone(self.map.get_index(index)?.1);
        if index + 1 != self.map.len() {
            self.map.move_index(index, self.map.len() - 1);
        }
        Some(value)
    }

    fn insert(&mut self, id: u32, value: Arc<ObjStm>) {
        if self.map.contains_key(&id) {
            self.map.shift_remove(&id);
        }
        self.map.insert(id, value);
        if self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
    }
}

/// Where an object lives. Free entries are never recorded, so a freed slot
/// in a newer section does not mask an older definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XRefEntry {
    Offset { pos: usize },
    InStream { stream_id: u32, index: usize },
}

/// One cross-reference section before merging.
struct XRefSection {
    entries: Vec<(u32, XRefEntry)>,
    trailer: Dict,
}

/// A parsed PDF document: the raw bytes, the merged object table, and
/// bounded caches for parsed objects and object streams.
pub struct Document {
    data: Bytes,
    entries: FxHashMap<u32, XRefEntry>,
    trailer: Dict,
    catalog: Dict,
    cache: Mutex<ObjectCache>,
    objstms: Mutex<ObjStmCache>,
}

impl Document {
    /// Parses the document structure: xref chain (or repair scan), trailer,
    /// and catalog. Page content is parsed lazily via [`Document::get_object`].
    pub fn load(data: impl Into<Bytes>) -> Result<Self> {
        let mut doc = Document {
            data: data.into(),
            entries: FxHashMap::default(),
            trailer: Dict::new(),
            catalog: Dict::new(),
            cache: Mutex::new(ObjectCache::new(DEFAULT_CACHE_CAPACITY)),
            objstms: Mutex::new(ObjStmCache::new(OBJSTM_CACHE_CAPACITY)),
        };

        doc.load_xref_chain()?;

        if doc.trailer.get("Encrypt").is_some_and(|e| !e.is_null()) {
            return Err(ExtractError::Encrypted);
        }

        match doc.trailer.get("Root").cloned() {
            Some(root) => {
                doc.catalog = doc.resolve(&root)?.as_dict()?.clone();
            }
            None => {
                warn!("trailer has no /Root, scanning objects for the catalog");
                doc.catalog = doc
                    .scan_for_catalog()
                    .ok_or(ExtractError::MissingKey("Root"))?;
            }
        }

        Ok(doc)
    }

    pub fn catalog(&self) -> &Dict {
        &self.catalog
    }

    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    fn load_xref_chain(&mut self) -> Result<()> {
        let mut loaded = false;
        match find_startxref(&self.data) {
            Ok(start) => match self.follow_xref_chain(start) {
                Ok(()) if !self.entries.is_empty() => loaded = true,
                Ok(()) => {}
                Err(err) => debug!("cross-reference chain unusable: {err}"),
            },
            Err(err) => debug!("{err}"),
        }

        if !loaded {
            warn!("no usable cross-reference table, scanning for object headers");
            self.repair_scan()?;
        }
        Ok(())
    }

    fn follow_xref_chain(&mut self, start: usize) -> Result<()> {
        let mut visited = FxHashSet::default();
        let mut pos = start;
        loop {
            if !visited.insert(pos) {
                break;
            }
            let section = self.load_section_at(pos)?;
            let xref_stm = trailer_offset(&section.trailer, "XRefStm");
            let prev = trailer_offset(&section.trailer, "Prev");
            self.merge_section(section);

            // Hybrid files point at a parallel xref stream holding the
            // entries for stream-contained objects.
            if let Some(stm_pos) = xref_stm
                && visited.insert(stm_pos)
            {
                match self.load_section_at(stm_pos) {
                    Ok(stm) => self.merge_section(stm),
                    Err(err) => debug!("hybrid xref stream at {stm_pos} unusable: {err}"),
                }
            }

            match prev {
                Some(p) => pos = p,
                None => break,
            }
        }
        Ok(())
    }

    /// Inserts a section into the merged view. Sections arrive newest-first
    /// and the first definition of an id (or trailer key) wins.
    fn merge_section(&mut self, section: XRefSection) {
        for (id, entry) in section.entries {
            self.entries.entry(id).or_insert(entry);
        }
        for (key, value) in section.trailer {
            self.trailer.entry(key).or_insert(value);
        }
    }

    fn load_section_at(&self, pos: usize) -> Result<XRefSection> {
        if pos >= self.data.len() {
            return Err(ExtractError::Syntax(format!(
                "cross-reference offset {pos} beyond end of file"
            )));
        }
        if self.data[pos..].starts_with(b"xref") {
            self.load_xref_table(pos)
        } else {
            self.load_xref_stream(pos)
        }
    }

    /// Classic `xref` table: subsections of `start count` followed by
    /// `offset gen n|f` entries, then a `trailer` dict. Entries are
    /// nominally 20 bytes but whitespace is treated loosely.
    fn load_xref_table(&self, pos: usize) -> Result<XRefSection> {
        let mut parser = ObjectParser::with_pos(&self.data, pos + b"xref".len());
        let mut entries = Vec::new();

        loop {
            let Some((tpos, token)) = parser.token()? else {
                return Err(ExtractError::UnexpectedEof);
            };
            match token {
                Token::Keyword(kw) if kw == "trailer" => break,
                Token::Integer(start) => {
                    let count = parser.expect_integer()?;
                    let Ok(count) = usize::try_from(count) else {
                        return Err(ExtractError::Syntax(format!(
                            "negative subsection count at offset {tpos}"
                        )));
                    };
                    if count > self.data.len() {
                        return Err(ExtractError::Syntax(format!(
                            "subsection count {count} larger than the file"
                        )));
                    }
                    let mut base = u32::try_from(start).map_err(|_| {
                        ExtractError::Syntax(format!(
                            "bad subsection start at offset {tpos}"
                        ))
                    })?;
                    for i in 0..count {
                        let offset = parser.expect_integer()?;
                        let genno = parser.expect_integer()?;
                        let free = match parser.token()? {
                            Some((_, Token::Keyword(kw))) if kw == "n" => false,
                            Some((_, Token::Keyword(kw))) if kw == "f" => true,
                            Some((p, other)) => {
                                return Err(ExtractError::Syntax(format!(
                                    "bad xref entry marker at offset {p}: {other:?}"
                                )));
                            }
                            None => return Err(ExtractError::UnexpectedEof),
                        };
                        // Subsections declared to start at 1 sometimes still
                        // carry the object-0 free head; realign them.
                        if i == 0 && base > 0 && free && offset == 0 && genno == 65535 {
                            base -= 1;
                        }
                        let Some(id) = base.checked_add(i as u32) else {
                            continue;
                        };
                        if !free && let Ok(off) = usize::try_from(offset) {
                            entries.push((id, XRefEntry::Offset { pos: off }));
                        }
                    }
                }
                other => {
                    return Err(ExtractError::Syntax(format!(
                        "unexpected {other:?} in cross-reference table at offset {tpos}"
                    )));
                }
            }
        }

        let trailer = match parser.next_object() {
            Ok(Some(Object::Dict(dict))) => dict,
            Ok(_) => Dict::new(),
            Err(err) => {
                debug!("unreadable trailer dict: {err}");
                Dict::new()
            }
        };
        Ok(XRefSection { entries, trailer })
    }

    /// Cross-reference stream (`/Type /XRef`): binary rows of `/W`-sized
    /// big-endian fields covering the `/Index` ranges.
    fn load_xref_stream(&self, pos: usize) -> Result<XRefSection> {
        let (_, obj) = parse_indirect_at(&self.data, pos, &|_| None)?;
        let stream = obj.as_stream()?;
        let dict = &stream.dict;

        let w = dict.get("W").ok_or(ExtractError::MissingKey("W"))?.as_array()?;
        if w.len() != 3 {
            return Err(ExtractError::Syntax(
                "xref stream /W must have three elements".to_string(),
            ));
        }
        let width = |i: usize| -> Result<usize> {
            let v = w[i].as_i64()?;
            usize::try_from(v)
                .ok()
                .filter(|&v| v <= 8)
                .ok_or_else(|| {
                    ExtractError::Syntax(format!("bad /W field width {v}"))
                })
        };
        let (w0, w1, w2) = (width(0)?, width(1)?, width(2)?);
        let entry_size = w0 + w1 + w2;
        if entry_size == 0 {
            return Err(ExtractError::Syntax("empty /W entry".to_string()));
        }

        let size = dict
            .get("Size")
            .ok_or(ExtractError::MissingKey("Size"))?
            .as_i64()?;
        let size = usize::try_from(size)
            .map_err(|_| ExtractError::Syntax("negative /Size".to_string()))?;

        let index = match dict.get("Index") {
            Some(idx) => {
                let arr = idx.as_array()?;
                let mut pairs = Vec::new();
                let mut i = 0;
                while i + 1 < arr.len() {
                    let start = u32::try_from(arr[i].as_i64()?).map_err(|_| {
                        ExtractError::Syntax("bad /Index start".to_string())
                    })?;
                    let count = usize::try_from(arr[i + 1].as_i64()?).map_err(|_| {
                        ExtractError::Syntax("bad /Index count".to_string())
                    })?;
                    pairs.push((start, count));
                    i += 2;
                }
                pairs
            }
            None => vec![(0, size)],
        };

        let data = self.decode_stream(stream)?;

        let mut entries = Vec::new();
        let mut at = 0usize;
        for (start, count) in index {
            for i in 0..count {
                if at + entry_size > data.len() {
                    break;
                }
                let entry_type = if w0 > 0 { read_be(&data[at..at + w0]) } else { 1 };
                let field1 = read_be(&data[at + w0..at + w0 + w1]);
                let field2 = read_be(&data[at + w0 + w1..at + entry_size]);
                at += entry_size;

                let Some(id) = start.checked_add(i as u32) else {
                    continue;
                };
                match entry_type {
                    0 => {}
                    1 => {
                        if let Ok(pos) = usize::try_from(field1) {
                            entries.push((id, XRefEntry::Offset { pos }));
                        }
                    }
                    2 => {
                        if let (Ok(stream_id), Ok(index)) =
                            (u32::try_from(field1), usize::try_from(field2))
                        {
                            entries.push((id, XRefEntry::InStream { stream_id, index }));
                        }
                    }
                    other => debug!("unknown xref entry type {other} for object {id}"),
                }
            }
        }

        let mut trailer = Dict::new();
        for (key, value) in dict {
            if !matches!(
                key.as_str(),
                "Length" | "Filter" | "DecodeParms" | "DP" | "W" | "Index"
            ) {
                trailer.insert(key.clone(), value.clone());
            }
        }
        Ok(XRefSection { entries, trailer })
    }

    /// Rebuilds the object table by scanning the whole file for
    /// `<id> <gen> obj` headers. The highest generation of an id wins, and
    /// among equals the later definition.
    fn repair_scan(&mut self) -> Result<()> {
        self.entries.clear();
        self.trailer.clear();

        let data = &self.data[..];
        let mut best: FxHashMap<u32, (u16, usize)> = FxHashMap::default();
        let mut search = 0usize;
        while let Some(at) = find_from(data, search, b"obj") {
            search = at + 3;
            if data
                .get(at + 3)
                .is_some_and(|&b| !is_whitespace(b) && !is_delimiter(b))
            {
                continue;
            }
            let Some((id, genno, start)) = header_before(data, at) else {
                continue;
            };
            match best.get(&id) {
                Some(&(seen, _)) if seen > genno => {}
                _ => {
                    best.insert(id, (genno, start));
                }
            }
        }

        if best.is_empty() {
            return Err(ExtractError::NoXref);
        }
        debug!("recovered {} object headers", best.len());
        self.entries = best
            .into_iter()
            .map(|(id, (_, pos))| (id, XRefEntry::Offset { pos }))
            .collect();

        if let Some(at) = rfind(data, b"trailer") {
            let mut parser = ObjectParser::with_pos(&self.data, at + b"trailer".len());
            if let Ok(Some(Object::Dict(dict))) = parser.next_object() {
                self.trailer = dict;
            }
        }
        Ok(())
    }

    /// All known object ids, ascending. Drives whole-file fallback scans,
    /// which must run in a stable order.
    pub(crate) fn object_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Last-resort catalog lookup for files whose trailer lost `/Root`.
    fn scan_for_catalog(&self) -> Option<Dict> {
        for id in self.object_ids() {
            let Ok(obj) = self.get_object(id) else {
                continue;
            };
            if let Ok(dict) = obj.as_dict()
                && let Some(Object::Name(tp)) = dict.get("Type")
                && tp == "Catalog"
            {
                return Some(dict.clone());
            }
        }
        None
    }

    /// Fetches an object by id, parsing and caching it on first use.
    pub fn get_object(&self, id: u32) -> Result<Arc<Object>> {
        if id == 0 {
            return Err(ExtractError::MissingObject(0));
        }

        // Thread-local cycle detection: a /Length reference back into the
        // object being parsed must not recurse forever.
        thread_local! {
            static RESOLVING: RefCell<HashSet<u32>> = RefCell::new(HashSet::new());
        }
        struct Guard {
            id: u32,
        }
        impl Drop for Guard {
            fn drop(&mut self) {
                RESOLVING.with(|set| {
                    set.borrow_mut().remove(&self.id);
                });
            }
        }
        let circular = RESOLVING.with(|set| !set.borrow_mut().insert(id));
        if circular {
            return Err(ExtractError::Syntax(format!(
                "circular reference through object {id}"
            )));
        }
        let _guard = Guard { id };

        if let Some(obj) = self.cache.lock().unwrap().get(id) {
            return Ok(obj);
        }

        let entry = *self
            .entries
            .get(&id)
            .ok_or(ExtractError::MissingObject(id))?;
        let obj = match entry {
            XRefEntry::Offset { pos } => {
                let (header, obj) = parse_indirect_at(&self.data, pos, &|r| {
                    self.get_object(r.id).ok().and_then(|o| o.as_i64().ok())
                })?;
                if header.id != id {
                    warn!(
                        "cross-reference points object {id} at object {}",
                        header.id
                    );
                }
                obj
            }
            XRefEntry::InStream { stream_id, index } => {
                self.object_from_stream(stream_id, index)?
            }
        };

        let obj = Arc::new(obj);
        self.cache.lock().unwrap().insert(id, Arc::clone(&obj));
        Ok(obj)
    }

    fn object_from_stream(&self, stream_id: u32, index: usize) -> Result<Object> {
        let objstm = self.load_objstm(stream_id)?;
        let (_, rel) = *objstm.index.get(index).ok_or_else(|| {
            ExtractError::Syntax(format!(
                "object stream {stream_id} has no slot {index}"
            ))
        })?;
        let at = objstm
            .first
            .checked_add(rel)
            .filter(|&p| p < objstm.data.len())
            .ok_or_else(|| {
                ExtractError::Syntax(format!(
                    "offset outside object stream {stream_id}"
                ))
            })?;
        let mut parser = ObjectParser::with_pos(&objstm.data, at);
        parser.next_object()?.ok_or(ExtractError::UnexpectedEof)
    }

    fn load_objstm(&self, stream_id: u32) -> Result<Arc<ObjStm>> {
        if let Some(stm) = self.objstms.lock().unwrap().get(stream_id) {
            return Ok(stm);
        }

        let container = self.get_object(stream_id)?;
        let stream = container.as_stream()?;
        let n = self.dict_usize(&stream.dict, "N")?;
        let first = self.dict_usize(&stream.dict, "First")?;
        let data = self.decode_stream(stream)?;
        if first > data.len() || n > data.len() {
            return Err(ExtractError::Syntax(format!(
                "object stream {stream_id} header out of bounds"
            )));
        }

        // The preamble holds `/N` pairs of `id offset`.
        let mut header = ObjectParser::new(&data[..first]);
        let mut index = Vec::new();
        for _ in 0..n {
            let id = header.expect_integer()?;
            let rel = header.expect_integer()?;
            let (Ok(id), Ok(rel)) = (u32::try_from(id), usize::try_from(rel)) else {
                return Err(ExtractError::Syntax(format!(
                    "bad header pair in object stream {stream_id}"
                )));
            };
            index.push((id, rel));
        }

        let stm = Arc::new(ObjStm { first, index, data });
        self.objstms
            .lock()
            .unwrap()
            .insert(stream_id, Arc::clone(&stm));
        Ok(stm)
    }

    /// Follows reference chains until a direct object, with a depth guard.
    pub fn resolve(&self, obj: &Object) -> Result<Object> {
        let mut current = obj.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Object::Reference(r) => current = (*self.get_object(r.id)?).clone(),
                other => return Ok(other),
            }
        }
        Err(ExtractError::Syntax(
            "reference chain too deep".to_string(),
        ))
    }

    /// Resolved dict lookup; `None` for absent keys, nulls, and dangling
    /// references.
    pub fn resolve_key(&self, dict: &Dict, key: &str) -> Option<Object> {
        let value = dict.get(key)?;
        let resolved = self.resolve(value).ok()?;
        (!resolved.is_null()).then_some(resolved)
    }

    fn dict_usize(&self, dict: &Dict, key: &'static str) -> Result<usize> {
        let value = dict.get(key).ok_or(ExtractError::MissingKey(key))?;
        let n = self.resolve(value)?.as_i64()?;
        usize::try_from(n)
            .map_err(|_| ExtractError::Syntax(format!("negative /{key}")))
    }

    /// Decodes a stream body through its `/Filter` chain.
    pub fn decode_stream(&self, stream: &StreamObject) -> Result<Vec<u8>> {
        let filters = self.stream_filters(&stream.dict)?;
        if filters.is_empty() {
            return Ok(stream.raw.to_vec());
        }
        decode_chain(&filters, &stream.raw)
    }

    /// Normalizes `/Filter` and `/DecodeParms` into parallel (name, params)
    /// pairs, resolving indirect values along the way.
    fn stream_filters(&self, dict: &Dict) -> Result<Vec<(String, Dict)>> {
        let filter = match dict.get("Filter") {
            None => return Ok(Vec::new()),
            Some(f) => self.resolve(f).unwrap_or_else(|_| f.clone()),
        };
        let names: Vec<String> = match filter {
            Object::Null => return Ok(Vec::new()),
            Object::Name(name) => vec![name],
            Object::Array(items) => {
                let mut names = Vec::with_capacity(items.len());
                for item in items {
                    let item = self.resolve(&item).unwrap_or(item);
                    names.push(item.as_name()?.to_string());
                }
                names
            }
            other => {
                return Err(ExtractError::Type {
                    expected: "name or array",
                    got: other.kind(),
                });
            }
        };

        let parms: Vec<Dict> = match dict.get("DecodeParms").or_else(|| dict.get("DP")) {
            None => Vec::new(),
            Some(p) => {
                let p = self.resolve(p).unwrap_or_else(|_| p.clone());
                match p {
                    Object::Dict(d) => vec![d],
                    Object::Array(items) => items
                        .into_iter()
                        .map(|item| {
                            let item = self.resolve(&item).unwrap_or(item);
                            match item {
                                Object::Dict(d) => d,
                                _ => Dict::new(),
                            }
                        })
                        .collect(),
                    _ => Vec::new(),
                }
            }
        };

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, parms.get(i).cloned().unwrap_or_default()))
            .collect())
    }
}

/// Scans the trailing window for the last `startxref` and parses its offset.
fn find_startxref(data: &[u8]) -> Result<usize> {
    let needle = b"startxref";
    if data.len() < needle.len() {
        return Err(ExtractError::NoXref);
    }
    let window_start = data.len().saturating_sub(STARTXREF_WINDOW);
    let found = data[window_start..]
        .windows(needle.len())
        .rposition(|w| w == needle)
        .ok_or(ExtractError::NoXref)?;

    let rest = &data[window_start + found + needle.len()..];
    let mut pos = 0;
    while pos < rest.len() && is_whitespace(rest[pos]) {
        pos += 1;
    }
    let start = pos;
    while pos < rest.len() && rest[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == start {
        return Err(ExtractError::NoXref);
    }
    std::str::from_utf8(&rest[start..pos])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ExtractError::NoXref)
}

fn trailer_offset(trailer: &Dict, key: &str) -> Option<usize> {
    trailer
        .get(key)
        .and_then(|v| v.as_i64().ok())
        .and_then(|v| usize::try_from(v).ok())
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| acc << 8 | u64::from(b))
}

fn find_from(data: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    data.get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

fn rfind(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).rposition(|w| w == needle)
}

/// Walks backwards from an `obj` keyword over `<id> <gen>`; returns the
/// header start. Both numbers require at least one digit and leading
/// whitespace.
fn header_before(data: &[u8], obj_pos: usize) -> Option<(u32, u16, usize)> {
    let mut p = obj_pos;
    let ws = p;
    while p > 0 && is_whitespace(data[p - 1]) {
        p -= 1;
    }
    if p == ws {
        return None;
    }
    let gen_end = p;
    while p > 0 && data[p - 1].is_ascii_digit() {
        p -= 1;
    }
    if p == gen_end {
        return None;
    }
    let genno: u16 = std::str::from_utf8(&data[p..gen_end]).ok()?.parse().ok()?;

    let ws = p;
    while p > 0 && is_whitespace(data[p - 1]) {
        p -= 1;
    }
    if p == ws {
        return None;
    }
    let id_end = p;
    while p > 0 && data[p - 1].is_ascii_digit() {
        p -= 1;
    }
    if p == id_end {
        return None;
    }
    let id: u32 = std::str::from_utf8(&data[p..id_end]).ok()?.parse().ok()?;
    Some((id, genno, p))
}
