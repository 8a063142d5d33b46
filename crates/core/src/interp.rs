//! Content stream interpreter.
//!
//! Executes page content against a [`Device`], tracking only what text
//! extraction needs: the coordinate transform, the text state, and the
//! font and XObject resource maps. Graphics operators that cannot affect
//! text are ignored, and content-level damage never fails a page; broken
//! operators are logged and skipped.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::content::{ContentParser, Operation};
use crate::device::{Device, TextItem};
use crate::document::Document;
use crate::error::Result;
use crate::font::Font;
use crate::matrix::{MATRIX_IDENTITY, Matrix, mat_mul, mat_translate};
use crate::object::{Dict, Object, StreamObject};
use crate::page::Page;

/// Form XObjects deeper than this are dropped.
const MAX_FORM_DEPTH: usize = 16;

/// Text parameters as set by the text state operators.
#[derive(Debug, Clone)]
pub struct TextState {
    pub font: Option<Arc<Font>>,
    pub fontsize: f64,
    pub charspace: f64,
    pub wordspace: f64,
    /// Horizontal scaling as a fraction (`Tz` operand / 100).
    pub scaling: f64,
    /// Stored negated: `T*` translates the text matrix by this amount.
    pub leading: f64,
    /// `Ts` offset: shifts the glyph origin off the baseline.
    pub rise: f64,
    /// Text matrix as set by `Tm` and the line-motion operators.
    pub matrix: Matrix,
}

impl Default for TextState {
    fn default() -> TextState {
        TextState {
            font: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
        }
    }
}

/// Executes content streams for one document against a device.
///
/// Create once per document: loaded fonts are cached across pages by
/// object id.
pub struct Interpreter<'a, D: Device> {
    doc: &'a Document,
    device: &'a mut D,
    /// Per-document font cache, keyed by font dict object id.
    fonts: FxHashMap<u32, Arc<Font>>,
    /// Current resource maps, swapped per page and per form.
    fontmap: FxHashMap<String, Arc<Font>>,
    xobjmap: FxHashMap<String, Object>,
    gstack: Vec<(Matrix, TextState)>,
    /// Names of the form XObjects currently executing.
    form_stack: Vec<String>,
    ctm: Matrix,
    state: TextState,
}

impl<'a, D: Device> Interpreter<'a, D> {
    pub fn new(doc: &'a Document, device: &'a mut D) -> Interpreter<'a, D> {
        Interpreter {
            doc,
            device,
            fonts: FxHashMap::default(),
            fontmap: FxHashMap::default(),
            xobjmap: FxHashMap::default(),
            gstack: Vec::new(),
            form_stack: Vec::new(),
            ctm: MATRIX_IDENTITY,
            state: TextState::default(),
        }
    }

    /// Renders one page through the device.
    ///
    /// Fails only on structural damage (unreadable content streams);
    /// anything wrong inside the content itself is skipped.
    pub fn process_page(&mut self, page: &Page) -> Result<()> {
        let content = page.content_bytes(self.doc)?;
        let ctm = page_ctm(page);
        self.ctm = ctm;
        self.state = TextState::default();
        self.gstack.clear();
        self.form_stack.clear();
        self.init_resources(&page.resources);
        self.device.begin_page(page, ctm);
        self.execute(&content);
        self.device.end_page(page);
        Ok(())
    }

    fn init_resources(&mut self, resources: &Dict) {
        self.fontmap.clear();
        self.xobjmap.clear();
        if let Some(Object::Dict(fonts)) = self.doc.resolve_key(resources, "Font") {
            for (name, value) in &fonts {
                let font = self.load_font(value);
                self.fontmap.insert(name.clone(), font);
            }
        }
        if let Some(Object::Dict(xobjects)) = self.doc.resolve_key(resources, "XObject") {
            self.xobjmap = xobjects.into_iter().collect();
        }
    }

    fn load_font(&mut self, value: &Object) -> Arc<Font> {
        let objid = value.as_reference().ok().map(|r| r.id);
        if let Some(id) = objid
            && let Some(font) = self.fonts.get(&id)
        {
            return Arc::clone(font);
        }
        let loaded = self
            .doc
            .resolve(value)
            .and_then(|obj| Font::load(self.doc, obj.as_dict()?));
        let font = match loaded {
            Ok(font) => Arc::new(font),
            Err(err) => {
                warn!("font load failed: {err}");
                Arc::new(Font::fallback())
            }
        };
        if let Some(id) = objid {
            self.fonts.insert(id, Arc::clone(&font));
        }
        font
    }

    fn execute(&mut self, data: &[u8]) {
        for op in ContentParser::new(data) {
            self.dispatch(&op);
        }
    }

    fn dispatch(&mut self, op: &Operation) {
        match op.operator.as_str() {
            "q" => self.gstack.push((self.ctm, self.state.clone())),
            "Q" => {
                if let Some((ctm, state)) = self.gstack.pop() {
                    self.ctm = ctm;
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(op) {
                    self.ctm = mat_mul(m, self.ctm);
                }
            }
            "BT" => self.state.matrix = MATRIX_IDENTITY,
            "ET" => {}
            "Tc" => {
                if let Some(n) = num(op, 0) {
                    self.state.charspace = n;
                }
            }
            "Tw" => {
                if let Some(n) = num(op, 0) {
                    self.state.wordspace = n;
                }
            }
            "Tz" => {
                if let Some(n) = num(op, 0) {
                    self.state.scaling = n / 100.0;
                }
            }
            "TL" => {
                if let Some(n) = num(op, 0) {
                    self.state.leading = -n;
                }
            }
            "Tf" => self.select_font(op),
            // Render mode changes how glyphs paint, not what they say;
            // invisible text still extracts.
            "Tr" => {}
            "Ts" => {
                if let Some(n) = num(op, 0) {
                    self.state.rise = n;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(op, 0), num(op, 1)) {
                    self.state.matrix = mat_translate(self.state.matrix, (tx, ty));
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (num(op, 0), num(op, 1)) {
                    self.state.leading = ty;
                    self.state.matrix = mat_translate(self.state.matrix, (tx, ty));
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(op) {
                    self.state.matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => self.show_at(op, 0),
            "'" => {
                self.next_line();
                self.show_at(op, 0);
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (num(op, 0), num(op, 1)) {
                    self.state.wordspace = aw;
                    self.state.charspace = ac;
                }
                self.next_line();
                self.show_at(op, 2);
            }
            "TJ" => self.show_array(op),
            "Do" => self.do_xobject(op),
            "BX" | "EX" => {}
            _ => debug!("operator {} ignored", op.operator),
        }
    }

    fn select_font(&mut self, op: &Operation) {
        let Some(Object::Name(fontid)) = op.operands.first() else {
            debug!("Tf without a font name");
            return;
        };
        let size = num(op, 1).unwrap_or(12.0);
        let font = match self.fontmap.get(fontid) {
            Some(font) => Arc::clone(font),
            None => {
                warn!("undefined font resource /{fontid}");
                Arc::new(Font::fallback())
            }
        };
        debug!("Tf /{fontid} {size} -> {}", font.name());
        self.state.font = Some(font);
        self.state.fontsize = size;
    }

    fn next_line(&mut self) {
        self.state.matrix = mat_translate(self.state.matrix, (0.0, self.state.leading));
    }

    fn show_at(&mut self, op: &Operation, idx: usize) {
        if let Some(Object::Str(bytes)) = op.operands.get(idx) {
            let items = [TextItem::Show(bytes.clone())];
            self.device.render_string(&self.state, &items, self.ctm);
        }
    }

    fn show_array(&mut self, op: &Operation) {
        let Some(Object::Array(entries)) = op.operands.first() else {
            return;
        };
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Object::Str(bytes) => items.push(TextItem::Show(bytes.clone())),
                other => {
                    if let Ok(n) = other.as_f64() {
                        items.push(TextItem::Adjust(n));
                    }
                }
            }
        }
        self.device.render_string(&self.state, &items, self.ctm);
    }

    fn do_xobject(&mut self, op: &Operation) {
        let Some(Object::Name(name)) = op.operands.first() else {
            return;
        };
        let Some(entry) = self.xobjmap.get(name).cloned() else {
            debug!("undefined XObject resource /{name}");
            return;
        };
        let resolved = match self.doc.resolve(&entry) {
            Ok(obj) => obj,
            Err(err) => {
                warn!("XObject /{name} unresolvable: {err}");
                return;
            }
        };
        let Ok(stream) = resolved.as_stream() else {
            debug!("XObject /{name} is not a stream");
            return;
        };
        let subtype = self
            .doc
            .resolve_key(&stream.dict, "Subtype")
            .and_then(|obj| obj.as_name().ok().map(str::to_owned));
        match subtype.as_deref() {
            Some("Form") => self.run_form(name, stream),
            Some("Image") => {}
            other => debug!("XObject /{name} subtype {other:?} ignored"),
        }
    }

    /// Runs a form XObject in place: the form matrix composes onto the
    /// CTM, the form's own resources (if any) shadow the page's, and the
    /// text state starts fresh. Everything is restored afterwards.
    fn run_form(&mut self, name: &str, stream: &StreamObject) {
        if self.form_stack.iter().any(|n| n == name) || self.form_stack.len() >= MAX_FORM_DEPTH {
            warn!("form XObject /{name} recursion halted");
            return;
        }
        let data = match self.doc.decode_stream(stream) {
            Ok(data) => data,
            Err(err) => {
                warn!("form XObject /{name} undecodable: {err}");
                return;
            }
        };
        let resources = self
            .doc
            .resolve_key(&stream.dict, "Resources")
            .and_then(|obj| obj.as_dict().ok().cloned());

        let saved_ctm = self.ctm;
        let saved_state = std::mem::take(&mut self.state);
        let saved_depth = self.gstack.len();
        self.ctm = mat_mul(form_matrix(self.doc, &stream.dict), self.ctm);
        self.state = TextState::default();

        let saved_maps = resources.map(|res| {
            let fonts = std::mem::take(&mut self.fontmap);
            let xobjs = std::mem::take(&mut self.xobjmap);
            self.init_resources(&res);
            (fonts, xobjs)
        });

        self.form_stack.push(name.to_string());
        self.execute(&data);
        self.form_stack.pop();

        if let Some((fonts, xobjs)) = saved_maps {
            self.fontmap = fonts;
            self.xobjmap = xobjs;
        }
        self.gstack.truncate(saved_depth);
        self.ctm = saved_ctm;
        self.state = saved_state;
    }
}

/// Page-level CTM: flips and shifts for `/Rotate`, scales for `/UserUnit`.
fn page_ctm(page: &Page) -> Matrix {
    let (x0, y0, x1, y1) = page.mediabox;
    let mut ctm = match page.rotate {
        90 => (0.0, -1.0, 1.0, 0.0, -y0, x1),
        180 => (-1.0, 0.0, 0.0, -1.0, x1, y1),
        270 => (0.0, 1.0, -1.0, 0.0, y1, -x0),
        _ => (1.0, 0.0, 0.0, 1.0, -x0, -y0),
    };
    if page.user_unit != 1.0 {
        ctm = mat_mul((page.user_unit, 0.0, 0.0, page.user_unit, 0.0, 0.0), ctm);
    }
    ctm
}

fn num(op: &Operation, idx: usize) -> Option<f64> {
    op.operands.get(idx).and_then(|obj| obj.as_f64().ok())
}

fn matrix_operands(op: &Operation) -> Option<Matrix> {
    if op.operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(&op.operands) {
        *slot = obj.as_f64().ok()?;
    }
    Some((m[0], m[1], m[2], m[3], m[4], m[5]))
}

fn form_matrix(doc: &Document, dict: &Dict) -> Matrix {
    let Some(obj) = doc.resolve_key(dict, "Matrix") else {
        return MATRIX_IDENTITY;
    };
    let Ok(items) = obj.as_array() else {
        return MATRIX_IDENTITY;
    };
    if items.len() < 6 {
        return MATRIX_IDENTITY;
    }
    let mut m = [0.0; 6];
    for (slot, item) in m.iter_mut().zip(items) {
        match item.as_f64() {
            Ok(v) => *slot = v,
            Err(_) => return MATRIX_IDENTITY,
        }
    }
    (m[0], m[1], m[2], m[3], m[4], m[5])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Dict;

    fn page_with(mediabox: (f64, f64, f64, f64), rotate: i64, user_unit: f64) -> Page {
        Page {
            id: 1,
            attrs: Dict::new(),
            resources: Dict::new(),
            mediabox,
            rotate,
            user_unit,
        }
    }

    #[test]
    fn test_page_ctm_translates_origin() {
        let page = page_with((5.0, 10.0, 617.0, 802.0), 0, 1.0);
        assert_eq!(page_ctm(&page), (1.0, 0.0, 0.0, 1.0, -5.0, -10.0));
    }

    #[test]
    fn test_page_ctm_rotation() {
        let page = page_with((0.0, 0.0, 612.0, 792.0), 90, 1.0);
        assert_eq!(page_ctm(&page), (0.0, -1.0, 1.0, 0.0, 0.0, 612.0));
        let page = page_with((0.0, 0.0, 612.0, 792.0), 180, 1.0);
        assert_eq!(page_ctm(&page), (-1.0, 0.0, 0.0, -1.0, 612.0, 792.0));
        let page = page_with((0.0, 0.0, 612.0, 792.0), 270, 1.0);
        assert_eq!(page_ctm(&page), (0.0, 1.0, -1.0, 0.0, 792.0, 0.0));
    }

    #[test]
    fn test_page_ctm_user_unit_scales() {
        let page = page_with((0.0, 0.0, 612.0, 792.0), 0, 2.0);
        assert_eq!(page_ctm(&page), (2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
    }

    #[test]
    fn test_matrix_operands() {
        let op = Operation {
            operator: "cm".to_string(),
            operands: vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Real(72.0),
                Object::Real(720.0),
            ],
        };
        assert_eq!(
            matrix_operands(&op),
            Some((1.0, 0.0, 0.0, 1.0, 72.0, 720.0))
        );
        let short = Operation {
            operator: "cm".to_string(),
            operands: vec![Object::Integer(1)],
        };
        assert_eq!(matrix_operands(&short), None);
    }

    #[test]
    fn test_text_state_defaults() {
        let state = TextState::default();
        assert_eq!(state.scaling, 1.0);
        assert_eq!(state.matrix, MATRIX_IDENTITY);
        assert!(state.font.is_none());
    }
}
