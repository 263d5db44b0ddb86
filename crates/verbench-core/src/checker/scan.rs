//! Bracket-aware scan of a token stream into a structural index.
//!
//! The scan is heuristic: it recognizes the syntactic shapes the check
//! vocabulary talks about and ignores everything else. Unbalanced brackets
//! extend to end of input.

use super::lexer::{tokenize, Token, TokenKind};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub module: String,
    pub bindings: Vec<ImportBinding>,
    pub type_only: bool,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Member path of the callee, e.g. `["z", "string"]`. A callee rooted in
    /// an expression (`f().then()`) only keeps the identifier segments.
    pub callee: Vec<String>,
    pub awaited: bool,
    pub is_new: bool,
    pub args_open: usize,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub path: Vec<String>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLiteral {
    pub open: usize,
    pub close: usize,
    pub keys: Vec<String>,
    /// Variable or property name the literal is assigned to.
    pub bound_to: Option<String>,
    /// Index into `calls` of the invocation this literal is an argument of,
    /// and whether it sits inside an array argument.
    pub argument_of: Option<(usize, bool)>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Identifier, or the source text of a destructuring pattern.
    pub name: String,
    /// Names introduced by the parameter (member names for object patterns).
    pub bindings: Vec<String>,
    pub type_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: Option<String>,
    pub is_async: bool,
    pub is_generator: bool,
    pub params: Vec<Param>,
    /// Token range of the body; `None` for bodiless declarations.
    pub body: Option<(usize, usize)>,
    pub line: u32,
}

impl FunctionInfo {
    pub fn contains(&self, token: usize) -> bool {
        self.body.is_some_and(|(a, b)| token > a && token < b)
    }
}

#[derive(Debug, Default)]
pub struct SourceIndex {
    pub imports: Vec<ImportDecl>,
    /// Modules referenced outside static imports (`import()`, `require()`, re-exports).
    pub module_refs: Vec<String>,
    pub exports: Vec<String>,
    pub calls: Vec<CallSite>,
    pub jsx_tags: Vec<Usage>,
    pub member_chains: Vec<Usage>,
    pub objects: Vec<ObjectLiteral>,
    pub directives: Vec<String>,
    pub functions: Vec<FunctionInfo>,
    pub yields: Vec<(usize, u32)>,
}

/// Identifiers that are never the callee of an invocation when not preceded by `.`.
const NON_CALLEE_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "typeof", "do", "else", "with",
    "await", "yield", "void", "delete", "in", "of", "instanceof", "class", "const", "let", "var",
    "import", "export", "super", "new", "throw", "case", "default", "try", "finally", "extends",
    "async", "from", "as", "satisfies", "keyof",
];

const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

const MEMBER_MODIFIERS: &[&str] = &["async", "get", "set", "static"];

/// Words after which `<Ident` opens a JSX element.
const JSX_PREFIX_WORDS: &[&str] = &["return", "yield", "await", "default", "case", "else"];

impl SourceIndex {
    pub fn build(src: &str) -> Self {
        let tokens = tokenize(src);
        let scanner = Scanner::new(src, &tokens);
        scanner.index()
    }
}

struct Scanner<'a> {
    src: &'a str,
    toks: &'a [Token],
    close_of: Vec<Option<usize>>,
    open_of: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, toks: &'a [Token]) -> Self {
        let n = toks.len();
        let mut close_of = vec![None; n];
        let mut open_of = vec![None; n];
        let mut parent = vec![None; n];
        let mut stack: Vec<usize> = Vec::new();
        for (i, t) in toks.iter().enumerate() {
            if t.kind != TokenKind::Punct {
                parent[i] = stack.last().copied();
                continue;
            }
            match t.text.as_str() {
                "(" | "[" | "{" => {
                    parent[i] = stack.last().copied();
                    stack.push(i);
                }
                ")" | "]" | "}" => {
                    let want = match t.text.as_str() {
                        ")" => "(",
                        "]" => "[",
                        _ => "{",
                    };
                    match stack.iter().rposition(|&o| toks[o].text == want) {
                        Some(pos) => {
                            let open = stack[pos];
                            stack.truncate(pos);
                            close_of[open] = Some(i);
                            open_of[i] = Some(open);
                            parent[i] = parent[open];
                        }
                        None => parent[i] = stack.last().copied(),
                    }
                }
                _ => parent[i] = stack.last().copied(),
            }
        }
        Self {
            src,
            toks,
            close_of,
            open_of,
            parent,
        }
    }

    fn len(&self) -> usize {
        self.toks.len()
    }

    fn tok(&self, i: usize) -> Option<&Token> {
        self.toks.get(i)
    }

    fn before(&self, i: usize, back: usize) -> Option<&Token> {
        i.checked_sub(back).and_then(|k| self.toks.get(k))
    }

    fn is_p(&self, i: usize, p: &str) -> bool {
        self.tok(i).is_some_and(|t| t.is_punct(p))
    }

    fn is_id(&self, i: usize, name: &str) -> bool {
        self.tok(i).is_some_and(|t| t.is_ident(name))
    }

    fn ident(&self, i: usize) -> Option<&str> {
        self.tok(i)
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text.as_str())
    }

    fn string(&self, i: usize) -> Option<&str> {
        self.tok(i)
            .filter(|t| t.kind == TokenKind::Str)
            .map(|t| t.text.as_str())
    }

    fn line(&self, i: usize) -> u32 {
        self.tok(i).map(|t| t.line).unwrap_or(0)
    }

    fn close(&self, open: usize) -> usize {
        self.close_of
            .get(open)
            .copied()
            .flatten()
            .unwrap_or(self.len())
    }

    fn after_dot(&self, i: usize) -> bool {
        self.before(i, 1)
            .is_some_and(|t| t.is_punct(".") || t.is_punct("?."))
    }

    fn raw(&self, from: usize, to_inclusive: usize) -> String {
        match (self.tok(from), self.tok(to_inclusive)) {
            (Some(a), Some(b)) if a.start <= b.end => self.src[a.start..b.end].trim().to_string(),
            _ => String::new(),
        }
    }

    /// Splits the contents of a bracket pair into entries separated by `,`
    /// (and `;` for type literals) at the bracket's own depth.
    fn entries(&self, open: usize) -> Vec<(usize, usize)> {
        let close = self.close(open);
        let mut out = Vec::new();
        let mut start = open + 1;
        let mut angle = 0usize;
        for k in open + 1..close {
            if self.parent[k] != Some(open) {
                continue;
            }
            if self.is_p(k, "<") {
                angle += 1;
            } else if self.is_p(k, ">") {
                angle = angle.saturating_sub(1);
            } else if (self.is_p(k, ",") || self.is_p(k, ";")) && angle == 0 {
                if start < k {
                    out.push((start, k));
                }
                start = k + 1;
            }
        }
        if start < close {
            out.push((start, close));
        }
        out
    }

    fn index(&self) -> SourceIndex {
        let mut idx = SourceIndex::default();
        let (functions, param_opens) = self.scan_functions();
        idx.calls = self.scan_calls(&param_opens);
        let call_by_args: HashMap<usize, usize> = idx
            .calls
            .iter()
            .enumerate()
            .map(|(n, c)| (c.args_open, n))
            .collect();
        self.scan_imports(&mut idx);
        self.scan_exports(&mut idx);
        idx.objects = self.scan_objects(&param_opens, &call_by_args);
        idx.jsx_tags = self.scan_jsx();
        idx.member_chains = self.scan_member_chains();
        idx.directives = self.prologue(0, self.len());
        for f in &functions {
            if let Some((open, close)) = f.body {
                if self.is_p(open, "{") {
                    idx.directives.extend(self.prologue(open + 1, close));
                }
            }
        }
        idx.functions = functions;
        idx.yields = (0..self.len())
            .filter(|&i| self.is_id(i, "yield") && !self.after_dot(i) && !self.is_p(i + 1, ":"))
            .map(|i| (i, self.line(i)))
            .collect();
        idx
    }

    // --- functions ---

    fn scan_functions(&self) -> (Vec<FunctionInfo>, HashSet<usize>) {
        let mut out = Vec::new();
        let mut param_opens = HashSet::new();
        for i in 0..self.len() {
            let t = &self.toks[i];
            if t.is_ident("function") && !self.after_dot(i) {
                let is_async = i > 0 && self.is_id(i - 1, "async");
                let mut j = i + 1;
                let is_generator = self.is_p(j, "*");
                if is_generator {
                    j += 1;
                }
                let mut name = None;
                if let Some(id) = self.ident(j) {
                    name = Some(id.to_string());
                    j += 1;
                }
                j = self.skip_type_params(j);
                if !self.is_p(j, "(") {
                    continue;
                }
                param_opens.insert(j);
                let start = if is_async { i - 1 } else { i };
                if name.is_none() {
                    name = self.binding_name_before(start);
                }
                out.push(FunctionInfo {
                    name,
                    is_async,
                    is_generator,
                    params: self.parse_params(j),
                    body: self.find_body(self.close(j) + 1),
                    line: t.line,
                });
            } else if t.is_punct("=>") {
                if let Some(f) = self.arrow_at(i, &mut param_opens) {
                    out.push(f);
                }
            } else if t.kind == TokenKind::Ident
                && self.is_p(i + 1, "(")
                && !self.after_dot(i)
                && !NON_CALLEE_WORDS.contains(&t.text.as_str())
                && !self.before(i, 1).is_some_and(|p| p.is_ident("new"))
                && !param_opens.contains(&(i + 1))
            {
                // method definition: `name(...) {` or `name(...): T {`
                let Some(body) = self.find_body(self.close(i + 1) + 1) else {
                    continue;
                };
                let prev = self.before(i, 1);
                let is_generator = prev.is_some_and(|p| p.is_punct("*"));
                let is_async = prev.is_some_and(|p| p.is_ident("async"))
                    || (is_generator && self.before(i, 2).is_some_and(|p| p.is_ident("async")));
                param_opens.insert(i + 1);
                out.push(FunctionInfo {
                    name: Some(t.text.clone()),
                    is_async,
                    is_generator,
                    params: self.parse_params(i + 1),
                    body: Some(body),
                    line: t.line,
                });
            }
        }
        (out, param_opens)
    }

    fn arrow_at(&self, i: usize, param_opens: &mut HashSet<usize>) -> Option<FunctionInfo> {
        let prev = self.before(i, 1)?;
        let (start, params) = if let Some(close) = self.return_type_close(i) {
            let open = self.open_of[close]?;
            param_opens.insert(open);
            (open, self.parse_params(open))
        } else if prev.is_punct(")") {
            let open = self.open_of[i - 1]?;
            param_opens.insert(open);
            (open, self.parse_params(open))
        } else if prev.kind == TokenKind::Ident {
            let name = prev.text.clone();
            (
                i - 1,
                vec![Param {
                    name: name.clone(),
                    bindings: vec![name],
                    type_text: None,
                }],
            )
        } else {
            return None;
        };
        let is_async = start > 0 && self.is_id(start - 1, "async");
        let fn_start = if is_async { start - 1 } else { start };
        let body = if self.is_p(i + 1, "{") {
            (i + 1, self.close(i + 1))
        } else {
            (i, self.expression_end(i + 1))
        };
        Some(FunctionInfo {
            name: self.binding_name_before(fn_start),
            is_async,
            is_generator: false,
            params,
            body: Some(body),
            line: self.line(i),
        })
    }

    /// For `(a): T => ...`, the index of the `)` closing the parameter list.
    fn return_type_close(&self, arrow: usize) -> Option<usize> {
        let mut m = arrow.checked_sub(1)?;
        for _ in 0..40 {
            let t = self.tok(m)?;
            if t.is_punct(":") {
                return (m > 0 && self.is_p(m - 1, ")")).then(|| m - 1);
            }
            let type_like = match t.kind {
                TokenKind::Ident | TokenKind::Str | TokenKind::Number => true,
                TokenKind::Punct => matches!(
                    t.text.as_str(),
                    "<" | ">" | "." | "|" | "&" | "[" | "]" | "," | "?"
                ),
                _ => false,
            };
            if !type_like {
                return None;
            }
            m = m.checked_sub(1)?;
        }
        None
    }

    fn expression_end(&self, from: usize) -> usize {
        let mut k = from;
        while let Some(t) = self.tok(k) {
            if t.kind == TokenKind::Punct {
                match t.text.as_str() {
                    "(" | "[" | "{" => {
                        k = self.close(k) + 1;
                        continue;
                    }
                    "," | ";" | ")" | "]" | "}" => return k,
                    _ => {}
                }
            }
            k += 1;
        }
        self.len()
    }

    fn skip_type_params(&self, i: usize) -> usize {
        if !self.is_p(i, "<") {
            return i;
        }
        let mut depth = 0usize;
        let mut k = i;
        while let Some(t) = self.tok(k) {
            if t.is_punct("<") {
                depth += 1;
            } else if t.is_punct(">") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return k + 1;
                }
            } else if t.is_punct("{") || t.is_punct(";") {
                return i;
            }
            k += 1;
        }
        i
    }

    /// Locates a block body after a parameter list, skipping a return type.
    fn find_body(&self, k: usize) -> Option<(usize, usize)> {
        if self.is_p(k, "{") {
            return Some((k, self.close(k)));
        }
        if !self.is_p(k, ":") {
            return None;
        }
        let mut m = k + 1;
        let mut after_type_op = true;
        for _ in 0..64 {
            let t = self.tok(m)?;
            if t.kind == TokenKind::Punct {
                match t.text.as_str() {
                    "{" if after_type_op => {
                        // object type literal in the return type
                        m = self.close(m) + 1;
                        after_type_op = false;
                        continue;
                    }
                    "{" => return Some((m, self.close(m))),
                    "(" | "[" => {
                        m = self.close(m) + 1;
                        after_type_op = false;
                        continue;
                    }
                    ";" | "=>" | ")" | "," | "}" | "=" => return None,
                    "|" | "&" | "<" => after_type_op = true,
                    _ => after_type_op = false,
                }
            } else {
                after_type_op = false;
            }
            m += 1;
        }
        None
    }

    fn binding_name_before(&self, start: usize) -> Option<String> {
        let prev = self.before(start, 1)?;
        if prev.is_punct("=") {
            return self.assigned_name(start - 1);
        }
        if prev.is_punct(":") {
            return self
                .before(start, 2)
                .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::Str))
                .map(|t| t.text.clone());
        }
        if prev.is_ident("default") {
            return Some("default".to_string());
        }
        None
    }

    /// Name on the left of the `=` at `eq`, looking through a type annotation.
    fn assigned_name(&self, eq: usize) -> Option<String> {
        if let Some(id) = eq.checked_sub(1).and_then(|k| self.ident(k)) {
            return Some(id.to_string());
        }
        let mut k = eq;
        for _ in 0..30 {
            k = k.checked_sub(1)?;
            let t = self.tok(k)?;
            if t.is_punct(";") || t.is_punct("{") || t.is_punct("}") {
                return None;
            }
            if matches!(t.text.as_str(), "const" | "let" | "var") && t.kind == TokenKind::Ident {
                return self.ident(k + 1).map(str::to_string);
            }
        }
        None
    }

    fn parse_params(&self, open: usize) -> Vec<Param> {
        let mut out = Vec::new();
        for (a, b) in self.entries(open) {
            let mut k = a;
            while k + 1 < b
                && self
                    .ident(k)
                    .is_some_and(|id| PARAM_MODIFIERS.contains(&id))
            {
                k += 1;
            }
            if self.is_p(k, "...") {
                k += 1;
            }
            let Some(t) = self.tok(k) else { continue };
            let (name, bindings, mut p) = if t.is_punct("{") || t.is_punct("[") {
                let close = self.close(k);
                (self.raw(k, close), self.pattern_keys(k), close + 1)
            } else if t.kind == TokenKind::Ident {
                (t.text.clone(), vec![t.text.clone()], k + 1)
            } else {
                continue;
            };
            if self.is_p(p, "?") {
                p += 1;
            }
            let mut type_text = None;
            if p < b && self.is_p(p, ":") {
                let mut end = b;
                let mut angle = 0usize;
                for m in p + 1..b {
                    if self.parent[m] != Some(open) {
                        continue;
                    }
                    if self.is_p(m, "<") {
                        angle += 1;
                    } else if self.is_p(m, ">") {
                        angle = angle.saturating_sub(1);
                    } else if self.is_p(m, "=") && angle == 0 {
                        end = m;
                        break;
                    }
                }
                if end > p + 1 {
                    type_text = Some(self.raw(p + 1, end - 1));
                }
            }
            out.push(Param {
                name,
                bindings,
                type_text,
            });
        }
        out
    }

    fn pattern_keys(&self, open: usize) -> Vec<String> {
        self.entries(open)
            .into_iter()
            .filter_map(|(a, _)| {
                let k = if self.is_p(a, "...") { a + 1 } else { a };
                self.ident(k).map(str::to_string)
            })
            .collect()
    }

    // --- calls ---

    fn scan_calls(&self, param_opens: &HashSet<usize>) -> Vec<CallSite> {
        let mut out = Vec::new();
        for i in 0..self.len() {
            let t = &self.toks[i];
            if t.kind != TokenKind::Ident {
                continue;
            }
            if !self.after_dot(i) && NON_CALLEE_WORDS.contains(&t.text.as_str()) {
                continue;
            }
            let mut j = i + 1;
            if self.is_p(j, "?.") && self.is_p(j + 1, "(") {
                j += 1;
            } else if self.is_p(j, "<") {
                match self.skip_generic_args(j) {
                    Some(k) if self.is_p(k, "(") => j = k,
                    _ => continue,
                }
            }
            if !self.is_p(j, "(") || param_opens.contains(&j) {
                continue;
            }
            let mut callee = vec![t.text.clone()];
            let mut k = i;
            while k >= 2
                && (self.is_p(k - 1, ".") || self.is_p(k - 1, "?."))
                && self.ident(k - 2).is_some()
            {
                callee.insert(0, self.toks[k - 2].text.clone());
                k -= 2;
            }
            let is_new = k > 0 && self.is_id(k - 1, "new") && !self.after_dot(k - 1);
            let head = if is_new { k - 1 } else { k };
            let close = self.close(j);
            let continues = self.is_p(close + 1, ".")
                || self.is_p(close + 1, "?.")
                || self.is_p(close + 1, "(")
                || self.is_p(close + 1, "[");
            let awaited =
                head > 0 && self.is_id(head - 1, "await") && !self.after_dot(head - 1) && !continues;
            out.push(CallSite {
                callee,
                awaited,
                is_new,
                args_open: j,
                line: t.line,
            });
        }
        out
    }

    /// Skips `<...>` type arguments at a call site; `None` if it is not one.
    fn skip_generic_args(&self, i: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut k = i;
        for _ in 0..64 {
            let t = self.tok(k)?;
            match t.kind {
                TokenKind::Ident | TokenKind::Str | TokenKind::Number => {}
                TokenKind::Punct => match t.text.as_str() {
                    "<" => depth += 1,
                    ">" => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(k + 1);
                        }
                    }
                    "," | "." | "|" | "&" | "[" | "]" | "{" | "}" | ":" | ";" | "?" | "("
                    | ")" | "=>" => {}
                    _ => return None,
                },
                _ => return None,
            }
            k += 1;
        }
        None
    }

    // --- imports / exports ---

    fn scan_imports(&self, idx: &mut SourceIndex) {
        for i in 0..self.len() {
            if self.is_id(i, "import") && !self.after_dot(i) {
                if self.is_p(i + 1, "(") {
                    if let Some(m) = self.string(i + 2) {
                        idx.module_refs.push(m.to_string());
                    }
                    continue;
                }
                if let Some(decl) = self.import_decl(i) {
                    idx.imports.push(decl);
                }
            } else if self.is_id(i, "require")
                && !self.after_dot(i)
                && self.is_p(i + 1, "(")
                && self.string(i + 2).is_some()
            {
                idx.imports.push(self.require_decl(i));
            }
        }
    }

    fn import_decl(&self, i: usize) -> Option<ImportDecl> {
        let mut j = i + 1;
        let mut type_only = false;
        if self.is_id(j, "type") && !self.is_id(j + 1, "from") && !self.is_p(j + 1, ",") {
            type_only = true;
            j += 1;
        }
        if let Some(m) = self.string(j) {
            return Some(ImportDecl {
                module: m.to_string(),
                bindings: Vec::new(),
                type_only,
                line: self.line(i),
            });
        }
        let mut bindings = Vec::new();
        if let Some(id) = self.ident(j).filter(|id| *id != "from") {
            bindings.push(ImportBinding {
                imported: "default".to_string(),
                local: id.to_string(),
                kind: BindingKind::Default,
            });
            j += 1;
            if self.is_p(j, "=") && self.is_id(j + 1, "require") {
                let module = self.string(j + 3)?.to_string();
                return Some(ImportDecl {
                    module,
                    bindings,
                    type_only,
                    line: self.line(i),
                });
            }
            if self.is_p(j, ",") {
                j += 1;
            }
        }
        if self.is_p(j, "*") && self.is_id(j + 1, "as") {
            if let Some(ns) = self.ident(j + 2) {
                bindings.push(ImportBinding {
                    imported: "*".to_string(),
                    local: ns.to_string(),
                    kind: BindingKind::Namespace,
                });
            }
            j += 3;
        }
        if self.is_p(j, "{") {
            for (a, b) in self.entries(j) {
                let mut k = a;
                if self.is_id(k, "type") && k + 1 < b {
                    k += 1;
                }
                let Some(imported) = self.ident(k).or_else(|| self.string(k)) else {
                    continue;
                };
                let local = if self.is_id(k + 1, "as") && k + 2 < b {
                    self.ident(k + 2).unwrap_or(imported)
                } else {
                    imported
                };
                bindings.push(ImportBinding {
                    imported: imported.to_string(),
                    local: local.to_string(),
                    kind: BindingKind::Named,
                });
            }
            j = self.close(j) + 1;
        }
        if self.is_id(j, "from") {
            let module = self.string(j + 1)?.to_string();
            return Some(ImportDecl {
                module,
                bindings,
                type_only,
                line: self.line(i),
            });
        }
        None
    }

    fn require_decl(&self, i: usize) -> ImportDecl {
        let module = self.string(i + 2).unwrap_or_default().to_string();
        let mut bindings = Vec::new();
        if i >= 2 && self.is_p(i - 1, "=") {
            if let Some(local) = self.ident(i - 2) {
                bindings.push(ImportBinding {
                    imported: "default".to_string(),
                    local: local.to_string(),
                    kind: BindingKind::Default,
                });
            } else if let Some(open) = self.is_p(i - 2, "}").then(|| self.open_of[i - 2]).flatten()
            {
                for (a, b) in self.entries(open) {
                    let Some(imported) = self.ident(a) else { continue };
                    let local = if self.is_p(a + 1, ":") && a + 2 < b {
                        self.ident(a + 2).unwrap_or(imported)
                    } else {
                        imported
                    };
                    bindings.push(ImportBinding {
                        imported: imported.to_string(),
                        local: local.to_string(),
                        kind: BindingKind::Named,
                    });
                }
            }
        }
        ImportDecl {
            module,
            bindings,
            type_only: false,
            line: self.line(i),
        }
    }

    fn scan_exports(&self, idx: &mut SourceIndex) {
        for i in 0..self.len() {
            if self.is_id(i, "export") && !self.after_dot(i) {
                self.export_decl(i + 1, idx);
            } else if self.is_id(i, "module")
                && !self.after_dot(i)
                && self.is_p(i + 1, ".")
                && self.is_id(i + 2, "exports")
            {
                if self.is_p(i + 3, "=") {
                    idx.exports.push("default".to_string());
                    if self.is_p(i + 4, "{") {
                        idx.exports.extend(self.object_keys(i + 4));
                    } else if let Some(id) = self.ident(i + 4) {
                        if id != "function" && id != "class" && id != "async" {
                            idx.exports.push(id.to_string());
                        }
                    }
                } else if self.is_p(i + 3, ".") && self.is_p(i + 5, "=") {
                    if let Some(id) = self.ident(i + 4) {
                        idx.exports.push(id.to_string());
                    }
                }
            } else if self.is_id(i, "exports")
                && !self.after_dot(i)
                && self.is_p(i + 1, ".")
                && self.is_p(i + 3, "=")
            {
                if let Some(id) = self.ident(i + 2) {
                    idx.exports.push(id.to_string());
                }
            }
        }
    }

    fn export_decl(&self, mut j: usize, idx: &mut SourceIndex) {
        if self.is_id(j, "default") {
            idx.exports.push("default".to_string());
            let mut k = j + 1;
            if self.is_id(k, "async") {
                k += 1;
            }
            if self.is_id(k, "function") || self.is_id(k, "class") {
                k += 1;
                if self.is_p(k, "*") {
                    k += 1;
                }
                if let Some(id) = self.ident(k) {
                    idx.exports.push(id.to_string());
                }
            } else if let Some(id) = self.ident(k) {
                let ends = self
                    .tok(k + 1)
                    .map_or(true, |t| t.is_punct(";") || t.newline_before);
                if ends {
                    idx.exports.push(id.to_string());
                }
            }
            return;
        }
        while self
            .ident(j)
            .is_some_and(|id| matches!(id, "async" | "declare" | "abstract"))
        {
            j += 1;
        }
        if self.is_id(j, "type") && self.is_p(j + 1, "{") {
            j += 1;
        }
        if self.is_p(j, "{") {
            for (a, b) in self.entries(j) {
                let mut k = a;
                if self.is_id(k, "type") && k + 1 < b {
                    k += 1;
                }
                let Some(local) = self.ident(k).or_else(|| self.string(k)) else {
                    continue;
                };
                let exported = if self.is_id(k + 1, "as") && k + 2 < b {
                    self.ident(k + 2).or_else(|| self.string(k + 2)).unwrap_or(local)
                } else {
                    local
                };
                idx.exports.push(exported.to_string());
                if exported == "default" && local != "default" {
                    idx.exports.push(local.to_string());
                }
            }
            let after = self.close(j) + 1;
            if self.is_id(after, "from") {
                if let Some(m) = self.string(after + 1) {
                    idx.module_refs.push(m.to_string());
                }
            }
            return;
        }
        if self.is_p(j, "*") {
            let mut k = j + 1;
            if self.is_id(k, "as") {
                if let Some(ns) = self.ident(k + 1) {
                    idx.exports.push(ns.to_string());
                }
                k += 2;
            }
            if self.is_id(k, "from") {
                if let Some(m) = self.string(k + 1) {
                    idx.module_refs.push(m.to_string());
                }
            }
            return;
        }
        match self.ident(j) {
            Some("function") => {
                let mut k = j + 1;
                if self.is_p(k, "*") {
                    k += 1;
                }
                if let Some(id) = self.ident(k) {
                    idx.exports.push(id.to_string());
                }
            }
            Some("const" | "let" | "var") => {
                let k = j + 1;
                if let Some(id) = self.ident(k) {
                    idx.exports.push(id.to_string());
                } else if self.is_p(k, "{") || self.is_p(k, "[") {
                    idx.exports.extend(self.pattern_keys(k));
                }
            }
            Some("class" | "interface" | "type" | "enum" | "namespace") => {
                if let Some(id) = self.ident(j + 1) {
                    idx.exports.push(id.to_string());
                }
            }
            _ => {}
        }
    }

    // --- object literals ---

    fn scan_objects(
        &self,
        param_opens: &HashSet<usize>,
        call_by_args: &HashMap<usize, usize>,
    ) -> Vec<ObjectLiteral> {
        let mut out = Vec::new();
        for i in 0..self.len() {
            if !self.is_p(i, "{") || !self.is_object_open(i) {
                continue;
            }
            if self.parent[i].is_some_and(|p| param_opens.contains(&p)) {
                continue;
            }
            let close = self.close(i);
            if self.is_p(close + 1, "=") {
                continue;
            }
            let argument_of = match self.parent[i] {
                Some(p) if call_by_args.contains_key(&p) => Some((call_by_args[&p], false)),
                Some(p) if self.is_p(p, "[") => self.parent[p]
                    .and_then(|pp| call_by_args.get(&pp))
                    .map(|&c| (c, true)),
                _ => None,
            };
            out.push(ObjectLiteral {
                open: i,
                close,
                keys: self.object_keys(i),
                bound_to: self.object_binding(i),
                argument_of,
                line: self.line(i),
            });
        }
        out
    }

    fn is_object_open(&self, i: usize) -> bool {
        let Some(prev) = self.before(i, 1) else {
            return false;
        };
        match prev.kind {
            TokenKind::Punct => match prev.text.as_str() {
                "=" | "(" | "," | "[" | "?" | "||" | "&&" | "??" | "..." => true,
                ":" => !self.before(i, 3).is_some_and(|t| t.is_ident("case")),
                // JSX attribute container `={{ ... }}`
                "{" => self.before(i, 2).is_some_and(|t| t.is_punct("=")),
                _ => false,
            },
            TokenKind::Ident => matches!(prev.text.as_str(), "return" | "default" | "yield" | "await"),
            _ => false,
        }
    }

    fn object_keys(&self, open: usize) -> Vec<String> {
        let mut keys = Vec::new();
        for (a, b) in self.entries(open) {
            let mut k = a;
            if self.is_p(k, "...") || self.is_p(k, "[") {
                continue;
            }
            while k + 1 < b
                && self
                    .ident(k)
                    .is_some_and(|id| MEMBER_MODIFIERS.contains(&id))
                && !self.is_p(k + 1, "(")
                && !self.is_p(k + 1, ":")
                && !self.is_p(k + 1, ",")
            {
                k += 1;
            }
            if self.is_p(k, "*") {
                k += 1;
            }
            if let Some(t) = self.tok(k) {
                if matches!(t.kind, TokenKind::Ident | TokenKind::Str | TokenKind::Number) {
                    keys.push(t.text.clone());
                }
            }
        }
        keys
    }

    fn object_binding(&self, i: usize) -> Option<String> {
        let prev = self.before(i, 1)?;
        if prev.is_punct("=") {
            return self.assigned_name(i - 1);
        }
        if prev.is_punct(":") {
            return self
                .before(i, 2)
                .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::Str))
                .map(|t| t.text.clone());
        }
        if prev.is_ident("default") {
            return Some("default".to_string());
        }
        None
    }

    // --- jsx, member chains, directives ---

    fn scan_jsx(&self) -> Vec<Usage> {
        let mut out = Vec::new();
        for i in 0..self.len() {
            if !self.is_p(i, "<") || self.ident(i + 1).is_none() {
                continue;
            }
            let opens_element = match self.before(i, 1) {
                None => true,
                Some(p) => match p.kind {
                    TokenKind::Ident => JSX_PREFIX_WORDS.contains(&p.text.as_str()),
                    TokenKind::Punct => !matches!(p.text.as_str(), ")" | "]"),
                    _ => false,
                },
            };
            if !opens_element {
                continue;
            }
            let mut path = vec![self.toks[i + 1].text.clone()];
            let mut k = i + 1;
            while self.is_p(k + 1, ".") {
                match self.ident(k + 2) {
                    Some(seg) => path.push(seg.to_string()),
                    None => break,
                }
                k += 2;
            }
            out.push(Usage {
                path,
                line: self.line(i),
            });
        }
        out
    }

    fn scan_member_chains(&self) -> Vec<Usage> {
        let mut out = Vec::new();
        for i in 0..self.len() {
            if self.ident(i).is_none() || self.after_dot(i) {
                continue;
            }
            let mut path = vec![self.toks[i].text.clone()];
            let mut k = i;
            while self.is_p(k + 1, ".") || self.is_p(k + 1, "?.") {
                match self.ident(k + 2) {
                    Some(seg) => path.push(seg.to_string()),
                    None => break,
                }
                k += 2;
            }
            if path.len() >= 2 {
                out.push(Usage {
                    path,
                    line: self.line(i),
                });
            }
        }
        out
    }

    /// String-literal expression statements at the start of `[start, end)`.
    fn prologue(&self, start: usize, end: usize) -> Vec<String> {
        let mut out = Vec::new();
        let mut k = start;
        while k < end {
            let Some(text) = self.string(k) else { break };
            let next = k + 1;
            let terminated = next >= end
                || self.is_p(next, ";")
                || self.is_p(next, "}")
                || self.tok(next).map_or(true, |t| t.newline_before);
            if !terminated {
                break;
            }
            out.push(text.to_string());
            k = if self.is_p(next, ";") { next + 1 } else { next };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callee_paths(idx: &SourceIndex) -> Vec<String> {
        idx.calls.iter().map(|c| c.callee.join(".")).collect()
    }

    #[test]
    fn indexes_import_forms() {
        let idx = SourceIndex::build(
            r#"
import React, { useState as useLocalState, type FC } from 'react';
import * as z from "zod";
import './globals.css';
const { readFile } = require('fs/promises');
const path = require('path');
"#,
        );
        assert_eq!(idx.imports.len(), 5);
        let react = &idx.imports[0];
        assert_eq!(react.module, "react");
        assert_eq!(react.bindings[0].kind, BindingKind::Default);
        assert_eq!(react.bindings[1].imported, "useState");
        assert_eq!(react.bindings[1].local, "useLocalState");
        assert_eq!(react.bindings[2].imported, "FC");
        assert_eq!(idx.imports[1].bindings[0].kind, BindingKind::Namespace);
        assert!(idx.imports[2].bindings.is_empty());
        assert_eq!(idx.imports[3].bindings[0].imported, "readFile");
        assert_eq!(idx.imports[4].bindings[0].local, "path");
    }

    #[test]
    fn indexes_exports() {
        let idx = SourceIndex::build(
            r#"
export async function generateMetadata() {}
export const revalidate = 60;
export { helper as util };
export default function Page() { return null }
"#,
        );
        for name in ["generateMetadata", "revalidate", "util", "default", "Page"] {
            assert!(idx.exports.iter().any(|e| e == name), "missing {name}");
        }
        assert!(!idx.exports.iter().any(|e| e == "helper"));
    }

    #[test]
    fn call_awaited_only_when_direct_operand() {
        let idx = SourceIndex::build(
            "const a = await cookies();\nconst b = await headers().get('x');\nconst c = (await draftMode()).isEnabled;",
        );
        let by_name = |n: &str| idx.calls.iter().find(|c| c.callee == vec![n.to_string()]).unwrap();
        assert!(by_name("cookies").awaited);
        assert!(!by_name("headers").awaited);
        assert!(by_name("draftMode").awaited);
    }

    #[test]
    fn method_definitions_are_not_calls() {
        let idx = SourceIndex::build(
            "class A { async load(id: string): Promise<void> { await fetchIt(id); } }",
        );
        assert_eq!(callee_paths(&idx), vec!["fetchIt"]);
        let f = idx.functions.iter().find(|f| f.name.as_deref() == Some("load")).unwrap();
        assert!(f.is_async);
        assert_eq!(f.params[0].type_text.as_deref(), Some("string"));
    }

    #[test]
    fn arrow_functions_take_binding_names() {
        let idx = SourceIndex::build(
            "export const handler = async (req: Request): Promise<Response> => { return new Response('ok') }",
        );
        let f = &idx.functions[0];
        assert_eq!(f.name.as_deref(), Some("handler"));
        assert!(f.is_async);
        assert_eq!(f.params[0].name, "req");
        assert_eq!(f.params[0].type_text.as_deref(), Some("Request"));
        assert!(idx.calls.iter().any(|c| c.is_new && c.callee == vec!["Response"]));
    }

    #[test]
    fn object_argument_context() {
        let idx = SourceIndex::build(
            "const app = createApp({ routes: [{ path: '/' }] });\nexport const config = { matcher: ['/x'] };",
        );
        let routes = idx.objects.iter().find(|o| o.keys.contains(&"routes".to_string())).unwrap();
        assert_eq!(routes.argument_of.map(|(_, via_array)| via_array), Some(false));
        let path = idx.objects.iter().find(|o| o.keys.contains(&"path".to_string())).unwrap();
        assert_eq!(path.argument_of, None);
        let cfg = idx.objects.iter().find(|o| o.keys.contains(&"matcher".to_string())).unwrap();
        assert_eq!(cfg.bound_to.as_deref(), Some("config"));
    }

    #[test]
    fn destructuring_is_not_an_object_literal() {
        let idx = SourceIndex::build("const { a, b } = props;\nfunction f({ c }) {}\n({ d } = e);");
        assert!(idx.objects.is_empty());
    }

    #[test]
    fn directives_in_module_and_function_prologue() {
        let idx = SourceIndex::build(
            "'use client'\nimport x from 'y';\nasync function act() {\n  \"use server\";\n  return 1;\n}",
        );
        assert_eq!(idx.directives, vec!["use client", "use server"]);
    }

    #[test]
    fn jsx_tags_and_generics_are_distinguished() {
        let idx = SourceIndex::build(
            "const [v, setV] = useState<string>('');\nreturn (<Suspense fallback={<Spinner />}><Form.Item /></Suspense>);",
        );
        let tags: Vec<_> = idx.jsx_tags.iter().map(|u| u.path.join(".")).collect();
        assert_eq!(tags, vec!["Suspense", "Spinner", "Form.Item"]);
        assert!(idx.calls.iter().any(|c| c.callee == vec!["useState"]));
    }

    #[test]
    fn malformed_input_still_indexes() {
        let idx = SourceIndex::build("import { a from 'b'\nfoo(((\nexport function g(");
        assert!(idx.calls.iter().any(|c| c.callee == vec!["foo"]));
        assert!(idx.exports.iter().any(|e| e == "g"));
    }
}
