//! Parser for the TOC markup dialect.
//!
//! The source is an HTML `<ul>` tree of `<li>` entries whose titles sit in
//! `<span class="LANG">` elements, sprinkled with template directives:
//!
//! - `<?cs # comment ?>` and `<!-- comment -->` are dropped
//! - `<?cs var:NAME ?>` is replaced by the variable's value
//! - `<?cs if:NAME ?> .. <?cs elif:NAME ?> .. <?cs else ?> .. <?cs /if ?>`
//!   keeps the selected branch (`!NAME` negates)
//!
//! Removed text is replaced by its newlines so error line numbers keep
//! pointing into the original source. The list parser is lenient the way
//! browsers are: an unclosed `<li>` ends at the next `<li>` of the same list
//! and unclosed elements are closed at end of input.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::labels::normalize_text;
use crate::domain::source::{TemplateContext, TocDocument, TocEntry};

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<\?cs\s*(.*?)\s*\?>").expect("valid directive regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("valid tag regex")
    })
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("valid attribute regex")
    })
}

fn line_at(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

fn push_newlines(out: &mut String, dropped: &str) {
    out.extend(dropped.chars().filter(|c| *c == '\n'));
}

/// Parse markup TOC content into a document.
#[instrument(level = "debug", skip(content, ctx))]
pub fn parse(
    content: &str,
    ctx: &TemplateContext,
    default_language: &str,
) -> Result<TocDocument, DomainError> {
    let expanded = expand_directives(content, ctx)?;
    let html = strip_comments(&expanded)?;
    let entries = ListParser::new(default_language).run(&html)?;
    debug!("parsed {} top-level entries", entries.len());
    Ok(TocDocument {
        title: None,
        default_language: Some(default_language.to_string()),
        entries,
    })
}

enum Directive<'a> {
    Comment,
    Var(&'a str),
    If(&'a str),
    Elif(&'a str),
    Else,
    EndIf,
    Other(&'a str),
}

fn classify(body: &str) -> Directive<'_> {
    if body.starts_with('#') {
        Directive::Comment
    } else if let Some(name) = body.strip_prefix("var:") {
        Directive::Var(name.trim())
    } else if let Some(expr) = body.strip_prefix("if:") {
        Directive::If(expr.trim())
    } else if let Some(expr) = body
        .strip_prefix("elif:")
        .or_else(|| body.strip_prefix("elseif:"))
    {
        Directive::Elif(expr.trim())
    } else if body == "else" {
        Directive::Else
    } else if body == "/if" {
        Directive::EndIf
    } else {
        Directive::Other(body)
    }
}

fn eval(expr: &str, ctx: &TemplateContext) -> bool {
    match expr.strip_prefix('!') {
        Some(name) => !ctx.is_true(name.trim()),
        None => ctx.is_true(expr),
    }
}

struct Branch {
    parent_live: bool,
    taken: bool,
    live: bool,
    line: usize,
}

fn is_live(stack: &[Branch]) -> bool {
    stack.last().map_or(true, |b| b.live)
}

/// Resolve `<?cs ... ?>` directives against the template context.
pub fn expand_directives(src: &str, ctx: &TemplateContext) -> Result<String, DomainError> {
    let mut out = String::with_capacity(src.len());
    let mut stack: Vec<Branch> = Vec::new();
    let mut last = 0;

    for caps in directive_regex().captures_iter(src) {
        let Some(whole) = caps.get(0) else { continue };
        let segment = &src[last..whole.start()];
        if is_live(&stack) {
            out.push_str(segment);
        } else {
            push_newlines(&mut out, segment);
        }

        let body = caps.get(1).map_or("", |g| g.as_str());
        let line = line_at(src, whole.start());
        let unbalanced = || DomainError::UnbalancedDirective {
            line,
            directive: body.to_string(),
        };

        match classify(body) {
            Directive::Comment => {}
            Directive::Var(name) => {
                if is_live(&stack) {
                    match ctx.var(name) {
                        Some(value) => out.push_str(value),
                        None => warn!("line {}: undefined template variable '{}'", line, name),
                    }
                }
            }
            Directive::If(expr) => {
                let parent_live = is_live(&stack);
                let cond = eval(expr, ctx);
                stack.push(Branch {
                    parent_live,
                    taken: cond,
                    live: parent_live && cond,
                    line,
                });
            }
            Directive::Elif(expr) => {
                let branch = stack.last_mut().ok_or_else(unbalanced)?;
                let cond = !branch.taken && eval(expr, ctx);
                branch.live = branch.parent_live && cond;
                branch.taken |= cond;
            }
            Directive::Else => {
                let branch = stack.last_mut().ok_or_else(unbalanced)?;
                branch.live = branch.parent_live && !branch.taken;
                branch.taken = true;
            }
            Directive::EndIf => {
                stack.pop().ok_or_else(unbalanced)?;
            }
            Directive::Other(other) => {
                warn!("line {}: ignoring unsupported directive '{}'", line, other);
            }
        }

        push_newlines(&mut out, whole.as_str());
        last = whole.end();
    }

    let rest = &src[last..];
    if let Some(pos) = rest.find("<?cs") {
        return Err(DomainError::UnbalancedDirective {
            line: line_at(src, last + pos),
            directive: "<?cs without closing ?>".to_string(),
        });
    }
    if let Some(open) = stack.last() {
        return Err(DomainError::UnbalancedDirective {
            line: open.line,
            directive: "if without /if".to_string(),
        });
    }
    if is_live(&stack) {
        out.push_str(rest);
    }
    Ok(out)
}

/// Remove `<!-- ... -->` comments, keeping their newlines.
pub fn strip_comments(src: &str) -> Result<String, DomainError> {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 4..];
        match after.find("-->") {
            Some(end) => {
                push_newlines(&mut out, &after[..end]);
                rest = &after[end + 3..];
            }
            None => {
                let consumed = src.len() - rest.len();
                return Err(DomainError::InvalidToc {
                    line: line_at(src, consumed + start),
                    message: "unterminated comment".to_string(),
                });
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Decode the HTML entities that appear in TOC titles and urls.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    attr_regex().captures_iter(attrs).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(wanted) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|v| decode_entities(v.as_str()))
    })
}

#[derive(Default)]
struct ItemFrame {
    url: Option<String>,
    spans: BTreeMap<String, String>,
    text: String,
    children: Vec<TocEntry>,
    line: usize,
}

enum Frame {
    List(Vec<TocEntry>),
    Item(ItemFrame),
}

struct ListParser<'a> {
    default_language: &'a str,
    stack: Vec<Frame>,
    roots: Vec<TocEntry>,
    spans: Vec<Option<String>>,
    line: usize,
}

impl<'a> ListParser<'a> {
    fn new(default_language: &'a str) -> Self {
        Self {
            default_language,
            stack: Vec::new(),
            roots: Vec::new(),
            spans: Vec::new(),
            line: 1,
        }
    }

    fn run(mut self, html: &str) -> Result<Vec<TocEntry>, DomainError> {
        let mut last = 0;
        let mut skip_until: Option<String> = None;

        for caps in tag_regex().captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            let text = &html[last..whole.start()];
            let closing = caps.get(1).is_some_and(|g| !g.as_str().is_empty());
            let name = caps
                .get(2)
                .map_or(String::new(), |g| g.as_str().to_ascii_lowercase());
            let attrs = caps.get(3).map_or("", |g| g.as_str());

            if skip_until.is_none() {
                self.text(text);
            }
            self.line += text.matches('\n').count();
            last = whole.end();

            if skip_until.is_some() {
                if closing && skip_until.as_deref() == Some(name.as_str()) {
                    skip_until = None;
                }
                self.line += whole.as_str().matches('\n').count();
                continue;
            }

            match (closing, name.as_str()) {
                (false, "script" | "style") => skip_until = Some(name.clone()),
                (false, "ul" | "ol") => self.stack.push(Frame::List(Vec::new())),
                (true, "ul" | "ol") => self.close_list()?,
                (false, "li") => self.open_item()?,
                (true, "li") => {
                    if matches!(self.stack.last(), Some(Frame::Item(_))) {
                        self.close_item()?;
                    } else {
                        debug!("line {}: stray </li>", self.line);
                    }
                }
                (false, "a") => {
                    if let Some(Frame::Item(item)) = self.stack.last_mut() {
                        if item.url.is_none() {
                            item.url = attribute(attrs, "href")
                                .map(|h| h.trim().to_string())
                                .filter(|h| !h.is_empty());
                        }
                    }
                }
                (false, "span") => {
                    let lang = attribute(attrs, "class")
                        .and_then(|c| c.split_whitespace().next().map(str::to_string));
                    self.spans.push(lang);
                }
                (true, "span") => {
                    self.spans.pop();
                }
                _ => {}
            }
            self.line += whole.as_str().matches('\n').count();
        }
        if skip_until.is_none() {
            self.text(&html[last..]);
        }
        self.finish()
    }

    fn text(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        let lang = self.spans.iter().rev().find_map(|s| s.clone());
        if let Some(Frame::Item(item)) = self.stack.last_mut() {
            let target = match lang {
                Some(lang) => item.spans.entry(lang).or_default(),
                None => &mut item.text,
            };
            target.push(' ');
            target.push_str(&decoded);
        }
    }

    fn open_item(&mut self) -> Result<(), DomainError> {
        if matches!(self.stack.last(), Some(Frame::Item(_))) {
            self.close_item()?;
        }
        self.spans.clear();
        if matches!(self.stack.last(), Some(Frame::List(_))) {
            self.stack.push(Frame::Item(ItemFrame {
                line: self.line,
                ..ItemFrame::default()
            }));
        } else {
            debug!("line {}: <li> outside of a list", self.line);
        }
        Ok(())
    }

    fn close_item(&mut self) -> Result<(), DomainError> {
        self.spans.clear();
        if let Some(Frame::Item(item)) = self.stack.pop() {
            if let Some(entry) = self.finish_item(item)? {
                self.attach(vec![entry]);
            }
        }
        Ok(())
    }

    fn close_list(&mut self) -> Result<(), DomainError> {
        if !self.stack.iter().any(|f| matches!(f, Frame::List(_))) {
            debug!("line {}: stray </ul>", self.line);
            return Ok(());
        }
        loop {
            if matches!(self.stack.last(), Some(Frame::Item(_))) {
                self.close_item()?;
                continue;
            }
            if let Some(Frame::List(entries)) = self.stack.pop() {
                self.attach(entries);
            }
            return Ok(());
        }
    }

    fn attach(&mut self, entries: Vec<TocEntry>) {
        match self.stack.last_mut() {
            Some(Frame::Item(item)) => item.children.extend(entries),
            Some(Frame::List(list)) => list.extend(entries),
            None => self.roots.extend(entries),
        }
    }

    fn finish_item(&self, item: ItemFrame) -> Result<Option<TocEntry>, DomainError> {
        let mut labels = BTreeMap::new();
        for (lang, text) in item.spans {
            let text = normalize_text(&text);
            if !text.is_empty() {
                labels.insert(lang, text);
            }
        }
        let has_default = labels
            .keys()
            .any(|l| l.eq_ignore_ascii_case(self.default_language));
        if !has_default {
            let text = normalize_text(&item.text);
            if !text.is_empty() {
                labels.insert(self.default_language.to_string(), text);
            }
        }

        let url = item.url.unwrap_or_default();
        let has_default = labels
            .keys()
            .any(|l| l.eq_ignore_ascii_case(self.default_language));
        if !has_default {
            if url.is_empty() && item.children.is_empty() && labels.is_empty() {
                debug!("line {}: dropping empty list item", item.line);
                return Ok(None);
            }
            return Err(DomainError::MissingDefaultLabel {
                url: if url.is_empty() {
                    format!("<li> at line {}", item.line)
                } else {
                    url
                },
                language: self.default_language.to_string(),
            });
        }

        Ok(Some(TocEntry {
            url,
            labels,
            children: item.children,
        }))
    }

    fn finish(mut self) -> Result<Vec<TocEntry>, DomainError> {
        if !self.stack.is_empty() {
            warn!("toc ends with {} unclosed element(s)", self.stack.len());
        }
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Item(item) => {
                    if let Some(entry) = self.finish_item(item)? {
                        self.attach(vec![entry]);
                    }
                }
                Frame::List(entries) => self.attach(entries),
            }
        }
        Ok(self.roots)
    }
}
